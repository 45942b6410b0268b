//! Framed substream I/O.
//!
//! Every encoded substream is stored as a big-endian `u32` payload size
//! (four bytes of symbol count plus the coder bitstream; zero marks an
//! empty substream), followed by the symbol count and the payload.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{GabacError, GabacResult};

/// Input, output and block granularity of an encode or decode run.
/// A `block_size` of zero processes the whole input as a single block.
pub struct IoConfiguration<'a> {
    pub input: &'a mut dyn Read,
    pub output: &'a mut dyn Write,
    pub block_size: usize,
}

pub(crate) fn write_substream(
    output: &mut dyn Write,
    num_symbols: u32,
    payload: &[u8],
) -> GabacResult<()> {
    if num_symbols == 0 {
        output.write_u32::<BigEndian>(0)?;
        return Ok(());
    }

    let payload_size = u32::try_from(payload.len() + 4).map_err(|_| {
        GabacError::InvalidConfiguration(format!(
            "substream payload of {} bytes exceeds the framing limit",
            payload.len()
        ))
    })?;
    output.write_u32::<BigEndian>(payload_size)?;
    output.write_u32::<BigEndian>(num_symbols)?;
    output.write_all(payload)?;
    Ok(())
}

/// Reads one framed substream. Returns `None` on a clean end of input,
/// i.e. when not even the size field is present.
pub(crate) fn read_substream(
    input: &mut dyn Read,
) -> GabacResult<Option<(u32, Vec<u8>)>> {
    let mut size_bytes = [0_u8; 4];
    let mut filled = 0;
    while filled < 4 {
        let n = input.read(&mut size_bytes[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(GabacError::CorruptedPayload(
                "input ended inside a substream size field".into(),
            ));
        }
        filled += n;
    }

    let payload_size = u32::from_be_bytes(size_bytes);
    if payload_size == 0 {
        return Ok(Some((0, Vec::new())));
    }
    if payload_size < 4 {
        return Err(GabacError::CorruptedPayload(format!(
            "substream payload size {} is below the symbol-count header",
            payload_size
        )));
    }

    let num_symbols = input.read_u32::<BigEndian>()?;
    let mut payload = vec![0_u8; payload_size as usize - 4];
    input.read_exact(&mut payload)?;
    Ok(Some((num_symbols, payload)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trip_framed_substream() {
        let mut buffer = Vec::new();
        write_substream(&mut buffer, 7, &[1, 2, 3]).unwrap();

        assert_eq!(buffer, vec![0, 0, 0, 7, 0, 0, 0, 7, 1, 2, 3]);

        let mut cursor = Cursor::new(buffer);
        let (num_symbols, payload) = read_substream(&mut cursor).unwrap().unwrap();
        assert_eq!(num_symbols, 7);
        assert_eq!(payload, vec![1, 2, 3]);
        assert!(read_substream(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn should_mark_empty_substream_with_zero_size() {
        let mut buffer = Vec::new();
        write_substream(&mut buffer, 0, &[]).unwrap();

        assert_eq!(buffer, vec![0, 0, 0, 0]);

        let mut cursor = Cursor::new(buffer);
        let (num_symbols, payload) = read_substream(&mut cursor).unwrap().unwrap();
        assert_eq!(num_symbols, 0);
        assert!(payload.is_empty());
    }

    #[test]
    fn should_fail_on_truncated_size_field() {
        let mut cursor = Cursor::new(vec![0, 0]);

        assert!(read_substream(&mut cursor).is_err());
    }

    #[test]
    fn should_fail_on_undersized_payload() {
        let mut cursor = Cursor::new(vec![0, 0, 0, 2]);

        assert!(read_substream(&mut cursor).is_err());
    }
}
