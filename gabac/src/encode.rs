//! Block-wise encoding of a raw symbol stream into framed substreams.

use std::io::Read;
use std::io::Write;

use log::{debug, trace};

use crate::configuration::EncodingConfiguration;
use crate::data_block::DataBlock;
use crate::error::{GabacError, GabacResult};
use crate::stream_handler::{self, IoConfiguration};
use crate::{transformation, transformed_subseq};

/// Encodes the whole input of `io` under `config`, writing framed blocks
/// of substreams to the output.
pub fn encode(io: &mut IoConfiguration<'_>, config: &EncodingConfiguration) -> GabacResult<()> {
    config.validate()?;

    let word_size = usize::from(config.word_size);
    let mut first_block = true;
    loop {
        let block = read_block(io.input, word_size, io.block_size)?;
        let last_block = io.block_size == 0 || block.len() < io.block_size;
        if block.is_empty() && !first_block {
            break;
        }

        encode_block(config, block, io.output)?;
        first_block = false;
        if last_block {
            break;
        }
    }
    io.output.flush()?;
    Ok(())
}

/// Encodes one block of symbols: sequence transformation, then one framed
/// entropy-coded payload per substream.
pub(crate) fn encode_block(
    config: &EncodingConfiguration,
    block: DataBlock,
    output: &mut dyn Write,
) -> GabacResult<()> {
    trace!("encoding block of {} symbols", block.len());

    let streams = transformation::transform(config, block);
    for (index, stream) in streams.iter().enumerate() {
        let num_symbols = u32::try_from(stream.len()).map_err(|_| {
            GabacError::InvalidConfiguration(format!(
                "substream of {} symbols exceeds the framing limit; use a \
                 smaller block size",
                stream.len()
            ))
        })?;
        if num_symbols == 0 {
            stream_handler::write_substream(output, 0, &[])?;
            continue;
        }

        let payload = transformed_subseq::encode(config, index, stream)?;
        debug!(
            "substream {}: {} symbols in {} bytes",
            index,
            num_symbols,
            payload.len()
        );
        stream_handler::write_substream(output, num_symbols, &payload)?;
    }
    Ok(())
}

/// Reads up to `block_size` symbols (everything when `block_size` is 0).
fn read_block(
    input: &mut dyn Read,
    word_size: usize,
    block_size: usize,
) -> GabacResult<DataBlock> {
    let mut bytes = Vec::new();
    if block_size == 0 {
        input.read_to_end(&mut bytes)?;
    } else {
        (&mut *input)
            .take((block_size * word_size) as u64)
            .read_to_end(&mut bytes)?;
    }

    if bytes.len() % word_size != 0 {
        return Err(GabacError::InvalidConfiguration(format!(
            "input size is not a multiple of the {}-byte word size",
            word_size
        )));
    }
    Ok(DataBlock::from_bytes(bytes, word_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn should_reject_input_not_aligned_to_word_size() {
        let mut cursor = Cursor::new(vec![1, 2, 3]);

        assert!(read_block(&mut cursor, 2, 0).is_err());
    }

    #[test]
    fn should_read_blocks_of_requested_symbol_count() {
        let mut cursor = Cursor::new(vec![1, 0, 2, 0, 3, 0]);

        let first = read_block(&mut cursor, 2, 2).unwrap();
        let second = read_block(&mut cursor, 2, 2).unwrap();

        assert_eq!(first.iter().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(second.iter().collect::<Vec<_>>(), vec![3]);
    }
}
