//! Bit-granular output and byte-granular input plumbing for the arithmetic
//! coder.

/// Accumulates bits most-significant-first into a byte vector.
pub(crate) struct BitOutputStream {
    bytes: Vec<u8>,
    held_bits: u8,
    num_held_bits: u32,
}

impl BitOutputStream {
    pub(crate) fn new() -> Self {
        Self {
            bytes: Vec::new(),
            held_bits: 0,
            num_held_bits: 0,
        }
    }

    /// Writes the `num_bits` least significant bits of `value`, MSB first.
    pub(crate) fn write(&mut self, value: u32, mut num_bits: u32) {
        debug_assert!(num_bits <= 32);
        debug_assert!(num_bits == 32 || u64::from(value) < (1_u64 << num_bits));

        while num_bits > 0 {
            let take = (8 - self.num_held_bits).min(num_bits);
            num_bits -= take;
            let chunk = (u64::from(value) >> num_bits) & ((1 << take) - 1);
            self.held_bits = ((u32::from(self.held_bits) << take) | chunk as u32) as u8;
            self.num_held_bits += take;
            if self.num_held_bits == 8 {
                self.bytes.push(self.held_bits);
                self.held_bits = 0;
                self.num_held_bits = 0;
            }
        }
    }

    /// Pads the pending partial byte with zero bits.
    pub(crate) fn write_align_zero(&mut self) {
        if self.num_held_bits > 0 {
            self.bytes
                .push(self.held_bits << (8 - self.num_held_bits));
            self.held_bits = 0;
            self.num_held_bits = 0;
        }
    }

    /// Number of complete bytes emitted so far.
    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        debug_assert_eq!(self.num_held_bits, 0, "stream must be byte-aligned");
        self.bytes
    }
}

/// Reads bytes from a payload slice.
///
/// Reads past the end yield zero bytes: every payload is explicitly
/// length-prefixed by its container, and the decoder's lookahead may
/// legitimately run a few bytes beyond the final renormalization.
pub(crate) struct BitInputStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitInputStream<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn read_byte(&mut self) -> u32 {
        let byte = self.data.get(self.pos).copied().unwrap_or(0);
        self.pos += 1;
        u32::from(byte)
    }

    pub(crate) fn num_bytes_read(&self) -> usize {
        self.pos.min(self.data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_pack_bits_msb_first() {
        let mut stream = BitOutputStream::new();
        stream.write(0b101, 3);
        stream.write(0b0, 1);
        stream.write(0b1111, 4);

        assert_eq!(stream.into_bytes(), vec![0b1010_1111]);
    }

    #[test]
    fn should_pad_partial_byte_with_zeros() {
        let mut stream = BitOutputStream::new();
        stream.write(0b11, 2);
        stream.write_align_zero();

        assert_eq!(stream.into_bytes(), vec![0b1100_0000]);
    }

    #[test]
    fn should_split_writes_across_byte_boundaries() {
        let mut stream = BitOutputStream::new();
        stream.write(0xABCD, 16);
        stream.write(0x12345678, 32);

        assert_eq!(
            stream.into_bytes(),
            vec![0xAB, 0xCD, 0x12, 0x34, 0x56, 0x78]
        );
    }

    #[test]
    fn should_read_zero_bytes_past_the_end() {
        let data = [0x42];
        let mut stream = BitInputStream::new(&data);

        assert_eq!(stream.read_byte(), 0x42);
        assert_eq!(stream.read_byte(), 0);
        assert_eq!(stream.num_bytes_read(), 1);
    }
}
