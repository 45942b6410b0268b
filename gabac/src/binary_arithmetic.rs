//! The binary arithmetic coding engine.
//!
//! A 9-bit range / 32-bit low register M-coder. The encoder defers `0xFF`
//! bytes until a carry can no longer reach them; the decoder mirrors the
//! renormalization schedule exactly, so both sides consume the same number
//! of coded bits per bin.

use crate::bit_stream::{BitInputStream, BitOutputStream};
use crate::context_model::{ContextModel, RENORM_TABLE};

const HALF_RANGE: u32 = 256;
const WRITE_OUT_THRESHOLD: i32 = 12;

pub(crate) struct BinaryArithmeticEncoder {
    bit_stream: BitOutputStream,
    low: u32,
    range: u32,
    num_bits_left: i32,
    buffered_byte: u32,
    num_buffered_bytes: u32,
}

impl BinaryArithmeticEncoder {
    pub(crate) fn new() -> Self {
        let mut encoder = Self {
            bit_stream: BitOutputStream::new(),
            low: 0,
            range: 0,
            num_bits_left: 0,
            buffered_byte: 0,
            num_buffered_bytes: 0,
        };
        encoder.start();
        encoder
    }

    fn start(&mut self) {
        self.low = 0;
        self.range = 510;
        self.num_bits_left = 23;
        self.buffered_byte = 0xFF;
        self.num_buffered_bytes = 0;
    }

    /// Encodes one bin with an adaptive context model.
    pub(crate) fn encode_bin(&mut self, bin: u32, ctx: &mut ContextModel) {
        debug_assert!(bin <= 1);

        let lps = ctx.lps((self.range >> 6) & 3);
        self.range -= lps;

        if bin != ctx.mps() {
            let num_bits = i32::from(RENORM_TABLE[(lps >> 3) as usize]);
            self.low = (self.low + self.range) << num_bits;
            self.range = lps << num_bits;
            ctx.update_lps();
            self.num_bits_left -= num_bits;
        } else {
            ctx.update_mps();
            if self.range >= HALF_RANGE {
                return;
            }
            self.low <<= 1;
            self.range <<= 1;
            self.num_bits_left -= 1;
        }

        if self.num_bits_left < WRITE_OUT_THRESHOLD {
            self.write_out();
        }
    }

    /// Encodes one equiprobable (bypass) bin.
    pub(crate) fn encode_bin_ep(&mut self, bin: u32) {
        debug_assert!(bin <= 1);

        self.low <<= 1;
        if bin != 0 {
            self.low += self.range;
        }
        self.num_bits_left -= 1;

        if self.num_bits_left < WRITE_OUT_THRESHOLD {
            self.write_out();
        }
    }

    /// Encodes `num_bins` equiprobable bins, MSB first, in chunks of at
    /// most eight.
    pub(crate) fn encode_bins_ep(&mut self, bins: u32, num_bins: u32) {
        debug_assert!(num_bins <= 32);
        debug_assert!(num_bins == 32 || u64::from(bins) < (1_u64 << num_bins));

        let mut bins = bins;
        let mut num_bins = num_bins;

        while num_bins > 8 {
            num_bins -= 8;
            let pattern = bins >> num_bins;
            self.low <<= 8;
            self.low += self.range * pattern;
            bins -= pattern << num_bins;
            self.num_bits_left -= 8;

            if self.num_bits_left < WRITE_OUT_THRESHOLD {
                self.write_out();
            }
        }

        self.low <<= num_bins;
        self.low += self.range * bins;
        self.num_bits_left -= num_bins as i32;

        if self.num_bits_left < WRITE_OUT_THRESHOLD {
            self.write_out();
        }
    }

    /// Encodes the termination bin. `1` ends the coded stream.
    fn encode_bin_trm(&mut self, bin: u32) {
        self.range -= 2;

        if bin != 0 {
            self.low += self.range;
            self.low <<= 7;
            self.range = 2 << 7;
            self.num_bits_left -= 7;
        } else if self.range >= HALF_RANGE {
            return;
        } else {
            self.low <<= 1;
            self.range <<= 1;
            self.num_bits_left -= 1;
        }

        if self.num_bits_left < WRITE_OUT_THRESHOLD {
            self.write_out();
        }
    }

    /// Terminates the coded stream and byte-aligns the output.
    pub(crate) fn flush(&mut self) {
        self.encode_bin_trm(1);
        self.finish();
        self.bit_stream.write(1, 1);
        self.bit_stream.write_align_zero();
        self.start();
    }

    /// Number of complete output bytes emitted so far, including bytes
    /// still held back for carry resolution.
    pub(crate) fn num_bytes(&self) -> usize {
        self.bit_stream.len() + self.num_buffered_bytes as usize
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.bit_stream.into_bytes()
    }

    fn write_out(&mut self) {
        let lead_byte = self.low >> (24 - self.num_bits_left);
        self.num_bits_left += 8;
        self.low &= u32::MAX >> self.num_bits_left;

        if lead_byte == 0xFF {
            self.num_buffered_bytes += 1;
        } else if self.num_buffered_bytes > 0 {
            let carry = lead_byte >> 8;
            self.bit_stream.write((self.buffered_byte + carry) & 0xFF, 8);
            self.buffered_byte = lead_byte & 0xFF;

            let byte = (0xFF + carry) & 0xFF;
            while self.num_buffered_bytes > 1 {
                self.bit_stream.write(byte, 8);
                self.num_buffered_bytes -= 1;
            }
        } else {
            self.num_buffered_bytes = 1;
            self.buffered_byte = lead_byte;
        }
    }

    fn finish(&mut self) {
        if (self.low >> (32 - self.num_bits_left)) != 0 {
            self.bit_stream
                .write((self.buffered_byte + 1) & 0xFF, 8);
            while self.num_buffered_bytes > 1 {
                self.bit_stream.write(0x00, 8);
                self.num_buffered_bytes -= 1;
            }
            self.low -= 1 << (32 - self.num_bits_left);
        } else {
            if self.num_buffered_bytes > 0 {
                self.bit_stream.write(self.buffered_byte, 8);
            }
            while self.num_buffered_bytes > 1 {
                self.bit_stream.write(0xFF, 8);
                self.num_buffered_bytes -= 1;
            }
        }
        self.num_buffered_bytes = 0;
        self.bit_stream
            .write(self.low >> 8, (24 - self.num_bits_left) as u32);
    }
}

pub(crate) struct BinaryArithmeticDecoder<'a> {
    bit_stream: BitInputStream<'a>,
    value: u32,
    range: u32,
    num_bits_needed: i32,
}

impl<'a> BinaryArithmeticDecoder<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        let mut bit_stream = BitInputStream::new(data);
        let value = (bit_stream.read_byte() << 8) | bit_stream.read_byte();

        Self {
            bit_stream,
            value,
            range: 510,
            num_bits_needed: -8,
        }
    }

    pub(crate) fn decode_bin(&mut self, ctx: &mut ContextModel) -> u32 {
        let lps = ctx.lps((self.range >> 6) & 3);
        self.range -= lps;
        let scaled_range = self.range << 7;

        if self.value < scaled_range {
            let bin = ctx.mps();
            ctx.update_mps();

            if scaled_range < (HALF_RANGE << 7) {
                self.range = scaled_range >> 6;
                self.value <<= 1;
                self.num_bits_needed += 1;
                if self.num_bits_needed == 0 {
                    self.num_bits_needed = -8;
                    self.value += self.bit_stream.read_byte();
                }
            }
            bin
        } else {
            let num_bits = i32::from(RENORM_TABLE[(lps >> 3) as usize]);
            self.value = (self.value - scaled_range) << num_bits;
            self.range = lps << num_bits;
            let bin = 1 - ctx.mps();
            ctx.update_lps();

            self.num_bits_needed += num_bits;
            if self.num_bits_needed >= 0 {
                self.value += self.bit_stream.read_byte() << self.num_bits_needed;
                self.num_bits_needed -= 8;
            }
            bin
        }
    }

    #[cfg(test)]
    pub(crate) fn decode_bin_ep(&mut self) -> u32 {
        self.value <<= 1;
        self.num_bits_needed += 1;
        if self.num_bits_needed >= 0 {
            self.num_bits_needed = -8;
            self.value += self.bit_stream.read_byte();
        }

        let scaled_range = self.range << 7;
        if self.value >= scaled_range {
            self.value -= scaled_range;
            1
        } else {
            0
        }
    }

    pub(crate) fn decode_bins_ep(&mut self, num_bins: u32) -> u32 {
        debug_assert!(num_bins <= 32);

        let mut bins: u32 = 0;
        let mut num_bins = num_bins;

        while num_bins > 8 {
            self.value = (self.value << 8)
                + (self.bit_stream.read_byte() << (8 + self.num_bits_needed));
            let mut scaled_range = self.range << 15;
            for _ in 0..8 {
                bins += bins;
                scaled_range >>= 1;
                if self.value >= scaled_range {
                    bins += 1;
                    self.value -= scaled_range;
                }
            }
            num_bins -= 8;
        }

        self.num_bits_needed += num_bins as i32;
        self.value <<= num_bins;
        if self.num_bits_needed >= 0 {
            self.value += self.bit_stream.read_byte() << self.num_bits_needed;
            self.num_bits_needed -= 8;
        }

        let mut scaled_range = self.range << (num_bins + 7);
        for _ in 0..num_bins {
            bins += bins;
            scaled_range >>= 1;
            if self.value >= scaled_range {
                bins += 1;
                self.value -= scaled_range;
            }
        }
        bins
    }

    fn decode_bin_trm(&mut self) -> u32 {
        self.range -= 2;
        let scaled_range = self.range << 7;

        if self.value >= scaled_range {
            1
        } else {
            if scaled_range < (HALF_RANGE << 7) {
                self.range = scaled_range >> 6;
                self.value <<= 1;
                self.num_bits_needed += 1;
                if self.num_bits_needed == 0 {
                    self.num_bits_needed = -8;
                    self.value += self.bit_stream.read_byte();
                }
            }
            0
        }
    }

    /// Consumes the termination bin and returns the number of payload
    /// bytes read.
    pub(crate) fn close(&mut self) -> usize {
        self.decode_bin_trm();
        self.bit_stream.num_bytes_read()
    }
}
