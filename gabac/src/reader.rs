//! Bin-level symbol reader, the exact mirror of [`crate::writer`].

use crate::binary_arithmetic::BinaryArithmeticDecoder;
use crate::context_model::{build_context_table, ContextModel};

pub(crate) struct Reader<'a> {
    decoder: BinaryArithmeticDecoder<'a>,
    context_models: Vec<ContextModel>,
    bypass_flag: bool,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bitstream: &'a [u8], bypass_flag: bool, num_contexts: usize) -> Self {
        let context_models = if bypass_flag {
            Vec::new()
        } else {
            build_context_table(num_contexts)
        };

        Self {
            decoder: BinaryArithmeticDecoder::new(bitstream),
            context_models,
            bypass_flag,
        }
    }

    pub(crate) fn read_as_bi_bypass(&mut self, c_length: u32) -> u64 {
        u64::from(self.decoder.decode_bins_ep(c_length))
    }

    pub(crate) fn read_as_bi_cabac(&mut self, c_length: u32, ctx_idx: u32) -> u64 {
        let mut cm = ctx_idx as usize;
        let mut bins: u64 = 0;
        for _ in 0..c_length {
            bins = (bins << 1)
                | u64::from(self.decoder.decode_bin(&mut self.context_models[cm]));
            cm += 1;
        }
        bins
    }

    pub(crate) fn read_as_tu_bypass(&mut self, c_max: u32) -> u64 {
        let mut i = 0;
        while i < c_max {
            if self.decoder.decode_bins_ep(1) == 0 {
                break;
            }
            i += 1;
        }
        u64::from(i)
    }

    pub(crate) fn read_as_tu_cabac(&mut self, c_max: u32, ctx_idx: u32) -> u64 {
        let mut i = 0;
        let mut cm = ctx_idx as usize;
        while i < c_max {
            if self.decoder.decode_bin(&mut self.context_models[cm]) == 0 {
                break;
            }
            i += 1;
            cm += 1;
        }
        u64::from(i)
    }

    pub(crate) fn read_as_eg_bypass(&mut self) -> u64 {
        let mut i = 0;
        while self.decoder.decode_bins_ep(1) == 0 {
            i += 1;
        }
        if i == 0 {
            return 0;
        }
        let bins = (1 << i) | self.decoder.decode_bins_ep(i);
        u64::from(bins - 1)
    }

    pub(crate) fn read_as_eg_cabac(&mut self, ctx_idx: u32) -> u64 {
        let mut cm = ctx_idx as usize;
        let mut i = 0;
        while self.decoder.decode_bin(&mut self.context_models[cm]) == 0 {
            cm += 1;
            i += 1;
        }
        if i == 0 {
            return 0;
        }
        let bins = (1 << i) | self.decoder.decode_bins_ep(i);
        u64::from(bins - 1)
    }

    pub(crate) fn read_as_teg_bypass(&mut self, c_max: u32) -> u64 {
        let mut value = self.read_as_tu_bypass(c_max);
        if value == u64::from(c_max) {
            value += self.read_as_eg_bypass();
        }
        value
    }

    pub(crate) fn read_as_teg_cabac(&mut self, c_max: u32, ctx_idx: u32) -> u64 {
        let mut value = self.read_as_tu_cabac(c_max, ctx_idx);
        if value == u64::from(c_max) {
            value += self.read_as_eg_cabac(ctx_idx + c_max);
        }
        value
    }

    #[cfg(test)]
    pub(crate) fn read_as_sutu_bypass(&mut self, output_sym_size: u32, split_unit_size: u32) -> u64 {
        let mut value: u64 = 0;
        let mut i = 0;
        while i < output_sym_size {
            let unit_size = if i == 0 && output_sym_size % split_unit_size != 0 {
                output_sym_size % split_unit_size
            } else {
                split_unit_size
            };
            let c_max = (1 << unit_size) - 1;
            let val = self.read_as_tu_bypass(c_max);
            value = (value << split_unit_size) | val;
            i += split_unit_size;
        }
        value
    }

    pub(crate) fn read_as_sutu_cabac(
        &mut self,
        output_sym_size: u32,
        split_unit_size: u32,
        ctx_idx: u32,
    ) -> u64 {
        let mut cm = ctx_idx;
        let mut value: u64 = 0;
        let mut i = 0;
        while i < output_sym_size {
            let unit_size = if i == 0 && output_sym_size % split_unit_size != 0 {
                output_sym_size % split_unit_size
            } else {
                split_unit_size
            };
            let c_max = (1 << unit_size) - 1;
            let val = self.read_as_tu_cabac(c_max, cm);
            cm += c_max;
            value = (value << split_unit_size) | val;
            i += split_unit_size;
        }
        value
    }

    #[cfg(test)]
    pub(crate) fn read_as_dtu_bypass(
        &mut self,
        output_sym_size: u32,
        split_unit_size: u32,
        c_max_dtu: u32,
    ) -> u64 {
        let mut value = self.read_as_tu_bypass(c_max_dtu);
        if value >= u64::from(c_max_dtu) {
            value += self.read_as_sutu_bypass(output_sym_size, split_unit_size);
        }
        value
    }

    #[cfg(test)]
    pub(crate) fn read_as_dtu_cabac(
        &mut self,
        output_sym_size: u32,
        split_unit_size: u32,
        c_max_dtu: u32,
        ctx_idx: u32,
    ) -> u64 {
        let mut value = self.read_as_tu_cabac(c_max_dtu, ctx_idx);
        if value >= u64::from(c_max_dtu) {
            value +=
                self.read_as_sutu_cabac(output_sym_size, split_unit_size, ctx_idx + c_max_dtu);
        }
        value
    }

    pub(crate) fn read_lut_symbol(&mut self, coding_subsym_size: u32) -> u64 {
        self.read_as_sutu_cabac(coding_subsym_size, 2, 0)
    }

    pub(crate) fn read_sign_flag(&mut self) -> bool {
        if self.bypass_flag {
            self.read_as_bi_bypass(1) != 0
        } else {
            let ctx_idx = (self.context_models.len() - 1) as u32;
            self.read_as_bi_cabac(1, ctx_idx) != 0
        }
    }

    /// Consumes the termination bin; returns the number of payload bytes
    /// used.
    pub(crate) fn close(mut self) -> usize {
        self.decoder.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::Writer;

    const NUM_CONTEXTS: usize = 128;

    fn test_values() -> Vec<u64> {
        let mut values: Vec<u64> = (0..40).collect();
        values.extend([62, 63, 64, 100, 255, 1000, 65535, 1 << 20]);
        values
    }

    #[test]
    fn round_trip_bi() {
        let values = test_values();

        let mut writer = Writer::new(false, NUM_CONTEXTS);
        for &value in &values {
            writer.write_as_bi_bypass(value, 21);
            writer.write_as_bi_cabac(value, 21, 3);
        }
        let bytes = writer.close();

        let mut reader = Reader::new(&bytes, false, NUM_CONTEXTS);
        for &value in &values {
            assert_eq!(reader.read_as_bi_bypass(21), value);
            assert_eq!(reader.read_as_bi_cabac(21, 3), value);
        }
        reader.close();
    }

    #[test]
    fn round_trip_tu() {
        let values: Vec<u64> = vec![0, 1, 2, 15, 16, 17];

        let mut writer = Writer::new(false, NUM_CONTEXTS);
        for &value in &values {
            writer.write_as_tu_bypass(value, 17);
            writer.write_as_tu_cabac(value, 17, 0);
        }
        let bytes = writer.close();

        let mut reader = Reader::new(&bytes, false, NUM_CONTEXTS);
        for &value in &values {
            assert_eq!(reader.read_as_tu_bypass(17), value);
            assert_eq!(reader.read_as_tu_cabac(17, 0), value);
        }
        reader.close();
    }

    #[test]
    fn round_trip_eg() {
        let mut values = test_values();
        values.push(u64::from(u32::MAX >> 1) - 1);

        let mut writer = Writer::new(false, NUM_CONTEXTS);
        for &value in &values {
            writer.write_as_eg_bypass(value);
            writer.write_as_eg_cabac(value, 0);
        }
        let bytes = writer.close();

        let mut reader = Reader::new(&bytes, false, NUM_CONTEXTS);
        for &value in &values {
            assert_eq!(reader.read_as_eg_bypass(), value);
            assert_eq!(reader.read_as_eg_cabac(0), value);
        }
        reader.close();
    }

    #[test]
    fn round_trip_teg() {
        let values = test_values();

        let mut writer = Writer::new(false, NUM_CONTEXTS);
        for &value in &values {
            writer.write_as_teg_bypass(value, 5);
            writer.write_as_teg_cabac(value, 5, 1);
        }
        let bytes = writer.close();

        let mut reader = Reader::new(&bytes, false, NUM_CONTEXTS);
        for &value in &values {
            assert_eq!(reader.read_as_teg_bypass(5), value);
            assert_eq!(reader.read_as_teg_cabac(5, 1), value);
        }
        reader.close();
    }

    #[test]
    fn round_trip_sutu_with_uneven_split() {
        let values: Vec<u64> = vec![0, 1, 5, 100, 255, 256, 4095];

        let mut writer = Writer::new(false, NUM_CONTEXTS);
        for &value in &values {
            writer.write_as_sutu_bypass(value, 12, 5);
            writer.write_as_sutu_cabac(value, 12, 5, 0);
        }
        let bytes = writer.close();

        let mut reader = Reader::new(&bytes, false, NUM_CONTEXTS);
        for &value in &values {
            assert_eq!(reader.read_as_sutu_bypass(12, 5), value);
            assert_eq!(reader.read_as_sutu_cabac(12, 5, 0), value);
        }
        reader.close();
    }

    #[test]
    fn round_trip_dtu() {
        let values: Vec<u64> = vec![0, 1, 2, 3, 4, 200, 255];

        let mut writer = Writer::new(false, NUM_CONTEXTS);
        for &value in &values {
            writer.write_as_dtu_bypass(value, 8, 4, 3);
            writer.write_as_dtu_cabac(value, 8, 4, 3, 0);
        }
        let bytes = writer.close();

        let mut reader = Reader::new(&bytes, false, NUM_CONTEXTS);
        for &value in &values {
            assert_eq!(reader.read_as_dtu_bypass(8, 4, 3), value);
            assert_eq!(reader.read_as_dtu_cabac(8, 4, 3, 0), value);
        }
        reader.close();
    }

    #[test]
    fn round_trip_lut_symbols() {
        let values: Vec<u64> = vec![0, 1, 2, 3, 200, 255];

        let mut writer = Writer::new(false, NUM_CONTEXTS);
        for &value in &values {
            writer.write_lut_symbol(value, 8);
        }
        let bytes = writer.close();

        let mut reader = Reader::new(&bytes, false, NUM_CONTEXTS);
        for &value in &values {
            assert_eq!(reader.read_lut_symbol(8), value);
        }
        reader.close();
    }

    #[test]
    fn round_trip_sign_flags() {
        let values: Vec<i64> = vec![-100, -1, 1, 5, -32768, 32767];

        for bypass in [false, true] {
            let mut writer = Writer::new(bypass, NUM_CONTEXTS);
            for &value in &values {
                writer.write_sign_flag(value);
            }
            let bytes = writer.close();

            let mut reader = Reader::new(&bytes, bypass, NUM_CONTEXTS);
            for &value in &values {
                assert_eq!(reader.read_sign_flag(), value < 0);
            }
            reader.close();
        }
    }
}
