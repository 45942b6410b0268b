//! Bin-level symbol writer: binarizes values and feeds the arithmetic
//! encoder.

use crate::binary_arithmetic::BinaryArithmeticEncoder;
use crate::context_model::{build_context_table, ContextModel};

/// Writes binarized symbols into a context-adaptive or bypass bitstream.
///
/// One `Writer` per transformed substream; it owns the arithmetic encoder
/// register state and the full context model table, so independent
/// substreams never share adaptive state.
pub(crate) struct Writer {
    encoder: BinaryArithmeticEncoder,
    context_models: Vec<ContextModel>,
    bypass_flag: bool,
}

impl Writer {
    pub(crate) fn new(bypass_flag: bool, num_contexts: usize) -> Self {
        let context_models = if bypass_flag {
            Vec::new()
        } else {
            build_context_table(num_contexts)
        };

        Self {
            encoder: BinaryArithmeticEncoder::new(),
            context_models,
            bypass_flag,
        }
    }

    /// Fixed-width binary, bypass bins.
    pub(crate) fn write_as_bi_bypass(&mut self, input: u64, c_length: u32) {
        self.encoder.encode_bins_ep(input as u32, c_length);
    }

    /// Fixed-width binary, one context per bit position starting at
    /// `ctx_idx`.
    pub(crate) fn write_as_bi_cabac(&mut self, input: u64, c_length: u32, ctx_idx: u32) {
        let mut cm = ctx_idx as usize;
        for i in (0..c_length).rev() {
            let bin = ((input >> i) & 0x1) as u32;
            self.encoder.encode_bin(bin, &mut self.context_models[cm]);
            cm += 1;
        }
    }

    /// Truncated unary, bypass bins.
    pub(crate) fn write_as_tu_bypass(&mut self, input: u64, c_max: u32) {
        debug_assert!(input <= u64::from(c_max));

        for _ in 0..input {
            self.encoder.encode_bin_ep(1);
        }
        if u64::from(c_max) > input {
            self.encoder.encode_bin_ep(0);
        }
    }

    /// Truncated unary, one context per bin position starting at `ctx_idx`.
    pub(crate) fn write_as_tu_cabac(&mut self, input: u64, c_max: u32, ctx_idx: u32) {
        debug_assert!(input <= u64::from(c_max));

        let mut cm = ctx_idx as usize;
        for _ in 0..input {
            self.encoder.encode_bin(1, &mut self.context_models[cm]);
            cm += 1;
        }
        if u64::from(c_max) > input {
            self.encoder.encode_bin(0, &mut self.context_models[cm]);
        }
    }

    /// Exp-Golomb, bypass bins.
    pub(crate) fn write_as_eg_bypass(&mut self, input: u64) {
        let value_plus_1 = (input + 1) as u32;
        let num_lead_zeros = 31 - value_plus_1.leading_zeros();

        self.write_as_bi_bypass(1, num_lead_zeros + 1);
        if num_lead_zeros > 0 {
            self.write_as_bi_bypass(
                u64::from(value_plus_1 & ((1 << num_lead_zeros) - 1)),
                num_lead_zeros,
            );
        }
    }

    /// Exp-Golomb with a context-coded prefix; the suffix stays bypass.
    pub(crate) fn write_as_eg_cabac(&mut self, input: u64, ctx_idx: u32) {
        let value_plus_1 = (input + 1) as u32;
        let num_lead_zeros = 31 - value_plus_1.leading_zeros();

        self.write_as_bi_cabac(1, num_lead_zeros + 1, ctx_idx);
        if num_lead_zeros > 0 {
            self.write_as_bi_bypass(
                u64::from(value_plus_1 & ((1 << num_lead_zeros) - 1)),
                num_lead_zeros,
            );
        }
    }

    /// Truncated Exp-Golomb, bypass bins.
    pub(crate) fn write_as_teg_bypass(&mut self, input: u64, c_max: u32) {
        if input < u64::from(c_max) {
            self.write_as_tu_bypass(input, c_max);
        } else {
            self.write_as_tu_bypass(u64::from(c_max), c_max);
            self.write_as_eg_bypass(input - u64::from(c_max));
        }
    }

    /// Truncated Exp-Golomb; the escape Exp-Golomb part reuses the
    /// contexts right after the unary ones.
    pub(crate) fn write_as_teg_cabac(&mut self, input: u64, c_max: u32, ctx_idx: u32) {
        self.write_as_tu_cabac(input.min(u64::from(c_max)), c_max, ctx_idx);
        if input >= u64::from(c_max) {
            self.write_as_eg_cabac(input - u64::from(c_max), ctx_idx + c_max);
        }
    }

    /// Split-unit truncated unary, bypass bins. The first unit absorbs the
    /// remainder when `split_unit_size` does not divide `output_sym_size`.
    #[cfg(test)]
    pub(crate) fn write_as_sutu_bypass(
        &mut self,
        input: u64,
        output_sym_size: u32,
        split_unit_size: u32,
    ) {
        let mut i = 0;
        let mut j = output_sym_size;
        while i < output_sym_size {
            let unit_size = if i == 0 && output_sym_size % split_unit_size != 0 {
                output_sym_size % split_unit_size
            } else {
                split_unit_size
            };
            let c_max = (1 << unit_size) - 1;
            j -= unit_size;
            let val = (input >> j) & u64::from(c_max);
            self.write_as_tu_bypass(val, c_max);
            i += split_unit_size;
        }
    }

    /// Split-unit truncated unary; each unit advances the context block by
    /// its own `c_max`.
    pub(crate) fn write_as_sutu_cabac(
        &mut self,
        input: u64,
        output_sym_size: u32,
        split_unit_size: u32,
        ctx_idx: u32,
    ) {
        let mut cm = ctx_idx;
        let mut i = 0;
        let mut j = output_sym_size;
        while i < output_sym_size {
            let unit_size = if i == 0 && output_sym_size % split_unit_size != 0 {
                output_sym_size % split_unit_size
            } else {
                split_unit_size
            };
            let c_max = (1 << unit_size) - 1;
            j -= unit_size;
            let val = (input >> j) & u64::from(c_max);
            self.write_as_tu_cabac(val, c_max, cm);
            cm += c_max;
            i += split_unit_size;
        }
    }

    /// Double truncated unary, bypass bins.
    #[cfg(test)]
    pub(crate) fn write_as_dtu_bypass(
        &mut self,
        input: u64,
        output_sym_size: u32,
        split_unit_size: u32,
        c_max_dtu: u32,
    ) {
        self.write_as_tu_bypass(input.min(u64::from(c_max_dtu)), c_max_dtu);
        if input >= u64::from(c_max_dtu) {
            self.write_as_sutu_bypass(
                input - u64::from(c_max_dtu),
                output_sym_size,
                split_unit_size,
            );
        }
    }

    /// Double truncated unary; the split-unit escape reuses the contexts
    /// right after the unary ones.
    #[cfg(test)]
    pub(crate) fn write_as_dtu_cabac(
        &mut self,
        input: u64,
        output_sym_size: u32,
        split_unit_size: u32,
        c_max_dtu: u32,
        ctx_idx: u32,
    ) {
        self.write_as_tu_cabac(input.min(u64::from(c_max_dtu)), c_max_dtu, ctx_idx);
        if input >= u64::from(c_max_dtu) {
            self.write_as_sutu_cabac(
                input - u64::from(c_max_dtu),
                output_sym_size,
                split_unit_size,
                ctx_idx + c_max_dtu,
            );
        }
    }

    /// Lookup-table symbols use split-unit coding over the dedicated
    /// context block at index 0.
    pub(crate) fn write_lut_symbol(&mut self, input: u64, coding_subsym_size: u32) {
        self.write_as_sutu_cabac(input, coding_subsym_size, 2, 0);
    }

    /// Sign flag for signed binarizations; shares the last context in the
    /// table.
    pub(crate) fn write_sign_flag(&mut self, value: i64) {
        let bin = u64::from(value < 0);
        if self.bypass_flag {
            self.write_as_bi_bypass(bin, 1);
        } else {
            let ctx_idx = (self.context_models.len() - 1) as u32;
            self.write_as_bi_cabac(bin, 1, ctx_idx);
        }
    }

    /// Bytes emitted so far, used for the early abort in the exhaustive
    /// search.
    pub(crate) fn num_bytes_written(&self) -> usize {
        self.encoder.num_bytes()
    }

    /// Terminates the bitstream and returns the payload bytes.
    pub(crate) fn close(mut self) -> Vec<u8> {
        self.encoder.flush();
        self.encoder.into_bytes()
    }
}
