//! Derived per-substream coding state: subsymbol layout and context table
//! geometry.

use crate::configuration::{BinarizationId, EncodingConfiguration};
use crate::error::{GabacError, GabacResult};

/// Upper bound on the adaptive context table of a single substream.
/// Configurations whose derived table would exceed it are invalid.
pub(crate) const MAX_TOTAL_CONTEXTS: u64 = 1 << 20;

/// Constants derived from a substream configuration, fixed for the whole
/// substream. Encoder and decoder derive identical values from the shared
/// configuration; this is what keeps their context tables aligned.
#[derive(Debug, Clone)]
pub(crate) struct StateVars {
    pub(crate) output_symbol_size: u32,
    pub(crate) coding_subsym_size: u32,
    pub(crate) coding_order: u8,
    pub(crate) bypass: bool,
    pub(crate) lut_enabled: bool,
    pub(crate) num_subsyms: u32,
    pub(crate) num_alpha_subsym: u64,
    pub(crate) c_length_bi: u32,
    pub(crate) num_ctx_subsym: u64,
    pub(crate) coding_order_ctx_offset: [u64; 3],
    pub(crate) coding_size_ctx_offset: u64,
    pub(crate) num_ctx_luts: u64,
    pub(crate) num_ctx_total: u64,
}

impl StateVars {
    /// Derives the state for the substream at `index`, rejecting
    /// combinations whose context table would not fit.
    pub(crate) fn derive(
        config: &EncodingConfiguration,
        index: usize,
    ) -> GabacResult<Self> {
        let stream = &config.transformed_sequences[index];
        let output_symbol_size = u32::from(config.output_symbol_size(index));
        let lut_enabled = stream.lut_transformation_enabled;
        let coding_subsym_size = if lut_enabled {
            u32::from(stream.lut_bits())
        } else {
            output_symbol_size
        };
        if coding_subsym_size == 0 || output_symbol_size % coding_subsym_size != 0 {
            return Err(GabacError::InvalidConfiguration(format!(
                "subsymbol size {} does not divide symbol size {}",
                coding_subsym_size, output_symbol_size
            )));
        }

        let coding_order = stream.context_selection_id.coding_order();
        let bypass = stream.context_selection_id.is_bypass();
        let num_subsyms = output_symbol_size / coding_subsym_size;
        let num_alpha_subsym = if coding_subsym_size >= 64 {
            u64::MAX
        } else {
            1_u64 << coding_subsym_size
        };

        let c_length_bi = if lut_enabled {
            coding_subsym_size
        } else {
            stream.parameter()
        };

        let mut vars = Self {
            output_symbol_size,
            coding_subsym_size,
            coding_order,
            bypass,
            lut_enabled,
            num_subsyms,
            num_alpha_subsym,
            c_length_bi,
            num_ctx_subsym: 0,
            coding_order_ctx_offset: [0; 3],
            coding_size_ctx_offset: 0,
            num_ctx_luts: 0,
            num_ctx_total: 0,
        };

        if bypass {
            return Ok(vars);
        }

        let eg_prefix_ctxs = floor_log2(num_alpha_subsym as u128 + 1) + 1;
        vars.num_ctx_subsym = match stream.binarization_id {
            BinarizationId::Bi => u64::from(c_length_bi),
            BinarizationId::Tu => u64::from(stream.parameter()),
            BinarizationId::Eg => eg_prefix_ctxs,
            BinarizationId::Seg => eg_prefix_ctxs + 1,
            BinarizationId::Teg => u64::from(stream.parameter()) + eg_prefix_ctxs,
            BinarizationId::Steg => u64::from(stream.parameter()) + eg_prefix_ctxs + 1,
        };

        vars.coding_order_ctx_offset[0] = 0;
        if coding_order >= 1 {
            vars.coding_order_ctx_offset[1] = vars.num_ctx_subsym;
        }
        if coding_order == 2 {
            vars.coding_order_ctx_offset[2] =
                vars.num_ctx_subsym.saturating_mul(num_alpha_subsym);
        }

        let context_size = if coding_order == 0 {
            vars.num_ctx_subsym
        } else {
            vars.coding_order_ctx_offset[coding_order as usize].saturating_mul(num_alpha_subsym)
        };
        vars.coding_size_ctx_offset = context_size;

        if lut_enabled {
            vars.num_ctx_luts = u64::from(
                (coding_subsym_size / 2) * 3 + ((1 << (coding_subsym_size % 2)) - 1),
            );
        }

        vars.num_ctx_total = vars
            .num_ctx_luts
            .saturating_add(u64::from(num_subsyms).saturating_mul(context_size));
        if vars.num_ctx_total > MAX_TOTAL_CONTEXTS {
            return Err(GabacError::InvalidConfiguration(format!(
                "derived context table too large: {} contexts (limit {})",
                vars.num_ctx_total, MAX_TOTAL_CONTEXTS
            )));
        }

        Ok(vars)
    }

    /// Mask selecting a single subsymbol.
    pub(crate) fn subsym_mask(&self) -> u64 {
        if self.coding_subsym_size >= 64 {
            u64::MAX
        } else {
            (1_u64 << self.coding_subsym_size) - 1
        }
    }
}

fn floor_log2(value: u128) -> u64 {
    debug_assert!(value > 0);
    u64::from(127 - value.leading_zeros())
}

/// Reinterprets a raw symbol as a signed value of the given word size.
pub(crate) fn signed_value(symbol: u64, word_size: usize) -> i64 {
    match word_size {
        1 => i64::from(symbol as u8 as i8),
        2 => i64::from(symbol as u16 as i16),
        4 => i64::from(symbol as u32 as i32),
        _ => symbol as i64,
    }
}
