//! Maps a subsymbol position and its coding history to a context index.

use crate::state_vars::StateVars;

/// Context index computation shared by the encoder and decoder. Both sides
/// must feed it the same history for the context tables to stay in sync.
pub(crate) struct ContextSelector<'a> {
    vars: &'a StateVars,
}

impl<'a> ContextSelector<'a> {
    pub(crate) fn new(vars: &'a StateVars) -> Self {
        Self { vars }
    }

    /// Context of subsymbol `subsym_idx` under order-0 selection.
    pub(crate) fn context_idx_order_0(&self, subsym_idx: u32) -> usize {
        (u64::from(subsym_idx) * self.vars.coding_size_ctx_offset) as usize
    }

    /// Context of subsymbol `subsym_idx` given the previously decoded
    /// subsymbol values at the same position.
    pub(crate) fn context_idx_order_n(&self, subsym_idx: u32, prv: &[u64; 2]) -> usize {
        let mut ctx_idx = self.vars.num_ctx_luts
            + u64::from(subsym_idx) * self.vars.coding_size_ctx_offset;
        for k in 1..=usize::from(self.vars.coding_order) {
            ctx_idx += prv[k - 1] * self.vars.coding_order_ctx_offset[k];
        }
        ctx_idx as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{
        BinarizationId, ContextSelectionId, EncodingConfiguration, SequenceTransformationId,
        TransformedSequenceConfiguration,
    };

    fn vars_for(context_selection_id: ContextSelectionId) -> StateVars {
        let config = EncodingConfiguration {
            word_size: 1,
            sequence_transformation_id: SequenceTransformationId::NoTransform,
            sequence_transformation_parameter: 0,
            transformed_sequences: vec![TransformedSequenceConfiguration {
                lut_transformation_enabled: false,
                lut_transformation_bits: None,
                lut_transformation_order: None,
                diff_coding_enabled: false,
                binarization_id: BinarizationId::Tu,
                binarization_parameters: vec![3],
                context_selection_id,
            }],
        };
        StateVars::derive(&config, 0).unwrap()
    }

    #[test]
    fn should_stride_order_0_contexts_by_subsymbol() {
        let vars = vars_for(ContextSelectionId::AdaptiveCodingOrder0);
        let selector = ContextSelector::new(&vars);

        assert_eq!(selector.context_idx_order_0(0), 0);
        assert_eq!(selector.context_idx_order_0(1), 3);
    }

    #[test]
    fn should_offset_order_1_contexts_by_history() {
        let vars = vars_for(ContextSelectionId::AdaptiveCodingOrder1);
        let selector = ContextSelector::new(&vars);

        let base = selector.context_idx_order_n(0, &[0, 0]);
        let shifted = selector.context_idx_order_n(0, &[2, 0]);
        assert_eq!(shifted - base, 2 * vars.coding_order_ctx_offset[1] as usize);
    }
}
