//! Adaptive binary probability models and their transition tables.

/// LPS range per (probability state, range quantizer) pair.
pub(crate) static LPS_TABLE: [[u8; 4]; 64] = [
    [128, 176, 208, 240],
    [128, 167, 197, 227],
    [128, 158, 187, 216],
    [123, 150, 178, 205],
    [116, 142, 169, 195],
    [111, 135, 160, 185],
    [105, 128, 152, 175],
    [100, 122, 144, 166],
    [95, 116, 137, 158],
    [90, 110, 130, 150],
    [85, 104, 123, 142],
    [81, 99, 117, 135],
    [77, 94, 111, 128],
    [73, 89, 105, 122],
    [69, 85, 100, 116],
    [66, 80, 95, 110],
    [62, 76, 90, 104],
    [59, 72, 86, 99],
    [56, 69, 81, 94],
    [53, 65, 77, 89],
    [51, 62, 73, 85],
    [48, 59, 69, 80],
    [46, 56, 66, 76],
    [43, 53, 63, 72],
    [41, 50, 59, 69],
    [39, 48, 56, 65],
    [37, 45, 54, 62],
    [35, 43, 51, 59],
    [33, 41, 48, 56],
    [32, 39, 46, 53],
    [30, 37, 43, 50],
    [29, 35, 41, 48],
    [27, 33, 39, 45],
    [26, 31, 37, 43],
    [24, 30, 35, 41],
    [23, 28, 33, 39],
    [22, 27, 32, 37],
    [21, 26, 30, 35],
    [20, 24, 29, 33],
    [19, 23, 27, 31],
    [18, 22, 26, 30],
    [17, 21, 25, 28],
    [16, 20, 23, 27],
    [15, 19, 22, 25],
    [14, 18, 21, 24],
    [14, 17, 20, 23],
    [13, 16, 19, 22],
    [12, 15, 18, 21],
    [12, 14, 17, 20],
    [11, 14, 16, 19],
    [11, 13, 15, 18],
    [10, 12, 15, 17],
    [10, 12, 14, 16],
    [9, 11, 13, 15],
    [9, 11, 12, 14],
    [8, 10, 12, 14],
    [8, 9, 11, 13],
    [7, 9, 11, 12],
    [7, 9, 10, 12],
    [7, 8, 10, 11],
    [6, 8, 9, 11],
    [6, 7, 9, 10],
    [6, 7, 8, 9],
    [2, 2, 2, 2],
];

/// Renormalization shift per `lps >> 3`.
pub(crate) static RENORM_TABLE: [u8; 32] = [
    6, 5, 4, 4, 3, 3, 3, 3, 2, 2, 2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
];

static STATE_TRANS_MPS: [u8; 64] = [
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26,
    27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48, 49, 50,
    51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61, 62, 62, 63,
];

static STATE_TRANS_LPS: [u8; 64] = [
    0, 0, 1, 2, 2, 4, 4, 5, 6, 7, 8, 9, 9, 11, 11, 12, 13, 13, 15, 15, 16, 16, 18, 18, 19, 19, 21,
    21, 22, 22, 23, 24, 24, 25, 26, 26, 27, 27, 28, 29, 29, 30, 30, 30, 31, 32, 32, 33, 33, 33, 34,
    34, 35, 35, 35, 36, 36, 36, 37, 37, 37, 38, 38, 63,
];

/// An adaptive probability model for a single binary decision.
///
/// Tracks one of 64 probability states plus the current most probable
/// symbol. The state walks the standard transition tables on every coded
/// bin; all models start at the equiprobable state 0 with MPS 0.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub(crate) struct ContextModel {
    state: u8,
    mps: u8,
}

impl ContextModel {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    #[inline]
    pub(crate) fn state(&self) -> u8 {
        self.state
    }

    #[inline]
    pub(crate) fn mps(&self) -> u32 {
        u32::from(self.mps)
    }

    /// LPS range for the current state and the given range quantizer
    /// (`(range >> 6) & 3`).
    #[inline]
    pub(crate) fn lps(&self, q_range_idx: u32) -> u32 {
        u32::from(LPS_TABLE[self.state as usize][q_range_idx as usize])
    }

    #[inline]
    pub(crate) fn update_mps(&mut self) {
        self.state = STATE_TRANS_MPS[self.state as usize];
    }

    #[inline]
    pub(crate) fn update_lps(&mut self) {
        if self.state == 0 {
            self.mps = 1 - self.mps;
        }
        self.state = STATE_TRANS_LPS[self.state as usize];
    }
}

/// Builds a fresh table of `num_contexts` equiprobable models.
pub(crate) fn build_context_table(num_contexts: usize) -> Vec<ContextModel> {
    vec![ContextModel::new(); num_contexts]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_start_equiprobable() {
        let model = ContextModel::new();

        assert_eq!(model.state(), 0);
        assert_eq!(model.mps(), 0);
        assert_eq!(model.lps(0), 128);
    }

    #[test]
    fn should_flip_mps_on_lps_in_state_zero() {
        let mut model = ContextModel::new();
        model.update_lps();

        assert_eq!(model.state(), 0);
        assert_eq!(model.mps(), 1);
    }

    #[test]
    fn should_saturate_mps_walk_at_state_62() {
        let mut model = ContextModel::new();
        for _ in 0..100 {
            model.update_mps();
        }

        assert_eq!(model.state(), 62);
    }

    #[test]
    fn should_back_off_on_lps() {
        let mut model = ContextModel::new();
        for _ in 0..10 {
            model.update_mps();
        }
        model.update_lps();

        assert_eq!(model.state(), 8);
        assert_eq!(model.mps(), 0);
    }

    #[test]
    fn should_build_fresh_table() {
        let table = build_context_table(16);

        assert_eq!(table.len(), 16);
        assert!(table.iter().all(|m| *m == ContextModel::new()));
    }
}
