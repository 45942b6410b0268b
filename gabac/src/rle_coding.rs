//! Run-length coding: each run of equal symbols becomes its value plus a
//! run length, with lengths split into guard-sized tokens.
//!
//! A run of `n` emits `n - 1` as a sequence of `guard`-valued tokens plus a
//! final token below the guard, so the length stream's alphabet stays
//! bounded by the guard value.

use crate::data_block::DataBlock;
use crate::error::{GabacError, GabacResult};

pub(crate) fn transform(values: &DataBlock, guard: u32) -> (DataBlock, DataBlock) {
    debug_assert!(guard > 0);
    let guard = u64::from(guard);
    let mut raw_values = DataBlock::new(values.word_size());
    let mut lengths = DataBlock::new(4);

    let len = values.len();
    let mut i = 0;
    while i < len {
        let value = values.get(i);
        let mut run = 1_u64;
        while i + (run as usize) < len && values.get(i + run as usize) == value {
            run += 1;
        }
        i += run as usize;

        raw_values.push(value);
        let mut remaining = run - 1;
        while remaining >= guard {
            lengths.push(guard);
            remaining -= guard;
        }
        lengths.push(remaining);
    }

    (raw_values, lengths)
}

pub(crate) fn inverse(
    raw_values: &DataBlock,
    lengths: &DataBlock,
    guard: u32,
) -> GabacResult<DataBlock> {
    debug_assert!(guard > 0);
    let guard = u64::from(guard);
    let mut values = DataBlock::new(raw_values.word_size());

    let mut length_idx = 0;
    for value in raw_values.iter() {
        let mut run = 1_u64;
        loop {
            if length_idx >= lengths.len() {
                return Err(GabacError::CorruptedPayload(
                    "run-length coding ran out of length tokens".into(),
                ));
            }
            let token = lengths.get(length_idx);
            length_idx += 1;
            if token > guard {
                return Err(GabacError::CorruptedPayload(format!(
                    "run-length token {} above the guard value {}",
                    token, guard
                )));
            }
            run += token;
            if token < guard {
                break;
            }
        }

        for _ in 0..run {
            values.push(value);
        }
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_split_long_runs_at_the_guard() {
        let values = DataBlock::from_symbols(&[4; 8], 1);

        let (raw_values, lengths) = transform(&values, 3);

        assert_eq!(raw_values.iter().collect::<Vec<_>>(), vec![4]);
        // run of 8: length 7 split as 3 + 3 + 1
        assert_eq!(lengths.iter().collect::<Vec<_>>(), vec![3, 3, 1]);
    }

    #[test]
    fn should_emit_zero_token_for_exact_guard_multiple() {
        let values = DataBlock::from_symbols(&[9, 9, 9, 9, 2], 1);

        let (raw_values, lengths) = transform(&values, 3);

        assert_eq!(raw_values.iter().collect::<Vec<_>>(), vec![9, 2]);
        // length 3 becomes a guard token plus a terminating zero
        assert_eq!(lengths.iter().collect::<Vec<_>>(), vec![3, 0, 0]);
    }

    #[test]
    fn round_trip_mixed_runs() {
        let values =
            DataBlock::from_symbols(&[1, 1, 1, 1, 1, 2, 3, 3, 65535, 65535, 65535, 0], 2);

        for guard in [1, 2, 4, 255] {
            let (raw_values, lengths) = transform(&values, guard);
            let restored = inverse(&raw_values, &lengths, guard).unwrap();

            assert_eq!(
                restored.iter().collect::<Vec<_>>(),
                values.iter().collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn round_trip_empty_input() {
        let values = DataBlock::new(1);

        let (raw_values, lengths) = transform(&values, 4);
        let restored = inverse(&raw_values, &lengths, 4).unwrap();

        assert!(restored.is_empty());
    }

    #[test]
    fn should_fail_on_truncated_length_stream() {
        let raw_values = DataBlock::from_symbols(&[1, 2], 1);
        let lengths = DataBlock::from_symbols(&[0], 4);

        assert!(inverse(&raw_values, &lengths, 4).is_err());
    }
}
