//! Equality coding: runs of repeated symbols collapse into a flag stream.
//!
//! Each input symbol produces one flag bit telling whether it equals its
//! predecessor. Only differing symbols are kept, shifted down by one where
//! possible since the previous value can never occur at that point.

use crate::data_block::DataBlock;
use crate::error::{GabacError, GabacResult};

pub(crate) fn transform(values: &DataBlock) -> (DataBlock, DataBlock) {
    let mut raw_values = DataBlock::new(values.word_size());
    let mut flags = DataBlock::new(1);

    let mut previous = 0_u64;
    for value in values.iter() {
        if value == previous {
            flags.push(1);
        } else {
            flags.push(0);
            raw_values.push(if value > previous { value - 1 } else { value });
            previous = value;
        }
    }

    (raw_values, flags)
}

pub(crate) fn inverse(raw_values: &DataBlock, flags: &DataBlock) -> GabacResult<DataBlock> {
    let mut values = DataBlock::new(raw_values.word_size());
    values.reserve(flags.len());

    let mut raw_idx = 0;
    let mut previous = 0_u64;
    for flag in flags.iter() {
        if flag != 0 {
            values.push(previous);
            continue;
        }

        if raw_idx >= raw_values.len() {
            return Err(GabacError::CorruptedPayload(
                "equality coding ran out of raw symbols".into(),
            ));
        }
        let raw = raw_values.get(raw_idx);
        raw_idx += 1;

        let value = if raw >= previous {
            raw.wrapping_add(1)
        } else {
            raw
        };
        values.push(value);
        previous = value;
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_flag_repeated_symbols() {
        let values = DataBlock::from_symbols(&[0, 0, 7, 7, 7, 3], 1);

        let (raw_values, flags) = transform(&values);

        assert_eq!(flags.iter().collect::<Vec<_>>(), vec![1, 1, 0, 1, 1, 0]);
        // 7 follows 0 so it is stored decremented; 3 follows 7 and stays
        assert_eq!(raw_values.iter().collect::<Vec<_>>(), vec![6, 3]);
    }

    #[test]
    fn round_trip_mixed_runs() {
        let values = DataBlock::from_symbols(&[5, 5, 0, 1, 1, 1, 255, 254, 254], 1);

        let (raw_values, flags) = transform(&values);
        let restored = inverse(&raw_values, &flags).unwrap();

        assert_eq!(
            restored.iter().collect::<Vec<_>>(),
            values.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn round_trip_empty_input() {
        let values = DataBlock::new(2);

        let (raw_values, flags) = transform(&values);
        let restored = inverse(&raw_values, &flags).unwrap();

        assert!(restored.is_empty());
        assert_eq!(restored.word_size(), 2);
    }

    #[test]
    fn should_fail_on_missing_raw_symbols() {
        let raw_values = DataBlock::new(1);
        let flags = DataBlock::from_symbols(&[0], 1);

        assert!(inverse(&raw_values, &flags).is_err());
    }
}
