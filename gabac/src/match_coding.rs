//! Match coding: an LZ-style transform replacing repeated stretches with
//! (pointer, length) pairs referring back into a sliding window.
//!
//! Literals emit a length of zero and keep their value in the raw stream;
//! matches emit the backwards distance and the match length. Matches may
//! overlap their own output, which makes short periodic patterns cheap.

use crate::data_block::DataBlock;
use crate::error::{GabacError, GabacResult};

const MIN_MATCH_LENGTH: u64 = 2;

pub(crate) fn transform(
    values: &DataBlock,
    window_size: u32,
) -> (DataBlock, DataBlock, DataBlock) {
    let mut raw_values = DataBlock::new(values.word_size());
    let mut pointers = DataBlock::new(4);
    let mut lengths = DataBlock::new(4);

    let len = values.len();
    let window = window_size as usize;
    let mut i = 0;
    while i < len {
        let mut best_pointer = 0;
        let mut best_length = 0_u64;
        for w in i.saturating_sub(window)..i {
            let mut length = 0;
            while i + length < len && values.get(w + length) == values.get(i + length) {
                length += 1;
            }
            if length as u64 > best_length {
                best_length = length as u64;
                best_pointer = w;
            }
        }

        if best_length < MIN_MATCH_LENGTH {
            raw_values.push(values.get(i));
            lengths.push(0);
            i += 1;
        } else {
            pointers.push((i - best_pointer) as u64);
            lengths.push(best_length);
            i += best_length as usize;
        }
    }

    (raw_values, pointers, lengths)
}

pub(crate) fn inverse(
    raw_values: &DataBlock,
    pointers: &DataBlock,
    lengths: &DataBlock,
) -> GabacResult<DataBlock> {
    let mut values = DataBlock::new(raw_values.word_size());

    let mut raw_idx = 0;
    let mut pointer_idx = 0;
    for length in lengths.iter() {
        if length == 0 {
            if raw_idx >= raw_values.len() {
                return Err(GabacError::CorruptedPayload(
                    "match coding ran out of raw symbols".into(),
                ));
            }
            values.push(raw_values.get(raw_idx));
            raw_idx += 1;
            continue;
        }

        if pointer_idx >= pointers.len() {
            return Err(GabacError::CorruptedPayload(
                "match coding ran out of pointers".into(),
            ));
        }
        let distance = pointers.get(pointer_idx) as usize;
        pointer_idx += 1;
        if distance == 0 || distance > values.len() {
            return Err(GabacError::CorruptedPayload(format!(
                "match pointer {} outside the decoded window",
                distance
            )));
        }

        // copying symbol by symbol lets a match run into its own output
        let start = values.len() - distance;
        for offset in 0..length as usize {
            values.push(values.get(start + offset));
        }
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_replace_repeated_stretch_with_pointer() {
        let values = DataBlock::from_symbols(&[9, 2, 3, 4, 2, 3, 4, 9], 1);

        let (raw_values, pointers, lengths) = transform(&values, 4);

        assert_eq!(raw_values.iter().collect::<Vec<_>>(), vec![9, 2, 3, 4, 9]);
        assert_eq!(pointers.iter().collect::<Vec<_>>(), vec![3]);
        assert_eq!(
            lengths.iter().collect::<Vec<_>>(),
            vec![0, 0, 0, 0, 3, 0]
        );
    }

    #[test]
    fn should_emit_only_literals_without_window() {
        let values = DataBlock::from_symbols(&[1, 1, 1, 1], 1);

        let (raw_values, pointers, lengths) = transform(&values, 0);

        assert_eq!(raw_values.len(), 4);
        assert!(pointers.is_empty());
        assert_eq!(lengths.iter().collect::<Vec<_>>(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn round_trip_overlapping_match() {
        // the run of sevens matches into its own expansion
        let values = DataBlock::from_symbols(&[7, 7, 7, 7, 7, 7, 1], 2);

        let (raw_values, pointers, lengths) = transform(&values, 8);
        let restored = inverse(&raw_values, &pointers, &lengths).unwrap();

        assert_eq!(
            restored.iter().collect::<Vec<_>>(),
            values.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn round_trip_empty_input() {
        let values = DataBlock::new(4);

        let (raw_values, pointers, lengths) = transform(&values, 16);
        let restored = inverse(&raw_values, &pointers, &lengths).unwrap();

        assert!(restored.is_empty());
    }

    #[test]
    fn should_fail_on_pointer_outside_window() {
        let raw_values = DataBlock::from_symbols(&[1], 1);
        let pointers = DataBlock::from_symbols(&[5], 4);
        let lengths = DataBlock::from_symbols(&[0, 2], 4);

        assert!(inverse(&raw_values, &pointers, &lengths).is_err());
    }
}
