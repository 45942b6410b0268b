//! Delta coding against the previously coded symbol. Only non-decreasing
//! sequences are accepted, so every delta is representable in the same
//! unsigned word size.

use crate::data_block::DataBlock;
use crate::error::{GabacError, GabacResult};

pub(crate) fn transform(values: &mut DataBlock) -> GabacResult<()> {
    let mut previous = 0_u64;
    for i in 0..values.len() {
        let value = values.get(i);
        if value < previous {
            return Err(GabacError::NegativeDelta { position: i });
        }
        values.set(i, value - previous);
        previous = value;
    }
    Ok(())
}

pub(crate) fn inverse(values: &mut DataBlock) {
    let mut previous = 0_u64;
    for i in 0..values.len() {
        let value = previous.wrapping_add(values.get(i));
        values.set(i, value);
        previous = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_store_deltas_from_zero() {
        let mut values = DataBlock::from_symbols(&[3, 3, 10, 11], 1);

        transform(&mut values).unwrap();

        assert_eq!(values.iter().collect::<Vec<_>>(), vec![3, 0, 7, 1]);
    }

    #[test]
    fn should_reject_decreasing_sequences() {
        let mut values = DataBlock::from_symbols(&[5, 4], 1);

        assert!(matches!(
            transform(&mut values),
            Err(GabacError::NegativeDelta { position: 1 })
        ));
    }

    #[test]
    fn round_trip_monotonic_positions() {
        let symbols = [0_u64, 0, 120, 120, 4096, 70000, 70000, 1 << 33];
        let mut values = DataBlock::from_symbols(&symbols, 8);

        transform(&mut values).unwrap();
        inverse(&mut values);

        assert_eq!(values.iter().collect::<Vec<_>>(), symbols.to_vec());
    }
}
