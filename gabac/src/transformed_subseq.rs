//! Entropy coding of a single transformed substream: subsymbol
//! decomposition, optional delta and lookup-table transforms, context
//! selection and binarization.

use crate::configuration::{BinarizationId, EncodingConfiguration};
use crate::context_selector::ContextSelector;
use crate::data_block::DataBlock;
use crate::diff_coding;
use crate::error::{GabacError, GabacResult};
use crate::lut_transform::LutTransform;
use crate::reader::Reader;
use crate::state_vars::{signed_value, StateVars};
use crate::writer::Writer;

/// Encodes the substream at `index`.
pub(crate) fn encode(
    config: &EncodingConfiguration,
    index: usize,
    symbols: &DataBlock,
) -> GabacResult<Vec<u8>> {
    encode_bounded(config, index, symbols, usize::MAX)
        .map(Option::unwrap_or_default)
}

/// Encodes the substream at `index`, or returns `None` once the output
/// grows past `max_bytes`. The cap lets configuration searches abandon
/// hopeless candidates early.
pub(crate) fn encode_bounded(
    config: &EncodingConfiguration,
    index: usize,
    symbols: &DataBlock,
    max_bytes: usize,
) -> GabacResult<Option<Vec<u8>>> {
    let vars = StateVars::derive(config, index)?;
    let stream = &config.transformed_sequences[index];
    let bin_id = stream.binarization_id;
    let parameter = stream.parameter();
    let word_size = usize::from(config.stream_word_size(index));

    let mut diffed;
    let symbols = if stream.diff_coding_enabled {
        diffed = symbols.clone();
        diff_coding::transform(&mut diffed)?;
        &diffed
    } else {
        symbols
    };

    // with the lookup table enabled the binarization codes bounded ranks,
    // so only the raw symbols of plain streams need the range check
    if !vars.lut_enabled {
        check_symbol_range(symbols, bin_id, parameter, word_size)?;
    }

    let mut writer = Writer::new(vars.bypass, vars.num_ctx_total as usize);
    let selector = ContextSelector::new(&vars);

    let luts = if vars.lut_enabled {
        let mut luts = LutTransform::new(&vars);
        if bin_id.is_signed() {
            let magnitudes = DataBlock::from_symbols(
                &symbols
                    .iter()
                    .map(|symbol| signed_value(symbol, word_size).unsigned_abs())
                    .collect::<Vec<_>>(),
                word_size,
            );
            luts.build(&magnitudes, &vars);
        } else {
            luts.build(symbols, &vars);
        }
        luts.encode(&mut writer);
        if writer.num_bytes_written() > max_bytes {
            return Ok(None);
        }
        Some(luts)
    } else {
        None
    };

    let mask = vars.subsym_mask();
    let mut history = vec![[0_u64; 2]; vars.num_subsyms as usize];
    for symbol in symbols.iter() {
        let signed = signed_value(symbol, word_size);
        let coded_symbol = if bin_id.is_signed() {
            signed.unsigned_abs()
        } else {
            symbol
        };

        let mut remaining = vars.output_symbol_size;
        for (s, prv) in history.iter_mut().enumerate() {
            remaining -= vars.coding_subsym_size;
            let subsym = (coded_symbol >> remaining) & mask;

            let ctx_idx = if vars.bypass || vars.coding_order == 0 {
                selector.context_idx_order_0(s as u32)
            } else {
                selector.context_idx_order_n(s as u32, prv)
            } as u32;

            let (coded, c_max) = match &luts {
                Some(luts) => {
                    let rank = luts.transform(s as u32, prv, subsym)?;
                    let c_max = lut_c_max(luts, bin_id, parameter, s as u32, prv);
                    if bin_id == BinarizationId::Tu && rank > u64::from(c_max) {
                        return Err(GabacError::SymbolOutOfRange {
                            value: subsym as i64,
                            binarization: bin_id.name(),
                        });
                    }
                    (rank, c_max)
                }
                None => (subsym, parameter),
            };

            write_binarization(&mut writer, bin_id, coded, c_max, vars.c_length_bi, vars.bypass, ctx_idx);

            if vars.coding_order == 2 {
                prv[1] = prv[0];
            }
            if vars.coding_order > 0 {
                prv[0] = subsym;
            }
        }

        if bin_id.is_signed() && signed != 0 {
            writer.write_sign_flag(signed);
        }

        if writer.num_bytes_written() > max_bytes {
            return Ok(None);
        }
    }

    Ok(Some(writer.close()))
}

/// Decodes `num_symbols` symbols of the substream at `index`, returning
/// the symbols and the number of payload bytes consumed.
pub(crate) fn decode(
    config: &EncodingConfiguration,
    index: usize,
    bitstream: &[u8],
    num_symbols: usize,
) -> GabacResult<(DataBlock, usize)> {
    let vars = StateVars::derive(config, index)?;
    let stream = &config.transformed_sequences[index];
    let bin_id = stream.binarization_id;
    let parameter = stream.parameter();
    let word_size = usize::from(config.stream_word_size(index));

    let mut reader = Reader::new(bitstream, vars.bypass, vars.num_ctx_total as usize);
    let selector = ContextSelector::new(&vars);

    let luts = if vars.lut_enabled {
        Some(LutTransform::decode(&mut reader, &vars)?)
    } else {
        None
    };

    let mask = vars.subsym_mask();
    let mut history = vec![[0_u64; 2]; vars.num_subsyms as usize];
    let mut symbols = DataBlock::with_len(num_symbols, word_size);
    for i in 0..num_symbols {
        let mut magnitude = 0_u64;
        for (s, prv) in history.iter_mut().enumerate() {
            let ctx_idx = if vars.bypass || vars.coding_order == 0 {
                selector.context_idx_order_0(s as u32)
            } else {
                selector.context_idx_order_n(s as u32, prv)
            } as u32;

            let c_max = match &luts {
                Some(luts) => lut_c_max(luts, bin_id, parameter, s as u32, prv),
                None => parameter,
            };
            let coded =
                read_binarization(&mut reader, bin_id, c_max, vars.c_length_bi, vars.bypass, ctx_idx);

            let subsym = match &luts {
                Some(luts) => luts.inverse(s as u32, prv, coded)?,
                None => coded & mask,
            };
            magnitude = (magnitude << vars.coding_subsym_size) | subsym;

            if vars.coding_order == 2 {
                prv[1] = prv[0];
            }
            if vars.coding_order > 0 {
                prv[0] = subsym;
            }
        }

        let value = if bin_id.is_signed() && magnitude != 0 && reader.read_sign_flag() {
            (magnitude as i64).wrapping_neg() as u64
        } else {
            magnitude
        };
        symbols.set(i, value);
    }

    let num_bytes_read = reader.close();

    if stream.diff_coding_enabled {
        diff_coding::inverse(&mut symbols);
    }

    Ok((symbols, num_bytes_read))
}

/// The truncated unary `cMax` tightens to the occupied part of the lookup
/// table row; other binarizations keep their configured parameter.
fn lut_c_max(
    luts: &LutTransform,
    bin_id: BinarizationId,
    parameter: u32,
    subsym_idx: u32,
    prv: &[u64; 2],
) -> u32 {
    if bin_id == BinarizationId::Tu {
        parameter.min(luts.num_max_elems(subsym_idx, prv) as u32)
    } else {
        parameter
    }
}

/// Verifies that every symbol is representable by the binarization before
/// any bin is written.
fn check_symbol_range(
    symbols: &DataBlock,
    bin_id: BinarizationId,
    parameter: u32,
    word_size: usize,
) -> GabacResult<()> {
    if symbols.is_empty() {
        return Ok(());
    }

    let mut min = i64::MAX;
    let mut max = i64::MIN;
    for symbol in symbols.iter() {
        let value = if bin_id.is_signed() {
            signed_value(symbol, word_size)
        } else {
            symbol as i64
        };
        min = min.min(value);
        max = max.max(value);
    }

    if !bin_id.sb_check(min, max, parameter) {
        let value = if min < bin_id.min_value(parameter) {
            min
        } else {
            max
        };
        return Err(GabacError::SymbolOutOfRange {
            value,
            binarization: bin_id.name(),
        });
    }
    Ok(())
}

fn write_binarization(
    writer: &mut Writer,
    bin_id: BinarizationId,
    input: u64,
    c_max: u32,
    c_length_bi: u32,
    bypass: bool,
    ctx_idx: u32,
) {
    match (bin_id, bypass) {
        (BinarizationId::Bi, true) => writer.write_as_bi_bypass(input, c_length_bi),
        (BinarizationId::Bi, false) => writer.write_as_bi_cabac(input, c_length_bi, ctx_idx),
        (BinarizationId::Tu, true) => writer.write_as_tu_bypass(input, c_max),
        (BinarizationId::Tu, false) => writer.write_as_tu_cabac(input, c_max, ctx_idx),
        (BinarizationId::Eg | BinarizationId::Seg, true) => writer.write_as_eg_bypass(input),
        (BinarizationId::Eg | BinarizationId::Seg, false) => {
            writer.write_as_eg_cabac(input, ctx_idx)
        }
        (BinarizationId::Teg | BinarizationId::Steg, true) => {
            writer.write_as_teg_bypass(input, c_max)
        }
        (BinarizationId::Teg | BinarizationId::Steg, false) => {
            writer.write_as_teg_cabac(input, c_max, ctx_idx)
        }
    }
}

fn read_binarization(
    reader: &mut Reader,
    bin_id: BinarizationId,
    c_max: u32,
    c_length_bi: u32,
    bypass: bool,
    ctx_idx: u32,
) -> u64 {
    match (bin_id, bypass) {
        (BinarizationId::Bi, true) => reader.read_as_bi_bypass(c_length_bi),
        (BinarizationId::Bi, false) => reader.read_as_bi_cabac(c_length_bi, ctx_idx),
        (BinarizationId::Tu, true) => reader.read_as_tu_bypass(c_max),
        (BinarizationId::Tu, false) => reader.read_as_tu_cabac(c_max, ctx_idx),
        (BinarizationId::Eg | BinarizationId::Seg, true) => reader.read_as_eg_bypass(),
        (BinarizationId::Eg | BinarizationId::Seg, false) => reader.read_as_eg_cabac(ctx_idx),
        (BinarizationId::Teg | BinarizationId::Steg, true) => reader.read_as_teg_bypass(c_max),
        (BinarizationId::Teg | BinarizationId::Steg, false) => {
            reader.read_as_teg_cabac(c_max, ctx_idx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{ContextSelectionId, SequenceTransformationId, TransformedSequenceConfiguration};

    fn single_stream_config(
        word_size: u8,
        stream: TransformedSequenceConfiguration,
    ) -> EncodingConfiguration {
        EncodingConfiguration {
            word_size,
            sequence_transformation_id: SequenceTransformationId::NoTransform,
            sequence_transformation_parameter: 0,
            transformed_sequences: vec![stream],
        }
    }

    fn stream(
        binarization_id: BinarizationId,
        binarization_parameters: Vec<u32>,
        context_selection_id: ContextSelectionId,
    ) -> TransformedSequenceConfiguration {
        TransformedSequenceConfiguration {
            lut_transformation_enabled: false,
            lut_transformation_bits: None,
            lut_transformation_order: None,
            diff_coding_enabled: false,
            binarization_id,
            binarization_parameters,
            context_selection_id,
        }
    }

    fn round_trip(config: &EncodingConfiguration, symbols: &[u64], word_size: usize) {
        let block = DataBlock::from_symbols(symbols, word_size);

        let bytes = encode(config, 0, &block).unwrap();
        let (decoded, consumed) = decode(config, 0, &bytes, symbols.len()).unwrap();

        assert_eq!(decoded.iter().collect::<Vec<_>>(), symbols.to_vec());
        // the decoder may leave the final alignment byte unread
        assert!(consumed <= bytes.len());
    }

    #[test]
    fn round_trip_order_0_tu() {
        let config = single_stream_config(
            1,
            stream(BinarizationId::Tu, vec![255], ContextSelectionId::AdaptiveCodingOrder0),
        );
        round_trip(&config, &[0, 1, 1, 2, 255, 0, 17, 17, 17, 200], 1);
    }

    #[test]
    fn round_trip_bypass_eg() {
        let config = single_stream_config(
            2,
            stream(BinarizationId::Eg, vec![], ContextSelectionId::Bypass),
        );
        round_trip(&config, &[0, 65535, 1, 1, 40000, 7], 2);
    }

    #[test]
    fn round_trip_signed_seg() {
        let config = single_stream_config(
            2,
            stream(BinarizationId::Seg, vec![], ContextSelectionId::AdaptiveCodingOrder0),
        );
        // raw words carrying negative values in two's complement
        let symbols = [-5_i64, 5, 0, -1, 300, -300]
            .iter()
            .map(|&v| v as u64 & 0xFFFF)
            .collect::<Vec<_>>();
        round_trip(&config, &symbols, 2);
    }

    #[test]
    fn round_trip_order_1_with_lut() {
        let mut cfg_stream = stream(
            BinarizationId::Tu,
            vec![3],
            ContextSelectionId::AdaptiveCodingOrder1,
        );
        cfg_stream.lut_transformation_enabled = true;
        cfg_stream.lut_transformation_bits = Some(2);
        cfg_stream.lut_transformation_order = Some(1);
        let config = single_stream_config(1, cfg_stream);

        round_trip(&config, &[0xAA, 0xAB, 0xAA, 0xAA, 0x01, 0xAB, 0xAA], 1);
    }

    #[test]
    fn round_trip_order_2_with_lut() {
        let mut cfg_stream = stream(
            BinarizationId::Tu,
            vec![15],
            ContextSelectionId::AdaptiveCodingOrder2,
        );
        cfg_stream.lut_transformation_enabled = true;
        cfg_stream.lut_transformation_bits = Some(4);
        cfg_stream.lut_transformation_order = Some(2);
        let config = single_stream_config(1, cfg_stream);

        round_trip(&config, &[1, 2, 1, 2, 1, 2, 1, 99, 1, 2], 1);
    }

    #[test]
    fn round_trip_diff_coded_positions() {
        let mut cfg_stream = stream(
            BinarizationId::Eg,
            vec![],
            ContextSelectionId::AdaptiveCodingOrder0,
        );
        cfg_stream.diff_coding_enabled = true;
        let config = single_stream_config(4, cfg_stream);

        round_trip(&config, &[10, 10, 160, 165, 100_000, 100_000, 2_000_000], 4);
    }

    #[test]
    fn round_trip_empty_substream() {
        let config = single_stream_config(
            1,
            stream(BinarizationId::Tu, vec![4], ContextSelectionId::AdaptiveCodingOrder0),
        );
        round_trip(&config, &[], 1);
    }

    #[test]
    fn should_reject_symbols_above_binarization_range() {
        let config = single_stream_config(
            1,
            stream(BinarizationId::Tu, vec![4], ContextSelectionId::AdaptiveCodingOrder0),
        );
        let block = DataBlock::from_symbols(&[3, 200], 1);

        assert!(matches!(
            encode(&config, 0, &block),
            Err(GabacError::SymbolOutOfRange { value: 200, .. })
        ));
    }

    #[test]
    fn should_stop_early_when_output_exceeds_cap() {
        let config = single_stream_config(
            1,
            stream(BinarizationId::Tu, vec![255], ContextSelectionId::Bypass),
        );
        let block = DataBlock::from_symbols(&[255; 512], 1);

        assert_eq!(encode_bounded(&config, 0, &block, 4).unwrap(), None);
    }
}
