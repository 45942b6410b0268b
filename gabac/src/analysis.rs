//! Exhaustive configuration search.
//!
//! Candidates are enumerated from a declarative [`SearchSpace`] and
//! evaluated by actually encoding the data, pruning a candidate as soon as
//! it exceeds the best size found so far. Substreams are entropy-coded
//! independently, so each substream's candidates are ranked on their own;
//! the per-substream winners compose the block's best configuration.

use std::sync::atomic::{AtomicUsize, Ordering};

use itertools::iproduct;
use log::{debug, trace};
use rayon::prelude::*;

use crate::configuration::{
    bits_needed, BinarizationId, ContextSelectionId, EncodingConfiguration,
    SequenceTransformationId, TransformedSequenceConfiguration,
};
use crate::data_block::DataBlock;
use crate::error::{GabacError, GabacResult};
use crate::state_vars::signed_value;
use crate::{transformation, transformed_subseq};

/// The candidate axes of the exhaustive search, constructed once and
/// passed by reference. Enumeration order is the tie-break order: on an
/// exact size tie the earlier candidate wins.
#[derive(Debug, Clone)]
pub struct SearchSpace {
    pub word_sizes: Vec<u8>,
    pub sequence_transformations: Vec<SequenceTransformationId>,
    pub match_window_sizes: Vec<u32>,
    pub rle_guards: Vec<u32>,
    pub lut_states: Vec<bool>,
    pub diff_states: Vec<bool>,
    pub binarizations: Vec<BinarizationId>,
    pub teg_thresholds: Vec<u32>,
    pub context_selections: Vec<ContextSelectionId>,
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self {
            word_sizes: vec![1, 2, 4],
            sequence_transformations: vec![
                SequenceTransformationId::NoTransform,
                SequenceTransformationId::EqualityCoding,
                SequenceTransformationId::MatchCoding,
                SequenceTransformationId::RleCoding,
            ],
            match_window_sizes: vec![32, 256],
            rle_guards: vec![255],
            lut_states: vec![false, true],
            diff_states: vec![false, true],
            binarizations: vec![
                BinarizationId::Bi,
                BinarizationId::Tu,
                BinarizationId::Eg,
                BinarizationId::Seg,
                BinarizationId::Teg,
                BinarizationId::Steg,
            ],
            teg_thresholds: vec![2, 7, 15, 30],
            context_selections: vec![
                ContextSelectionId::Bypass,
                ContextSelectionId::AdaptiveCodingOrder0,
                ContextSelectionId::AdaptiveCodingOrder1,
                ContextSelectionId::AdaptiveCodingOrder2,
            ],
        }
    }
}

impl SearchSpace {
    fn transformation_parameters(&self, id: SequenceTransformationId) -> &[u32] {
        match id {
            SequenceTransformationId::NoTransform
            | SequenceTransformationId::EqualityCoding => &[0],
            SequenceTransformationId::MatchCoding => &self.match_window_sizes,
            SequenceTransformationId::RleCoding => &self.rle_guards,
        }
    }
}

/// Searches `space` for the configuration that encodes `input` smallest.
/// Candidates that cannot represent the data are skipped; the search fails
/// only when not a single candidate survives.
pub fn analyze(input: &[u8], space: &SearchSpace) -> GabacResult<EncodingConfiguration> {
    let mut best: Option<(usize, EncodingConfiguration)> = None;

    for &word_size in &space.word_sizes {
        if input.len() % usize::from(word_size) != 0 {
            trace!("skipping word size {}: input not aligned", word_size);
            continue;
        }
        let symbols = DataBlock::from_bytes(input.to_vec(), usize::from(word_size));

        for &transformation_id in &space.sequence_transformations {
            for &parameter in space.transformation_parameters(transformation_id) {
                let candidate = evaluate_transformation(
                    space,
                    word_size,
                    transformation_id,
                    parameter,
                    &symbols,
                );
                if let Some((size, config)) = candidate {
                    debug!(
                        "candidate {} (parameter {}, word size {}): {} bytes",
                        transformation_id.name(),
                        parameter,
                        word_size,
                        size
                    );
                    // strict comparison keeps the first candidate on ties
                    if best.as_ref().map_or(true, |(best_size, _)| size < *best_size) {
                        best = Some((size, config));
                    }
                }
            }
        }
    }

    match best {
        Some((size, config)) => {
            debug!("best configuration encodes to {} bytes: {}", size, config);
            Ok(config)
        }
        None => Err(GabacError::AnalysisFailed),
    }
}

/// Evaluates one (word size, transformation, parameter) cell, picking the
/// best candidate per substream. `None` when any substream has no valid
/// candidate.
fn evaluate_transformation(
    space: &SearchSpace,
    word_size: u8,
    transformation_id: SequenceTransformationId,
    parameter: u32,
    symbols: &DataBlock,
) -> Option<(usize, EncodingConfiguration)> {
    let scaffold = EncodingConfiguration {
        word_size,
        sequence_transformation_id: transformation_id,
        sequence_transformation_parameter: parameter,
        transformed_sequences: vec![
            bypass_fallback();
            transformation_id.num_streams()
        ],
    };
    let streams = transformation::transform(&scaffold, symbols.clone());

    let mut total_size = 0;
    let mut chosen = Vec::with_capacity(streams.len());
    for (index, stream) in streams.iter().enumerate() {
        let (size, stream_config) =
            evaluate_substream(space, &scaffold, index, stream)?;
        // framing: payload size field, plus symbol count when non-empty
        total_size += size + if stream.is_empty() { 4 } else { 8 };
        chosen.push(stream_config);
    }

    EncodingConfiguration::new(
        word_size,
        transformation_id,
        parameter,
        chosen,
    )
    .ok()
    .map(|config| (total_size, config))
}

/// Ranks every candidate of one substream by encoded size, in parallel.
/// The winner is the smallest (size, enumeration index) pair, so rayon's
/// scheduling cannot change the outcome.
fn evaluate_substream(
    space: &SearchSpace,
    scaffold: &EncodingConfiguration,
    index: usize,
    stream: &DataBlock,
) -> Option<(usize, TransformedSequenceConfiguration)> {
    let candidates = substream_candidates(space, scaffold, index, stream);
    let best_size = AtomicUsize::new(usize::MAX);

    candidates
        .into_par_iter()
        .enumerate()
        .filter_map(|(rank, candidate)| {
            let mut config = scaffold.clone();
            config.transformed_sequences[index] = candidate.clone();
            if config.validate().is_err() {
                return None;
            }

            let cap = best_size.load(Ordering::Relaxed);
            match transformed_subseq::encode_bounded(&config, index, stream, cap) {
                Ok(Some(payload)) => {
                    best_size.fetch_min(payload.len(), Ordering::Relaxed);
                    Some((payload.len(), rank, candidate))
                }
                // over the cap, or unable to represent the data
                Ok(None) | Err(_) => None,
            }
        })
        .min_by_key(|(size, rank, _)| (*size, *rank))
        .map(|(size, _, candidate)| (size, candidate))
}

/// Enumerates the per-substream candidates, cheapest filters first.
fn substream_candidates(
    space: &SearchSpace,
    scaffold: &EncodingConfiguration,
    index: usize,
    stream: &DataBlock,
) -> Vec<TransformedSequenceConfiguration> {
    let word_size = usize::from(scaffold.stream_word_size(index));
    let output_symbol_size = u32::from(scaffold.output_symbol_size(index));

    let mut max = 0_u64;
    let mut min_signed = 0_i64;
    let mut max_signed = 0_i64;
    for symbol in stream.iter() {
        max = max.max(symbol);
        let signed = signed_value(symbol, word_size);
        min_signed = min_signed.min(signed);
        max_signed = max_signed.max(signed);
    }

    let mut candidates = Vec::new();
    for (&context_selection_id, &lut_enabled, &diff_enabled, &binarization_id) in iproduct!(
        &space.context_selections,
        &space.lut_states,
        &space.diff_states,
        &space.binarizations
    ) {
        if lut_enabled
            && (diff_enabled || context_selection_id.coding_order() == 0)
        {
            continue;
        }
        if binarization_id.is_signed() && min_signed >= 0 {
            continue;
        }

        let lut_bits = 8.min(output_symbol_size) as u8;
        for parameters in
            parameter_candidates(space, binarization_id, max, min_signed, max_signed, lut_enabled)
        {
            candidates.push(TransformedSequenceConfiguration {
                lut_transformation_enabled: lut_enabled,
                lut_transformation_bits: lut_enabled.then(|| lut_bits),
                lut_transformation_order: lut_enabled
                    .then(|| context_selection_id.coding_order()),
                diff_coding_enabled: diff_enabled,
                binarization_id,
                binarization_parameters: parameters,
                context_selection_id,
            });
        }
    }
    candidates
}

/// Parameter vectors worth trying for one binarization, already filtered
/// through `sb_check` against the observed value range.
fn parameter_candidates(
    space: &SearchSpace,
    binarization_id: BinarizationId,
    max: u64,
    min_signed: i64,
    max_signed: i64,
    lut_enabled: bool,
) -> Vec<Vec<u32>> {
    let (min, max_observed) = if binarization_id.is_signed() {
        (min_signed, max_signed)
    } else if max > i64::MAX as u64 {
        return Vec::new();
    } else {
        (0, max as i64)
    };

    match binarization_id {
        BinarizationId::Bi => {
            let parameter = bits_needed(max).clamp(1, 32);
            if binarization_id.sb_check(min, max_observed, parameter) {
                vec![vec![parameter]]
            } else {
                Vec::new()
            }
        }
        BinarizationId::Tu => {
            // with the lookup table the coded ranks shrink below the raw
            // maximum, so a capped parameter is still worth trying
            let parameter = (max.min(32).max(1)) as u32;
            if lut_enabled || binarization_id.sb_check(min, max_observed, parameter) {
                vec![vec![parameter]]
            } else {
                Vec::new()
            }
        }
        BinarizationId::Eg | BinarizationId::Seg => {
            if binarization_id.sb_check(min, max_observed, 0) {
                vec![Vec::new()]
            } else {
                Vec::new()
            }
        }
        BinarizationId::Teg | BinarizationId::Steg => space
            .teg_thresholds
            .iter()
            .filter(|&&parameter| {
                binarization_id.sb_check(min, max_observed, parameter)
            })
            .map(|&parameter| vec![parameter])
            .collect(),
    }
}

fn bypass_fallback() -> TransformedSequenceConfiguration {
    TransformedSequenceConfiguration {
        lut_transformation_enabled: false,
        lut_transformation_bits: None,
        lut_transformation_order: None,
        diff_coding_enabled: false,
        binarization_id: BinarizationId::Eg,
        binarization_parameters: Vec::new(),
        context_selection_id: ContextSelectionId::Bypass,
    }
}
