//! Encoding configurations: the serializable description of how a symbol
//! stream is transformed and entropy-coded.
//!
//! A configuration must be byte-identical between encoder and decoder;
//! it is the only state shared between the two sides.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::{GabacError, GabacResult};
use crate::state_vars::StateVars;

/// Reversible preprocessing applied to the raw symbol stream before
/// entropy coding.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SequenceTransformationId {
    /// Identity; one substream.
    NoTransform,
    /// Collapse repeats into equality flags; two substreams.
    EqualityCoding,
    /// LZ-style window matching; three substreams.
    MatchCoding,
    /// Run lengths chunked by a guard value; two substreams.
    RleCoding,
}

impl From<SequenceTransformationId> for u8 {
    fn from(id: SequenceTransformationId) -> Self {
        id as u8
    }
}

impl TryFrom<u8> for SequenceTransformationId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::NoTransform),
            1 => Ok(Self::EqualityCoding),
            2 => Ok(Self::MatchCoding),
            3 => Ok(Self::RleCoding),
            _ => Err(format!("invalid sequence transformation id: {}", value)),
        }
    }
}

/// How a substream symbol is mapped to a bin sequence.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum BinarizationId {
    /// Fixed-width binary.
    Bi,
    /// Truncated unary.
    Tu,
    /// Exp-Golomb.
    Eg,
    /// Signed Exp-Golomb.
    Seg,
    /// Truncated Exp-Golomb.
    Teg,
    /// Signed truncated Exp-Golomb.
    Steg,
}

impl BinarizationId {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Bi => "BI",
            Self::Tu => "TU",
            Self::Eg => "EG",
            Self::Seg => "SEG",
            Self::Teg => "TEG",
            Self::Steg => "STEG",
        }
    }

    /// Number of required binarization parameters.
    pub(crate) fn num_parameters(&self) -> usize {
        match self {
            Self::Bi | Self::Tu | Self::Teg | Self::Steg => 1,
            Self::Eg | Self::Seg => 0,
        }
    }

    /// Inclusive range of valid parameter values.
    pub(crate) fn parameter_range(&self) -> (u32, u32) {
        match self {
            Self::Bi | Self::Tu => (1, 32),
            Self::Eg | Self::Seg => (0, 0),
            Self::Teg | Self::Steg => (0, 255),
        }
    }

    /// Whether symbols are reinterpreted as signed values of the stream's
    /// word size, coded as magnitude plus sign flag.
    pub(crate) fn is_signed(&self) -> bool {
        matches!(self, Self::Seg | Self::Steg)
    }

    /// Smallest representable symbol, in the signed view.
    pub(crate) fn min_value(&self, parameter: u32) -> i64 {
        match self {
            Self::Bi | Self::Tu | Self::Eg | Self::Teg => 0,
            Self::Seg => i64::from(i32::MIN) / 2,
            Self::Steg => i64::from(i32::MIN) / 2 - i64::from(parameter),
        }
    }

    /// Largest representable symbol, in the signed view.
    pub(crate) fn max_value(&self, parameter: u32) -> i64 {
        match self {
            Self::Bi => ((1_u64 << parameter) - 1) as i64,
            Self::Tu => i64::from(parameter),
            Self::Eg => i64::from(i32::MAX),
            Self::Seg => i64::from(i32::MAX) / 2,
            Self::Teg => i64::from(i32::MAX) + i64::from(parameter),
            Self::Steg => i64::from(i32::MAX) / 2 + i64::from(parameter),
        }
    }

    /// Checks that the observed value range is representable with the
    /// given parameter.
    pub(crate) fn sb_check(&self, min: i64, max: i64, parameter: u32) -> bool {
        min >= self.min_value(parameter) && max <= self.max_value(parameter)
    }
}

impl From<BinarizationId> for u8 {
    fn from(id: BinarizationId) -> Self {
        id as u8
    }
}

impl TryFrom<u8> for BinarizationId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Bi),
            1 => Ok(Self::Tu),
            2 => Ok(Self::Eg),
            3 => Ok(Self::Seg),
            4 => Ok(Self::Teg),
            5 => Ok(Self::Steg),
            _ => Err(format!("invalid binarization id: {}", value)),
        }
    }
}

/// How contexts are selected for the adaptive models, if at all.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ContextSelectionId {
    /// No adaptive models; every bin is equiprobable.
    Bypass,
    /// One context block per subsymbol position.
    AdaptiveCodingOrder0,
    /// Contexts additionally keyed by the previous subsymbol value.
    AdaptiveCodingOrder1,
    /// Contexts keyed by the two previous subsymbol values.
    AdaptiveCodingOrder2,
}

impl ContextSelectionId {
    pub(crate) fn is_bypass(&self) -> bool {
        matches!(self, Self::Bypass)
    }

    /// Number of previous subsymbol values that key the context.
    pub(crate) fn coding_order(&self) -> u8 {
        match self {
            Self::Bypass | Self::AdaptiveCodingOrder0 => 0,
            Self::AdaptiveCodingOrder1 => 1,
            Self::AdaptiveCodingOrder2 => 2,
        }
    }
}

impl From<ContextSelectionId> for u8 {
    fn from(id: ContextSelectionId) -> Self {
        id as u8
    }
}

impl TryFrom<u8> for ContextSelectionId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Bypass),
            1 => Ok(Self::AdaptiveCodingOrder0),
            2 => Ok(Self::AdaptiveCodingOrder1),
            3 => Ok(Self::AdaptiveCodingOrder2),
            _ => Err(format!("invalid context selection id: {}", value)),
        }
    }
}

/// Coding parameters for a single transformed substream.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct TransformedSequenceConfiguration {
    /// Whether subsymbols are remapped through frequency-ranked lookup
    /// tables before binarization.
    pub lut_transformation_enabled: bool,
    /// Subsymbol size in bits; present only when the LUT is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lut_transformation_bits: Option<u8>,
    /// Context order of the tables; present only when the LUT is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lut_transformation_order: Option<u8>,
    /// Whether symbols are delta-coded against the previously decoded
    /// value. Mutually exclusive with the LUT transform.
    pub diff_coding_enabled: bool,
    /// The binarization for this substream.
    pub binarization_id: BinarizationId,
    /// Parameters of the binarization, e.g. `cMax` or the bit width.
    pub binarization_parameters: Vec<u32>,
    /// Bypass or adaptive context selection.
    pub context_selection_id: ContextSelectionId,
}

impl TransformedSequenceConfiguration {
    /// Effective LUT subsymbol size; 0 when the LUT is disabled.
    pub(crate) fn lut_bits(&self) -> u8 {
        if self.lut_transformation_enabled {
            self.lut_transformation_bits.unwrap_or(0)
        } else {
            0
        }
    }

    /// Effective LUT context order; 0 when the LUT is disabled.
    pub(crate) fn lut_order(&self) -> u8 {
        if self.lut_transformation_enabled {
            self.lut_transformation_order.unwrap_or(0)
        } else {
            0
        }
    }

    /// First binarization parameter, defaulting to 0 for parameterless
    /// binarizations.
    pub(crate) fn parameter(&self) -> u32 {
        self.binarization_parameters.first().copied().unwrap_or(0)
    }
}

impl PartialEq for TransformedSequenceConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.lut_transformation_enabled == other.lut_transformation_enabled
            && (!self.lut_transformation_enabled
                || (self.lut_bits() == other.lut_bits()
                    && self.lut_order() == other.lut_order()))
            && self.diff_coding_enabled == other.diff_coding_enabled
            && self.binarization_id == other.binarization_id
            && self.binarization_parameters == other.binarization_parameters
            && self.context_selection_id == other.context_selection_id
    }
}

impl Display for TransformedSequenceConfiguration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} | {} | {} | {} | {} {:?} | {}]",
            u8::from(self.lut_transformation_enabled),
            self.lut_bits(),
            self.lut_order(),
            u8::from(self.diff_coding_enabled),
            self.binarization_id.name(),
            self.binarization_parameters,
            u8::from(self.context_selection_id),
        )
    }
}

/// A complete, serializable encoding configuration: word size, sequence
/// transformation, and per-substream coding parameters.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct EncodingConfiguration {
    /// Symbol width in bytes (1, 2, 4 or 8).
    pub word_size: u8,
    /// The sequence transformation splitting the input into substreams.
    pub sequence_transformation_id: SequenceTransformationId,
    /// Transformation parameter (window size, run-length guard; unused
    /// for the other transformations).
    pub sequence_transformation_parameter: u32,
    /// One entry per transformed substream.
    pub transformed_sequences: Vec<TransformedSequenceConfiguration>,
}

impl EncodingConfiguration {
    /// Creates and validates a configuration.
    pub fn new(
        word_size: u8,
        sequence_transformation_id: SequenceTransformationId,
        sequence_transformation_parameter: u32,
        transformed_sequences: Vec<TransformedSequenceConfiguration>,
    ) -> GabacResult<Self> {
        let config = Self {
            word_size,
            sequence_transformation_id,
            sequence_transformation_parameter,
            transformed_sequences,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> GabacResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to the interchange JSON format. `parse(to_json(x)) == x`
    /// holds for every valid configuration.
    pub fn to_json(&self) -> GabacResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Word size in bytes of the transformed substream at `index`.
    pub(crate) fn stream_word_size(&self, index: usize) -> u8 {
        let fixed = self.sequence_transformation_id.stream_word_sizes()[index];
        if fixed == 0 {
            self.word_size
        } else {
            fixed
        }
    }

    /// Symbol width in bits of the transformed substream at `index`.
    pub(crate) fn output_symbol_size(&self, index: usize) -> u8 {
        self.stream_word_size(index) * 8
    }

    /// Checks internal consistency. Decode assumes a configuration that
    /// was validated at encode time.
    pub fn validate(&self) -> GabacResult<()> {
        if !matches!(self.word_size, 1 | 2 | 4 | 8) {
            return Err(GabacError::InvalidConfiguration(format!(
                "word_size must be 1, 2, 4 or 8, got {}",
                self.word_size
            )));
        }

        let num_streams = self.sequence_transformation_id.num_streams();
        if self.transformed_sequences.len() != num_streams {
            return Err(GabacError::InvalidConfiguration(format!(
                "{} requires {} transformed sequences, got {}",
                self.sequence_transformation_id.name(),
                num_streams,
                self.transformed_sequences.len()
            )));
        }

        match self.sequence_transformation_id {
            SequenceTransformationId::RleCoding => {
                if self.sequence_transformation_parameter == 0 {
                    return Err(GabacError::InvalidConfiguration(
                        "rle_coding guard must be greater than 0".into(),
                    ));
                }
            }
            SequenceTransformationId::MatchCoding => {
                // window size 0 degenerates to literals only, which is valid
            }
            _ => {}
        }

        for (index, stream) in self.transformed_sequences.iter().enumerate() {
            self.validate_stream(index, stream)?;

            // the context cap and LUT alphabet bounds live in the derived
            // state; computing it surfaces them at validation time
            StateVars::derive(self, index)?;
        }

        Ok(())
    }

    fn validate_stream(
        &self,
        index: usize,
        stream: &TransformedSequenceConfiguration,
    ) -> GabacResult<()> {
        let bin_id = stream.binarization_id;
        if stream.binarization_parameters.len() < bin_id.num_parameters() {
            return Err(GabacError::InvalidConfiguration(format!(
                "{} requires {} binarization parameters",
                bin_id.name(),
                bin_id.num_parameters()
            )));
        }
        if bin_id.num_parameters() > 0 {
            let (param_min, param_max) = bin_id.parameter_range();
            let parameter = stream.parameter();
            if parameter < param_min || parameter > param_max {
                return Err(GabacError::InvalidConfiguration(format!(
                    "{} parameter {} outside [{}, {}]",
                    bin_id.name(),
                    parameter,
                    param_min,
                    param_max
                )));
            }
        }

        if stream.lut_transformation_enabled {
            if stream.diff_coding_enabled {
                return Err(GabacError::InvalidConfiguration(
                    "lut transformation and diff coding are mutually exclusive".into(),
                ));
            }

            let order = stream.context_selection_id.coding_order();
            if stream.context_selection_id.is_bypass() || order == 0 {
                return Err(GabacError::InvalidConfiguration(
                    "lut transformation requires adaptive coding order 1 or 2".into(),
                ));
            }
            if stream.lut_transformation_order != Some(order) {
                return Err(GabacError::InvalidConfiguration(format!(
                    "lut_transformation_order must match the context selection order {}",
                    order
                )));
            }

            let bits = stream.lut_bits();
            let oss = self.output_symbol_size(index);
            if bits == 0 || bits > 8 || oss % bits != 0 {
                return Err(GabacError::InvalidConfiguration(format!(
                    "lut_transformation_bits {} must be in 1..=8 and divide the symbol size {}",
                    bits, oss
                )));
            }
        }

        Ok(())
    }

    /// Returns a configuration guaranteed to represent any stream whose
    /// values do not exceed `max`, degrading binarizations and the LUT
    /// transform as needed. `word_size` caps the configured word size.
    pub fn generalize(&self, max: u64, word_size: u8) -> GabacResult<Self> {
        if max > u64::from(u32::MAX) {
            return Err(GabacError::InvalidConfiguration(
                "values not representable in 32 bits are not supported".into(),
            ));
        }

        let mut ret = self.clone();
        ret.word_size = ret.word_size.min(word_size);
        if ret.word_size == 8 {
            ret.transformed_sequences[0].diff_coding_enabled = false;
        }

        generalize_lut(&mut ret, max, 0);
        generalize_bin(&mut ret, max, 0);

        match ret.sequence_transformation_id {
            SequenceTransformationId::EqualityCoding => {
                // the flag stream holds single bits
                generalize_lut(&mut ret, 1, 1);
                generalize_bin(&mut ret, 1, 1);
            }
            SequenceTransformationId::MatchCoding => {
                // pointers are distances within the window, lengths are
                // unbounded 32-bit values
                let window = u64::from(ret.sequence_transformation_parameter);
                generalize_lut(&mut ret, window, 1);
                generalize_bin(&mut ret, window, 1);
                generalize_lut(&mut ret, u64::from(u32::MAX), 2);
                generalize_bin(&mut ret, u64::from(u32::MAX), 2);
            }
            SequenceTransformationId::RleCoding => {
                // lengths are chunked, so the guard bounds them
                let guard = u64::from(ret.sequence_transformation_parameter);
                generalize_lut(&mut ret, guard, 1);
                generalize_bin(&mut ret, guard, 1);
            }
            SequenceTransformationId::NoTransform => {}
        }

        Ok(ret)
    }

    /// Returns a configuration with parameters tightened to the observed
    /// maximum; the inverse direction of [`Self::generalize`].
    pub fn optimize(&self, max: u64) -> GabacResult<Self> {
        if max > u64::from(u32::MAX) {
            return Err(GabacError::InvalidConfiguration(
                "values not representable in 32 bits are not supported".into(),
            ));
        }

        let mut ret = self.clone();

        optimize_lut(&mut ret, max, 0);
        optimize_bin(&mut ret, max, 0);

        match ret.sequence_transformation_id {
            SequenceTransformationId::EqualityCoding => {
                optimize_lut(&mut ret, 1, 1);
                optimize_bin(&mut ret, 1, 1);
            }
            SequenceTransformationId::MatchCoding => {
                let window = u64::from(ret.sequence_transformation_parameter);
                optimize_lut(&mut ret, window, 1);
                optimize_bin(&mut ret, window, 1);
                optimize_lut(&mut ret, u64::from(u32::MAX), 2);
                optimize_bin(&mut ret, u64::from(u32::MAX), 2);
            }
            SequenceTransformationId::RleCoding => {
                let guard = u64::from(ret.sequence_transformation_parameter);
                optimize_lut(&mut ret, guard, 1);
                optimize_bin(&mut ret, guard, 1);
            }
            SequenceTransformationId::NoTransform => {}
        }

        Ok(ret)
    }

    /// Whether this configuration can represent any stream with values up
    /// to `max` without modification.
    pub fn is_general(&self, max: u64, word_size: u8) -> bool {
        match self.generalize(max, word_size) {
            Ok(generalized) => *self == generalized,
            Err(_) => false,
        }
    }

    /// Whether this configuration is already tightened to `max`.
    pub fn is_optimal(&self, max: u64) -> bool {
        match self.optimize(max) {
            Ok(optimized) => *self == optimized,
            Err(_) => false,
        }
    }
}

impl Display for EncodingConfiguration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | {} | {} |",
            self.word_size,
            self.sequence_transformation_id.name(),
            self.sequence_transformation_parameter
        )?;
        for stream in &self.transformed_sequences {
            write!(f, " {}", stream)?;
        }
        Ok(())
    }
}

/// Bits needed to represent `max`, i.e. `ceil(log2(max + 1))`.
pub(crate) fn bits_needed(max: u64) -> u32 {
    if max == 0 {
        0
    } else {
        64 - max.leading_zeros()
    }
}

/// Smallest valid LUT subsymbol size covering `bits` bits.
fn lut_bits_for(bits: u32) -> u8 {
    (bits.max(1).next_power_of_two().min(8)) as u8
}

fn generalize_lut(config: &mut EncodingConfiguration, max: u64, index: usize) {
    if !config.transformed_sequences[index].lut_transformation_enabled {
        return;
    }

    let current = config.transformed_sequences[index].lut_bits();
    let bits = lut_bits_for(bits_needed(max)).max(current);
    config.transformed_sequences[index].lut_transformation_bits = Some(bits);

    // degrade the context order, then the LUT itself, until the derived
    // context table fits
    while StateVars::derive(config, index).is_err() {
        let stream = &mut config.transformed_sequences[index];
        if stream.lut_order() == 2 {
            stream.lut_transformation_order = Some(1);
            stream.context_selection_id = ContextSelectionId::AdaptiveCodingOrder1;
        } else {
            stream.lut_transformation_enabled = false;
            stream.lut_transformation_bits = None;
            stream.lut_transformation_order = None;
            break;
        }
    }
}

fn optimize_lut(config: &mut EncodingConfiguration, max: u64, index: usize) {
    let stream = &mut config.transformed_sequences[index];
    if !stream.lut_transformation_enabled {
        return;
    }

    let current = stream.lut_bits();
    let bits = lut_bits_for(bits_needed(max)).min(current.max(1));
    stream.lut_transformation_bits = Some(bits);
}

fn generalize_bin(config: &mut EncodingConfiguration, max: u64, index: usize) {
    const TU_MAX: u32 = 32;

    let stream = &mut config.transformed_sequences[index];
    match stream.binarization_id {
        BinarizationId::Bi => {
            let bits = bits_needed(max).max(stream.parameter()).clamp(1, 32);
            stream.binarization_parameters = vec![bits];
        }
        BinarizationId::Tu => {
            if max > u64::from(TU_MAX) {
                // switch to TEG and fix it up recursively
                stream.binarization_id = BinarizationId::Teg;
                stream.binarization_parameters = vec![TU_MAX];
                generalize_bin(config, max, index);
            } else {
                let c_max = (max as u32).max(stream.parameter()).max(1);
                stream.binarization_parameters = vec![c_max];
            }
        }
        BinarizationId::Eg | BinarizationId::Seg => {
            let bin_id = stream.binarization_id;
            if max as i64 > bin_id.max_value(0) {
                stream.binarization_parameters = vec![0];
                stream.binarization_id = BinarizationId::Bi;
                generalize_bin(config, max, index);
            }
        }
        BinarizationId::Teg | BinarizationId::Steg => {
            let bin_id = stream.binarization_id;
            if stream.parameter() > TU_MAX {
                stream.binarization_parameters = vec![TU_MAX];
            }
            if max as i64 > bin_id.max_value(0) {
                stream.binarization_parameters = vec![0];
                stream.binarization_id = BinarizationId::Bi;
                generalize_bin(config, max, index);
            }
        }
    }
}

fn optimize_bin(config: &mut EncodingConfiguration, max: u64, index: usize) {
    let stream = &mut config.transformed_sequences[index];
    match stream.binarization_id {
        BinarizationId::Bi => {
            let bits = bits_needed(max).min(stream.parameter()).clamp(1, 32);
            stream.binarization_parameters = vec![bits];
        }
        BinarizationId::Tu => {
            let c_max = (max as u32).clamp(1, 32);
            stream.binarization_parameters = vec![c_max];
        }
        BinarizationId::Teg => {
            if stream.parameter() == 0 {
                // TEG 0 is just a slower EG
                stream.binarization_parameters = vec![];
                stream.binarization_id = BinarizationId::Eg;
                optimize_bin(config, max, index);
            } else if u64::from(stream.parameter()) > max {
                stream.binarization_parameters = vec![(max as u32).max(1)];
            }
        }
        BinarizationId::Steg => {
            if stream.parameter() == 0 {
                // STEG 0 is just a slower SEG
                stream.binarization_parameters = vec![];
                stream.binarization_id = BinarizationId::Seg;
                optimize_bin(config, max, index);
            } else if u64::from(stream.parameter()) > max {
                stream.binarization_parameters = vec![(max as u32).max(1)];
            }
        }
        BinarizationId::Eg | BinarizationId::Seg => {}
    }
}
