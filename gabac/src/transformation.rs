//! Sequence transformation dispatch: splits a symbol stream into the
//! substreams of the configured transformation and merges them back.

use crate::configuration::{EncodingConfiguration, SequenceTransformationId};
use crate::data_block::DataBlock;
use crate::error::{GabacError, GabacResult};
use crate::{equality_coding, match_coding, rle_coding};

impl SequenceTransformationId {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::NoTransform => "no_transform",
            Self::EqualityCoding => "equality_coding",
            Self::MatchCoding => "match_coding",
            Self::RleCoding => "rle_coding",
        }
    }

    pub(crate) fn num_streams(&self) -> usize {
        self.stream_word_sizes().len()
    }

    /// Fixed word size in bytes per substream; 0 means the input word size.
    pub(crate) fn stream_word_sizes(&self) -> &'static [u8] {
        match self {
            Self::NoTransform => &[0],
            Self::EqualityCoding => &[0, 1],
            Self::MatchCoding => &[0, 4, 4],
            Self::RleCoding => &[0, 4],
        }
    }
}

/// Applies the configured sequence transformation.
pub(crate) fn transform(config: &EncodingConfiguration, values: DataBlock) -> Vec<DataBlock> {
    let parameter = config.sequence_transformation_parameter;
    match config.sequence_transformation_id {
        SequenceTransformationId::NoTransform => vec![values],
        SequenceTransformationId::EqualityCoding => {
            let (raw_values, flags) = equality_coding::transform(&values);
            vec![raw_values, flags]
        }
        SequenceTransformationId::MatchCoding => {
            let (raw_values, pointers, lengths) = match_coding::transform(&values, parameter);
            vec![raw_values, pointers, lengths]
        }
        SequenceTransformationId::RleCoding => {
            let (raw_values, lengths) = rle_coding::transform(&values, parameter);
            vec![raw_values, lengths]
        }
    }
}

/// Undoes the configured sequence transformation.
pub(crate) fn inverse(
    config: &EncodingConfiguration,
    streams: Vec<DataBlock>,
) -> GabacResult<DataBlock> {
    let num_streams = config.sequence_transformation_id.num_streams();
    if streams.len() != num_streams {
        return Err(GabacError::CorruptedPayload(format!(
            "{} expects {} substreams, got {}",
            config.sequence_transformation_id.name(),
            num_streams,
            streams.len()
        )));
    }

    match config.sequence_transformation_id {
        SequenceTransformationId::NoTransform => {
            Ok(streams.into_iter().next().unwrap_or_else(|| {
                DataBlock::new(usize::from(config.word_size))
            }))
        }
        SequenceTransformationId::EqualityCoding => {
            equality_coding::inverse(&streams[0], &streams[1])
        }
        SequenceTransformationId::MatchCoding => {
            match_coding::inverse(&streams[0], &streams[1], &streams[2])
        }
        SequenceTransformationId::RleCoding => rle_coding::inverse(
            &streams[0],
            &streams[1],
            config.sequence_transformation_parameter,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{
        BinarizationId, ContextSelectionId, TransformedSequenceConfiguration,
    };

    fn bypass_stream() -> TransformedSequenceConfiguration {
        TransformedSequenceConfiguration {
            lut_transformation_enabled: false,
            lut_transformation_bits: None,
            lut_transformation_order: None,
            diff_coding_enabled: false,
            binarization_id: BinarizationId::Eg,
            binarization_parameters: vec![],
            context_selection_id: ContextSelectionId::Bypass,
        }
    }

    fn config_for(
        id: SequenceTransformationId,
        parameter: u32,
    ) -> EncodingConfiguration {
        EncodingConfiguration {
            word_size: 1,
            sequence_transformation_id: id,
            sequence_transformation_parameter: parameter,
            transformed_sequences: vec![bypass_stream(); id.num_streams()],
        }
    }

    #[test]
    fn should_expose_stream_layouts() {
        assert_eq!(SequenceTransformationId::NoTransform.num_streams(), 1);
        assert_eq!(SequenceTransformationId::EqualityCoding.num_streams(), 2);
        assert_eq!(SequenceTransformationId::MatchCoding.num_streams(), 3);
        assert_eq!(SequenceTransformationId::RleCoding.num_streams(), 2);
    }

    #[test]
    fn round_trip_every_transformation() {
        let symbols = [1_u64, 1, 1, 5, 6, 5, 6, 5, 6, 200, 200, 0];
        for (id, parameter) in [
            (SequenceTransformationId::NoTransform, 0),
            (SequenceTransformationId::EqualityCoding, 0),
            (SequenceTransformationId::MatchCoding, 8),
            (SequenceTransformationId::RleCoding, 4),
        ] {
            let config = config_for(id, parameter);
            let values = DataBlock::from_symbols(&symbols, 1);

            let streams = transform(&config, values);
            assert_eq!(streams.len(), id.num_streams());
            let restored = inverse(&config, streams).unwrap();

            assert_eq!(restored.iter().collect::<Vec<_>>(), symbols.to_vec());
        }
    }

    #[test]
    fn should_reject_wrong_substream_count() {
        let config = config_for(SequenceTransformationId::MatchCoding, 4);

        assert!(inverse(&config, vec![DataBlock::new(1)]).is_err());
    }
}
