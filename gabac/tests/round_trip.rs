use gabac::_internal_test_data::{
    MONOTONIC_U32_BYTES, RANDOM_BYTES, REPETITIVE_BYTES, SKEWED_BYTES,
};
use gabac::analysis::{analyze, SearchSpace};
use gabac::configuration::{
    BinarizationId, ContextSelectionId, EncodingConfiguration, SequenceTransformationId,
    TransformedSequenceConfiguration,
};
use gabac::decode::decode;
use gabac::encode::encode;
use gabac::stream_handler::IoConfiguration;

fn run_round_trip(config: &EncodingConfiguration, input: &[u8], block_size: usize) -> usize {
    let mut encoded = Vec::new();
    {
        let mut io = IoConfiguration {
            input: &mut &input[..],
            output: &mut encoded,
            block_size,
        };
        encode(&mut io, config).unwrap();
    }

    let mut decoded = Vec::new();
    {
        let mut io = IoConfiguration {
            input: &mut encoded.as_slice(),
            output: &mut decoded,
            block_size,
        };
        decode(&mut io, config).unwrap();
    }

    assert_eq!(decoded, input);
    encoded.len()
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

#[test]
fn test_round_trip_no_transform_random_bytes() {
    let config = EncodingConfiguration::new(
        1,
        SequenceTransformationId::NoTransform,
        0,
        vec![stream(
            BinarizationId::Bi,
            vec![8],
            ContextSelectionId::AdaptiveCodingOrder0,
        )],
    )
    .unwrap();

    run_round_trip(&config, &RANDOM_BYTES, 0);
}

#[test_log::test]
fn test_round_trip_rle_skewed_bytes() {
    let config = EncodingConfiguration::new(
        1,
        SequenceTransformationId::RleCoding,
        255,
        vec![
            stream(BinarizationId::Tu, vec![8], ContextSelectionId::AdaptiveCodingOrder1),
            stream(BinarizationId::Eg, vec![], ContextSelectionId::AdaptiveCodingOrder0),
        ],
    )
    .unwrap();

    let encoded_size = run_round_trip(&config, &SKEWED_BYTES, 0);
    // mostly zeros; run-length coding must beat the raw size
    assert!(encoded_size < SKEWED_BYTES.len());
}

#[test]
fn test_round_trip_equality_coding_small_blocks() {
    let config = EncodingConfiguration::new(
        1,
        SequenceTransformationId::EqualityCoding,
        0,
        vec![
            stream(BinarizationId::Eg, vec![], ContextSelectionId::AdaptiveCodingOrder0),
            stream(BinarizationId::Tu, vec![1], ContextSelectionId::AdaptiveCodingOrder1),
        ],
    )
    .unwrap();

    for block_size in [1, 7, 256, 100_000] {
        run_round_trip(&config, &SKEWED_BYTES, block_size);
    }
}

#[test]
fn test_round_trip_match_coding_repetitive_bytes() {
    let config = EncodingConfiguration::new(
        1,
        SequenceTransformationId::MatchCoding,
        255,
        vec![
            stream(BinarizationId::Bi, vec![8], ContextSelectionId::AdaptiveCodingOrder1),
            stream(BinarizationId::Eg, vec![], ContextSelectionId::Bypass),
            stream(BinarizationId::Eg, vec![], ContextSelectionId::Bypass),
        ],
    )
    .unwrap();

    run_round_trip(&config, &REPETITIVE_BYTES, 0);
}

#[test]
fn test_round_trip_diff_coding_monotonic_words() {
    let mut raw = stream(
        BinarizationId::Eg,
        vec![],
        ContextSelectionId::AdaptiveCodingOrder0,
    );
    raw.diff_coding_enabled = true;
    let config = EncodingConfiguration::new(
        4,
        SequenceTransformationId::NoTransform,
        0,
        vec![raw],
    )
    .unwrap();

    run_round_trip(&config, &MONOTONIC_U32_BYTES, 128);
}

#[test]
fn test_round_trip_lut_transformed_bytes() {
    let mut raw = stream(
        BinarizationId::Bi,
        vec![8],
        ContextSelectionId::AdaptiveCodingOrder1,
    );
    raw.lut_transformation_enabled = true;
    raw.lut_transformation_bits = Some(8);
    raw.lut_transformation_order = Some(1);
    let config = EncodingConfiguration::new(
        1,
        SequenceTransformationId::NoTransform,
        0,
        vec![raw],
    )
    .unwrap();

    run_round_trip(&config, &REPETITIVE_BYTES, 0);
}

#[test]
fn test_round_trip_empty_input() {
    let config = EncodingConfiguration::new(
        1,
        SequenceTransformationId::EqualityCoding,
        0,
        vec![
            stream(BinarizationId::Eg, vec![], ContextSelectionId::Bypass),
            stream(BinarizationId::Tu, vec![1], ContextSelectionId::AdaptiveCodingOrder0),
        ],
    )
    .unwrap();

    let encoded_size = run_round_trip(&config, &[], 0);
    // one zero-size frame per substream
    assert_eq!(encoded_size, 8);
}

#[test_log::test]
fn test_round_trip_analysis_chosen_configurations() {
    let space = SearchSpace::default();

    for input in [
        &RANDOM_BYTES[..1024],
        &SKEWED_BYTES[..1024],
        &REPETITIVE_BYTES[..1024],
    ] {
        let config = analyze(input, &space).unwrap();
        run_round_trip(&config, input, 0);
    }
}

#[test]
fn test_analysis_configuration_survives_json() {
    let config = analyze(&SKEWED_BYTES[..512], &SearchSpace::default()).unwrap();

    let json = config.to_json().unwrap();
    let parsed = EncodingConfiguration::from_json(&json).unwrap();

    assert_eq!(parsed, config);
}
