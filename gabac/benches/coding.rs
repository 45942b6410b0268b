use criterion::{criterion_group, criterion_main, Criterion};
use gabac::_internal_test_data::{RANDOM_BYTES, SKEWED_BYTES};
use gabac::analysis::{analyze, SearchSpace};
use gabac::configuration::{
    BinarizationId, ContextSelectionId, EncodingConfiguration, SequenceTransformationId,
    TransformedSequenceConfiguration,
};
use gabac::decode::decode;
use gabac::encode::encode;
use gabac::stream_handler::IoConfiguration;

fn adaptive_order_1_config() -> EncodingConfiguration {
    EncodingConfiguration::new(
        1,
        SequenceTransformationId::NoTransform,
        0,
        vec![TransformedSequenceConfiguration {
            lut_transformation_enabled: false,
            lut_transformation_bits: None,
            lut_transformation_order: None,
            diff_coding_enabled: false,
            binarization_id: BinarizationId::Bi,
            binarization_parameters: vec![8],
            context_selection_id: ContextSelectionId::AdaptiveCodingOrder1,
        }],
    )
    .unwrap()
}

fn encode_bytes(config: &EncodingConfiguration, input: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::new();
    let mut io = IoConfiguration {
        input: &mut &input[..],
        output: &mut encoded,
        block_size: 0,
    };
    encode(&mut io, config).unwrap();
    encoded
}

fn encode_random(c: &mut Criterion) {
    let config = adaptive_order_1_config();

    c.bench_function("Encode 4 KiB of random bytes", |b| {
        b.iter(|| {
            let encoded = encode_bytes(&config, &RANDOM_BYTES);
            assert!(!encoded.is_empty());
        })
    });
}

fn decode_skewed(c: &mut Criterion) {
    let config = adaptive_order_1_config();
    let encoded = encode_bytes(&config, &SKEWED_BYTES);

    c.bench_function("Decode 4 KiB of skewed bytes", |b| {
        b.iter(|| {
            let mut decoded = Vec::new();
            let mut io = IoConfiguration {
                input: &mut encoded.as_slice(),
                output: &mut decoded,
                block_size: 0,
            };
            decode(&mut io, &config).unwrap();
            assert_eq!(decoded.len(), SKEWED_BYTES.len());
        })
    });
}

fn analyze_skewed(c: &mut Criterion) {
    let space = SearchSpace::default();

    c.bench_function("Analyze 1 KiB of skewed bytes", |b| {
        b.iter(|| {
            let config = analyze(&SKEWED_BYTES[..1024], &space).unwrap();
            assert!(config.validate().is_ok());
        })
    });
}

criterion_group!(benches, encode_random, decode_skewed, analyze_skewed);
criterion_main!(benches);
