pub mod analysis;
mod binary_arithmetic;
mod bit_stream;
pub mod configuration;
mod context_model;
mod context_selector;
pub mod data_block;
pub mod decode;
mod diff_coding;
pub mod encode;
mod equality_coding;
pub mod error;
mod lut_transform;
mod match_coding;
mod reader;
mod rle_coding;
mod state_vars;
pub mod stream_handler;
mod transformation;
mod transformed_subseq;
mod writer;

#[doc(hidden)]
pub mod _internal_test_data;
