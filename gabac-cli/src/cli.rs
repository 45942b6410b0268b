use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

use crate::opts::{input_file, input_stream, InputFile, InputStream};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,

    /// Don't display a progress bar/spinner
    #[clap(long, global = true, value_parser)]
    pub no_progress: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Entropy-encode a raw stream using a JSON configuration
    Encode {
        /// JSON configuration file path
        #[clap(short, long, value_parser = input_file)]
        config: InputFile,

        /// Input file path; `-` is the standard input
        #[clap(default_value_t, value_parser = input_stream)]
        input: InputStream,

        /// Output file path; `-` is the standard output
        #[clap(short, long, value_parser)]
        output: Option<PathBuf>,

        /// Number of symbols per coded block; 0 encodes the whole input as
        /// a single block
        #[clap(default_value_t = 0, short, long, value_parser)]
        block_size: usize,
    },

    /// Decode an entropy-encoded stream using a JSON configuration
    Decode {
        /// JSON configuration file path
        #[clap(short, long, value_parser = input_file)]
        config: InputFile,

        /// Input file path; `-` is the standard input
        #[clap(default_value_t, value_parser = input_stream)]
        input: InputStream,

        /// Output file path; `-` is the standard output
        #[clap(short, long, value_parser)]
        output: Option<PathBuf>,
    },

    /// Search for the smallest-output configuration for given input
    Analyze {
        /// Input file path; `-` is the standard input
        #[clap(default_value_t, value_parser = input_stream)]
        input: InputStream,

        /// Output configuration file path; `-` is the standard output
        #[clap(short, long, value_parser)]
        output: Option<PathBuf>,

        /// Restrict the search to a single symbol word size (in bytes)
        #[clap(short, long, value_parser)]
        word_size: Option<u8>,
    },
}
