use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use cmd::{analyze, decode, encode};
use human_panic::setup_panic;
use lazy_static::lazy_static;

use crate::logging::init_logging;
use crate::opts::OutputWriter;
use crate::progress_bar::{CodingProgressBar, ProgressRead};

mod cli;
mod cmd;
mod logging;
mod opts;
mod progress_bar;

lazy_static! {
    pub(crate) static ref PROGRESS_BAR: CodingProgressBar = CodingProgressBar::new();
}

fn main() -> anyhow::Result<()> {
    setup_panic!();

    let cli: Cli = Cli::parse();

    if !cli.no_progress {
        PROGRESS_BAR.show();
    }

    init_logging(cli.verbose.log_level_filter()).expect("Could not initialize logging");

    match &cli.command {
        Commands::Encode {
            config,
            input,
            output,
            block_size,
        } => {
            let config_json = config.read_to_string()?;
            let reader = input.as_reader()?;
            let output = OutputWriter::from_path_and_input(output, &reader, "gabac")?;

            PROGRESS_BAR.set_bytes(reader.length()?);
            let reader = ProgressRead::new(reader.into_read(), PROGRESS_BAR.clone());

            encode::encode(reader, output.into_write(), &config_json, *block_size)
                .context("Failed to encode the input file")?;
        }
        Commands::Decode {
            config,
            input,
            output,
        } => {
            let config_json = config.read_to_string()?;
            let reader = input.as_reader()?;
            let output = OutputWriter::from_path_and_input(output, &reader, "raw")?;

            PROGRESS_BAR.set_bytes(reader.length()?);
            let reader = ProgressRead::new(reader.into_read(), PROGRESS_BAR.clone());

            decode::decode(reader, output.into_write(), &config_json)
                .context("Failed to decode the input file")?;
        }
        Commands::Analyze {
            input,
            output,
            word_size,
        } => {
            let reader = input.as_reader()?;
            let output = OutputWriter::from_path_and_input(output, &reader, "json")?;

            PROGRESS_BAR.set_bytes(reader.length()?);
            let reader = ProgressRead::new(reader.into_read(), PROGRESS_BAR.clone());

            analyze::analyze_stream(reader, output.into_write(), *word_size)
                .context("Failed to analyze the input file")?;
        }
    }

    PROGRESS_BAR.finish();

    Ok(())
}
