use std::io::{Read, Write};

use anyhow::Context;
use gabac::analysis::{analyze, SearchSpace};
use log::info;

pub fn analyze_stream<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    word_size: Option<u8>,
) -> anyhow::Result<()> {
    let mut input = Vec::new();
    reader
        .read_to_end(&mut input)
        .context("Could not read the input stream")?;

    let mut space = SearchSpace::default();
    if let Some(word_size) = word_size {
        space.word_sizes = vec![word_size];
    }

    let config = analyze(&input, &space)
        .context("Could not find a working configuration for the input")?;
    info!(
        "Selected a word size {} configuration for {} input bytes",
        config.word_size,
        input.len()
    );

    let json = config
        .to_json()
        .context("Could not serialize the configuration")?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;

    Ok(())
}
