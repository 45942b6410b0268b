use std::io::{BufReader, BufWriter, Read, Write};

use anyhow::Context;
use gabac::configuration::EncodingConfiguration;
use gabac::stream_handler::IoConfiguration;

pub fn encode<R: Read, W: Write>(
    reader: R,
    writer: W,
    config_json: &str,
    block_size: usize,
) -> anyhow::Result<()> {
    let config = EncodingConfiguration::from_json(config_json)
        .context("Could not parse the encoding configuration")?;

    let mut input = BufReader::new(reader);
    let mut output = BufWriter::new(writer);
    let mut io = IoConfiguration {
        input: &mut input,
        output: &mut output,
        block_size,
    };

    gabac::encode::encode(&mut io, &config).context("Could not encode the input stream")?;

    Ok(())
}
