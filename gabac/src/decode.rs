//! Block-wise decoding of framed substreams back into raw symbols.

use std::io::Read;

use log::trace;

use crate::configuration::EncodingConfiguration;
use crate::data_block::DataBlock;
use crate::error::{GabacError, GabacResult};
use crate::stream_handler::{self, IoConfiguration};
use crate::{transformation, transformed_subseq};

/// Decodes the whole input of `io` under `config`, writing raw symbol
/// words to the output. The configuration must be the one used to encode.
pub fn decode(io: &mut IoConfiguration<'_>, config: &EncodingConfiguration) -> GabacResult<()> {
    config.validate()?;

    while let Some(block) = decode_block(config, io.input)? {
        io.output.write_all(block.as_bytes())?;
    }
    io.output.flush()?;
    Ok(())
}

/// Decodes one block of substreams, or `None` on a clean end of input.
pub(crate) fn decode_block(
    config: &EncodingConfiguration,
    input: &mut dyn Read,
) -> GabacResult<Option<DataBlock>> {
    let num_streams = config.sequence_transformation_id.num_streams();
    let mut streams = Vec::with_capacity(num_streams);

    for index in 0..num_streams {
        let substream = stream_handler::read_substream(input)?;
        let (num_symbols, payload) = match substream {
            Some(framed) => framed,
            None if index == 0 => return Ok(None),
            None => {
                return Err(GabacError::CorruptedPayload(
                    "input ended in the middle of a block".into(),
                ))
            }
        };

        let word_size = usize::from(config.stream_word_size(index));
        if num_symbols == 0 {
            streams.push(DataBlock::new(word_size));
            continue;
        }

        let (symbols, num_bytes_read) =
            transformed_subseq::decode(config, index, &payload, num_symbols as usize)?;
        trace!(
            "substream {}: {} symbols from {} of {} bytes",
            index,
            num_symbols,
            num_bytes_read,
            payload.len()
        );
        streams.push(symbols);
    }

    transformation::inverse(config, streams).map(Some)
}
