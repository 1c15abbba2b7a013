//! Conversion driver
//!
//! Copies a source into a sink, converting audio the sink cannot take and
//! optionally pacing output to real time:
//!
//! ```text
//! input ──► ConvertDemuxer ──► [Walltime] ──► cutoff check ──► output
//! ```

pub mod args;
pub mod demuxer;

use crate::error::{Error, Result};
use crate::filter::{FilterDemuxer, Filters, Walltime};
use crate::media::{CodecData, Demuxer, Muxer};

pub use args::{ConvertArgs, ConvertOptions};
pub use demuxer::{CodecRegistry, ConvertDemuxer};

/// Convert `input` into `output`
///
/// Writes the header, every packet up to the cutoff or end-of-stream, and
/// the trailer. Returns the number of packets written. The first error
/// aborts the conversion; codecs are released on every path.
pub async fn convert<D, M, R>(
    mut input: D,
    output: &mut M,
    registry: R,
    options: &ConvertOptions,
) -> Result<u64>
where
    D: Demuxer,
    M: Muxer,
    R: CodecRegistry + 'static,
{
    let source_streams = input.streams().await?;

    let mut demuxer = ConvertDemuxer::new(input, registry, options.output_codec_types.clone());
    let streams = demuxer.streams().await?;

    if options.verbose {
        tracing::info!(
            from = %codec_names(&source_streams),
            to = %codec_names(&streams),
            "Stream mapping"
        );
    }

    output.write_header(&streams).await?;

    let mut filters = Filters::new();
    if options.realtime {
        filters.push(Walltime::new());
    }
    let mut demuxer = FilterDemuxer::new(demuxer, filters);

    let mut count = 0;
    loop {
        let packet = match demuxer.read_packet().await {
            Ok(packet) => packet,
            Err(Error::EndOfStream) => break,
            Err(e) => return Err(e),
        };

        if options.verbose {
            tracing::info!(
                stream = packet.stream_index,
                time_ms = packet.time.as_millis() as u64,
                size = packet.size(),
                keyframe = packet.is_keyframe,
                "Packet"
            );
        }

        if options.duration.is_some_and(|limit| packet.time > limit) {
            tracing::debug!(time_ms = packet.time.as_millis() as u64, "Cutoff reached");
            break;
        }

        output.write_packet(packet).await?;
        count += 1;
    }

    output.write_trailer().await?;
    Ok(count)
}

fn codec_names(streams: &[CodecData]) -> String {
    streams
        .iter()
        .map(|s| s.codec_type().name())
        .collect::<Vec<_>>()
        .join(" ")
}
