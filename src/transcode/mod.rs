//! Audio transcoding
//!
//! A [`Transcoder`] decodes and re-encodes selected audio streams, using a
//! [`Timeline`] to give every encoded packet the capture time of the audio
//! it carries. [`TranscodeMuxer`] and [`TranscodeDemuxer`] wrap it around a
//! consumer or a producer.
//!
//! ```text
//! Packet ──► AudioDecoder ──► AudioFrame ──► AudioEncoder ──► payloads
//!   │                                                          │
//!   └──── push(time, input duration) ─► Timeline ◄─ pop(output duration)
//! ```

pub mod demuxer;
pub mod muxer;
pub mod timeline;
pub mod transcoder;

pub use demuxer::TranscodeDemuxer;
pub use muxer::TranscodeMuxer;
pub use timeline::Timeline;
pub use transcoder::{AudioCodecFinder, AudioCodecPair, TranscodeOptions, Transcoder};
