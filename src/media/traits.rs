//! Producer, consumer and codec roles
//!
//! The relay core never parses containers or codec bitstreams itself. It
//! talks to the outside world through these traits: a [`Demuxer`] produces
//! packets, a [`Muxer`] consumes them, and an [`AudioDecoder`] /
//! [`AudioEncoder`] pair turns one audio codec into another.

use std::future::Future;

use bytes::Bytes;

use super::codec::{AudioCodecData, CodecData};
use super::frame::AudioFrame;
use super::packet::Packet;
use crate::error::Result;

/// Packet producer
///
/// `read_packet` fails with [`Error::EndOfStream`](crate::error::Error::EndOfStream)
/// on graceful completion.
pub trait Demuxer: Send {
    /// Stream descriptors, in `stream_index` order
    fn streams(&mut self) -> impl Future<Output = Result<Vec<CodecData>>> + Send;

    /// Read the next packet
    fn read_packet(&mut self) -> impl Future<Output = Result<Packet>> + Send;
}

/// Packet consumer
pub trait Muxer: Send {
    /// Announce the stream descriptors; called once before any packet
    fn write_header(&mut self, streams: &[CodecData]) -> impl Future<Output = Result<()>> + Send;

    /// Write one packet
    fn write_packet(&mut self, packet: Packet) -> impl Future<Output = Result<()>> + Send;

    /// Finish the output
    fn write_trailer(&mut self) -> impl Future<Output = Result<()>> + Send;
}

/// Compressed audio to [`AudioFrame`]
pub trait AudioDecoder: Send {
    /// Decode one payload
    ///
    /// Returns `Ok(None)` when the decoder buffered the input without
    /// producing a frame yet.
    fn decode(&mut self, data: &[u8]) -> Result<Option<AudioFrame>>;

    /// Release codec resources
    fn close(&mut self) {}
}

/// [`AudioFrame`] to compressed audio
pub trait AudioEncoder: Send {
    /// Descriptor of the encoded output
    fn codec_data(&self) -> Result<AudioCodecData>;

    /// Encode one frame into zero or more payloads
    fn encode(&mut self, frame: &AudioFrame) -> Result<Vec<Bytes>>;

    /// Release codec resources
    fn close(&mut self) {}
}
