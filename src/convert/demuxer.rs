//! Codec negotiation for conversions

use crate::error::{Result, TranscodeError};
use crate::media::{AudioCodecData, AudioDecoder, AudioEncoder, CodecData, CodecType, Demuxer, Packet};
use crate::transcode::{AudioCodecFinder, AudioCodecPair, TranscodeDemuxer, TranscodeOptions};

/// Source of audio codecs
pub trait CodecRegistry: Send {
    /// Create an encoder producing `codec`
    fn new_audio_encoder(&self, codec: CodecType) -> Option<Box<dyn AudioEncoder>>;

    /// Create a decoder for a stream
    fn new_audio_decoder(&self, codec: &AudioCodecData) -> Option<Box<dyn AudioDecoder>>;
}

/// Picks a codec pair for each audio stream the output cannot take
struct Negotiator<R> {
    registry: R,
    supported: Vec<CodecType>,
}

impl<R: CodecRegistry> AudioCodecFinder for Negotiator<R> {
    fn find(&mut self, codec: &AudioCodecData, index: usize) -> Result<Option<AudioCodecPair>> {
        if self.supported.is_empty() || self.supported.contains(&codec.codec_type) {
            return Ok(None);
        }

        let (target, encoder) = self
            .supported
            .iter()
            .filter(|t| t.is_audio())
            .find_map(|&t| self.registry.new_audio_encoder(t).map(|enc| (t, enc)))
            .ok_or_else(|| TranscodeError::NoEncoder {
                from: codec.codec_type,
                to: self.supported.clone(),
            })?;

        let decoder = self
            .registry
            .new_audio_decoder(codec)
            .ok_or(TranscodeError::NoDecoder(codec.codec_type))?;

        tracing::debug!(
            stream = index,
            from = %codec.codec_type,
            to = %target,
            "Audio conversion negotiated"
        );

        Ok(Some(AudioCodecPair { decoder, encoder }))
    }
}

/// Demuxer whose audio is converted to a codec the output supports
///
/// If `output_codec_types` is empty, or already contains a stream's codec,
/// that stream is passed through. Otherwise the first audio codec in the
/// list that the registry can encode is chosen.
pub struct ConvertDemuxer<D> {
    inner: TranscodeDemuxer<D>,
}

impl<D: Demuxer> ConvertDemuxer<D> {
    pub fn new<R>(demuxer: D, registry: R, output_codec_types: Vec<CodecType>) -> Self
    where
        R: CodecRegistry + 'static,
    {
        let negotiator = Negotiator {
            registry,
            supported: output_codec_types,
        };
        Self {
            inner: TranscodeDemuxer::new(demuxer, TranscodeOptions::new().finder(negotiator)),
        }
    }

    /// Get a reference to the source demuxer
    pub fn get_ref(&self) -> &D {
        self.inner.get_ref()
    }

    /// Release codecs
    pub fn close(&mut self) {
        self.inner.close();
    }
}

impl<D: Demuxer> Demuxer for ConvertDemuxer<D> {
    async fn streams(&mut self) -> Result<Vec<CodecData>> {
        self.inner.streams().await
    }

    async fn read_packet(&mut self) -> Result<Packet> {
        self.inner.read_packet().await
    }
}
