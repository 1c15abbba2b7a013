//! Transcoding consumer adapter

use super::transcoder::{TranscodeOptions, Transcoder};
use crate::error::{Error, Result};
use crate::media::{CodecData, Muxer, Packet};

/// Muxer that transcodes everything written to it
///
/// The transcoder is negotiated in `write_header`; the wrapped muxer sees
/// the post-transcoding stream descriptors and every output packet, in
/// order.
pub struct TranscodeMuxer<M> {
    muxer: M,
    options: TranscodeOptions,
    transcoder: Option<Transcoder>,
}

impl<M: Muxer> TranscodeMuxer<M> {
    pub fn new(muxer: M, options: TranscodeOptions) -> Self {
        Self {
            muxer,
            options,
            transcoder: None,
        }
    }

    /// Get a reference to the wrapped muxer
    pub fn get_ref(&self) -> &M {
        &self.muxer
    }

    /// Close the transcoder and return the wrapped muxer
    pub fn into_inner(mut self) -> M {
        self.close();
        self.muxer
    }

    /// Release codecs
    pub fn close(&mut self) {
        if let Some(mut transcoder) = self.transcoder.take() {
            transcoder.close();
        }
    }
}

impl<M: Muxer> Muxer for TranscodeMuxer<M> {
    async fn write_header(&mut self, streams: &[CodecData]) -> Result<()> {
        let transcoder = Transcoder::new(streams, &mut self.options)?;
        let streams = transcoder.streams();
        self.transcoder = Some(transcoder);
        self.muxer.write_header(&streams).await
    }

    async fn write_packet(&mut self, packet: Packet) -> Result<()> {
        let transcoder = self
            .transcoder
            .as_mut()
            .ok_or(Error::InvalidStreamIndex(packet.stream_index))?;

        for out in transcoder.transcode(packet)? {
            self.muxer.write_packet(out).await?;
        }
        Ok(())
    }

    async fn write_trailer(&mut self) -> Result<()> {
        self.muxer.write_trailer().await
    }
}
