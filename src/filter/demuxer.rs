//! Filtered packet source

use super::{FilterContext, Filters};
use crate::error::Result;
use crate::media::{stream_indices, CodecData, Demuxer, Packet};

/// Demuxer that runs a filter chain over another demuxer
///
/// Dropped packets are skipped; `read_packet` keeps pulling from the source
/// until a packet survives the chain.
pub struct FilterDemuxer<D> {
    demuxer: D,
    filters: Filters,
    streams: Option<Vec<CodecData>>,
    video_index: Option<usize>,
    audio_index: Option<usize>,
}

impl<D: Demuxer> FilterDemuxer<D> {
    pub fn new(demuxer: D, filters: Filters) -> Self {
        Self {
            demuxer,
            filters,
            streams: None,
            video_index: None,
            audio_index: None,
        }
    }

    /// Get a reference to the wrapped demuxer
    pub fn get_ref(&self) -> &D {
        &self.demuxer
    }

    /// Unwrap the source demuxer
    pub fn into_inner(self) -> D {
        self.demuxer
    }

    async fn prepare(&mut self) -> Result<()> {
        if self.streams.is_none() {
            let streams = self.demuxer.streams().await?;
            let (video_index, audio_index) = stream_indices(&streams);
            self.video_index = video_index;
            self.audio_index = audio_index;
            self.streams = Some(streams);
        }
        Ok(())
    }
}

impl<D: Demuxer> Demuxer for FilterDemuxer<D> {
    async fn streams(&mut self) -> Result<Vec<CodecData>> {
        self.prepare().await?;
        Ok(self.streams.clone().unwrap_or_default())
    }

    async fn read_packet(&mut self) -> Result<Packet> {
        self.prepare().await?;
        let streams = self.streams.as_deref().unwrap_or_default();
        let ctx = FilterContext {
            streams,
            video_index: self.video_index,
            audio_index: self.audio_index,
        };

        loop {
            let mut packet = self.demuxer.read_packet().await?;
            if self.filters.apply(&mut packet, &ctx).await? {
                return Ok(packet);
            }
            tracing::trace!(
                stream = packet.stream_index,
                time_ms = packet.time.as_millis() as u64,
                "Packet dropped by filter"
            );
        }
    }
}
