//! Single-writer, multi-reader packet queue
//!
//! The writer appends packets with [`Queue::write_packet`]; any number of
//! [`Cursor`]s read them independently without consuming anything. Old
//! packets are evicted GOP by GOP, and a reader that falls behind eviction
//! is fast-forwarded to the oldest packet still buffered. The writer never
//! waits for readers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, RwLock};

use super::buf::{BufPos, PacketBuf};
use super::config::QueueConfig;
use super::cursor::{Cursor, CursorStart};
use crate::error::Result;
use crate::media::{CodecData, Muxer, Packet};

/// State guarded by the queue lock
#[derive(Debug)]
pub(super) struct QueueState {
    pub(super) buf: PacketBuf,
    pub(super) streams: Option<Vec<CodecData>>,
    pub(super) video_index: Option<usize>,
    pub(super) gop_count: usize,
    pub(super) max_gop_count: usize,
    pub(super) closed: bool,
}

impl QueueState {
    fn is_video_keyframe(&self, packet: &Packet) -> bool {
        packet.is_keyframe && Some(packet.stream_index) == self.video_index
    }

    /// Drop packets from the head until fewer than `max_gop_count` GOPs
    /// remain, never emptying the buffer. Returns the number evicted.
    fn evict(&mut self) -> usize {
        let mut evicted = 0;
        while self.gop_count >= self.max_gop_count && self.buf.count() > 1 {
            let Some(old) = self.buf.pop() else {
                break;
            };
            evicted += 1;
            if self.is_video_keyframe(&old) {
                self.gop_count = self.gop_count.saturating_sub(1);
            }
        }
        evicted
    }
}

pub(super) struct Shared {
    pub(super) state: RwLock<QueueState>,
    /// Woken after every state change; readers re-check their predicate
    pub(super) notify: Notify,
}

/// Snapshot of queue occupancy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStats {
    /// Number of buffered packets
    pub packet_count: usize,
    /// Number of video keyframes buffered
    pub gop_count: usize,
    /// Retention target
    pub max_gop_count: usize,
    /// Oldest valid position
    pub head: BufPos,
    /// One past the newest position
    pub tail: BufPos,
    /// Whether a header was written
    pub has_header: bool,
    /// Whether the queue was closed
    pub closed: bool,
}

/// One publisher, many subscribers packet queue
///
/// Cloning a `Queue` yields another handle to the same buffer.
#[derive(Clone)]
pub struct Queue {
    shared: Arc<Shared>,
}

impl Queue {
    /// Create an empty queue with default configuration
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    /// Create an empty queue with custom configuration
    pub fn with_config(config: QueueConfig) -> Self {
        let state = QueueState {
            buf: PacketBuf::new(),
            streams: None,
            video_index: None,
            gop_count: 0,
            max_gop_count: config.max_gop_count,
            closed: false,
        };

        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(state),
                notify: Notify::new(),
            }),
        }
    }

    /// Check if two handles refer to the same queue
    pub fn ptr_eq(&self, other: &Queue) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Change the retention target; applies on the next write
    pub async fn set_max_gop_count(&self, n: usize) {
        self.shared.state.write().await.max_gop_count = n;
    }

    /// Store the stream descriptors and wake readers waiting for them
    ///
    /// Call at most once per session.
    pub async fn write_header(&self, streams: &[CodecData]) {
        {
            let mut state = self.shared.state.write().await;
            state.video_index = streams.iter().rposition(CodecData::is_video);
            state.streams = Some(streams.to_vec());

            tracing::info!(
                streams = streams.len(),
                video_index = ?state.video_index,
                "Queue header written"
            );
        }
        self.shared.notify.notify_waiters();
    }

    /// Append a packet, evicting old GOPs as needed
    pub async fn write_packet(&self, packet: Packet) {
        {
            let mut state = self.shared.state.write().await;
            if state.is_video_keyframe(&packet) {
                state.gop_count += 1;
            }
            state.buf.push(packet);

            let evicted = state.evict();
            if evicted > 0 {
                tracing::trace!(
                    evicted = evicted,
                    buffered = state.buf.count(),
                    gop_count = state.gop_count,
                    "Evicted old packets"
                );
            }
        }
        self.shared.notify.notify_waiters();
    }

    /// Nothing to finalize; present for symmetry with other muxers
    pub async fn write_trailer(&self) {}

    /// Close the queue; every cursor read past the buffered data then
    /// reports end-of-stream
    pub async fn close(&self) {
        {
            let mut state = self.shared.state.write().await;
            if !state.closed {
                state.closed = true;
                tracing::info!(buffered = state.buf.count(), "Queue closed");
            }
        }
        self.shared.notify.notify_waiters();
    }

    /// Get a snapshot of queue occupancy
    pub async fn stats(&self) -> QueueStats {
        let state = self.shared.state.read().await;
        QueueStats {
            packet_count: state.buf.count(),
            gop_count: state.gop_count,
            max_gop_count: state.max_gop_count,
            head: state.buf.head(),
            tail: state.buf.tail(),
            has_header: state.streams.is_some(),
            closed: state.closed,
        }
    }

    /// Copy of every buffered packet, oldest first
    pub async fn buffered(&self) -> Vec<Packet> {
        self.shared.state.read().await.buf.iter().cloned().collect()
    }

    /// Cursor that starts at the given position strategy
    pub fn cursor(&self, start: CursorStart) -> Cursor {
        Cursor::new(Arc::clone(&self.shared), start)
    }

    /// Cursor that only sees packets written after its first read
    pub fn latest(&self) -> Cursor {
        self.cursor(CursorStart::Latest)
    }

    /// Cursor that replays everything currently buffered
    pub fn oldest(&self) -> Cursor {
        self.cursor(CursorStart::Oldest)
    }

    /// Cursor that starts `delay` behind the newest packet
    pub fn delayed_time(&self, delay: Duration) -> Cursor {
        self.cursor(CursorStart::DelayedTime(delay))
    }

    /// Cursor that starts `n` GOPs behind the newest packet
    pub fn delayed_gop_count(&self, n: usize) -> Cursor {
        self.cursor(CursorStart::DelayedGopCount(n))
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

impl Muxer for Queue {
    async fn write_header(&mut self, streams: &[CodecData]) -> Result<()> {
        Queue::write_header(self, streams).await;
        Ok(())
    }

    async fn write_packet(&mut self, packet: Packet) -> Result<()> {
        Queue::write_packet(self, packet).await;
        Ok(())
    }

    async fn write_trailer(&mut self) -> Result<()> {
        Queue::write_trailer(self).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{audio, video, video_audio_streams, video_key};

    async fn queue_with_header(max_gop_count: usize) -> Queue {
        let queue = Queue::with_config(QueueConfig::default().max_gop_count(max_gop_count));
        queue.write_header(&video_audio_streams()).await;
        queue
    }

    fn times(packets: &[Packet]) -> Vec<(usize, u128, bool)> {
        packets
            .iter()
            .map(|p| (p.stream_index, p.time.as_millis(), p.is_keyframe))
            .collect()
    }

    #[tokio::test]
    async fn test_header_sets_video_index() {
        let queue = queue_with_header(2).await;
        let stats = queue.stats().await;

        assert!(stats.has_header);
        assert_eq!(stats.max_gop_count, 2);
        assert_eq!(stats.packet_count, 0);
    }

    #[tokio::test]
    async fn test_first_gop_evicted() {
        let queue = queue_with_header(1).await;

        queue.write_packet(video_key(0)).await;
        queue.write_packet(audio(0)).await;
        queue.write_packet(video(33)).await;
        queue.write_packet(video_key(66)).await;

        // Everything before the second keyframe is gone
        assert_eq!(times(&queue.buffered().await), vec![(0, 66, true)]);

        queue.write_packet(audio(66)).await;

        // Counter hit the limit again; degrade to the newest packet
        assert_eq!(times(&queue.buffered().await), vec![(1, 66, false)]);
        assert_eq!(queue.stats().await.gop_count, 0);
    }

    #[tokio::test]
    async fn test_retains_packets_below_limit() {
        let queue = queue_with_header(2).await;

        queue.write_packet(video_key(0)).await;
        queue.write_packet(audio(0)).await;
        queue.write_packet(video(33)).await;
        queue.write_packet(audio(40)).await;

        let stats = queue.stats().await;
        assert_eq!(stats.packet_count, 4);
        assert_eq!(stats.gop_count, 1);
    }

    #[tokio::test]
    async fn test_eviction_invariant_holds_after_every_write() {
        let queue = queue_with_header(2).await;

        for i in 0..200u64 {
            let packet = match i % 7 {
                0 => video_key(i * 10),
                1 | 4 => audio(i * 10),
                _ => video(i * 10),
            };
            queue.write_packet(packet).await;

            let stats = queue.stats().await;
            assert!(stats.gop_count < stats.max_gop_count || stats.packet_count == 1);
            assert!(stats.packet_count >= 1);
        }
    }

    #[tokio::test]
    async fn test_no_gop_counting_without_header() {
        let queue = Queue::with_config(QueueConfig::default().max_gop_count(1));

        queue.write_packet(video_key(0)).await;
        queue.write_packet(video_key(33)).await;

        let stats = queue.stats().await;
        assert_eq!(stats.gop_count, 0);
        assert_eq!(stats.packet_count, 2);
    }

    #[tokio::test]
    async fn test_set_max_gop_count_applies_on_next_write() {
        let queue = queue_with_header(3).await;

        queue.write_packet(video_key(0)).await;
        queue.write_packet(video(33)).await;
        queue.write_packet(video_key(66)).await;
        assert_eq!(queue.stats().await.packet_count, 3);

        queue.set_max_gop_count(1).await;
        assert_eq!(queue.stats().await.packet_count, 3);

        queue.write_packet(video(99)).await;
        assert_eq!(times(&queue.buffered().await), vec![(0, 99, false)]);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let queue = queue_with_header(2).await;
        queue.close().await;
        queue.close().await;

        assert!(queue.stats().await.closed);
    }

    #[tokio::test]
    async fn test_queue_as_muxer() {
        let mut queue = Queue::new();

        Muxer::write_header(&mut queue, &video_audio_streams())
            .await
            .unwrap();
        Muxer::write_packet(&mut queue, video_key(0)).await.unwrap();
        Muxer::write_trailer(&mut queue).await.unwrap();

        assert_eq!(queue.stats().await.packet_count, 1);
    }
}
