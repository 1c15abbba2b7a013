//! Queue readers
//!
//! A [`Cursor`] is a private read position into a [`Queue`](super::Queue).
//! Its starting point is chosen by a [`CursorStart`] strategy, resolved
//! against the buffer on the first read.

use std::sync::Arc;
use std::time::Duration;

use super::buf::{BufPos, PacketBuf};
use super::store::Shared;
use crate::error::{Error, Result};
use crate::media::{CodecData, Demuxer, Packet};

/// Where a new cursor starts reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStart {
    /// Only packets written after the first read
    Latest,
    /// Everything currently buffered
    Oldest,
    /// Earliest packet within this time gap of the newest packet
    DelayedTime(Duration),
    /// The n-th most recent video keyframe
    DelayedGopCount(usize),
}

impl CursorStart {
    /// Resolve to a buffer position; may fall outside `[head, tail]`
    pub fn resolve(&self, buf: &PacketBuf, video_index: Option<usize>) -> BufPos {
        match *self {
            CursorStart::Latest => buf.tail(),
            CursorStart::Oldest => buf.head(),
            CursorStart::DelayedTime(delay) => {
                let mut pos = buf.tail().prev();
                let Some(end) = buf.get(pos).map(|p| p.time) else {
                    return buf.tail();
                };
                while let Some(packet) = buf.get(pos) {
                    if end.saturating_sub(packet.time) > delay {
                        break;
                    }
                    pos = pos.prev();
                }
                pos.next()
            }
            CursorStart::DelayedGopCount(n) => {
                let mut pos = buf.tail().prev();
                let Some(video_index) = video_index else {
                    return pos;
                };
                let mut gops = 0;
                while gops < n {
                    let Some(packet) = buf.get(pos) else {
                        break;
                    };
                    if packet.is_keyframe && packet.stream_index == video_index {
                        gops += 1;
                        if gops == n {
                            break;
                        }
                    }
                    pos = pos.prev();
                }
                pos
            }
        }
    }
}

/// Independent, non-consuming reader of a queue
pub struct Cursor {
    shared: Arc<Shared>,
    start: CursorStart,
    pos: Option<BufPos>,
}

impl Cursor {
    pub(super) fn new(shared: Arc<Shared>, start: CursorStart) -> Self {
        Self {
            shared,
            start,
            pos: None,
        }
    }

    /// Start strategy of this cursor
    pub fn start(&self) -> CursorStart {
        self.start
    }

    /// Next position to read, once resolved
    pub fn position(&self) -> Option<BufPos> {
        self.pos
    }

    /// Wait for the stream header
    ///
    /// Fails with end-of-stream if the queue closes without a header.
    pub async fn streams(&self) -> Result<Vec<CodecData>> {
        loop {
            let notified = self.shared.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let state = self.shared.state.read().await;
                if let Some(streams) = &state.streams {
                    return Ok(streams.clone());
                }
                if state.closed {
                    return Err(Error::EndOfStream);
                }
            }

            notified.await;
        }
    }

    /// Read the next packet, waiting for the writer if none is buffered
    ///
    /// A cursor that fell behind eviction skips ahead to the oldest
    /// buffered packet. After the queue closes, buffered packets are still
    /// returned; end-of-stream is reported once the cursor reaches the tail.
    pub async fn read_packet(&mut self) -> Result<Packet> {
        loop {
            let notified = self.shared.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let state = self.shared.state.read().await;
                let pos = match self.pos {
                    Some(pos) => pos,
                    None => self.start.resolve(&state.buf, state.video_index),
                };

                let clamped = state.buf.clamp(pos);
                if clamped > pos && self.pos.is_some() {
                    tracing::debug!(
                        skipped = clamped.0 - pos.0,
                        head = clamped.0,
                        "Cursor fell behind eviction, skipping ahead"
                    );
                }

                if let Some(packet) = state.buf.get(clamped) {
                    let packet = packet.clone();
                    self.pos = Some(clamped.next());
                    return Ok(packet);
                }

                self.pos = Some(clamped);
                if state.closed {
                    return Err(Error::EndOfStream);
                }
            }

            notified.await;
        }
    }
}

impl Demuxer for Cursor {
    async fn streams(&mut self) -> Result<Vec<CodecData>> {
        Cursor::streams(self).await
    }

    async fn read_packet(&mut self) -> Result<Packet> {
        Cursor::read_packet(self).await
    }
}
