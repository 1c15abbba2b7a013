//! Channel registry
//!
//! Maps a path to the [`Queue`] of its live publisher. Subscribers look the
//! path up and get their own cursor and filter chain.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::options::{PlayOptions, PublishOptions};
use crate::error::{RelayError, Result};
use crate::filter::FilterDemuxer;
use crate::media::{CodecData, Muxer, Packet};
use crate::queue::{Cursor, Queue};

type Channels = Arc<RwLock<HashMap<String, Queue>>>;

/// Live relay: one publisher and any number of players per path
///
/// Thread-safe via `RwLock`; cloning yields another handle to the same
/// registry.
#[derive(Clone, Default)]
pub struct Relay {
    channels: Channels,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a channel for publishing
    ///
    /// Fails if the path already has a publisher.
    pub async fn publish(&self, path: &str, options: &PublishOptions) -> Result<Publisher> {
        let mut channels = self.channels.write().await;
        if channels.contains_key(path) {
            tracing::warn!(path = path, "Rejected second publisher");
            return Err(RelayError::AlreadyPublishing(path.to_string()).into());
        }

        let config = options.queue_config();
        tracing::info!(
            path = path,
            max_gop_count = config.max_gop_count,
            "Channel opened"
        );

        let queue = Queue::with_config(config);
        channels.insert(path.to_string(), queue.clone());

        Ok(Publisher {
            path: path.to_string(),
            queue,
            channels: Arc::clone(&self.channels),
            finished: false,
        })
    }

    /// Subscribe to a channel
    ///
    /// Returns `None` if nothing is published at `path`.
    pub async fn play(&self, path: &str, options: &PlayOptions) -> Option<FilterDemuxer<Cursor>> {
        let channels = self.channels.read().await;
        let queue = channels.get(path)?;

        let start = options.cursor_start();
        tracing::info!(path = path, start = ?start, "Player attached");

        Some(FilterDemuxer::new(queue.cursor(start), options.filters()))
    }

    /// Number of published channels
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }

    /// Check if a path is published
    pub async fn contains(&self, path: &str) -> bool {
        self.channels.read().await.contains_key(path)
    }
}

/// Write side of a published channel
///
/// Implements [`Muxer`], so a source can be copied straight in. Finishing
/// or dropping the publisher removes the channel and closes its queue;
/// players then drain what is buffered and see end-of-stream.
pub struct Publisher {
    path: String,
    queue: Queue,
    channels: Channels,
    finished: bool,
}

impl Publisher {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The channel queue
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Unregister the channel and close its queue
    pub async fn finish(mut self) {
        self.finished = true;
        release(&self.channels, &self.path, &self.queue).await;
    }
}

impl Muxer for Publisher {
    async fn write_header(&mut self, streams: &[CodecData]) -> Result<()> {
        self.queue.write_header(streams).await;
        Ok(())
    }

    async fn write_packet(&mut self, packet: Packet) -> Result<()> {
        self.queue.write_packet(packet).await;
        Ok(())
    }

    async fn write_trailer(&mut self) -> Result<()> {
        self.queue.write_trailer().await;
        Ok(())
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        let channels = Arc::clone(&self.channels);
        let path = std::mem::take(&mut self.path);
        let queue = self.queue.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { release(&channels, &path, &queue).await });
            }
            Err(_) => tracing::warn!(path = %path, "Publisher dropped outside a runtime"),
        }
    }
}

async fn release(channels: &Channels, path: &str, queue: &Queue) {
    {
        let mut channels = channels.write().await;
        // A later publisher may own the path by now
        if channels.get(path).is_some_and(|q| q.ptr_eq(queue)) {
            channels.remove(path);
        }
    }
    queue.close().await;
    tracing::info!(path = path, "Channel closed");
}
