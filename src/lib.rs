//! Live audio/video packet relay
//!
//! Building blocks for fanning out a live stream to many players and for
//! converting a stream between audio codecs:
//!
//! - [`queue`]: single-writer, multi-reader packet queue with GOP-based
//!   retention and independently positioned cursors
//! - [`filter`]: per-subscriber packet filters (keyframe gating, timestamp
//!   repair, A/V sync, real-time pacing, frame dropping)
//! - [`transcode`]: audio decode/re-encode with timestamp re-mapping
//! - [`relay`]: path-keyed channels with URL-query options
//! - [`convert`]: demuxer-to-muxer conversion driver
//!
//! Containers, network protocols and codec implementations are supplied by
//! the caller through the [`media::Demuxer`], [`media::Muxer`],
//! [`media::AudioDecoder`] and [`media::AudioEncoder`] traits.
//!
//! # Architecture
//!
//! ```text
//! producer ──► Queue::write_packet ──► PacketBuf (GOP-trimmed)
//!                                          │
//!                  ┌───────────────────────┼───────────────────────┐
//!                  ▼                       ▼                       ▼
//!               Cursor                  Cursor                  Cursor
//!                  │                       │                       │
//!           FilterDemuxer           FilterDemuxer           FilterDemuxer
//!                  │                       │                       │
//!                  ▼                       ▼                       ▼
//!              consumer                consumer                consumer
//! ```
//!
//! # Example
//!
//! ```no_run
//! use av_relay::media::{copy_file, Demuxer, Muxer};
//! use av_relay::relay::{PlayOptions, PublishOptions, Relay};
//!
//! async fn serve<S, P>(relay: Relay, mut source: S, mut player: P) -> av_relay::Result<()>
//! where
//!     S: Demuxer,
//!     P: Muxer + 'static,
//! {
//!     let mut publisher = relay.publish("/live/cam", &PublishOptions::from_query("cachegop=1")?).await?;
//!     let options = PlayOptions::from_query("delaytime=5s&waitkey=1")?;
//!     if let Some(mut feed) = relay.play("/live/cam", &options).await {
//!         tokio::spawn(async move { copy_file(&mut player, &mut feed).await });
//!     }
//!     copy_file(&mut publisher, &mut source).await?;
//!     publisher.finish().await;
//!     Ok(())
//! }
//! ```

pub mod convert;
pub mod error;
pub mod filter;
pub mod media;
pub mod queue;
pub mod relay;
pub mod transcode;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use media::{CodecData, Packet};
pub use queue::{Cursor, CursorStart, Queue, QueueConfig};
pub use relay::{PlayOptions, PublishOptions, Relay};
