//! Publisher/subscriber packet queue
//!
//! One writer feeds many independent cursors at different playback offsets.
//!
//! # Architecture
//!
//! ```text
//!                       Queue (Arc<Shared>)
//!                 ┌──────────────────────────┐
//!   write_packet  │ RwLock<QueueState> {     │
//!  ─────────────► │   buf: PacketBuf,        │
//!                 │   gop_count, streams,    │
//!                 │ }                        │
//!                 │ Notify (wake all)        │
//!                 └────────────┬─────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//!     Cursor(Latest)     Cursor(Oldest)    Cursor(DelayedTime)
//!     read_packet()      read_packet()     read_packet()
//! ```
//!
//! Retention is GOP based: every video keyframe bumps a counter, and packets
//! are evicted from the head while the counter is at or above
//! `max_gop_count`, never dropping the last packet. Readers never throttle
//! the writer; a cursor that falls behind is moved up to the head.

pub mod buf;
pub mod config;
pub mod cursor;
pub mod store;

pub use buf::{BufPos, PacketBuf};
pub use config::QueueConfig;
pub use cursor::{Cursor, CursorStart};
pub use store::{Queue, QueueStats};
