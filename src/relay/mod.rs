//! Live relay
//!
//! Each published path owns a [`Queue`](crate::queue::Queue). Players attach
//! a cursor to it, positioned and filtered according to their
//! [`PlayOptions`]:
//!
//! ```text
//! publisher ──► Publisher ──► Queue ──┬──► Cursor ──► FilterDemuxer ──► player
//!                                     ├──► Cursor ──► FilterDemuxer ──► player
//!                                     └──► ...
//! ```

pub mod options;
pub mod store;

pub use options::{parse_duration, PlayOptions, PublishOptions};
pub use store::{Publisher, Relay};
