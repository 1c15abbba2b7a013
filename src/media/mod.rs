//! Media types shared by every stage of the relay
//!
//! This module provides:
//! - Packets and stream descriptors
//! - AAC AudioSpecificConfig parsing (for packet durations)
//! - Decoded audio frames
//! - Demuxer / Muxer / codec traits implemented by external collaborators
//! - Copy helpers between a demuxer and a muxer

pub mod aac;
pub mod codec;
pub mod copy;
pub mod frame;
pub mod packet;
pub mod traits;

pub use aac::AudioSpecificConfig;
pub use codec::{stream_indices, AudioCodecData, CodecData, CodecType, VideoCodecData};
pub use copy::{copy_file, copy_header, copy_packets};
pub use frame::{AudioFrame, SampleFormat};
pub use packet::Packet;
pub use traits::{AudioDecoder, AudioEncoder, Demuxer, Muxer};
