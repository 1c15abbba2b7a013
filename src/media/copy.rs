//! Demuxer to muxer plumbing

use super::codec::CodecData;
use super::traits::{Demuxer, Muxer};
use crate::error::{Error, Result};

/// Forward the stream descriptors of `src` to `dst`
pub async fn copy_header<M: Muxer, D: Demuxer>(dst: &mut M, src: &mut D) -> Result<Vec<CodecData>> {
    let streams = src.streams().await?;
    dst.write_header(&streams).await?;
    Ok(streams)
}

/// Forward packets until `src` reports end-of-stream
///
/// Returns the number of packets copied. End-of-stream is success; any
/// other error aborts the copy.
pub async fn copy_packets<M: Muxer, D: Demuxer>(dst: &mut M, src: &mut D) -> Result<u64> {
    let mut count = 0;
    loop {
        let packet = match src.read_packet().await {
            Ok(packet) => packet,
            Err(Error::EndOfStream) => return Ok(count),
            Err(e) => return Err(e),
        };
        dst.write_packet(packet).await?;
        count += 1;
    }
}

/// Copy header, every packet and the trailer
pub async fn copy_file<M: Muxer, D: Demuxer>(dst: &mut M, src: &mut D) -> Result<u64> {
    copy_header(dst, src).await?;
    let count = copy_packets(dst, src).await?;
    dst.write_trailer().await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bytes::Bytes;

    use super::*;
    use crate::media::Packet;
    use crate::testing::{video_streams, VecDemuxer, VecMuxer};

    #[tokio::test]
    async fn test_copy_file() {
        let packets = vec![
            Packet::keyframe(0, Duration::ZERO, Bytes::from_static(&[1])),
            Packet::new(0, Duration::from_millis(33), Bytes::from_static(&[2])),
        ];
        let mut src = VecDemuxer::new(video_streams(), packets.clone());
        let mut dst = VecMuxer::default();

        let count = copy_file(&mut dst, &mut src).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(dst.streams, Some(video_streams()));
        assert_eq!(dst.packets, packets);
        assert!(dst.trailer_written);
    }

    #[tokio::test]
    async fn test_copy_propagates_errors() {
        let mut src = VecDemuxer::new(video_streams(), vec![]).fail_with("disk gone");
        let mut dst = VecMuxer::default();

        let err = copy_file(&mut dst, &mut src).await.unwrap_err();

        assert!(matches!(err, Error::Io(_)));
        assert!(!dst.trailer_written);
    }
}
