//! Transcoding producer adapter

use std::collections::VecDeque;

use super::transcoder::{TranscodeOptions, Transcoder};
use crate::error::Result;
use crate::media::{CodecData, Demuxer, Packet};

/// Demuxer that transcodes the packets of another demuxer
///
/// The transcoder is negotiated on first use. Output packets produced from
/// one input packet are buffered and handed out one per `read_packet`.
pub struct TranscodeDemuxer<D> {
    demuxer: D,
    options: TranscodeOptions,
    transcoder: Option<Transcoder>,
    pending: VecDeque<Packet>,
}

impl<D: Demuxer> TranscodeDemuxer<D> {
    pub fn new(demuxer: D, options: TranscodeOptions) -> Self {
        Self {
            demuxer,
            options,
            transcoder: None,
            pending: VecDeque::new(),
        }
    }

    /// Get a reference to the wrapped demuxer
    pub fn get_ref(&self) -> &D {
        &self.demuxer
    }

    /// Release codecs; later reads fail
    pub fn close(&mut self) {
        if let Some(transcoder) = self.transcoder.as_mut() {
            transcoder.close();
        }
        self.pending.clear();
    }

    async fn prepare(&mut self) -> Result<&mut Transcoder> {
        let transcoder = match self.transcoder.take() {
            Some(transcoder) => transcoder,
            None => {
                let streams = self.demuxer.streams().await?;
                Transcoder::new(&streams, &mut self.options)?
            }
        };
        Ok(self.transcoder.insert(transcoder))
    }
}

impl<D: Demuxer> Demuxer for TranscodeDemuxer<D> {
    async fn streams(&mut self) -> Result<Vec<CodecData>> {
        Ok(self.prepare().await?.streams())
    }

    async fn read_packet(&mut self) -> Result<Packet> {
        self.prepare().await?;
        loop {
            if let Some(packet) = self.pending.pop_front() {
                return Ok(packet);
            }
            let packet = self.demuxer.read_packet().await?;
            let out = self.prepare().await?.transcode(packet)?;
            self.pending.extend(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use bytes::Bytes;

    use super::*;
    use crate::error::Error;
    use crate::media::AudioCodecData;
    use crate::testing::{alaw, h264, speex, video, video_key, FakeDecoder, FakeEncoder, VecDemuxer};
    use crate::transcode::AudioCodecPair;

    fn options(decoder: FakeDecoder, encoder: FakeEncoder) -> TranscodeOptions {
        let mut pair = Some(AudioCodecPair::new(decoder, encoder));
        TranscodeOptions::new().finder(
            move |_: &AudioCodecData, _: usize| -> Result<Option<AudioCodecPair>> {
                Ok(pair.take())
            },
        )
    }

    fn speex_packet(time_ms: u64) -> Packet {
        Packet::new(1, Duration::from_millis(time_ms), Bytes::from_static(&[0u8; 38]))
    }

    async fn drain<D: Demuxer>(demuxer: &mut D) -> Vec<(usize, u128)> {
        let mut out = Vec::new();
        loop {
            match demuxer.read_packet().await {
                Ok(p) => out.push((p.stream_index, p.time.as_millis())),
                Err(Error::EndOfStream) => return out,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
    }

    #[tokio::test]
    async fn test_buffered_outputs_returned_in_order() {
        let source = VecDemuxer::new(
            vec![h264(), speex().into()],
            vec![video_key(0), speex_packet(0), video(20), speex_packet(20)],
        );
        let mut demuxer = TranscodeDemuxer::new(
            source,
            options(FakeDecoder::new(160, 1), FakeEncoder::new(80)),
        );

        assert_eq!(demuxer.streams().await.unwrap(), vec![h264(), alaw().into()]);
        assert_eq!(
            drain(&mut demuxer).await,
            vec![(0, 0), (1, 0), (1, 10), (0, 20), (1, 20), (1, 30)]
        );
        assert_eq!(demuxer.get_ref().streams_calls, 1);
    }

    #[tokio::test]
    async fn test_skips_inputs_without_output() {
        let source = VecDemuxer::new(
            vec![h264(), speex().into()],
            vec![speex_packet(0), speex_packet(20), speex_packet(40), speex_packet(60)],
        );
        // Two inputs per output packet
        let mut demuxer = TranscodeDemuxer::new(
            source,
            options(FakeDecoder::new(160, 1), FakeEncoder::new(320)),
        );

        assert_eq!(drain(&mut demuxer).await, vec![(1, 0), (1, 40)]);
    }

    #[tokio::test]
    async fn test_close_releases_codecs() {
        let decoder = FakeDecoder::new(160, 1);
        let closed = decoder.closed.clone();
        let source = VecDemuxer::new(vec![h264(), speex().into()], vec![speex_packet(0)]);
        let mut demuxer = TranscodeDemuxer::new(source, options(decoder, FakeEncoder::new(160)));
        demuxer.streams().await.unwrap();

        demuxer.close();
        assert!(closed.load(Ordering::SeqCst));
        assert!(matches!(
            demuxer.read_packet().await,
            Err(Error::InvalidStreamIndex(1))
        ));
    }
}
