//! In-process relay with a synthetic publisher and two players
//!
//! Run with: cargo run --example relay_fanout
//!
//! The publisher produces a 25 fps video stream with a keyframe every
//! second plus 20ms audio packets. One player joins live, the other two
//! GOPs behind and waiting for a keyframe. Set `RUST_LOG=av_relay=trace`
//! to watch eviction and filter decisions.

use std::time::Duration;

use av_relay::media::{AudioCodecData, CodecData, CodecType, Demuxer, Muxer, Packet, VideoCodecData};
use av_relay::relay::{PlayOptions, PublishOptions, Relay};
use bytes::Bytes;

const FRAME: Duration = Duration::from_millis(40);

fn streams() -> Vec<CodecData> {
    vec![
        VideoCodecData::new(CodecType::H264, 1280, 720).into(),
        AudioCodecData::new(CodecType::Aac, 44100, 2).into(),
    ]
}

async fn play(relay: Relay, name: &'static str, query: &'static str) -> av_relay::Result<()> {
    let options = PlayOptions::from_query(query)?;
    let Some(mut player) = relay.play("/live/demo", &options).await else {
        println!("[{}] channel not found", name);
        return Ok(());
    };

    let mut video = 0;
    let mut audio = 0;
    loop {
        match player.read_packet().await {
            Ok(packet) if packet.stream_index == 0 => {
                video += 1;
                if packet.is_keyframe {
                    println!("[{}] keyframe at {:?}", name, packet.time);
                }
            }
            Ok(_) => audio += 1,
            Err(e) if e.is_end_of_stream() => break,
            Err(e) => return Err(e),
        }
    }

    println!("[{}] done: video={} audio={}", name, video, audio);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("av_relay=info".parse()?),
        )
        .init();

    let relay = Relay::new();
    let mut publisher = relay
        .publish("/live/demo", &PublishOptions::from_query("cachegop=3")?)
        .await?;
    publisher.write_header(&streams()).await?;

    let mut players = Vec::new();
    for i in 0..150u32 {
        let time = FRAME * i;
        let video = if i % 25 == 0 {
            Packet::keyframe(0, time, Bytes::from_static(b"idr"))
        } else {
            Packet::new(0, time, Bytes::from_static(b"p"))
        };
        publisher.write_packet(video).await?;
        publisher
            .write_packet(Packet::new(1, time, Bytes::from_static(b"aac")))
            .await?;
        publisher
            .write_packet(Packet::new(1, time + FRAME / 2, Bytes::from_static(b"aac")))
            .await?;

        if i == 60 {
            players.push(tokio::spawn(play(relay.clone(), "live", "")));
            players.push(tokio::spawn(play(relay.clone(), "delayed", "delaygop=2&waitkey=1")));
        }

        tokio::time::sleep(FRAME).await;
    }

    publisher.finish().await;
    for player in players {
        player.await??;
    }

    println!("Channels left: {}", relay.channel_count().await);
    Ok(())
}
