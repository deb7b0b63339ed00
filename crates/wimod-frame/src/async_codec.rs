use std::collections::VecDeque;

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::assembler::{ReceiveAssembler, ReceiveStats};
use crate::codec::{encode_frame, Frame};
use crate::error::FrameError;

/// `tokio_util` codec for HCI frames.
///
/// Decoding keeps the same per-link state as [`ReceiveAssembler`], so any
/// chunking the async reader produces yields the same frames.
#[derive(Debug, Default)]
pub struct HciCodec {
    assembler: ReceiveAssembler,
    ready: VecDeque<Frame>,
}

impl HciCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ReceiveStats {
        self.assembler.stats()
    }
}

impl Decoder for HciCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        while self.ready.is_empty() && !src.is_empty() {
            let ready = &mut self.ready;
            let consumed = self.assembler.receive(&src[..], |frame| ready.push_back(frame));
            if consumed == 0 {
                break;
            }
            src.advance(consumed);
        }
        Ok(self.ready.pop_front())
    }
}

impl Encoder<Frame> for HciCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_frame(frame.dst_id, frame.msg_id, &frame.payload, dst)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use tokio::io::AsyncWriteExt;
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;

    #[test]
    fn decode_across_buffer_refills() {
        let mut wire = BytesMut::new();
        encode_frame(1, 2, &[0x00], &mut wire).unwrap();
        encode_frame(1, 4, &[0xC0, 0xDB], &mut wire).unwrap();

        let mut codec = HciCodec::new();
        let mut src = BytesMut::new();
        let mut frames = Vec::new();
        for byte in wire.iter() {
            src.extend_from_slice(&[*byte]);
            while let Some(frame) = codec.decode(&mut src).unwrap() {
                frames.push(frame);
            }
        }

        assert_eq!(
            frames,
            vec![Frame::new(1, 2, vec![0x00]), Frame::new(1, 4, vec![0xC0, 0xDB])]
        );
        assert_eq!(codec.stats().frames, 2);
    }

    #[tokio::test]
    async fn framed_roundtrip_over_duplex() {
        let (host, module) = tokio::io::duplex(64);
        let mut sink = FramedWrite::new(host, HciCodec::new());
        let mut stream = FramedRead::new(module, HciCodec::new());

        // The escaped frames exceed the pipe buffer, so both sides must run.
        let write = async {
            sink.send(Frame::new(1, 1, Vec::new())).await.unwrap();
            sink.send(Frame::new(1, 4, vec![0xC0; 40])).await.unwrap();
        };
        let read = async {
            let ping = stream.next().await.unwrap().unwrap();
            let info = stream.next().await.unwrap().unwrap();
            (ping, info)
        };
        let ((), (ping, info)) = tokio::join!(write, read);

        assert_eq!(ping.key(), (1, 1));
        assert_eq!(info.payload.as_ref(), &[0xC0; 40]);
    }

    #[tokio::test]
    async fn framed_read_skips_noise_and_ends_cleanly() {
        let (mut host, module) = tokio::io::duplex(64);
        let mut stream = FramedRead::new(module, HciCodec::new());

        let mut wire = BytesMut::new();
        wire.extend_from_slice(&[0xC0, 0x01, 0xC0]);
        encode_frame(1, 2, &[0x00], &mut wire).unwrap();
        host.write_all(&wire).await.unwrap();
        drop(host);

        assert_eq!(stream.next().await.unwrap().unwrap().key(), (1, 2));
        assert!(stream.next().await.is_none());
        assert_eq!(stream.decoder().stats().runts, 1);
    }
}
