use std::collections::VecDeque;
use std::io;

use tokio_util::bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

use crate::assembler::FrameAssembler;
use crate::message::Message;

/// A `tokio_util` decoder yielding SIP messages.
///
/// Framing faults never end the stream: they are logged and the faulty
/// bytes skipped.
///
/// # Examples
///
/// ```
/// use sipwire::transport::SipCodec;
/// use tokio_util::bytes::BytesMut;
/// use tokio_util::codec::Decoder;
///
/// let mut codec = SipCodec::default();
/// let mut src = BytesMut::from(&b"garbage\r\nSIP/2.0 200 OK\r\nContent-Length: 0\r\n\r\n"[..]);
///
/// let message = codec.decode(&mut src).unwrap().unwrap();
///
/// assert_eq!(message.response().unwrap().code(), 200);
/// assert!(src.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct SipCodec {
    assembler: FrameAssembler,
    ready: VecDeque<Message>,
}

impl SipCodec {
    /// Creates a codec around `assembler`.
    pub fn new(assembler: FrameAssembler) -> Self {
        Self {
            assembler,
            ready: VecDeque::new(),
        }
    }

    /// Returns the assembler, e.g. to give it back to a pool.
    pub fn into_inner(self) -> FrameAssembler {
        self.assembler
    }
}

impl Decoder for SipCodec {
    type Error = io::Error;
    type Item = Message;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while self.ready.is_empty() && !src.is_empty() {
            match self.assembler.feed(&src[..], &mut self.ready) {
                Ok(0) => break,
                Ok(consumed) => src.advance(consumed),
                Err(err) => {
                    tracing::warn!(parent: self.assembler.span(), "Framing fault: {}", err.fault);
                    if err.consumed == 0 {
                        break;
                    }
                    src.advance(err.consumed);
                }
            }
        }

        Ok(self.ready.pop_front())
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let message = self.decode(buf)?;

        if message.is_none() {
            if !buf.is_empty() {
                tracing::debug!(parent: self.assembler.span(), "Discarding {} bytes at end of stream", buf.len());
                buf.clear();
            }
            self.assembler.abandon();
        }

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use tokio_stream::StreamExt;
    use tokio_util::codec::FramedRead;

    use super::*;

    #[tokio::test]
    async fn test_framed_read_skips_faulty_bytes() {
        let input: &[u8] = b"OPTIONS sip:carol@chicago.com SIP/2.0\r\nContent-Length: 0\r\n\r\n\
            \r\n\
            not a start line\r\n\
            SIP/2.0 200 OK\r\nCSeq: 1 OPTIONS\r\nContent-Length: 2\r\n\r\nok\
            SIP/2.0 180 Ringing\r\nContent-Length: 10\r\n\r\ncut";
        let mut framed = FramedRead::new(input, SipCodec::default());

        let first = framed.next().await.unwrap().unwrap();
        assert!(first.is_request());

        let second = framed.next().await.unwrap().unwrap();
        assert_eq!(second.response().unwrap().code(), 200);
        assert_eq!(&second.body()[..], b"ok");

        // The truncated response is dropped at end of stream.
        assert!(framed.next().await.is_none());
    }

    #[test]
    fn test_decode_waits_for_more_bytes() {
        let mut codec = SipCodec::default();
        let mut src = BytesMut::from(&b"SIP/2.0 200 OK\r\nContent-Length: 0\r\n"[..]);

        assert!(codec.decode(&mut src).unwrap().is_none());
        // The last header line stays buffered until the next byte shows it is not folded.
        assert_eq!(&src[..], b"Content-Length: 0\r\n");

        src.extend_from_slice(b"\r\n");
        assert!(codec.decode(&mut src).unwrap().is_some());
        assert!(src.is_empty());
    }
}
