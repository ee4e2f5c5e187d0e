//! Newline framing for the TCP transport.
//!
//! Unlike `LinesCodec`, frames are raw bytes (no UTF-8 check) and an
//! over-long line is reported as [`LineFrame::Oversized`] instead of an
//! error, so the connection survives both.

use std::io;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// One decoded request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineFrame {
    /// Line contents without the trailing `\n` / `\r\n`.
    Line(Bytes),
    /// A line longer than the limit; its bytes were discarded.
    Oversized,
}

/// Splits the inbound stream on `\n` and writes each outbound message
/// followed by `\n`.
#[derive(Debug, Clone)]
pub struct RequestLineCodec {
    max_length: usize,
    /// Where the next newline scan starts.
    next_index: usize,
    /// Set while skipping the rest of an over-long line.
    discarding: bool,
}

impl RequestLineCodec {
    /// Creates a codec accepting lines of at most `max_length` bytes,
    /// terminator excluded.
    #[must_use]
    pub const fn new(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
            discarding: false,
        }
    }
}

impl Decoder for RequestLineCodec {
    type Item = LineFrame;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<LineFrame>, io::Error> {
        loop {
            let scan_end = buf.len().min(self.max_length.saturating_add(1));
            let newline = buf
                .get(self.next_index..scan_end)
                .and_then(|window| window.iter().position(|b| *b == b'\n'))
                .map(|offset| self.next_index + offset);

            match (self.discarding, newline) {
                (true, Some(end)) => {
                    buf.advance(end + 1);
                    self.discarding = false;
                    self.next_index = 0;
                    return Ok(Some(LineFrame::Oversized));
                }
                (true, None) => {
                    buf.advance(scan_end);
                    self.next_index = 0;
                    if buf.is_empty() {
                        return Ok(None);
                    }
                }
                (false, Some(end)) => {
                    self.next_index = 0;
                    let mut line = buf.split_to(end + 1);
                    line.truncate(end);
                    return Ok(Some(LineFrame::Line(strip_cr(line))));
                }
                (false, None) if buf.len() > self.max_length => {
                    self.discarding = true;
                }
                (false, None) => {
                    self.next_index = scan_end;
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<LineFrame>, io::Error> {
        if let Some(frame) = self.decode(buf)? {
            return Ok(Some(frame));
        }
        self.next_index = 0;
        if buf.is_empty() && !self.discarding {
            return Ok(None);
        }
        if self.discarding {
            buf.clear();
            self.discarding = false;
            return Ok(Some(LineFrame::Oversized));
        }
        // Unterminated final line.
        Ok(Some(LineFrame::Line(strip_cr(buf.split()))))
    }
}

impl Encoder<String> for RequestLineCodec {
    type Error = io::Error;

    fn encode(&mut self, line: String, buf: &mut BytesMut) -> Result<(), io::Error> {
        buf.reserve(line.len() + 1);
        buf.put_slice(line.as_bytes());
        buf.put_u8(b'\n');
        Ok(())
    }
}

fn strip_cr(mut line: BytesMut) -> Bytes {
    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }
    line.freeze()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut RequestLineCodec, input: &[u8]) -> Vec<LineFrame> {
        let mut buf = BytesMut::from(input);
        let mut frames = Vec::new();
        loop {
            match codec.decode(&mut buf) {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) => break,
                Err(err) => panic!("decode failed: {err}"),
            }
        }
        frames
    }

    fn line(text: &[u8]) -> LineFrame {
        LineFrame::Line(Bytes::copy_from_slice(text))
    }

    #[test]
    fn splits_on_newline_and_strips_carriage_return() {
        let mut codec = RequestLineCodec::new(64);
        let mut buf = BytesMut::from(b"one\r\ntwo\n\nthr".as_slice());
        let mut frames = Vec::new();
        while let Ok(Some(frame)) = codec.decode(&mut buf) {
            frames.push(frame);
        }
        assert_eq!(frames, vec![line(b"one"), line(b"two"), line(b"")]);

        let Ok(eof) = codec.decode_eof(&mut buf) else {
            panic!("eof decode failed");
        };
        assert_eq!(eof, Some(line(b"thr")));
        assert!(matches!(codec.decode_eof(&mut buf), Ok(None)));
    }

    #[test]
    fn invalid_utf8_is_passed_through() {
        let mut codec = RequestLineCodec::new(64);
        let frames = decode_all(&mut codec, b"{\"command\":\"\xff\"}\n");
        assert_eq!(frames, vec![line(b"{\"command\":\"\xff\"}")]);
    }

    #[test]
    fn oversized_line_is_skipped_and_framing_recovers() {
        let mut codec = RequestLineCodec::new(8);
        let frames = decode_all(&mut codec, b"0123456789abcdef\nok\n");
        assert_eq!(frames, vec![LineFrame::Oversized, line(b"ok")]);
    }

    #[test]
    fn oversized_line_split_across_reads() {
        let mut codec = RequestLineCodec::new(4);
        let mut buf = BytesMut::from(b"abcdefgh".as_slice());
        assert!(matches!(codec.decode(&mut buf), Ok(None)));
        assert!(buf.is_empty());

        buf.extend_from_slice(b"ijk\nping\n");
        let Ok(Some(first)) = codec.decode(&mut buf) else {
            panic!("expected a frame");
        };
        assert_eq!(first, LineFrame::Oversized);
        let Ok(Some(second)) = codec.decode(&mut buf) else {
            panic!("expected a frame");
        };
        assert_eq!(second, line(b"ping"));
    }

    #[test]
    fn line_at_exact_limit_is_accepted() {
        let mut codec = RequestLineCodec::new(4);
        let frames = decode_all(&mut codec, b"abcd\n");
        assert_eq!(frames, vec![line(b"abcd")]);
    }

    #[test]
    fn encode_appends_newline() {
        let mut codec = RequestLineCodec::new(4);
        let mut buf = BytesMut::new();
        let Ok(()) = codec.encode("{}".to_string(), &mut buf) else {
            panic!("encode failed");
        };
        assert_eq!(buf.as_ref(), b"{}\n");
    }
}
