//! Incremental base64 transcoding.
//!
//! Both directions operate chunk-at-a-time over arbitrary `Read`/`Write`
//! endpoints; the payload is never held in memory as a whole. The standard
//! alphabet (`+`, `/`, `=` padding) is used throughout, which also means the
//! encoded text never needs escaping inside a JSON string.

use std::io::{self, Read, Write};

use base64::engine::general_purpose::{GeneralPurpose, STANDARD};
use base64::read::DecoderReader;
use base64::write::EncoderWriter;

/// Streaming base64 encoder: bytes written in come out as base64 text on the
/// wrapped writer.
///
/// Call [`finish`](Self::finish) when done — the final quantum and padding
/// are not emitted until then.
pub struct Base64Writer<W: Write> {
    inner: EncoderWriter<'static, GeneralPurpose, W>,
}

impl<W: Write> Base64Writer<W> {
    /// Encode onto `out`.
    pub fn new(out: W) -> Self {
        Self {
            inner: EncoderWriter::new(out, &STANDARD),
        }
    }

    /// Flush the final partial quantum and padding, returning the wrapped
    /// writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.finish()
    }
}

impl<W: Write> Write for Base64Writer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Streaming base64 decoder: reads base64 text from the wrapped reader and
/// yields the decoded bytes on demand.
///
/// Malformed input surfaces as an `InvalidData` I/O error at the read that
/// encounters it.
pub struct Base64Reader<R: Read> {
    inner: DecoderReader<'static, GeneralPurpose, R>,
}

impl<R: Read> Base64Reader<R> {
    /// Decode from `input`.
    pub fn new(input: R) -> Self {
        Self {
            inner: DecoderReader::new(input, &STANDARD),
        }
    }
}

impl<R: Read> Read for Base64Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_encode_streaming() {
        let mut writer = Base64Writer::new(Vec::new());
        // Write in awkward chunk sizes to cross quantum boundaries.
        writer.write_all(b"test ").unwrap();
        writer.write_all(b"attachment\n").unwrap();
        let encoded = writer.finish().unwrap();
        assert_eq!(encoded, b"dGVzdCBhdHRhY2htZW50Cg==");
    }

    #[test]
    fn test_decode_streaming() {
        let mut reader = Base64Reader::new(Cursor::new("dGVzdCBhdHRhY2htZW50Cg=="));
        let mut decoded = Vec::new();
        reader.read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, b"test attachment\n");
    }

    #[test]
    fn test_decode_small_buffer() {
        let mut reader = Base64Reader::new(Cursor::new("aGVsbG8gd29ybGQ="));
        let mut out = Vec::new();
        let mut buf = [0u8; 3];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(out, b"hello world");
    }

    #[test]
    fn test_decode_malformed_errors() {
        let mut reader = Base64Reader::new(Cursor::new("!!!!"));
        let mut decoded = Vec::new();
        assert!(reader.read_to_end(&mut decoded).is_err());
    }

    #[test]
    fn test_encode_empty() {
        let writer = Base64Writer::new(Vec::new());
        let encoded = writer.finish().unwrap();
        assert!(encoded.is_empty());
    }
}
