//! One-shot attachment content streams.
//!
//! Content is forward-only and read at most once, by at most one consumer.
//! The payload is never buffered wholesale by this crate; whatever reader a
//! `Content` wraps is pulled on demand.

use std::fmt;
use std::io::{self, Cursor, Read};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{AttachmentError, Result};

/// An owned, forward-only byte stream holding an attachment's payload.
///
/// A `Content` is exclusively owned by whichever attachment (or caller)
/// currently holds it. Once read to the end or taken, it is "spent" and
/// further reads yield no bytes. The `description` identifies the stream in
/// serialization error messages.
pub struct Content {
    reader: Option<Box<dyn Read + Send>>,
    description: String,
}

impl Content {
    /// Wrap an arbitrary reader. `description` identifies the stream when a
    /// read fails during marshaling (e.g. `"file foo.txt"`).
    pub fn from_reader(reader: impl Read + Send + 'static, description: impl Into<String>) -> Self {
        Self {
            reader: Some(Box::new(reader)),
            description: description.into(),
        }
    }

    /// Content backed by an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            reader: Some(Box::new(Cursor::new(bytes.into()))),
            description: "in-memory bytes".to_string(),
        }
    }

    /// Decode a base64 payload eagerly. Malformed input is rejected here so
    /// wire decoding can report it against the `data` field.
    pub fn from_base64(data: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(data)
            .map_err(|e| AttachmentError::deserialization("data", e.to_string()))?;
        Ok(Self {
            reader: Some(Box::new(Cursor::new(bytes))),
            description: "base64 data".to_string(),
        })
    }

    /// An explicitly-empty stream, used for stub and follows attachments
    /// whose payload does not travel in the JSON body.
    pub fn empty() -> Self {
        Self {
            reader: None,
            description: "empty".to_string(),
        }
    }

    /// Human-readable identity of this stream, used in error messages.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// `true` once the underlying reader has been taken or never existed.
    /// A spent stream reads as empty; it never errors.
    pub fn is_spent(&self) -> bool {
        self.reader.is_none()
    }

    /// Read the remaining bytes, consuming the stream.
    pub fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut reader) = self.reader.take() {
            reader.read_to_end(&mut buf)?;
        }
        Ok(buf)
    }

    /// Transfer the underlying reader out, leaving this stream spent.
    pub fn take_reader(&mut self) -> Option<Box<dyn Read + Send>> {
        self.reader.take()
    }
}

impl Read for Content {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.reader.as_mut() {
            Some(reader) => {
                let n = reader.read(buf)?;
                if n == 0 && !buf.is_empty() {
                    // Fully drained; drop the reader so resources release early.
                    self.reader = None;
                }
                Ok(n)
            }
            None => Ok(0),
        }
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Content")
            .field("description", &self.description)
            .field("spent", &self.is_spent())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_all_consumes() {
        let mut content = Content::from_bytes(b"hello".to_vec());
        assert!(!content.is_spent());
        assert_eq!(content.read_all().unwrap(), b"hello");
        assert!(content.is_spent());
        assert_eq!(content.read_all().unwrap(), b"");
    }

    #[test]
    fn test_spent_stream_reads_empty() {
        let mut content = Content::empty();
        let mut buf = [0u8; 8];
        assert_eq!(content.read(&mut buf).unwrap(), 0);
        assert!(content.is_spent());
    }

    #[test]
    fn test_from_base64_round_trip() {
        let mut content = Content::from_base64("dGVzdCBhdHRhY2htZW50Cg==").unwrap();
        assert_eq!(content.read_all().unwrap(), b"test attachment\n");
    }

    #[test]
    fn test_from_base64_rejects_garbage() {
        let err = Content::from_base64("not!valid!base64").unwrap_err();
        assert!(err.to_string().contains("data"));
    }

    #[test]
    fn test_take_reader_transfers_ownership() {
        let mut content = Content::from_bytes(b"payload".to_vec());
        let mut reader = content.take_reader().unwrap();
        assert!(content.is_spent());
        assert!(content.take_reader().is_none());
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"payload");
    }

    #[test]
    fn test_drained_reader_is_released() {
        let mut content = Content::from_bytes(b"ab".to_vec());
        let mut buf = [0u8; 8];
        assert_eq!(content.read(&mut buf).unwrap(), 2);
        assert_eq!(content.read(&mut buf).unwrap(), 0);
        assert!(content.is_spent());
    }
}
