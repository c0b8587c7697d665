//! The single-attachment entity.
//!
//! An attachment is metadata plus an owned, lazily-read content stream. The
//! payload is only pulled when the attachment is marshaled inline or when
//! the caller reads the stream itself.

use std::io::{Read, Write};

use serde::{Deserialize, Deserializer};

use crate::codec::json;
use crate::content::Content;
use crate::error::Result;

/// A named binary/text payload associated with a document revision.
///
/// Exactly one of three wire representations is chosen when marshaling, in
/// priority order: stub, follows, inline data. See [`crate::codec::json`]
/// for the shapes.
///
/// The content stream is one-shot: it is consumed by an inline marshal or by
/// whoever takes it, and cannot be re-read afterwards.
#[derive(Debug, Default)]
pub struct Attachment {
    /// Filename, unique within the owning collection. Set explicitly for
    /// outbound attachments; assigned from the collection key on decode.
    pub filename: String,

    /// MIME content type (e.g. `"text/plain"`). Required on the wire.
    pub content_type: String,

    /// Declared length in bytes. Authoritative only for stub attachments.
    pub size: u64,

    /// Revision-position marker. Zero means unset and is omitted on the wire.
    pub rev_pos: u64,

    /// Reference-only representation: no content travels with this record.
    pub stub: bool,

    /// Content is delivered out-of-band (e.g. a later multipart section),
    /// not inline as base64.
    pub follows: bool,

    /// The payload stream. Present only while the attachment holds unread,
    /// not-yet-transferred data.
    pub content: Option<Content>,
}

impl Attachment {
    /// Construct an outbound inline attachment.
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: Content,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            content: Some(content),
            ..Self::default()
        }
    }

    /// Construct a stub (reference-only) attachment with a declared size.
    pub fn new_stub(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            size,
            stub: true,
            ..Self::default()
        }
    }

    /// Transfer the content stream out of this attachment.
    ///
    /// Ownership moves to the caller; the attachment no longer holds data
    /// and a second call returns `None`.
    pub fn take_content(&mut self) -> Option<Content> {
        self.content.take()
    }

    /// Marshal onto `out` per the representation priority stub → follows →
    /// inline. An inline marshal consumes the content stream; a content read
    /// failure is reported as a serialization error naming the stream.
    pub fn to_json_writer(&mut self, out: impl Write) -> Result<()> {
        json::encode_attachment(self, out)
    }

    /// Marshal to an in-memory JSON string. Intended for small payloads;
    /// large ones should go through [`to_json_writer`](Self::to_json_writer).
    pub fn to_json_string(&mut self) -> Result<String> {
        let mut buf = Vec::new();
        json::encode_attachment(self, &mut buf)?;
        Ok(String::from_utf8(buf).expect("codec emits valid UTF-8"))
    }

    /// Unmarshal a single attachment from a JSON reader.
    ///
    /// The filename is left empty — it comes from context (the enclosing
    /// collection key, or the driver record), never from this payload.
    pub fn from_json_reader(input: impl Read) -> Result<Self> {
        json::decode_attachment(input)
    }

    /// Unmarshal from a JSON string slice.
    pub fn from_json_str(input: &str) -> Result<Self> {
        json::decode_attachment(input.as_bytes())
    }
}

/// Serde binding for the decode direction, so attachments deserialize inside
/// larger document structures. There is deliberately no `Serialize`
/// counterpart: an inline marshal consumes the content stream, which serde's
/// `&self` contract cannot express — use [`Attachment::to_json_writer`].
impl<'de> Deserialize<'de> for Attachment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = json::WireAttachment::deserialize(deserializer)?;
        json::attachment_from_wire(wire).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults_to_inline() {
        let att = Attachment::new("foo.txt", "text/plain", Content::from_bytes(b"hi".to_vec()));
        assert!(!att.stub);
        assert!(!att.follows);
        assert_eq!(att.rev_pos, 0);
        assert!(att.content.is_some());
    }

    #[test]
    fn test_take_content_is_one_shot() {
        let mut att =
            Attachment::new("foo.txt", "text/plain", Content::from_bytes(b"hi".to_vec()));
        let mut content = att.take_content().unwrap();
        assert_eq!(content.read_all().unwrap(), b"hi");
        assert!(att.take_content().is_none());
    }

    #[test]
    fn test_serde_deserialize_binding() {
        let att: Attachment =
            serde_json::from_str(r#"{"content_type":"text/plain","stub":true,"length":7}"#)
                .unwrap();
        assert!(att.stub);
        assert_eq!(att.size, 7);
        assert_eq!(att.filename, "");
    }
}
