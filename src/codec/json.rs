//! JSON wire codec for attachments.
//!
//! Three mutually exclusive shapes exist on the wire, chosen in priority
//! order at encode time:
//!
//! ```json
//! { "content_type": "...", "length": 7, "stub": true }
//! { "content_type": "...", "follows": true, "revpos": 3 }
//! { "content_type": "...", "data": "<base64>", "revpos": 3 }
//! ```
//!
//! The inline shape streams content through [`Base64Writer`] directly into
//! the output writer; the payload is never buffered wholesale. Decoding
//! accepts any of the three shapes and rejects contradictory ones.

use std::io::{self, Read, Write};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::base64::Base64Writer;
use crate::content::Content;
use crate::error::{AttachmentError, Result};
use crate::model::attachment::Attachment;
use crate::model::collection::Attachments;

/// Copy chunk size for the inline content path.
const COPY_BUF_SIZE: usize = 8 * 1024;

/// Identity reported when an envelope write (not a content read) fails.
const OUTPUT_STREAM: &str = "JSON output";

/// The raw wire shape, before validation. Unknown fields are ignored, as
/// servers are free to add metadata.
#[derive(Debug, Deserialize)]
pub(crate) struct WireAttachment {
    content_type: Option<String>,
    data: Option<String>,
    #[serde(default)]
    stub: bool,
    #[serde(default)]
    follows: bool,
    length: Option<u64>,
    revpos: Option<u64>,
}

#[derive(Serialize)]
struct StubShape<'a> {
    content_type: &'a str,
    length: u64,
    stub: bool,
}

#[derive(Serialize)]
struct FollowsShape<'a> {
    content_type: &'a str,
    follows: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    revpos: Option<u64>,
}

/// Encode one attachment onto `out`, consuming its content stream if the
/// inline shape is chosen.
pub fn encode_attachment<W: Write>(att: &mut Attachment, mut out: W) -> Result<()> {
    if att.stub {
        // Content, if any, is deliberately not consulted.
        let shape = StubShape {
            content_type: &att.content_type,
            length: att.size,
            stub: true,
        };
        return Ok(serde_json::to_writer(&mut out, &shape)?);
    }

    if att.follows {
        let shape = FollowsShape {
            content_type: &att.content_type,
            follows: true,
            revpos: nonzero(att.rev_pos),
        };
        return Ok(serde_json::to_writer(&mut out, &shape)?);
    }

    encode_inline(att, out)
}

/// The inline shape: hand-written envelope so the base64 text can stream
/// straight into `out`. The standard alphabet needs no JSON escaping, so the
/// encoded bytes are written between the quotes verbatim.
fn encode_inline<W: Write>(att: &mut Attachment, mut out: W) -> Result<()> {
    let mut content = att.content.take().ok_or_else(|| {
        AttachmentError::serialization(
            "<missing>",
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "inline attachment has no content stream",
            ),
        )
    })?;
    let stream = content.description().to_string();

    write_envelope(&mut out, |out| {
        out.write_all(b"{\"content_type\":")?;
        serde_json::to_writer(&mut *out, &att.content_type)?;
        out.write_all(b",\"data\":\"")?;
        Ok(())
    })?;

    let mut encoder = Base64Writer::new(&mut out);
    let mut buf = [0u8; COPY_BUF_SIZE];
    let mut total: u64 = 0;
    loop {
        let n = content
            .read(&mut buf)
            .map_err(|e| AttachmentError::serialization(stream.as_str(), e))?;
        if n == 0 {
            break;
        }
        total += n as u64;
        encoder
            .write_all(&buf[..n])
            .map_err(|e| AttachmentError::serialization(OUTPUT_STREAM, e))?;
    }
    encoder
        .finish()
        .map_err(|e| AttachmentError::serialization(OUTPUT_STREAM, e))?;
    debug!(bytes = total, stream = %stream, "encoded inline attachment content");

    write_envelope(&mut out, |out| {
        out.write_all(b"\"")?;
        if let Some(revpos) = nonzero(att.rev_pos) {
            write!(out, ",\"revpos\":{revpos}")?;
        }
        out.write_all(b"}")?;
        Ok(())
    })
}

/// Run an envelope-writing fragment, mapping its failures onto the crate
/// error taxonomy. Serde errors here are I/O-backed (string escaping never
/// fails on its own).
fn write_envelope<W: Write>(
    out: &mut W,
    body: impl FnOnce(&mut W) -> std::result::Result<(), EnvelopeError>,
) -> Result<()> {
    body(out).map_err(|e| match e {
        EnvelopeError::Io(e) => AttachmentError::serialization(OUTPUT_STREAM, e),
        EnvelopeError::Json(e) => AttachmentError::Json(e),
    })
}

enum EnvelopeError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl From<io::Error> for EnvelopeError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for EnvelopeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Decode one attachment from a JSON reader. The filename is left empty;
/// it is assigned from context (e.g. the enclosing collection key).
pub fn decode_attachment<R: Read>(input: R) -> Result<Attachment> {
    let wire: WireAttachment = serde_json::from_reader(input)?;
    attachment_from_wire(wire)
}

/// Validate a raw wire shape and build the typed attachment.
pub(crate) fn attachment_from_wire(wire: WireAttachment) -> Result<Attachment> {
    let content_type = wire
        .content_type
        .ok_or_else(|| AttachmentError::deserialization("content_type", "missing required field"))?;

    if wire.stub && wire.follows {
        return Err(AttachmentError::deserialization(
            "stub",
            "stub and follows are mutually exclusive",
        ));
    }
    if wire.stub && wire.data.is_some() {
        return Err(AttachmentError::deserialization(
            "stub",
            "a stub attachment cannot carry inline data",
        ));
    }
    if wire.follows && wire.data.is_some() {
        return Err(AttachmentError::deserialization(
            "follows",
            "a follows attachment cannot carry inline data",
        ));
    }

    let mut att = Attachment {
        content_type,
        rev_pos: wire.revpos.unwrap_or(0),
        ..Attachment::default()
    };

    if wire.stub {
        att.stub = true;
        att.size = wire.length.unwrap_or(0);
        att.content = Some(Content::empty());
    } else if wire.follows {
        // Content arrives out-of-band (e.g. a later multipart section).
        att.follows = true;
        att.content = Some(Content::empty());
    } else if let Some(data) = wire.data {
        att.content = Some(Content::from_base64(&data)?);
    } else {
        return Err(AttachmentError::deserialization(
            "data",
            "attachment carries none of stub, follows, or data",
        ));
    }

    Ok(att)
}

/// Encode a whole collection as a JSON object keyed by filename.
/// Fail-fast: the first member failure aborts the encode.
pub fn encode_attachments<W: Write>(atts: &mut Attachments, mut out: W) -> Result<()> {
    write_envelope(&mut out, |out| Ok(out.write_all(b"{")?))?;
    let mut first = true;
    for (filename, att) in atts.iter_mut() {
        write_envelope(&mut out, |out| {
            if !first {
                out.write_all(b",")?;
            }
            serde_json::to_writer(&mut *out, filename)?;
            out.write_all(b":")?;
            Ok(())
        })?;
        first = false;
        encode_attachment(att, &mut out)?;
    }
    write_envelope(&mut out, |out| Ok(out.write_all(b"}")?))
}

/// Decode a collection, assigning each member's filename from its key.
/// An empty object decodes to an empty (non-error) collection.
pub fn decode_attachments<R: Read>(input: R) -> Result<Attachments> {
    let wire: IndexMap<String, WireAttachment> = serde_json::from_reader(input)?;
    attachments_from_wire(wire)
}

pub(crate) fn attachments_from_wire(wire: IndexMap<String, WireAttachment>) -> Result<Attachments> {
    let mut atts = Attachments::new();
    for (filename, entry) in wire {
        let mut att = attachment_from_wire(entry)?;
        att.filename = filename;
        atts.insert(att);
    }
    Ok(atts)
}

fn nonzero(revpos: u64) -> Option<u64> {
    (revpos != 0).then_some(revpos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicting_flags_rejected() {
        let err = decode_attachment(
            r#"{"content_type":"text/plain","stub":true,"follows":true}"#.as_bytes(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("stub"));
    }

    #[test]
    fn test_stub_with_data_rejected() {
        let err = decode_attachment(
            r#"{"content_type":"text/plain","stub":true,"data":"aGk="}"#.as_bytes(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("stub"));
    }

    #[test]
    fn test_missing_content_type_rejected() {
        let err = decode_attachment(r#"{"data":"aGk="}"#.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("content_type"));
    }

    #[test]
    fn test_empty_shape_rejected() {
        let err = decode_attachment(r#"{"content_type":"text/plain"}"#.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("data"));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let att = decode_attachment(
            r#"{"content_type":"text/plain","stub":true,"length":7,"digest":"md5-xyz"}"#
                .as_bytes(),
        )
        .unwrap();
        assert!(att.stub);
        assert_eq!(att.size, 7);
    }
}
