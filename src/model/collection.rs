//! The attachment set of a document revision.

use std::io::{Read, Write};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use crate::codec::json;
use crate::error::Result;
use crate::model::attachment::Attachment;

/// A filename-keyed, insertion-ordered collection of attachments.
///
/// On the wire this is a JSON object whose keys are filenames. Every
/// member's `filename` equals its key: decoding assigns it from the key,
/// and encoding takes the key from the member.
#[derive(Debug, Default)]
pub struct Attachments {
    inner: IndexMap<String, Attachment>,
}

impl Attachments {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an attachment, keyed by its filename. A member with the same
    /// filename is replaced and returned.
    pub fn insert(&mut self, attachment: Attachment) -> Option<Attachment> {
        self.inner
            .insert(attachment.filename.clone(), attachment)
    }

    /// Look up an attachment by filename.
    pub fn get(&self, filename: &str) -> Option<&Attachment> {
        self.inner.get(filename)
    }

    /// Mutable lookup, e.g. to take a member's content stream.
    pub fn get_mut(&mut self, filename: &str) -> Option<&mut Attachment> {
        self.inner.get_mut(filename)
    }

    /// Remove and return an attachment. Preserves the order of the rest.
    pub fn remove(&mut self, filename: &str) -> Option<Attachment> {
        self.inner.shift_remove(filename)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attachment)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Mutable iteration; keys stay immutable.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Attachment)> {
        self.inner.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Marshal as a JSON object. Fails on the first member that fails to
    /// marshal; no partial collection is emitted as valid output.
    pub fn to_json_writer(&mut self, out: impl Write) -> Result<()> {
        json::encode_attachments(self, out)
    }

    /// Marshal to an in-memory JSON string.
    pub fn to_json_string(&mut self) -> Result<String> {
        let mut buf = Vec::new();
        json::encode_attachments(self, &mut buf)?;
        Ok(String::from_utf8(buf).expect("codec emits valid UTF-8"))
    }

    /// Unmarshal a collection from a JSON reader. `{}` yields an empty
    /// collection, not an error.
    pub fn from_json_reader(input: impl Read) -> Result<Self> {
        json::decode_attachments(input)
    }

    /// Unmarshal from a JSON string slice.
    pub fn from_json_str(input: &str) -> Result<Self> {
        json::decode_attachments(input.as_bytes())
    }
}

impl IntoIterator for Attachments {
    type Item = (String, Attachment);
    type IntoIter = indexmap::map::IntoIter<String, Attachment>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl Extend<Attachment> for Attachments {
    fn extend<T: IntoIterator<Item = Attachment>>(&mut self, iter: T) {
        for att in iter {
            self.insert(att);
        }
    }
}

impl FromIterator<Attachment> for Attachments {
    fn from_iter<T: IntoIterator<Item = Attachment>>(iter: T) -> Self {
        let mut atts = Self::new();
        atts.extend(iter);
        atts
    }
}

/// Serde binding for the decode direction; see [`Attachment`] for why there
/// is no `Serialize` counterpart.
impl<'de> Deserialize<'de> for Attachments {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = IndexMap::<String, json::WireAttachment>::deserialize(deserializer)?;
        json::attachments_from_wire(wire).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Content;

    fn inline(filename: &str, bytes: &[u8]) -> Attachment {
        Attachment::new(filename, "text/plain", Content::from_bytes(bytes.to_vec()))
    }

    #[test]
    fn test_insert_keys_by_filename() {
        let mut atts = Attachments::new();
        atts.insert(inline("a.txt", b"a"));
        atts.insert(inline("b.txt", b"b"));
        assert_eq!(atts.len(), 2);
        assert_eq!(atts.get("a.txt").unwrap().filename, "a.txt");
    }

    #[test]
    fn test_insert_replaces_duplicate() {
        let mut atts = Attachments::new();
        atts.insert(inline("a.txt", b"old"));
        let old = atts.insert(inline("a.txt", b"new")).unwrap();
        assert_eq!(old.filename, "a.txt");
        assert_eq!(atts.len(), 1);
    }

    #[test]
    fn test_preserves_insertion_order() {
        let mut atts = Attachments::new();
        for name in ["z.txt", "a.txt", "m.txt"] {
            atts.insert(inline(name, b"x"));
        }
        let names: Vec<&str> = atts.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["z.txt", "a.txt", "m.txt"]);
    }

    #[test]
    fn test_remove() {
        let mut atts = Attachments::new();
        atts.insert(inline("a.txt", b"a"));
        assert!(atts.remove("a.txt").is_some());
        assert!(atts.remove("a.txt").is_none());
        assert!(atts.is_empty());
    }
}
