//! The backend ("driver") contract.
//!
//! A driver is whatever produces raw attachment records: an HTTP client
//! decoding a multipart response, an in-memory fixture, a cache. The core
//! consumes only the narrow [`AttachmentSource`] capability defined here;
//! everything else about a backend is out of scope.

use std::error::Error;
use std::fmt;

use crate::content::Content;

pub mod memory;

/// The raw per-attachment shape a backend produces, before it becomes a
/// public [`crate::model::attachment::Attachment`].
#[derive(Debug, Default)]
pub struct AttachmentRecord {
    pub filename: String,
    pub content_type: String,
    pub stub: bool,
    pub follows: bool,
    pub size: u64,
    pub rev_pos: u64,
    /// The payload stream, owned by the backend until the record is handed
    /// to the iterator.
    pub content: Option<Content>,
}

/// A backend failure, optionally carrying a numeric status classification
/// (e.g. an upstream HTTP status). The classification travels unchanged
/// through every layer so callers can tell transport-class failures from
/// protocol-class ones.
#[derive(Debug)]
pub struct SourceError {
    pub status: Option<u16>,
    pub source: Box<dyn Error + Send + Sync>,
}

impl SourceError {
    /// An unclassified failure.
    pub fn new(source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self {
            status: None,
            source: source.into(),
        }
    }

    /// A failure carrying a backend status classification.
    pub fn with_status(status: u16, source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self {
            status: Some(status),
            source: source.into(),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {status})", self.source),
            None => write!(f, "{}", self.source),
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        let source: &(dyn Error + 'static) = &*self.source;
        Some(source)
    }
}

/// Outcome of a [`AttachmentSource::fetch`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    /// The slot was populated with the next record.
    Record,
    /// No more records. Not a failure.
    Exhausted,
}

/// The minimal capability a backend must implement.
///
/// `fetch` must be safe to call repeatedly: once it reports exhaustion or an
/// error, every subsequent call must report the same (idempotent terminal
/// state). `close` releases backend resources, is safe to call at any point
/// and more than once, but never concurrently with `fetch`.
pub trait AttachmentSource {
    /// Populate `out` with the next raw record, or report exhaustion.
    fn fetch(&mut self, out: &mut AttachmentRecord) -> Result<Fetch, SourceError>;

    /// Release underlying resources.
    fn close(&mut self) -> Result<(), SourceError>;
}
