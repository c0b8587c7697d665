//! In-memory attachment source.
//!
//! Replays a prepared list of records in order. Used as a test double and
//! as a backend for data that is already local (the role the mock driver
//! plays for HTTP backends).

use std::collections::VecDeque;

use crate::driver::{AttachmentRecord, AttachmentSource, Fetch, SourceError};

/// An [`AttachmentSource`] over a fixed set of records.
///
/// Yields the records in order, then reports exhaustion — or, if built via
/// [`failing`](Self::failing), a classified failure. Both terminal states
/// are idempotent, as the contract requires.
#[derive(Debug, Default)]
pub struct MemorySource {
    records: VecDeque<AttachmentRecord>,
    failure: Option<(Option<u16>, String)>,
    closed: bool,
    close_count: u32,
}

impl MemorySource {
    /// A source that yields `records` then exhausts.
    pub fn new(records: Vec<AttachmentRecord>) -> Self {
        Self {
            records: records.into(),
            ..Self::default()
        }
    }

    /// A source that yields `records` and then fails with the given status
    /// classification instead of exhausting.
    pub fn failing(
        records: Vec<AttachmentRecord>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            records: records.into(),
            failure: Some((status, message.into())),
            ..Self::default()
        }
    }

    /// How many times `close` has been called. Lets tests observe that
    /// teardown ran exactly once.
    pub fn close_count(&self) -> u32 {
        self.close_count
    }

    fn failure_error(status: Option<u16>, message: &str) -> SourceError {
        match status {
            Some(status) => SourceError::with_status(status, message.to_string()),
            None => SourceError::new(message.to_string()),
        }
    }
}

impl AttachmentSource for MemorySource {
    fn fetch(&mut self, out: &mut AttachmentRecord) -> Result<Fetch, SourceError> {
        if self.closed {
            return Err(SourceError::new("fetch on a closed source"));
        }
        match self.records.pop_front() {
            Some(record) => {
                *out = record;
                Ok(Fetch::Record)
            }
            None => match &self.failure {
                Some((status, message)) => Err(Self::failure_error(*status, message)),
                None => Ok(Fetch::Exhausted),
            },
        }
    }

    fn close(&mut self) -> Result<(), SourceError> {
        // Dropping queued records releases their content streams.
        self.records.clear();
        self.closed = true;
        self.close_count += 1;
        Ok(())
    }
}
