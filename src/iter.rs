//! Lazy iteration over many attachments from one response stream.

use tracing::{debug, warn};

use crate::driver::{AttachmentRecord, AttachmentSource, Fetch, SourceError};
use crate::error::{AttachmentError, Result};
use crate::model::attachment::Attachment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ready,
    Exhausted,
    Failed,
    Closed,
}

/// Adapts an [`AttachmentSource`] into a sequence of typed [`Attachment`]s.
///
/// Attachments are yielded in the order the backend produces them, with no
/// reordering or buffering. Backend failures surface as retrieval errors
/// with any status classification preserved; exhaustion surfaces as a clean
/// `Ok(None)`.
///
/// When the backend multiplexes content over one shared connection, the
/// caller must fully read (or drop) each yielded attachment's content before
/// the next [`next`](Self::next) call; interleaving reads gives undefined
/// byte results.
pub struct AttachmentIterator {
    source: Box<dyn AttachmentSource>,
    state: State,
}

impl AttachmentIterator {
    /// Wrap a backend source.
    pub fn new(source: impl AttachmentSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            state: State::Ready,
        }
    }

    /// Fetch and decode the next attachment.
    ///
    /// Returns `Ok(None)` when the source is exhausted — a normal end, not a
    /// failure. After a failure the iterator remains usable only for
    /// [`close`](Self::close); further `next` calls re-surface the source's
    /// idempotent terminal error.
    pub fn next(&mut self) -> Result<Option<Attachment>> {
        match self.state {
            State::Exhausted | State::Closed => return Ok(None),
            State::Ready | State::Failed => {}
        }

        let mut record = AttachmentRecord::default();
        match self.source.fetch(&mut record) {
            Ok(Fetch::Record) => {
                self.state = State::Ready;
                Ok(Some(attachment_from_record(record)))
            }
            Ok(Fetch::Exhausted) => {
                debug!("attachment source exhausted");
                self.state = State::Exhausted;
                Ok(None)
            }
            Err(err) => {
                self.state = State::Failed;
                Err(retrieval_error(err))
            }
        }
    }

    /// Release the underlying source. Idempotent: the first call delegates
    /// to the backend, later calls are no-ops.
    ///
    /// If the iterator already failed retrieval, a close failure is logged
    /// and suppressed so the retrieval error stays the primary failure.
    pub fn close(&mut self) -> Result<()> {
        if self.state == State::Closed {
            return Ok(());
        }
        let failed = self.state == State::Failed;
        self.state = State::Closed;
        match self.source.close() {
            Ok(()) => Ok(()),
            Err(err) if failed => {
                warn!(error = %err, "close failed after retrieval error; suppressing");
                Ok(())
            }
            Err(err) => Err(retrieval_error(err)),
        }
    }
}

impl Drop for AttachmentIterator {
    /// Best-effort close, idempotent with an explicit [`close`](Self::close).
    /// Errors cannot propagate from here, so explicit close remains the
    /// supported path.
    fn drop(&mut self) {
        if self.state != State::Closed {
            if let Err(err) = self.source.close() {
                warn!(error = %err, "failed to close attachment source on drop");
            }
        }
    }
}

impl Iterator for AttachmentIterator {
    type Item = Result<Attachment>;

    fn next(&mut self) -> Option<Self::Item> {
        AttachmentIterator::next(self).transpose()
    }
}

/// Field-for-field mapping from the raw driver shape, moving content
/// ownership into the public attachment.
fn attachment_from_record(record: AttachmentRecord) -> Attachment {
    Attachment {
        filename: record.filename,
        content_type: record.content_type,
        size: record.size,
        rev_pos: record.rev_pos,
        stub: record.stub,
        follows: record.follows,
        content: record.content,
    }
}

fn retrieval_error(err: SourceError) -> AttachmentError {
    AttachmentError::Retrieval {
        status: err.status,
        source: err.source,
    }
}
