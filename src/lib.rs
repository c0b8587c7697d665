//! `docuwire` — the attachment core of a document-database client.
//!
//! This crate models binary/text attachments to documents, converts them to
//! and from their JSON wire representation without materializing large
//! payloads in memory, and adapts pluggable backend drivers into a typed,
//! lazy attachment iterator.

pub mod codec;
pub mod content;
pub mod driver;
pub mod error;
pub mod iter;
pub mod model;
