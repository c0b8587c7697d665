//! Core data model: attachments and attachment collections.

pub mod attachment;
pub mod collection;
