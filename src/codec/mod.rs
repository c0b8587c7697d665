//! Wire codecs: streaming base64 transcoding and the JSON attachment shapes.

pub mod base64;
pub mod json;
