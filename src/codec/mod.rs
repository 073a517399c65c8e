//! Animation codecs.
//!
//! The binary layout is written to `.cla` files and streamed to the controller during upload.
//! JSON is a human-editable interchange form of the same model.

pub(crate) mod binary;
pub(crate) mod json;
