//! Editing engine: invariant-preserving mutations and drag gestures.

pub(crate) mod engine;
pub(crate) mod gesture;
