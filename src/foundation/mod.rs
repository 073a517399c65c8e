//! Shared units, constants and the crate error type.

pub(crate) mod core;
pub(crate) mod error;
