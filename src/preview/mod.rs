//! Real-time preview: a pure brightness interpreter and the clock that drives it.

pub(crate) mod clock;
pub(crate) mod interpreter;
