//! Animation data model: sections, channels and the animation that owns them.

pub(crate) mod animation;
pub(crate) mod channel;
pub(crate) mod section;
