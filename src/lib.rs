//! ledanim is the editing core for multi-channel LED controller animations.
//!
//! An animation is a fixed set of channels, one per LED, each holding an ordered, non-overlapping
//! list of timed sections that are on, fade off or fade on. The crate provides:
//!
//! 1. **Edit**: [`Editor`] and [`Gesture`] mutate an [`Animation`] over (channel, division)
//!    coordinates and keep every channel sorted and overlap-free.
//! 2. **Encode**: [`encode`] / [`decode`] convert to the compact `.cla` byte layout that is both
//!    the file format and the upload payload.
//! 3. **Preview**: [`brightness`] computes per-channel brightness at a tick, and [`PreviewClock`]
//!    drives it in real time on a background thread.
//! 4. **Upload**: [`run_upload`] streams the encoded bytes to a controller over a serial link and
//!    verifies the echo byte for byte; [`UploadService`] runs it in the background.
//!
//! The open animation lives in an [`AnimationDocument`] shared with the preview and upload
//! workers as a [`SharedDocument`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod codec;
mod config;
mod document;
mod edit;
mod foundation;
mod model;
mod preview;
mod upload;

pub use codec::binary::{
    SECTION_RECORD_LEN, decode, encode, header_len, pack_section, unpack_section,
};
pub use codec::json::{from_json_reader, from_json_str, to_json};
pub use config::AppConfig;
pub use document::{AnimationDocument, FILE_EXTENSION, SharedDocument, lock_document};
pub use edit::engine::{Editor, SectionRef};
pub use edit::gesture::{Gesture, GrabZone};
pub use foundation::core::{
    DEFAULT_CHANNEL_COUNT, MAX_DIVISION, MAX_ENCODED_DIVISION, TICKS_PER_DIVISION, Tick,
    clamp_division,
};
pub use foundation::error::{LedAnimError, LedAnimResult};
pub use model::animation::Animation;
pub use model::channel::Channel;
pub use model::section::{Section, SectionMode};
pub use preview::clock::{PreviewClock, PreviewOpts};
pub use preview::interpreter::{
    FULL_BRIGHTNESS, PreviewFrame, brightness, loop_end, sample, section_level,
};
pub use upload::discovery::{
    DiscoveryHandle, PortEnumerator, PortFilter, StaticPorts, SystemPorts, spawn_discovery,
};
pub use upload::link::{LinkSettings, Parity, PortOpener, SerialLink, SystemSerial};
pub use upload::protocol::{
    ACK, MAX_PAYLOAD_LEN, NAK, READY, UploadOpts, UploadState, run_upload, upload_animation,
};
pub use upload::sim::{DeviceLog, EchoBehavior, SimulatedDevice};
pub use upload::worker::{UploadHandle, UploadService};
