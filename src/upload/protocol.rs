use std::{
    thread,
    time::{Duration, Instant},
};

use crate::{
    codec::binary::encode,
    foundation::error::{LedAnimError, LedAnimResult},
    model::animation::Animation,
    upload::link::{LinkSettings, PortOpener},
};

/// Sent before the length byte: the controller should get ready for a new animation.
pub const READY: u8 = b'R';
/// Sent after a bad echo: the controller must discard what it received.
pub const NAK: u8 = b'0';
/// Sent after a verified echo: the controller may use the new animation.
pub const ACK: u8 = b'1';

/// Largest payload the one-byte length prefix can describe.
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize;

/// Options for [`run_upload`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct UploadOpts {
    /// Serial line parameters.
    pub link: LinkSettings,
    /// Wait after opening the port before talking to the controller, in milliseconds.
    pub settle_ms: u64,
    /// Deadline for the full echo to arrive, in milliseconds.
    pub echo_timeout_ms: u64,
}

impl Default for UploadOpts {
    fn default() -> Self {
        Self {
            link: LinkSettings::default(),
            settle_ms: 3000,
            echo_timeout_ms: 10_000,
        }
    }
}

impl UploadOpts {
    /// Settle delay as a [`Duration`].
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Echo deadline as a [`Duration`].
    pub fn echo_timeout(&self) -> Duration {
        Duration::from_millis(self.echo_timeout_ms)
    }
}

/// Progress of one upload attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    /// Not started.
    #[default]
    Idle,
    /// Opening and settling the port.
    Opening,
    /// Writing the ready byte, length and payload.
    Sending,
    /// Waiting for the controller to echo the payload.
    AwaitingEcho,
    /// Comparing the echo with what was sent.
    Verifying,
    /// ACK sent; the controller has the new animation.
    Succeeded,
    /// The attempt ended without an ACK.
    Failed,
}

impl UploadState {
    /// Whether the attempt is over.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Transfer `payload` to the controller on `port` and verify the echo byte for byte.
///
/// `observe` sees every state in order, ending with exactly one of
/// [`UploadState::Succeeded`] or [`UploadState::Failed`]. The port is closed before the terminal
/// state is reported. There is no retry.
#[tracing::instrument(skip(opener, payload, opts, observe), fields(bytes = payload.len()))]
pub fn run_upload(
    opener: &dyn PortOpener,
    port: &str,
    payload: &[u8],
    opts: &UploadOpts,
    mut observe: impl FnMut(UploadState),
) -> LedAnimResult<()> {
    let result = transfer(opener, port, payload, opts, &mut observe);
    match &result {
        Ok(()) => {
            tracing::info!("upload verified");
            observe(UploadState::Succeeded);
        }
        Err(e) => {
            tracing::warn!(error = %e, "upload failed");
            observe(UploadState::Failed);
        }
    }
    result
}

/// Encode `anim` and upload it with [`run_upload`].
///
/// Encoding happens before the port is opened, so an unencodable animation never touches the
/// link.
pub fn upload_animation(
    opener: &dyn PortOpener,
    port: &str,
    anim: &Animation,
    opts: &UploadOpts,
    mut observe: impl FnMut(UploadState),
) -> LedAnimResult<()> {
    match encode(anim) {
        Ok(payload) => run_upload(opener, port, &payload, opts, observe),
        Err(e) => {
            observe(UploadState::Failed);
            Err(e)
        }
    }
}

fn transfer(
    opener: &dyn PortOpener,
    port: &str,
    payload: &[u8],
    opts: &UploadOpts,
    observe: &mut dyn FnMut(UploadState),
) -> LedAnimResult<()> {
    let len = u8::try_from(payload.len()).map_err(|_| {
        LedAnimError::validation(format!(
            "payload of {} bytes exceeds the {MAX_PAYLOAD_LEN}-byte upload limit",
            payload.len()
        ))
    })?;

    observe(UploadState::Opening);
    let mut link = opener.open(port, &opts.link)?;
    thread::sleep(opts.settle());
    link.discard_input()?;

    observe(UploadState::Sending);
    let mut frame = Vec::with_capacity(payload.len() + 2);
    frame.push(READY);
    frame.push(len);
    frame.extend_from_slice(payload);
    link.write_all(&frame)?;

    observe(UploadState::AwaitingEcho);
    let mut echo = vec![0u8; payload.len()];
    // A missing echo ends the attempt without a NAK.
    link.read_exact_until(&mut echo, Instant::now() + opts.echo_timeout())?;

    observe(UploadState::Verifying);
    if let Some(index) = payload.iter().zip(&echo).position(|(a, b)| a != b) {
        if let Err(e) = link.write_all(&[NAK]) {
            tracing::warn!(error = %e, "could not send NAK");
        }
        return Err(LedAnimError::IntegrityMismatch {
            index,
            sent: payload[index],
            received: echo[index],
        });
    }
    link.write_all(&[ACK])
}

#[cfg(test)]
#[path = "../../tests/unit/upload/protocol.rs"]
mod tests;
