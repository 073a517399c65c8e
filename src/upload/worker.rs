use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread,
};

use crate::{
    document::{SharedDocument, lock_document},
    foundation::error::{LedAnimError, LedAnimResult},
    upload::link::PortOpener,
    upload::protocol::{UploadOpts, UploadState, run_upload},
};

/// Runs uploads on a background thread, one at a time.
pub struct UploadService {
    opener: Arc<dyn PortOpener>,
    opts: UploadOpts,
    in_flight: Arc<AtomicBool>,
}

impl UploadService {
    /// Service that opens ports through `opener`.
    pub fn new(opener: Arc<dyn PortOpener>, opts: UploadOpts) -> Self {
        Self {
            opener,
            opts,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether an upload is currently running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Encode the document as it is now and upload it to `port` in the background.
    ///
    /// Later edits do not affect a running upload. Fails with [`LedAnimError::Busy`] while
    /// another upload is in flight, or with the encoder's error if the animation cannot be
    /// encoded.
    pub fn start(&self, doc: &SharedDocument, port: &str) -> LedAnimResult<UploadHandle> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(LedAnimError::busy("an upload is already in progress"));
        }
        let guard = InFlight(Arc::clone(&self.in_flight));

        let payload = lock_document(doc).encode()?;

        let state = Arc::new(Mutex::new(UploadState::Idle));
        let (tx, rx) = mpsc::channel();
        let opener = Arc::clone(&self.opener);
        let opts = self.opts.clone();
        let port = port.to_string();
        let worker_state = Arc::clone(&state);

        thread::Builder::new()
            .name("upload-worker".to_string())
            .spawn(move || {
                let result = run_upload(opener.as_ref(), &port, &payload, &opts, |s| {
                    *worker_state.lock().unwrap_or_else(PoisonError::into_inner) = s;
                });
                drop(guard);
                let _ = tx.send(result);
            })?;

        Ok(UploadHandle { state, rx })
    }
}

struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Progress and result of a background upload.
pub struct UploadHandle {
    state: Arc<Mutex<UploadState>>,
    rx: mpsc::Receiver<LedAnimResult<()>>,
}

impl UploadHandle {
    /// Latest state reported by the worker.
    pub fn state(&self) -> UploadState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Result, if the upload has finished. Returns `None` on every call after the first `Some`.
    pub fn try_result(&self) -> Option<LedAnimResult<()>> {
        self.rx.try_recv().ok()
    }

    /// Block until the upload finishes.
    pub fn wait(self) -> LedAnimResult<()> {
        self.rx.recv().map_err(|_| {
            LedAnimError::Other(anyhow::anyhow!("upload worker exited without a result"))
        })?
    }
}

#[cfg(test)]
#[path = "../../tests/unit/upload/worker.rs"]
mod tests;
