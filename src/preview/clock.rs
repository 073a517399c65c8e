use std::{
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crate::{
    document::{SharedDocument, lock_document},
    foundation::core::Tick,
    foundation::error::LedAnimResult,
    preview::interpreter::{PreviewFrame, loop_end, sample},
};

/// Options for [`PreviewClock`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PreviewOpts {
    /// Time between ticks while playing, in milliseconds.
    pub tick_period_ms: u64,
}

impl Default for PreviewOpts {
    fn default() -> Self {
        Self { tick_period_ms: 10 }
    }
}

impl PreviewOpts {
    /// Tick period as a [`Duration`]; never zero.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms.max(1))
    }
}

struct ClockState {
    playing: bool,
    // Next tick to sample.
    tick: Tick,
    frame: PreviewFrame,
    // Frame set by stop/seek/reset that the observer has not seen yet.
    pending: bool,
    shutdown: bool,
}

struct Shared {
    state: Mutex<ClockState>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ClockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, ClockState>) -> MutexGuard<'a, ClockState> {
        self.wake.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_timeout<'a>(
        &self,
        guard: MutexGuard<'a, ClockState>,
        timeout: Duration,
    ) -> MutexGuard<'a, ClockState> {
        match self.wake.wait_timeout(guard, timeout) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        }
    }
}

type FrameObserver = Box<dyn FnMut(&PreviewFrame) + Send>;

/// Periodic preview driver.
///
/// A background thread advances the playhead one tick per period while playing and samples the
/// shared document under its lock. While stopped the thread parks on a condition variable.
///
/// Locks are always taken document first, then clock state. [`seek`](Self::seek) and
/// [`reset`](Self::reset) lock the document, so they must not be called while holding it.
pub struct PreviewClock {
    doc: SharedDocument,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl PreviewClock {
    /// Start a stopped clock over `doc`.
    pub fn spawn(doc: SharedDocument, opts: PreviewOpts) -> LedAnimResult<Self> {
        Self::spawn_inner(doc, opts, None)
    }

    /// Start a stopped clock that hands every published frame to `observer`.
    ///
    /// The observer runs on the clock thread without any lock held.
    pub fn spawn_with_observer<F>(
        doc: SharedDocument,
        opts: PreviewOpts,
        observer: F,
    ) -> LedAnimResult<Self>
    where
        F: FnMut(&PreviewFrame) + Send + 'static,
    {
        Self::spawn_inner(doc, opts, Some(Box::new(observer)))
    }

    fn spawn_inner(
        doc: SharedDocument,
        opts: PreviewOpts,
        observer: Option<FrameObserver>,
    ) -> LedAnimResult<Self> {
        let channels = lock_document(&doc).animation().channel_count();
        let shared = Arc::new(Shared {
            state: Mutex::new(ClockState {
                playing: false,
                tick: Tick::default(),
                frame: PreviewFrame::dark(channels),
                pending: false,
                shutdown: false,
            }),
            wake: Condvar::new(),
        });

        let period = opts.tick_period();
        let worker_doc = Arc::clone(&doc);
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("preview-clock".to_string())
            .spawn(move || run_clock(worker_doc, worker_shared, period, observer))?;

        tracing::debug!(period_ms = period.as_millis() as u64, "preview clock started");
        Ok(Self {
            doc,
            shared,
            worker: Some(worker),
        })
    }

    /// Start advancing from the current position.
    pub fn play(&self) {
        let mut st = self.shared.lock();
        if !st.playing {
            st.playing = true;
            tracing::debug!(tick = st.tick.0, "preview play");
            self.shared.wake.notify_all();
        }
    }

    /// Stop advancing and turn every channel dark. The position is kept.
    pub fn stop(&self) {
        let mut st = self.shared.lock();
        st.playing = false;
        st.frame = PreviewFrame {
            tick: st.tick,
            levels: vec![0; st.frame.levels.len()],
        };
        st.pending = true;
        tracing::debug!(tick = st.tick.0, "preview stop");
        self.shared.wake.notify_all();
    }

    /// Play if stopped, stop if playing. Returns whether the clock is now playing.
    pub fn toggle(&self) -> bool {
        if self.is_playing() {
            self.stop();
            false
        } else {
            self.play();
            true
        }
    }

    /// Move the playhead to `tick`, stopping playback, and show the frame at that tick.
    pub fn seek(&self, tick: Tick) {
        let doc = lock_document(&self.doc);
        let mut st = self.shared.lock();
        st.playing = false;
        st.tick = tick;
        st.frame = sample(doc.animation(), tick);
        st.pending = true;
        tracing::debug!(tick = tick.0, "preview seek");
        self.shared.wake.notify_all();
    }

    /// Stop, rewind to tick 0 and go dark; used after the animation is replaced.
    pub fn reset(&self) {
        let doc = lock_document(&self.doc);
        let mut st = self.shared.lock();
        st.playing = false;
        st.tick = Tick::default();
        st.frame = PreviewFrame::dark(doc.animation().channel_count());
        st.pending = true;
        self.shared.wake.notify_all();
    }

    /// Whether the clock is advancing.
    pub fn is_playing(&self) -> bool {
        self.shared.lock().playing
    }

    /// Next tick to be sampled.
    pub fn position(&self) -> Tick {
        self.shared.lock().tick
    }

    /// Most recently published frame.
    pub fn frame(&self) -> PreviewFrame {
        self.shared.lock().frame.clone()
    }
}

impl Drop for PreviewClock {
    fn drop(&mut self) {
        self.shared.lock().shutdown = true;
        self.shared.wake.notify_all();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!("preview clock thread panicked");
        }
    }
}

fn run_clock(
    doc: SharedDocument,
    shared: Arc<Shared>,
    period: Duration,
    mut observer: Option<FrameObserver>,
) {
    loop {
        let mut st = shared.lock();
        while !st.shutdown && !st.playing && !st.pending {
            st = shared.wait(st);
        }
        if st.shutdown {
            break;
        }
        if st.pending {
            st.pending = false;
            let frame = st.frame.clone();
            drop(st);
            if let Some(observe) = observer.as_mut() {
                observe(&frame);
            }
            continue;
        }

        let deadline = Instant::now() + period;
        loop {
            let now = Instant::now();
            if st.shutdown || !st.playing || st.pending || now >= deadline {
                break;
            }
            st = shared.wait_timeout(st, deadline - now);
        }
        if st.shutdown {
            break;
        }
        if !st.playing || st.pending {
            continue;
        }
        drop(st);

        let frame = {
            let doc = lock_document(&doc);
            let mut st = shared.lock();
            if st.shutdown {
                break;
            }
            if !st.playing {
                continue;
            }
            if st.tick > loop_end(doc.animation()) {
                st.tick = Tick::default();
            }
            let frame = sample(doc.animation(), st.tick);
            st.tick = st.tick.next();
            st.frame = frame.clone();
            frame
        };
        tracing::trace!(tick = frame.tick.0, "preview tick");
        if let Some(observe) = observer.as_mut() {
            observe(&frame);
        }
    }
    tracing::debug!("preview clock stopped");
}

#[cfg(test)]
#[path = "../../tests/unit/preview/clock.rs"]
mod tests;
