use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread,
    time::Instant,
};

use crate::{
    foundation::error::{LedAnimError, LedAnimResult},
    upload::link::{LinkSettings, PortOpener, SerialLink},
    upload::protocol::READY,
};

/// How a [`SimulatedDevice`] answers a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EchoBehavior {
    /// Echo every byte unchanged.
    Exact,
    /// Echo the payload with the byte at this offset inverted.
    CorruptAt(usize),
    /// Never answer.
    Silent,
}

/// Everything a [`SimulatedDevice`] observed, across every link it opened.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceLog {
    /// Port names passed to `open`, in order.
    pub opened: Vec<String>,
    /// Every byte written by the host, in order.
    pub written: Vec<u8>,
    /// Stale input bytes the host discarded.
    pub discarded: usize,
    /// Links dropped by the host.
    pub closed: usize,
}

impl DeviceLog {
    /// Payload framed by the first `READY, len` prefix, if a complete one was written.
    pub fn payload(&self) -> Option<&[u8]> {
        let (&ready, rest) = self.written.split_first()?;
        let (&len, rest) = rest.split_first()?;
        if ready != READY {
            return None;
        }
        rest.get(..usize::from(len))
    }

    /// Last byte the host wrote.
    pub fn last_written(&self) -> Option<u8> {
        self.written.last().copied()
    }
}

/// In-memory controller used for testing the upload protocol without hardware.
#[derive(Clone, Debug)]
pub struct SimulatedDevice {
    behavior: EchoBehavior,
    available: bool,
    stale_input: Vec<u8>,
    log: Arc<Mutex<DeviceLog>>,
}

impl SimulatedDevice {
    /// Device that answers with `behavior`.
    pub fn new(behavior: EchoBehavior) -> Self {
        Self {
            behavior,
            available: true,
            stale_input: Vec::new(),
            log: Arc::new(Mutex::new(DeviceLog::default())),
        }
    }

    /// Device whose port cannot be opened.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(EchoBehavior::Exact)
        }
    }

    /// Queue bytes that are already waiting when a link opens.
    pub fn with_stale_input(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.stale_input = bytes.into();
        self
    }

    /// Snapshot of what the device has seen so far.
    pub fn log(&self) -> DeviceLog {
        lock_log(&self.log).clone()
    }
}

fn lock_log(log: &Mutex<DeviceLog>) -> MutexGuard<'_, DeviceLog> {
    log.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PortOpener for SimulatedDevice {
    fn open(&self, port: &str, settings: &LinkSettings) -> LedAnimResult<Box<dyn SerialLink>> {
        settings.validate()?;
        if !self.available {
            return Err(LedAnimError::port(format!("open '{port}': no such device")));
        }
        lock_log(&self.log).opened.push(port.to_string());
        Ok(Box::new(SimulatedLink {
            behavior: self.behavior,
            inbound: self.stale_input.iter().copied().collect(),
            received: Vec::new(),
            answered: false,
            log: Arc::clone(&self.log),
        }))
    }
}

struct SimulatedLink {
    behavior: EchoBehavior,
    inbound: VecDeque<u8>,
    received: Vec<u8>,
    answered: bool,
    log: Arc<Mutex<DeviceLog>>,
}

impl SimulatedLink {
    fn answer_if_complete(&mut self) {
        if self.answered || self.received.first() != Some(&READY) {
            return;
        }
        let Some(&len) = self.received.get(1) else {
            return;
        };
        let Some(payload) = self.received.get(2..2 + usize::from(len)) else {
            return;
        };
        self.answered = true;
        match self.behavior {
            EchoBehavior::Exact => self.inbound.extend(payload),
            EchoBehavior::CorruptAt(k) => self.inbound.extend(
                payload
                    .iter()
                    .enumerate()
                    .map(|(i, &b)| if i == k { !b } else { b }),
            ),
            EchoBehavior::Silent => {}
        }
    }
}

impl SerialLink for SimulatedLink {
    fn write_all(&mut self, bytes: &[u8]) -> LedAnimResult<()> {
        lock_log(&self.log).written.extend_from_slice(bytes);
        self.received.extend_from_slice(bytes);
        self.answer_if_complete();
        Ok(())
    }

    fn discard_input(&mut self) -> LedAnimResult<()> {
        lock_log(&self.log).discarded += self.inbound.len();
        self.inbound.clear();
        Ok(())
    }

    fn read_exact_until(&mut self, buf: &mut [u8], deadline: Instant) -> LedAnimResult<()> {
        if self.inbound.len() < buf.len() {
            thread::sleep(deadline.saturating_duration_since(Instant::now()));
            return Err(LedAnimError::ProtocolTimeout {
                expected: buf.len(),
                received: self.inbound.len(),
            });
        }
        let wanted = buf.len();
        for (slot, byte) in buf.iter_mut().zip(self.inbound.drain(..wanted)) {
            *slot = byte;
        }
        Ok(())
    }
}

impl Drop for SimulatedLink {
    fn drop(&mut self) {
        lock_log(&self.log).closed += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/upload/sim.rs"]
mod tests;
