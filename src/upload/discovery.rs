use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread,
};

use crate::foundation::error::{LedAnimError, LedAnimResult};

/// Source of serial port names.
pub trait PortEnumerator: Send + Sync {
    /// List port names currently present.
    fn list(&self) -> LedAnimResult<Vec<String>>;
}

/// Ports reported by the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemPorts;

impl PortEnumerator for SystemPorts {
    fn list(&self) -> LedAnimResult<Vec<String>> {
        let ports = serialport::available_ports()
            .map_err(|e| LedAnimError::port(format!("list serial ports: {e}")))?;
        Ok(ports.into_iter().map(|p| p.port_name).collect())
    }
}

/// Fixed list of port names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticPorts(pub Vec<String>);

impl PortEnumerator for StaticPorts {
    fn list(&self) -> LedAnimResult<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Which port names can belong to a controller.
///
/// Controllers pair over Bluetooth, so only the serial devices each OS creates for a Bluetooth
/// link are offered. Names are matched on their last path component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortFilter {
    /// Every port.
    Any,
    /// Linux RFCOMM devices: `rfcomm` followed by one to three digits.
    Rfcomm,
    /// macOS Bluetooth ttys: `tty.<name>-Dev<A-Z>`.
    BluetoothTty,
}

impl PortFilter {
    /// Filter for an OS name as reported by [`std::env::consts::OS`].
    pub fn for_os(os: &str) -> Self {
        match os {
            "linux" => Self::Rfcomm,
            "macos" => Self::BluetoothTty,
            _ => Self::Any,
        }
    }

    /// Filter for the OS this binary was built for.
    pub fn current() -> Self {
        Self::for_os(std::env::consts::OS)
    }

    /// Whether `port` passes the filter.
    pub fn matches(self, port: &str) -> bool {
        let name = port.rsplit(['/', '\\']).next().unwrap_or(port);
        match self {
            Self::Any => true,
            Self::Rfcomm => name.strip_prefix("rfcomm").is_some_and(|digits| {
                (1..=3).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
            }),
            Self::BluetoothTty => name
                .strip_prefix("tty.")
                .and_then(|rest| rest.strip_suffix(|c: char| c.is_ascii_uppercase()))
                .and_then(|rest| rest.strip_suffix("-Dev"))
                .is_some_and(|stem| !stem.is_empty()),
        }
    }

    /// Keep only matching ports, preserving order.
    pub fn apply(self, ports: impl IntoIterator<Item = String>) -> Vec<String> {
        ports.into_iter().filter(|p| self.matches(p)).collect()
    }
}

/// Pending result of [`spawn_discovery`]. Dropping it cancels the scan.
pub struct DiscoveryHandle {
    cancelled: Arc<AtomicBool>,
    rx: mpsc::Receiver<LedAnimResult<Vec<String>>>,
}

impl DiscoveryHandle {
    /// Tell the scan its result is no longer wanted.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Result, if the scan has finished.
    pub fn try_result(&self) -> Option<LedAnimResult<Vec<String>>> {
        self.rx.try_recv().ok()
    }

    /// Block until the scan finishes. Returns `None` if it was cancelled.
    pub fn wait(self) -> Option<LedAnimResult<Vec<String>>> {
        self.rx.recv().ok()
    }
}

impl Drop for DiscoveryHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// List and filter ports on a background thread.
pub fn spawn_discovery(
    enumerator: Arc<dyn PortEnumerator>,
    filter: PortFilter,
) -> LedAnimResult<DiscoveryHandle> {
    let cancelled = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel();
    let worker_cancelled = Arc::clone(&cancelled);

    thread::Builder::new()
        .name("port-discovery".to_string())
        .spawn(move || {
            let result = enumerator.list().map(|ports| filter.apply(ports));
            if worker_cancelled.load(Ordering::Acquire) {
                tracing::debug!("port discovery cancelled");
                return;
            }
            match &result {
                Ok(ports) => tracing::debug!(count = ports.len(), ?filter, "discovered ports"),
                Err(e) => tracing::warn!(error = %e, "port discovery failed"),
            }
            let _ = tx.send(result);
        })?;

    Ok(DiscoveryHandle { cancelled, rx })
}

#[cfg(test)]
#[path = "../../tests/unit/upload/discovery.rs"]
mod tests;
