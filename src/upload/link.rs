use std::{
    io::{ErrorKind, Read, Write},
    time::{Duration, Instant},
};

use crate::foundation::error::{LedAnimError, LedAnimResult};

/// Parity bit setting for the serial link.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    /// No parity bit.
    #[default]
    None,
    /// Odd parity.
    Odd,
    /// Even parity.
    Even,
}

/// Serial line parameters. Defaults match the controller: 9600 baud, 8N1.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LinkSettings {
    /// Line speed in bits per second.
    pub baud_rate: u32,
    /// Data bits per character, 5 to 8.
    pub data_bits: u8,
    /// Stop bits, 1 or 2.
    pub stop_bits: u8,
    /// Parity bit setting.
    pub parity: Parity,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: 8,
            stop_bits: 1,
            parity: Parity::None,
        }
    }
}

impl LinkSettings {
    /// Check that every field is something a serial driver accepts.
    pub fn validate(&self) -> LedAnimResult<()> {
        if self.baud_rate == 0 {
            return Err(LedAnimError::validation("baud rate must be non-zero"));
        }
        if !(5..=8).contains(&self.data_bits) {
            return Err(LedAnimError::validation(format!(
                "data bits must be 5..=8, got {}",
                self.data_bits
            )));
        }
        if !matches!(self.stop_bits, 1 | 2) {
            return Err(LedAnimError::validation(format!(
                "stop bits must be 1 or 2, got {}",
                self.stop_bits
            )));
        }
        Ok(())
    }
}

/// An open, configured byte link to a controller.
pub trait SerialLink: Send {
    /// Write every byte of `bytes`.
    fn write_all(&mut self, bytes: &[u8]) -> LedAnimResult<()>;

    /// Drop any bytes already queued on the input side.
    fn discard_input(&mut self) -> LedAnimResult<()>;

    /// Fill `buf` completely or fail with [`LedAnimError::ProtocolTimeout`] once `deadline`
    /// passes.
    fn read_exact_until(&mut self, buf: &mut [u8], deadline: Instant) -> LedAnimResult<()>;
}

/// Opens links by port name. The link closes when it is dropped.
pub trait PortOpener: Send + Sync {
    /// Open and configure `port`.
    fn open(&self, port: &str, settings: &LinkSettings) -> LedAnimResult<Box<dyn SerialLink>>;
}

/// [`PortOpener`] backed by the operating system's serial driver.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemSerial;

impl PortOpener for SystemSerial {
    fn open(&self, port: &str, settings: &LinkSettings) -> LedAnimResult<Box<dyn SerialLink>> {
        settings.validate()?;
        let handle = serialport::new(port, settings.baud_rate)
            .data_bits(data_bits(settings.data_bits)?)
            .stop_bits(if settings.stop_bits == 2 {
                serialport::StopBits::Two
            } else {
                serialport::StopBits::One
            })
            .parity(match settings.parity {
                Parity::None => serialport::Parity::None,
                Parity::Odd => serialport::Parity::Odd,
                Parity::Even => serialport::Parity::Even,
            })
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(100))
            .open()
            .map_err(|e| LedAnimError::port(format!("open '{port}': {e}")))?;
        tracing::debug!(port, baud = settings.baud_rate, "opened serial port");
        Ok(Box::new(SystemLink {
            name: port.to_string(),
            handle,
        }))
    }
}

fn data_bits(bits: u8) -> LedAnimResult<serialport::DataBits> {
    Ok(match bits {
        5 => serialport::DataBits::Five,
        6 => serialport::DataBits::Six,
        7 => serialport::DataBits::Seven,
        8 => serialport::DataBits::Eight,
        other => {
            return Err(LedAnimError::validation(format!(
                "data bits must be 5..=8, got {other}"
            )));
        }
    })
}

struct SystemLink {
    name: String,
    handle: Box<dyn serialport::SerialPort>,
}

impl SerialLink for SystemLink {
    fn write_all(&mut self, bytes: &[u8]) -> LedAnimResult<()> {
        self.handle
            .write_all(bytes)
            .and_then(|()| self.handle.flush())
            .map_err(|e| LedAnimError::port(format!("write to '{}': {e}", self.name)))
    }

    fn discard_input(&mut self) -> LedAnimResult<()> {
        self.handle
            .clear(serialport::ClearBuffer::Input)
            .map_err(|e| LedAnimError::port(format!("clear input of '{}': {e}", self.name)))
    }

    fn read_exact_until(&mut self, buf: &mut [u8], deadline: Instant) -> LedAnimResult<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(LedAnimError::ProtocolTimeout {
                    expected: buf.len(),
                    received: filled,
                });
            }
            self.handle
                .set_timeout(remaining)
                .map_err(|e| LedAnimError::port(format!("set timeout on '{}': {e}", self.name)))?;
            match self.handle.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(LedAnimError::port(format!(
                        "'{}' closed while reading",
                        self.name
                    )));
                }
                Ok(n) => filled += n,
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => {}
                Err(e) => {
                    return Err(LedAnimError::port(format!("read from '{}': {e}", self.name)));
                }
            }
        }
        Ok(())
    }
}

impl Drop for SystemLink {
    fn drop(&mut self) {
        tracing::debug!(port = %self.name, "closed serial port");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/upload/link.rs"]
mod tests;
