//! # Serial Transmitter
//!
//! Writes one finished [`Frame`] to the node's serial device per call.
//!
//! The link is fire-and-forget: the device is opened immediately before the
//! write, the frame bytes go out with no extra terminator, and the device is
//! closed again before [`Transmitter::send`] returns. Nothing is read back.
//!
//! ```text
//! Idle -> Opening -> Writing -> Closed(Sent)
//! Idle -> Opening -> Failed(TransportError)
//! Idle -> Failed(NoPortSelected)
//! ```
//!
//! Failures never escape as errors; every path ends in a [`SendOutcome`].
//! Callers driving one physical port from several threads must serialize
//! their calls to `send`.
use std::fmt;
use std::io::Write;
use std::time::Duration;

use log::{debug, warn};

use crate::frame::Frame;

/// Fixed line rate expected by the node firmware.
pub const BAUD_RATE: u32 = 9600;
/// Upper bound on a single open/write.
pub const IO_TIMEOUT: Duration = Duration::from_secs(1);

/// Line settings for the node link. Framing is always 8-N-1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialSettings {
    pub baud_rate: u32,
    pub timeout: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: BAUD_RATE,
            timeout: IO_TIMEOUT,
        }
    }
}

/// Result of one send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    NoPortSelected,
    TransportError(String),
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent)
    }
}

impl fmt::Display for SendOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendOutcome::Sent => write!(f, "Sent successfully."),
            SendOutcome::NoPortSelected => write!(f, "No serial port selected."),
            SendOutcome::TransportError(msg) => write!(f, "Error: {}", msg),
        }
    }
}

/// Opens a writable handle to a named serial device.
///
/// The handle is dropped (closing the device) as soon as the frame is written.
pub trait PortOpener {
    fn open(&self, port: &str, settings: &SerialSettings) -> std::io::Result<Box<dyn Write + Send>>;
}

/// Opens real serial devices through the `serialport` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPorts;

impl PortOpener for SystemPorts {
    #[cfg(feature = "serial")]
    fn open(&self, port: &str, settings: &SerialSettings) -> std::io::Result<Box<dyn Write + Send>> {
        let device = serialport::new(port, settings.baud_rate)
            .timeout(settings.timeout)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None)
            .open()?;
        Ok(Box::new(device))
    }

    #[cfg(not(feature = "serial"))]
    fn open(&self, port: &str, _settings: &SerialSettings) -> std::io::Result<Box<dyn Write + Send>> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            format!("cannot open {}: built without the 'serial' feature", port),
        ))
    }
}

/// Enumerate serial devices known to the OS, for port pickers.
#[cfg(feature = "serial")]
pub fn list_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            warn!("Failed to enumerate serial ports: {}", e);
            Vec::new()
        }
    }
}

#[cfg(not(feature = "serial"))]
pub fn list_ports() -> Vec<String> {
    Vec::new()
}

#[derive(Debug, Clone)]
pub struct Transmitter<O = SystemPorts> {
    opener: O,
    settings: SerialSettings,
}

impl Transmitter<SystemPorts> {
    pub fn system() -> Self {
        Self::new(SystemPorts)
    }
}

impl<O: PortOpener> Transmitter<O> {
    pub fn new(opener: O) -> Self {
        Self {
            opener,
            settings: SerialSettings::default(),
        }
    }

    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }

    /// Write `frame` to `port` and report what happened. Blocks for at most
    /// the configured timeout.
    pub fn send(&self, port: &str, frame: &Frame) -> SendOutcome {
        if port.is_empty() {
            debug!("Send skipped: no port selected");
            return SendOutcome::NoPortSelected;
        }
        debug!(
            "Opening {} at {} baud (timeout {:?})",
            port, self.settings.baud_rate, self.settings.timeout
        );
        let mut device = match self.opener.open(port, &self.settings) {
            Ok(device) => device,
            Err(e) => {
                warn!("Failed to open serial port {}: {}", port, e);
                return SendOutcome::TransportError(format!("Failed to open serial port {}: {}", port, e));
            }
        };
        debug!("Writing {} byte(s) to {}", frame.as_bytes().len(), port);
        let written = device.write_all(frame.as_bytes()).and_then(|_| device.flush());
        drop(device);
        match written {
            Ok(()) => {
                debug!("Closed {} after write", port);
                SendOutcome::Sent
            }
            Err(e) => {
                warn!("Write to {} failed: {}", port, e);
                SendOutcome::TransportError(format!("Write to {} failed: {}", port, e))
            }
        }
    }
}
