//! Serial-port line source.

use anyhow::{anyhow, Context, Result};
use serialport::{ClearBuffer, SerialPort};
use std::io::Read;
use std::time::Duration;

use super::LineSource;

/// Cap on buffered bytes with no newline in sight. A flood of garbage
/// (wrong baud rate, binary noise) gets discarded instead of growing the
/// buffer without bound.
const MAX_PENDING_BYTES: usize = 64 * 1024;

const READ_CHUNK_BYTES: usize = 512;

/// Configuration for a serial line source.
#[derive(Clone, Debug)]
pub struct SerialConfig {
    /// Device path. `None` triggers discovery.
    pub port: Option<String>,
    pub baud: u32,
    /// Per-read timeout; bounds how long one `next_line` poll can block.
    pub read_timeout: Duration,
    /// Wait after opening before the first read, so a board that resets on
    /// port-open has finished booting.
    pub settle: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: 115_200,
            read_timeout: Duration::from_secs(1),
            settle: Duration::from_secs(2),
        }
    }
}

/// Scan attached ports for the typical USB-CDC device names.
pub fn discover_port() -> Result<String> {
    let ports = serialport::available_ports().context("enumerate serial ports")?;
    for port in &ports {
        if port.port_name.contains("usbmodem") || port.port_name.contains("ttyACM") {
            return Ok(port.port_name.clone());
        }
    }
    Err(anyhow!(
        "no thermal camera port found among {} ports; is the board plugged in and not held open elsewhere?",
        ports.len()
    ))
}

/// A [`LineSource`] over an exclusively-opened serial port.
///
/// Bytes are accumulated and split on `\n`; carriage returns and trailing
/// whitespace are stripped, and decoding is lossy so stray non-ASCII bytes
/// cannot abort a capture.
pub struct SerialLineSource {
    port: Box<dyn SerialPort>,
    pending: Vec<u8>,
}

impl SerialLineSource {
    /// Open the configured port (discovering one if unset), wait for the
    /// board to settle, and drop any stale buffered input.
    ///
    /// Failure here is fatal for a capture session: the caller surfaces it
    /// immediately rather than retrying.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let port_name = match &config.port {
            Some(name) => name.clone(),
            None => discover_port()?,
        };
        log::info!("opening {} at {} baud", port_name, config.baud);

        let port = serialport::new(port_name.as_str(), config.baud)
            .timeout(config.read_timeout)
            .open()
            .with_context(|| format!("open serial port {}", port_name))?;

        if !config.settle.is_zero() {
            std::thread::sleep(config.settle);
        }
        port.clear(ClearBuffer::Input)
            .with_context(|| format!("flush stale input on {}", port_name))?;

        Ok(Self {
            port,
            pending: Vec::with_capacity(READ_CHUNK_BYTES),
        })
    }

    fn take_buffered_line(&mut self) -> Option<String> {
        let pos = self.pending.iter().position(|&b| b == b'\n')?;
        let raw: Vec<u8> = self.pending.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&raw).trim_end().to_string();
        Some(line)
    }
}

impl LineSource for SerialLineSource {
    fn next_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.take_buffered_line() {
            return Ok(Some(line));
        }

        let mut chunk = [0u8; READ_CHUNK_BYTES];
        match self.port.read(&mut chunk) {
            Ok(0) => Ok(None),
            Ok(n) => {
                self.pending.extend_from_slice(&chunk[..n]);
                if self.pending.len() > MAX_PENDING_BYTES {
                    log::warn!(
                        "discarding {} unterminated bytes from serial buffer",
                        self.pending.len()
                    );
                    self.pending.clear();
                }
                Ok(self.take_buffered_line())
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e).context("read from serial port"),
        }
    }
}
