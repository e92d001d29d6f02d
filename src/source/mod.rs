//! Record-line sources.
//!
//! This module provides the transports the assembler pulls wire lines from:
//! - Serial ports (the MLX90640 board, via `serialport`)
//! - Stub source (synthetic frames for demos and tests)
//!
//! All sources implement [`LineSource`], a pull interface yielding "next
//! line or no-data poll". The source layer is responsible for:
//! - Opening the transport with exclusive access
//! - Flushing stale buffered input before the first read
//! - Splitting the byte stream into text lines (lossy ASCII decode)
//!
//! The source layer MUST NOT interpret line contents; parsing and bounds
//! policy live in `record` and `assemble`.

mod serial;
mod stub;

use anyhow::Result;

pub use serial::{discover_port, SerialConfig, SerialLineSource};
pub use stub::StubLineSource;

/// Port name that selects the synthetic stub source instead of real
/// hardware, in place of a device path.
pub const STUB_PORT: &str = "stub";

/// Pull interface over a line-oriented transport.
///
/// `Ok(None)` means "no data this poll": the transport's read timeout
/// elapsed without a complete line. Implementations block at most briefly
/// per call so callers can interleave their own deadline checks.
pub trait LineSource {
    fn next_line(&mut self) -> Result<Option<String>>;
}

/// Open the configured source: the stub generator for [`STUB_PORT`], a
/// discovered port when `config.port` is `None`, otherwise the named
/// serial device.
pub fn open_line_source(
    config: &SerialConfig,
    height: usize,
    width: usize,
) -> Result<Box<dyn LineSource>> {
    match config.port.as_deref() {
        Some(STUB_PORT) => Ok(Box::new(StubLineSource::new(height, width))),
        _ => Ok(Box::new(SerialLineSource::open(config)?)),
    }
}
