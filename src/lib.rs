//! Thermal frame capture and aggregation.
//!
//! This crate captures 32x24 thermal frames from a serial-connected
//! MLX90640 board streaming one pixel per CSV line, and reduces captured
//! frames into outlier-robust summary heatmaps.
//!
//! # Architecture
//!
//! Data flows one way:
//!
//! raw line stream -> `FrameAssembler` -> grids -> aggregation -> rendering
//!
//! Everything is single-threaded and synchronous. The only blocking
//! operation is frame assembly, bounded by the configured per-frame
//! timeout; aggregation and rendering are pure computation over
//! already-materialized grids.
//!
//! # Module Structure
//!
//! - `source`: line transports (serial port, synthetic stub)
//! - `record`: wire-format parsing and bounds checks
//! - `assemble`: per-frame assembly under a timeout budget
//! - `aggregate`: rolling-window mean and 3-sigma-clipped statistics
//! - `session`: capture-session state machine
//! - `render`: PNG and ANSI heatmap sinks
//! - `config`: defaults + TOML file + environment overrides

pub mod aggregate;
pub mod assemble;
pub mod config;
pub mod grid;
pub mod record;
pub mod render;
pub mod session;
pub mod source;

pub use aggregate::{robust_stats, RobustSummary, RollingWindow};
pub use assemble::{FrameAssembler, FrameTimeout};
pub use config::CaptureConfig;
pub use grid::{Grid, MISSING_TEMP};
pub use record::Record;
pub use session::{CaptureOutcome, CaptureReport, CaptureSession, SessionEvent, SessionState};
pub use source::{discover_port, LineSource, SerialConfig, SerialLineSource, StubLineSource};
