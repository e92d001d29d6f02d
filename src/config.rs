use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::source::SerialConfig;

const DEFAULT_BAUD: u32 = 115_200;
const DEFAULT_WIDTH: usize = 32;
const DEFAULT_HEIGHT: usize = 24;
const DEFAULT_FRAMES: usize = 10;
const DEFAULT_FRAME_TIMEOUT_SECS: f64 = 3.0;
const DEFAULT_WINDOW: usize = 5;
const DEFAULT_COUNTDOWN_SECS: u64 = 5;

#[derive(Debug, Deserialize, Default)]
struct CaptureConfigFile {
    port: Option<String>,
    baud: Option<u32>,
    grid: Option<GridConfigFile>,
    capture: Option<CaptureSectionFile>,
}

#[derive(Debug, Deserialize, Default)]
struct GridConfigFile {
    width: Option<usize>,
    height: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct CaptureSectionFile {
    frames: Option<usize>,
    frame_timeout_secs: Option<f64>,
    window: Option<usize>,
    countdown_secs: Option<u64>,
}

/// Resolved capture configuration.
///
/// Layering, lowest to highest precedence: built-in defaults, the TOML
/// file named by `THERMAL_CONFIG`, then `THERMAL_*` environment overrides.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Serial device path; `None` means autodiscover.
    pub port: Option<String>,
    pub baud: u32,
    pub width: usize,
    pub height: usize,
    /// Number of frames a capture session collects.
    pub frames: usize,
    /// Per-frame assembly budget.
    pub frame_timeout: Duration,
    /// Rolling-window capacity for the live average.
    pub window: usize,
    /// Seconds counted down before capture starts.
    pub countdown_secs: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: DEFAULT_BAUD,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            frames: DEFAULT_FRAMES,
            frame_timeout: Duration::from_secs_f64(DEFAULT_FRAME_TIMEOUT_SECS),
            window: DEFAULT_WINDOW,
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
        }
    }
}

impl CaptureConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("THERMAL_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: CaptureConfigFile) -> Result<Self> {
        let defaults = Self::default();
        let frame_timeout = match file.capture.as_ref().and_then(|c| c.frame_timeout_secs) {
            Some(secs) => {
                if !secs.is_finite() || secs <= 0.0 {
                    return Err(anyhow!("frame_timeout_secs must be a positive number"));
                }
                Duration::from_secs_f64(secs)
            }
            None => defaults.frame_timeout,
        };
        Ok(Self {
            port: file.port,
            baud: file.baud.unwrap_or(defaults.baud),
            width: file
                .grid
                .as_ref()
                .and_then(|grid| grid.width)
                .unwrap_or(defaults.width),
            height: file
                .grid
                .as_ref()
                .and_then(|grid| grid.height)
                .unwrap_or(defaults.height),
            frames: file
                .capture
                .as_ref()
                .and_then(|capture| capture.frames)
                .unwrap_or(defaults.frames),
            frame_timeout,
            window: file
                .capture
                .as_ref()
                .and_then(|capture| capture.window)
                .unwrap_or(defaults.window),
            countdown_secs: file
                .capture
                .and_then(|capture| capture.countdown_secs)
                .unwrap_or(defaults.countdown_secs),
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("THERMAL_PORT") {
            if !port.trim().is_empty() {
                self.port = Some(port);
            }
        }
        if let Ok(baud) = std::env::var("THERMAL_BAUD") {
            self.baud = baud
                .parse()
                .map_err(|_| anyhow!("THERMAL_BAUD must be an integer baud rate"))?;
        }
        if let Ok(frames) = std::env::var("THERMAL_FRAMES") {
            self.frames = frames
                .parse()
                .map_err(|_| anyhow!("THERMAL_FRAMES must be an integer frame count"))?;
        }
        if let Ok(secs) = std::env::var("THERMAL_FRAME_TIMEOUT_SECS") {
            let secs: f64 = secs
                .parse()
                .map_err(|_| anyhow!("THERMAL_FRAME_TIMEOUT_SECS must be a number of seconds"))?;
            if !secs.is_finite() || secs < 0.0 {
                return Err(anyhow!("THERMAL_FRAME_TIMEOUT_SECS must be non-negative"));
            }
            self.frame_timeout = Duration::from_secs_f64(secs);
        }
        if let Ok(window) = std::env::var("THERMAL_WINDOW") {
            self.window = window
                .parse()
                .map_err(|_| anyhow!("THERMAL_WINDOW must be an integer window size"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(anyhow!("grid dimensions must be non-zero"));
        }
        if self.frames == 0 {
            return Err(anyhow!("frame count must be at least 1"));
        }
        if self.window == 0 {
            return Err(anyhow!("rolling window size must be at least 1"));
        }
        if self.baud == 0 {
            return Err(anyhow!("baud rate must be non-zero"));
        }
        if self.frame_timeout.is_zero() {
            return Err(anyhow!("frame timeout must be greater than zero"));
        }
        Ok(())
    }

    /// Serial transport settings for this capture configuration.
    pub fn serial(&self) -> SerialConfig {
        SerialConfig {
            port: self.port.clone(),
            baud: self.baud,
            ..SerialConfig::default()
        }
    }
}

fn read_config_file(path: &Path) -> Result<CaptureConfigFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let cfg = toml::from_str(&raw)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(cfg)
}
