//! Frame assembly.
//!
//! [`FrameAssembler`] turns a live record stream into one completed
//! [`Grid`], bounded by a wall-clock timeout. The stream is noisy: boot
//! banners, blank polls, corrupted lines, out-of-range indices, and
//! duplicate hits on the same cell are all expected and survived.
//!
//! Policies, in one place:
//! - Duplicate hits on a cell combine by running arithmetic mean
//!   (sum/count accumulator).
//! - Completion is count-based: assembly succeeds once the total number of
//!   accepted records reaches `height * width`, even when duplicates mean
//!   some cells were never hit. Zero-hit cells are filled with
//!   [`MISSING_TEMP`] on success.
//! - Parse and bounds failures never abort assembly; only the timeout
//!   bounds a stream that refuses to fill a frame.

use anyhow::Result;
use std::time::{Duration, Instant};

use crate::grid::{Grid, MISSING_TEMP};
use crate::record::Record;
use crate::source::LineSource;

/// Frame assembly did not complete within its budget.
///
/// Carries the partial hit count for diagnostics. No partial grid is
/// produced; the accumulator is discarded.
#[derive(Debug)]
pub struct FrameTimeout {
    pub hits: usize,
    pub target: usize,
    pub timeout: Duration,
}

impl std::fmt::Display for FrameTimeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "timed out after {:.1}s, got {}/{} pixels",
            self.timeout.as_secs_f64(),
            self.hits,
            self.target
        )
    }
}

impl std::error::Error for FrameTimeout {}

/// Per-cell accumulator state held only while one frame is in flight.
struct FrameBuffer {
    width: usize,
    sums: Vec<f64>,
    counts: Vec<u32>,
    hits: usize,
}

impl FrameBuffer {
    fn new(height: usize, width: usize) -> Self {
        Self {
            width,
            sums: vec![0.0; height * width],
            counts: vec![0; height * width],
            hits: 0,
        }
    }

    fn record(&mut self, record: &Record) {
        let i = record.row * self.width + record.col;
        self.sums[i] += record.temperature;
        self.counts[i] += 1;
        self.hits += 1;
    }

    fn finalize(self, height: usize, width: usize) -> Grid {
        let mut grid = Grid::new(height, width);
        for row in 0..height {
            for col in 0..width {
                let i = row * width + col;
                if self.counts[i] > 0 {
                    grid.set(row, col, self.sums[i] / self.counts[i] as f64);
                } else {
                    grid.set(row, col, MISSING_TEMP);
                }
            }
        }
        grid
    }
}

/// Assembles one grid per call from a [`LineSource`].
pub struct FrameAssembler {
    height: usize,
    width: usize,
    timeout: Duration,
}

impl FrameAssembler {
    pub fn new(height: usize, width: usize, timeout: Duration) -> Self {
        Self {
            height,
            width,
            timeout,
        }
    }

    /// Pull lines until `height * width` valid pixel records have been
    /// accepted, then return the averaged grid.
    ///
    /// Fails with [`FrameTimeout`] if the budget elapses first; source I/O
    /// errors propagate as-is. Blocks the caller for at most roughly the
    /// configured timeout.
    pub fn assemble(&self, source: &mut dyn LineSource) -> Result<Grid> {
        let target = self.height * self.width;
        let mut buffer = FrameBuffer::new(self.height, self.width);
        let start = Instant::now();

        while buffer.hits < target {
            if start.elapsed() > self.timeout {
                return Err(FrameTimeout {
                    hits: buffer.hits,
                    target,
                    timeout: self.timeout,
                }
                .into());
            }

            let Some(line) = source.next_line()? else {
                continue;
            };
            if line.trim().is_empty() {
                continue;
            }
            let Some(record) = Record::parse(&line) else {
                log::debug!("skipping malformed line: {:?}", line);
                continue;
            };
            if !record.in_bounds(self.height, self.width) {
                log::debug!(
                    "skipping out-of-range record ({},{})",
                    record.row,
                    record.col
                );
                continue;
            }
            buffer.record(&record);
        }

        Ok(buffer.finalize(self.height, self.width))
    }
}
