//! Robust aggregation over grid sequences.
//!
//! Two reductions, both purely computational:
//! - [`RollingWindow`]: bounded FIFO of the most recent grids with a
//!   per-cell arithmetic mean, for a live-updating average display.
//! - [`robust_stats`]: per-cell 3-sigma-clipped mean and median over a
//!   full capture, resistant to transient sensor spikes.
//!
//! Determinism: every accumulation walks the sequence in capture order, so
//! identical input produces bit-identical output. Standard deviation is
//! the population form (divide by N, not N-1).

use anyhow::{anyhow, Result};
use std::collections::VecDeque;

use crate::grid::Grid;

/// Bounded FIFO of the most recent grids.
///
/// Created empty, grows to `capacity`, then slides: pushing into a full
/// window evicts the oldest grid. Pushing a grid whose dimensions differ
/// from the buffered ones clears the window first.
pub struct RollingWindow {
    buffer: VecDeque<Grid>,
    capacity: usize,
}

impl RollingWindow {
    /// `capacity` must be at least 1.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "rolling window capacity must be at least 1");
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, grid: Grid) {
        if self.buffer.front().is_some_and(|g| !g.same_dims(&grid)) {
            log::warn!("grid dimensions changed; clearing rolling window");
            self.buffer.clear();
        }
        while self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(grid);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&Grid> {
        self.buffer.back()
    }

    /// Per-cell arithmetic mean over the window contents, oldest to
    /// newest. `None` when the window is empty.
    pub fn mean(&self) -> Option<Grid> {
        let first = self.buffer.front()?;
        let mut sums = vec![0.0f64; first.len()];
        for grid in &self.buffer {
            for (sum, &temp) in sums.iter_mut().zip(grid.cells()) {
                *sum += temp;
            }
        }
        let n = self.buffer.len() as f64;
        let mut mean = Grid::new(first.height(), first.width());
        for row in 0..first.height() {
            for col in 0..first.width() {
                mean.set(row, col, sums[row * first.width() + col] / n);
            }
        }
        Some(mean)
    }
}

/// Outlier-clipped summary of a grid sequence.
pub struct RobustSummary {
    pub mean: Grid,
    pub median: Grid,
}

/// Per-cell 3-sigma-clipped mean and median over `grids`.
///
/// For each cell: compute mean and population standard deviation across
/// the sequence, drop samples deviating from the mean by more than three
/// standard deviations, and recompute mean and median from the survivors.
/// A cell whose samples are all flagged (only possible through numerical
/// degeneracy) falls back to its unfiltered mean and median.
///
/// A length-1 sequence has zero deviation everywhere, so nothing is
/// clipped and mean = median = the single grid.
pub fn robust_stats(grids: &[Grid]) -> Result<RobustSummary> {
    let first = grids
        .first()
        .ok_or_else(|| anyhow!("robust statistics require at least one grid"))?;
    if let Some(bad) = grids.iter().find(|g| !g.same_dims(first)) {
        return Err(anyhow!(
            "grid dimension mismatch in sequence: {}x{} vs {}x{}",
            bad.height(),
            bad.width(),
            first.height(),
            first.width()
        ));
    }

    let n = grids.len() as f64;
    let mut mean = Grid::new(first.height(), first.width());
    let mut median = Grid::new(first.height(), first.width());

    let mut samples = Vec::with_capacity(grids.len());
    for row in 0..first.height() {
        for col in 0..first.width() {
            samples.clear();
            samples.extend(grids.iter().map(|g| g.get(row, col)));

            let cell_mean = samples.iter().sum::<f64>() / n;
            let variance = samples
                .iter()
                .map(|&v| (v - cell_mean) * (v - cell_mean))
                .sum::<f64>()
                / n;
            let cell_std = variance.sqrt();

            let (robust_mean, robust_median) = clipped_cell(&samples, cell_mean, cell_std);
            mean.set(row, col, robust_mean);
            median.set(row, col, robust_median);
        }
    }

    Ok(RobustSummary { mean, median })
}

/// Mean and median of the samples surviving the 3-sigma clip, falling back
/// to the unfiltered statistics when no sample survives.
fn clipped_cell(samples: &[f64], mean: f64, std: f64) -> (f64, f64) {
    let survivors: Vec<f64> = samples
        .iter()
        .copied()
        .filter(|v| (v - mean).abs() <= 3.0 * std)
        .collect();
    if survivors.is_empty() {
        (mean, median_of(samples))
    } else {
        let robust_mean = survivors.iter().sum::<f64>() / survivors.len() as f64;
        (robust_mean, median_of(&survivors))
    }
}

/// Median with the even-count convention of averaging the two middle
/// values. Callers guarantee non-empty, finite samples.
fn median_of(samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(height: usize, width: usize, temp: f64) -> Grid {
        let mut grid = Grid::new(height, width);
        for row in 0..height {
            for col in 0..width {
                grid.set(row, col, temp);
            }
        }
        grid
    }

    #[test]
    fn window_slides_past_capacity() {
        let mut window = RollingWindow::new(2);
        window.push(flat(1, 1, 1.0));
        window.push(flat(1, 1, 2.0));
        window.push(flat(1, 1, 3.0));
        assert_eq!(window.len(), 2);
        // Oldest grid (1.0) evicted; mean reflects only the newest two.
        assert_eq!(window.mean().unwrap().get(0, 0), 2.5);
        assert_eq!(window.latest().unwrap().get(0, 0), 3.0);
    }

    #[test]
    fn empty_window_has_no_mean() {
        let window = RollingWindow::new(3);
        assert!(window.mean().is_none());
        assert!(window.is_empty());
    }

    #[test]
    fn dimension_change_resets_window() {
        let mut window = RollingWindow::new(4);
        window.push(flat(2, 2, 5.0));
        window.push(flat(3, 3, 7.0));
        assert_eq!(window.len(), 1);
        assert_eq!(window.mean().unwrap().get(0, 0), 7.0);
    }

    #[test]
    fn identical_grids_survive_untouched() {
        let grid = Grid::from_rows(&[vec![10.0, 20.0], vec![30.0, 40.0]]);
        for n in [1, 2, 5] {
            let grids = vec![grid.clone(); n];
            let summary = robust_stats(&grids).unwrap();
            assert_eq!(summary.mean, grid, "mean for n={}", n);
            assert_eq!(summary.median, grid, "median for n={}", n);
        }
    }

    #[test]
    fn single_spike_is_clipped_without_touching_other_cells() {
        // One spike among 12 samples deviates by sqrt(11) sigma > 3 sigma.
        let mut grids = vec![flat(2, 2, 20.0); 12];
        grids[3].set(0, 1, 1000.0);

        let summary = robust_stats(&grids).unwrap();
        assert_eq!(summary.mean.get(0, 1), 20.0);
        assert_eq!(summary.median.get(0, 1), 20.0);
        assert_eq!(summary.mean.get(0, 0), 20.0);
        assert_eq!(summary.mean.get(1, 0), 20.0);
        assert_eq!(summary.mean.get(1, 1), 20.0);
    }

    #[test]
    fn all_outlier_cell_falls_back_to_unfiltered_stats() {
        // Degenerate by construction: a mean/std pair that flags every
        // sample. The fallback must report the unfiltered statistics.
        let (mean, median) = clipped_cell(&[10.0, 10.0, 14.0], 100.0, 1.0);
        assert_eq!(mean, 100.0);
        assert_eq!(median, 10.0);
    }

    #[test]
    fn median_averages_middle_pair() {
        assert_eq!(median_of(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(median_of(&[3.0, 1.0, 2.0]), 2.0);
    }

    #[test]
    fn empty_sequence_is_an_error() {
        assert!(robust_stats(&[]).is_err());
    }

    #[test]
    fn mismatched_dimensions_are_an_error() {
        let grids = vec![flat(2, 2, 1.0), flat(2, 3, 1.0)];
        assert!(robust_stats(&grids).is_err());
    }
}
