//! Heatmap rendering.
//!
//! Two sinks over the `Grid` contract: PNG files (via the `image` crate)
//! and ANSI true-color terminal output for interactive browsing. Both draw
//! row 0 at the bottom, matching the sensor's origin convention, and label
//! the temperature scale in degrees Celsius.

use anyhow::{anyhow, Context, Result};
use image::{Rgb, RgbImage};
use std::path::Path;

use crate::grid::Grid;

/// Edge length in pixels of one grid cell in PNG output.
pub const DEFAULT_CELL_PIXELS: u32 = 20;

/// Perceptually-ordered gradient stops, cold to hot.
const GRADIENT: [(f64, [u8; 3]); 5] = [
    (0.0, [13, 8, 135]),
    (0.25, [126, 3, 168]),
    (0.5, [204, 71, 120]),
    (0.75, [248, 149, 64]),
    (1.0, [240, 249, 33]),
];

fn color_for(norm: f64) -> [u8; 3] {
    let norm = norm.clamp(0.0, 1.0);
    let mut lower = GRADIENT[0];
    for &stop in &GRADIENT[1..] {
        if norm <= stop.0 {
            let span = stop.0 - lower.0;
            let t = if span > 0.0 { (norm - lower.0) / span } else { 0.0 };
            let mut rgb = [0u8; 3];
            for (i, channel) in rgb.iter_mut().enumerate() {
                let a = lower.1[i] as f64;
                let b = stop.1[i] as f64;
                *channel = (a + (b - a) * t).round() as u8;
            }
            return rgb;
        }
        lower = stop;
    }
    GRADIENT[GRADIENT.len() - 1].1
}

/// Map a temperature into the gradient given the grid's value range. A
/// flat grid renders mid-scale.
fn normalize(temp: f64, min: f64, max: f64) -> f64 {
    if max > min {
        (temp - min) / (max - min)
    } else {
        0.5
    }
}

/// Write `grid` as a PNG heatmap, each cell scaled to `cell_px` square
/// pixels, row 0 at the bottom of the image.
pub fn heatmap_png(grid: &Grid, path: &Path, cell_px: u32) -> Result<()> {
    if grid.is_empty() || cell_px == 0 {
        return Err(anyhow!("nothing to render"));
    }
    let (min, max) = grid.min_max().ok_or_else(|| anyhow!("nothing to render"))?;

    let width = grid.width() as u32 * cell_px;
    let height = grid.height() as u32 * cell_px;
    let image = RgbImage::from_fn(width, height, |x, y| {
        let col = (x / cell_px) as usize;
        // Image y grows downward; flip so grid row 0 lands at the bottom.
        let row = grid.height() - 1 - (y / cell_px) as usize;
        Rgb(color_for(normalize(grid.get(row, col), min, max)))
    });

    image
        .save(path)
        .with_context(|| format!("write heatmap to {}", path.display()))?;
    Ok(())
}

/// Render `grid` as ANSI true-color terminal rows (two columns per cell),
/// row 0 at the bottom, with a °C scale line underneath.
pub fn heatmap_ansi(grid: &Grid) -> String {
    let Some((min, max)) = grid.min_max() else {
        return String::from("(empty grid)\n");
    };

    let mut out = String::new();
    for row in (0..grid.height()).rev() {
        for col in 0..grid.width() {
            let [r, g, b] = color_for(normalize(grid.get(row, col), min, max));
            out.push_str(&format!("\x1b[48;2;{};{};{}m  ", r, g, b));
        }
        out.push_str("\x1b[0m\n");
    }
    out.push_str(&format!("scale: {:.1} °C .. {:.1} °C\n", min, max));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_endpoints_match_stops() {
        assert_eq!(color_for(0.0), [13, 8, 135]);
        assert_eq!(color_for(1.0), [240, 249, 33]);
        assert_eq!(color_for(-1.0), [13, 8, 135]);
        assert_eq!(color_for(2.0), [240, 249, 33]);
    }

    #[test]
    fn flat_grid_normalizes_mid_scale() {
        assert_eq!(normalize(20.0, 20.0, 20.0), 0.5);
        assert_eq!(normalize(25.0, 20.0, 30.0), 0.5);
    }

    #[test]
    fn ansi_output_has_one_line_per_row_plus_scale() {
        let grid = Grid::from_rows(&[vec![10.0, 20.0], vec![30.0, 40.0]]);
        let out = heatmap_ansi(&grid);
        assert_eq!(out.lines().count(), 3);
        assert!(out.contains("°C"));
        assert!(out.contains("\x1b[48;2;"));
    }

    #[test]
    fn png_has_scaled_dimensions_and_bottom_origin() {
        let grid = Grid::from_rows(&[vec![10.0, 10.0], vec![40.0, 40.0]]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heatmap.png");
        heatmap_png(&grid, &path, 4).unwrap();

        let image = image::open(&path).unwrap().into_rgb8();
        assert_eq!(image.dimensions(), (8, 8));
        // Row 1 is the hot row and must appear at the TOP of the image.
        assert_eq!(*image.get_pixel(0, 0), Rgb(color_for(1.0)));
        assert_eq!(*image.get_pixel(0, 7), Rgb(color_for(0.0)));
    }

    #[test]
    fn empty_grid_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(heatmap_png(&Grid::new(0, 0), &dir.path().join("x.png"), 4).is_err());
    }
}
