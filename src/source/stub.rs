//! Synthetic frame source.
//!
//! Emits the same wire format as the firmware: a boot banner, then one CSV
//! line per pixel in row-major order, with a warm spot that drifts across
//! the sensor from frame to frame. Fully deterministic so tests can assert
//! exact output.

use anyhow::Result;
use std::collections::VecDeque;

use super::LineSource;

const BACKGROUND_TEMP: f64 = 21.0;
const SPOT_PEAK_TEMP: f64 = 9.0;
const SPOT_SPREAD: f64 = 18.0;

pub struct StubLineSource {
    height: usize,
    width: usize,
    frame_id: u32,
    queue: VecDeque<String>,
}

impl StubLineSource {
    pub fn new(height: usize, width: usize) -> Self {
        let mut queue = VecDeque::new();
        queue.push_back("MLX90640 ready".to_string());
        Self {
            height,
            width,
            frame_id: 0,
            queue,
        }
    }

    fn fill_frame(&mut self) {
        let spot_row = (self.frame_id as usize * 2) % self.height.max(1);
        let spot_col = (self.frame_id as usize * 3) % self.width.max(1);
        for i in 0..self.height * self.width {
            let row = i / self.width;
            let col = i % self.width;
            let dr = row as f64 - spot_row as f64;
            let dc = col as f64 - spot_col as f64;
            let temp = BACKGROUND_TEMP
                + SPOT_PEAK_TEMP * (-(dr * dr + dc * dc) / SPOT_SPREAD).exp();
            self.queue
                .push_back(format!("{},{},{},{:.2}", self.frame_id, row, col, temp));
        }
        self.frame_id = self.frame_id.wrapping_add(1);
    }
}

impl LineSource for StubLineSource {
    fn next_line(&mut self) -> Result<Option<String>> {
        if self.queue.is_empty() {
            self.fill_frame();
        }
        Ok(self.queue.pop_front())
    }
}
