use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

#[derive(Clone, Copy, Debug)]
pub enum UiMode {
    Auto,
    Plain,
    Pretty,
}

#[derive(Clone, Debug)]
pub struct Ui {
    mode: UiMode,
    is_tty: bool,
}

impl Ui {
    pub fn new(mode: UiMode, is_tty: bool) -> Self {
        Self { mode, is_tty }
    }

    pub fn from_args(ui_flag: Option<&str>, is_tty: bool) -> Self {
        let mode = match ui_flag {
            Some("plain") => UiMode::Plain,
            Some("pretty") => UiMode::Pretty,
            _ => UiMode::Auto,
        };
        Self::new(mode, is_tty)
    }

    fn use_pretty(&self) -> bool {
        match self.mode {
            UiMode::Pretty => true,
            UiMode::Plain => false,
            UiMode::Auto => self.is_tty,
        }
    }

    /// One countdown tick before capture starts.
    pub fn countdown_tick(&self, remaining: u64) {
        eprintln!("  {}", remaining);
    }

    /// Progress over the frames of one capture run.
    pub fn capture_bar(&self, total: usize) -> CaptureBar {
        if self.use_pretty() {
            let bar = ProgressBar::new(total as u64);
            bar.set_draw_target(ProgressDrawTarget::stderr());
            let style = ProgressStyle::with_template("{bar:32} {pos}/{len} frames {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style);
            CaptureBar { bar: Some(bar) }
        } else {
            CaptureBar { bar: None }
        }
    }
}

pub struct CaptureBar {
    bar: Option<ProgressBar>,
}

impl CaptureBar {
    /// Advance past a captured frame; `status` is the live average shown
    /// alongside the bar.
    pub fn frame_done(&self, index: usize, total: usize, status: &str) {
        match &self.bar {
            Some(bar) => {
                bar.set_message(status.to_string());
                bar.inc(1);
            }
            None => eprintln!("frame {}/{} done ({})", index, total, status),
        }
    }

    pub fn finish(&self, message: &str) {
        match &self.bar {
            Some(bar) => bar.finish_with_message(message.to_string()),
            None => eprintln!("{}", message),
        }
    }

    pub fn abandon(&self, message: &str) {
        match &self.bar {
            Some(bar) => bar.abandon_with_message(message.to_string()),
            None => eprintln!("{}", message),
        }
    }
}
