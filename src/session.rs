//! Capture-session orchestration.
//!
//! A [`CaptureSession`] drives the assembler once per frame:
//! Idle -> Countdown -> Capturing(i) -> Complete | TimedOut. A frame
//! timeout ends the session but keeps the frames already collected; an
//! external stop flag (ctrl-c) is honored between frames only, never
//! mid-assembly.
//!
//! UI layers observe progress through [`SessionEvent`] callbacks and the
//! grids in the final [`CaptureReport`]; they never see the assembler's
//! internal accumulators.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::assemble::{FrameAssembler, FrameTimeout};
use crate::config::CaptureConfig;
use crate::grid::Grid;
use crate::source::LineSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Countdown,
    /// 1-based index of the frame currently being assembled.
    Capturing(usize),
    Complete,
    TimedOut,
}

/// Progress notifications for UI layers.
pub enum SessionEvent<'a> {
    /// Seconds remaining before capture starts.
    CountdownTick(u64),
    FrameStart {
        index: usize,
        total: usize,
    },
    FrameCaptured {
        index: usize,
        total: usize,
        grid: &'a Grid,
    },
    FrameTimedOut {
        index: usize,
        hits: usize,
        target: usize,
    },
    Stopped {
        index: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// All requested frames were captured.
    Complete,
    /// Frame `frame_index` timed out with `hits` pixels; earlier frames
    /// are retained.
    TimedOut { frame_index: usize, hits: usize },
    /// Stop flag raised between frames.
    Stopped { frame_index: usize },
}

pub struct CaptureReport {
    pub grids: Vec<Grid>,
    pub outcome: CaptureOutcome,
}

pub struct CaptureSession {
    config: CaptureConfig,
    state: SessionState,
    stop: Option<Arc<AtomicBool>>,
}

impl CaptureSession {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            state: SessionState::Idle,
            stop: None,
        }
    }

    /// Install a flag checked between frames; when set, the session stops
    /// and returns the frames collected so far.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Run one full capture: countdown, then up to `config.frames`
    /// assemblies. Source I/O errors abort and propagate; a frame timeout
    /// ends the session normally with a `TimedOut` outcome.
    pub fn run(
        &mut self,
        source: &mut dyn LineSource,
        on_event: &mut dyn FnMut(SessionEvent<'_>),
    ) -> Result<CaptureReport> {
        if self.config.countdown_secs > 0 {
            self.state = SessionState::Countdown;
            for remaining in (1..=self.config.countdown_secs).rev() {
                on_event(SessionEvent::CountdownTick(remaining));
                std::thread::sleep(Duration::from_secs(1));
            }
        }

        let assembler = FrameAssembler::new(
            self.config.height,
            self.config.width,
            self.config.frame_timeout,
        );
        let total = self.config.frames;
        let mut grids = Vec::with_capacity(total);

        for index in 1..=total {
            if self.stop_requested() {
                log::info!("stop requested; ending capture before frame {}", index);
                on_event(SessionEvent::Stopped { index });
                self.state = SessionState::Complete;
                return Ok(CaptureReport {
                    grids,
                    outcome: CaptureOutcome::Stopped { frame_index: index },
                });
            }

            self.state = SessionState::Capturing(index);
            on_event(SessionEvent::FrameStart { index, total });

            match assembler.assemble(source) {
                Ok(grid) => {
                    on_event(SessionEvent::FrameCaptured {
                        index,
                        total,
                        grid: &grid,
                    });
                    grids.push(grid);
                }
                Err(e) => match e.downcast_ref::<FrameTimeout>() {
                    Some(timeout) => {
                        log::warn!("frame {}/{}: {}", index, total, timeout);
                        on_event(SessionEvent::FrameTimedOut {
                            index,
                            hits: timeout.hits,
                            target: timeout.target,
                        });
                        self.state = SessionState::TimedOut;
                        return Ok(CaptureReport {
                            grids,
                            outcome: CaptureOutcome::TimedOut {
                                frame_index: index,
                                hits: timeout.hits,
                            },
                        });
                    }
                    None => return Err(e),
                },
            }
        }

        self.state = SessionState::Complete;
        Ok(CaptureReport {
            grids,
            outcome: CaptureOutcome::Complete,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StubLineSource;
    use std::collections::VecDeque;

    struct ScriptedSource {
        lines: VecDeque<String>,
    }

    impl ScriptedSource {
        fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|l| l.to_string()).collect(),
            }
        }
    }

    impl LineSource for ScriptedSource {
        fn next_line(&mut self) -> Result<Option<String>> {
            Ok(self.lines.pop_front())
        }
    }

    fn test_config(height: usize, width: usize, frames: usize) -> CaptureConfig {
        CaptureConfig {
            height,
            width,
            frames,
            countdown_secs: 0,
            frame_timeout: Duration::from_millis(50),
            ..CaptureConfig::default()
        }
    }

    #[test]
    fn captures_requested_frames_from_stub() {
        let mut source = StubLineSource::new(4, 4);
        let mut session = CaptureSession::new(test_config(4, 4, 3));
        let mut captured = 0;
        let report = session
            .run(&mut source, &mut |event| {
                if let SessionEvent::FrameCaptured { .. } = event {
                    captured += 1;
                }
            })
            .unwrap();

        assert_eq!(report.outcome, CaptureOutcome::Complete);
        assert_eq!(report.grids.len(), 3);
        assert_eq!(captured, 3);
        assert_eq!(session.state(), SessionState::Complete);
    }

    #[test]
    fn timeout_retains_earlier_frames() {
        // One complete 2x2 frame, then silence.
        let mut source =
            ScriptedSource::new(&["0,0,0,10.0", "0,0,1,20.0", "0,1,0,30.0", "0,1,1,40.0"]);
        let mut session = CaptureSession::new(test_config(2, 2, 3));
        let report = session.run(&mut source, &mut |_| {}).unwrap();

        assert_eq!(report.grids.len(), 1);
        assert_eq!(
            report.outcome,
            CaptureOutcome::TimedOut {
                frame_index: 2,
                hits: 0
            }
        );
        assert_eq!(session.state(), SessionState::TimedOut);
    }

    #[test]
    fn stop_flag_ends_capture_between_frames() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut source = StubLineSource::new(2, 2);
        let mut session =
            CaptureSession::new(test_config(2, 2, 5)).with_stop_flag(Arc::clone(&flag));
        let report = session.run(&mut source, &mut |_| {}).unwrap();

        assert!(report.grids.is_empty());
        assert_eq!(report.outcome, CaptureOutcome::Stopped { frame_index: 1 });
    }
}
