//! thermal_capture - batch frame capture with interactive browsing
//!
//! This tool:
//! 1. Opens the configured serial port (or the synthetic stub source)
//! 2. Counts down, then captures the configured number of frames
//! 3. Shows a live rolling-window average while capturing
//! 4. Lets you browse captured frames in the terminal (n/p/q)
//! 5. Writes robust mean/median summary heatmaps as PNGs

use anyhow::{anyhow, Result};
use clap::Parser;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thermal_capture::render::{heatmap_ansi, heatmap_png, DEFAULT_CELL_PIXELS};
use thermal_capture::source::open_line_source;
use thermal_capture::{
    robust_stats, CaptureConfig, CaptureOutcome, CaptureSession, Grid, RollingWindow, SessionEvent,
};

#[path = "../ui.rs"]
mod ui;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Serial device path; discovered automatically when omitted.
    /// Pass "stub" for a synthetic source (no hardware).
    #[arg(long, env = "THERMAL_PORT")]
    port: Option<String>,
    /// Number of frames to capture (overrides config).
    #[arg(long)]
    frames: Option<usize>,
    /// Directory for summary heatmap PNGs.
    #[arg(long, default_value = "heatmaps")]
    output_dir: PathBuf,
    /// Skip the interactive frame browser.
    #[arg(long)]
    no_browse: bool,
    /// UI mode for stderr progress (auto|plain|pretty)
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = CaptureConfig::load()?;
    if args.port.is_some() {
        cfg.port = args.port.clone();
    }
    if let Some(frames) = args.frames {
        cfg.frames = frames;
    }

    let is_tty = std::io::stderr().is_terminal();
    let ui = ui::Ui::from_args(Some(&args.ui), is_tty);

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))?;
    }

    let mut source = open_line_source(&cfg.serial(), cfg.height, cfg.width)?;

    if cfg.countdown_secs > 0 {
        eprintln!("Capture starts in:");
    }
    let bar = ui.capture_bar(cfg.frames);
    let mut window = RollingWindow::new(cfg.window);

    let mut session = CaptureSession::new(cfg.clone()).with_stop_flag(stop);
    let report = session.run(source.as_mut(), &mut |event| match event {
        SessionEvent::CountdownTick(remaining) => ui.countdown_tick(remaining),
        SessionEvent::FrameStart { .. } => {}
        SessionEvent::FrameCaptured { index, total, grid } => {
            window.push(grid.clone());
            let status = window
                .mean()
                .and_then(|mean| mean.mean())
                .map(|avg| format!("rolling avg {:.1} °C", avg))
                .unwrap_or_default();
            bar.frame_done(index, total, &status);
        }
        SessionEvent::FrameTimedOut {
            index,
            hits,
            target,
        } => {
            bar.abandon(&format!(
                "frame {} timed out with {}/{} pixels",
                index, hits, target
            ));
        }
        SessionEvent::Stopped { .. } => bar.abandon("capture interrupted"),
    })?;

    if report.outcome == CaptureOutcome::Complete {
        bar.finish("capture complete");
    }
    if report.grids.is_empty() {
        return Err(anyhow!("no frames captured"));
    }
    log::info!("captured {} frames", report.grids.len());

    if !args.no_browse && std::io::stdin().is_terminal() {
        browse_frames(&report.grids)?;
    }

    let summary = robust_stats(&report.grids)?;
    std::fs::create_dir_all(&args.output_dir)?;
    let mean_path = args.output_dir.join("mean.png");
    let median_path = args.output_dir.join("median.png");
    heatmap_png(&summary.mean, &mean_path, DEFAULT_CELL_PIXELS)?;
    heatmap_png(&summary.median, &median_path, DEFAULT_CELL_PIXELS)?;

    println!("Robust mean of {} frames:", report.grids.len());
    print!("{}", heatmap_ansi(&summary.mean));
    println!("summary heatmaps written to {}", args.output_dir.display());
    Ok(())
}

fn browse_frames(grids: &[Grid]) -> Result<()> {
    let total = grids.len();
    let mut idx = 0;
    println!("Browse frames: [n]ext, [p]revious, [q]uit");

    loop {
        println!("Frame {}/{}", idx + 1, total);
        print!("{}", heatmap_ansi(&grids[idx]));
        print!("Command (n/p/q): ");
        std::io::stdout().flush()?;

        let mut cmd = String::new();
        if std::io::stdin().read_line(&mut cmd)? == 0 {
            break;
        }
        match cmd.trim().to_lowercase().as_str() {
            "n" => {
                if idx + 1 < total {
                    idx += 1;
                } else {
                    println!("Already at last frame.");
                }
            }
            "p" => {
                if idx > 0 {
                    idx -= 1;
                } else {
                    println!("Already at first frame.");
                }
            }
            "q" => break,
            _ => println!("Use 'n', 'p', or 'q'."),
        }
    }
    Ok(())
}
