//! thermal_plot - capture a single frame and write a heatmap PNG

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use thermal_capture::render::{heatmap_ansi, heatmap_png, DEFAULT_CELL_PIXELS};
use thermal_capture::source::open_line_source;
use thermal_capture::{CaptureConfig, FrameAssembler};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Serial device path; discovered automatically when omitted.
    /// Pass "stub" for a synthetic source (no hardware).
    #[arg(long, env = "THERMAL_PORT")]
    port: Option<String>,
    /// Output PNG path.
    #[arg(long, default_value = "thermal_frame.png")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = CaptureConfig::load()?;
    if args.port.is_some() {
        cfg.port = args.port.clone();
    }

    let mut source = open_line_source(&cfg.serial(), cfg.height, cfg.width)?;
    let assembler = FrameAssembler::new(cfg.height, cfg.width, cfg.frame_timeout);

    eprintln!("Reading one frame of data…");
    let grid = assembler.assemble(source.as_mut())?;

    print!("{}", heatmap_ansi(&grid));
    heatmap_png(&grid, &args.output, DEFAULT_CELL_PIXELS)?;
    println!("heatmap written to {}", args.output.display());
    Ok(())
}
