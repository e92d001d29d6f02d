//! thermal_listen - dump raw serial lines for a bounded window
//!
//! Wiring check: prints whatever the board is sending, no parsing.

use anyhow::Result;
use clap::Parser;
use std::time::{Duration, Instant};

use thermal_capture::source::open_line_source;
use thermal_capture::{CaptureConfig, LineSource};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Serial device path; discovered automatically when omitted.
    /// Pass "stub" for a synthetic source (no hardware).
    #[arg(long, env = "THERMAL_PORT")]
    port: Option<String>,
    /// How long to listen, in seconds.
    #[arg(long, default_value_t = 10)]
    seconds: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = CaptureConfig::load()?;
    if args.port.is_some() {
        cfg.port = args.port.clone();
    }

    let mut source = open_line_source(&cfg.serial(), cfg.height, cfg.width)?;

    eprintln!("Listening for {} seconds…", args.seconds);
    let deadline = Instant::now() + Duration::from_secs(args.seconds);
    let mut lines = 0u64;
    while Instant::now() < deadline {
        if let Some(line) = source.next_line()? {
            println!("{}", line);
            lines += 1;
        }
    }
    log::info!("received {} lines", lines);
    Ok(())
}
