mod config;
mod replay;
mod trace;

use std::{
    fs::File,
    io::{BufReader, Read},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use config::ConfigFile;
use replay::{replay, write_rows};
use trace::read_trace;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};
use trend_calculator::TrendCalculator;

/// Replay a recorded bandwidth trace through a trend calculator.
#[derive(Parser)]
struct CliArgs {
    /// trace file with `<now_ms> <sample> [force]` lines; reads stdin if absent or "-"
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// path to a YAML-based config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// how long a peak is held, overriding the config file
    #[arg(long)]
    peak_hold_ms: Option<u64>,

    /// print one JSON object per event
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive("trend_replay=info".parse()?)
                .from_env_lossy(),
        )
        .init();
    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    if let Some(peak_hold_ms) = args.peak_hold_ms {
        config.trend.peak_hold_ms = peak_hold_ms;
    }
    let json = args.json || config.json;

    let input: Box<dyn Read> = match &args.trace {
        Some(path) if path.as_os_str() != "-" => Box::new(
            File::open(path).with_context(|| format!("cannot open trace {}", path.display()))?,
        ),
        _ => Box::new(std::io::stdin()),
    };
    let events = read_trace(BufReader::new(input))?;
    tracing::info!(
        events = events.len(),
        peak_hold_ms = config.trend.peak_hold_ms,
        "replaying trace"
    );

    let mut calc = TrendCalculator::from(config.trend);
    let rows = replay(&mut calc, &events);
    write_rows(std::io::stdout().lock(), &rows, json)?;

    tracing::debug!(
        final_value = calc.value(),
        highest_value = calc.highest_value(),
        "replay done"
    );
    Ok(())
}
