use anyhow::{Context, Result};
use clap::Parser;
use replaylog_rs::{decode_into, export_json, read_replay_file, ConsoleSink, ReplayLog};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Decode a binary replay log and export it as JSON
#[derive(Parser)]
#[command(name = "replaylog")]
#[command(version)]
struct Cli {
    /// Replay file to decode
    input: PathBuf,

    /// Where to write the JSON document
    #[arg(short, long, default_value = "data/out/replay.json")]
    output: PathBuf,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,

    /// Only log decoded events, do not write JSON
    #[arg(long)]
    print: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let data = read_replay_file(&cli.input)?;

    let mut console = ConsoleSink::default();
    let termination = if cli.print {
        decode_into(&data, &mut console)
    } else {
        let mut log = ReplayLog::new();
        let termination = decode_into(&data, &mut (&mut console, &mut log));
        export_json(&log, &cli.output, cli.pretty)
            .with_context(|| format!("exporting {}", cli.input.display()))?;
        termination
    };

    if termination.is_clean() {
        info!(events = console.events_seen, "finished decoding");
    } else {
        warn!(events = console.events_seen, "stopped early: {termination}");
    }

    Ok(())
}
