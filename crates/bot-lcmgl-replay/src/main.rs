#![forbid(unsafe_code)]

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use bot_lcmgl::DecoderConfig;
use bot_lcmgl_replay::{replay_files, OutputFormat, ReplaySession};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "lcmgl-replay",
    about = "Decode captured LCMGL buffers and print the resulting graphics calls."
)]
struct Args {
    /// Captured buffers, decoded in order
    #[arg(required = true, value_name = "BUFFER")]
    inputs: Vec<PathBuf>,

    /// Print JSON lines instead of text
    #[arg(long, action = clap::ArgAction::SetTrue)]
    json: bool,

    /// Decode every buffer with a fresh session instead of sharing textures and display lists
    #[arg(long, action = clap::ArgAction::SetTrue)]
    independent: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = DecoderConfig::from_env().context("load decoder limits")?;
    let format = if args.json {
        OutputFormat::JsonLines
    } else {
        OutputFormat::Text
    };

    let mut session = ReplaySession::new(config).independent(args.independent);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = replay_files(&args.inputs, &mut session, &mut out, format)?;
    out.flush()?;

    if report.failures > 0 {
        bail!(
            "{} of {} buffers failed to decode",
            report.failures,
            report.buffers
        );
    }
    Ok(())
}
