use anyhow::Result;
use clap::Parser;
use latest_uploader::{Config, run};
use log::{LevelFilter, error, info};

/// Upload copies of the newest files under fixed names
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Scan and report winners without uploading anything
    #[arg(long)]
    dry_run: bool,

    /// Log every decision
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
    info!("Starting uploader");

    let config = Config::try_load(&args.config)?;
    run(&config, args.dry_run).inspect_err(|e| error!("{e:#}"))?;

    Ok(())
}
