use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod pipeline;

use cli::Args;
use config::{FileConfig, RunConfig};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let config = RunConfig::resolve(args, file)?;

    pipeline::run(&config)
}
