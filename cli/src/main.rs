use anyhow::Result;
use clap::Parser;
use sift::{run, Args};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).init();
    let args = Args::parse();
    run(&args)
}
