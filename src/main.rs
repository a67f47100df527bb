use anyhow::Result;
use clap::Parser;
use kumihan_dist::cli;
use log::info;

fn main() -> Result<()> {
    let args = cli::Args::parse();
    cli::init_logging(&args);
    info!("Starting kumihan-dist v{}", env!("CARGO_PKG_VERSION"));

    cli::run(args)
}
