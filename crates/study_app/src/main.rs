use anyhow::{Context, Result};
use clap::Parser;
use study_app::platform::cli::{self, Cli};

fn main() -> Result<()> {
    let args = Cli::parse();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    runtime.block_on(cli::run(args))
}
