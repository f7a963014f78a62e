//! Pagesmith CLI: grow a topic bank, generate one worked-example page per
//! run, and keep every page wrapped in the shared site shell.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
