//! docpress CLI — documentation-site-to-PDF tool.
//!
//! Crawls a chain of next-linked documentation pages, assembles them into
//! one document, and prints it to PDF with a headless browser.

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
