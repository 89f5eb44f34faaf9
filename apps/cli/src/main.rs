//! infojunkie CLI — run the site plugins over rendered files.
//!
//! Expands `{% oembed %}` tags, applies post-render hooks and named filters,
//! and manages `_plugins.toml`.

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
