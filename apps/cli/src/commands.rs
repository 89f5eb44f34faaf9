//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use infojunkie_core::Site;
use infojunkie_shared::{PluginsConfig, RenderedDocument, init_config, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// infojunkie — heading anchors, changelog stripping and oEmbed for static sites.
#[derive(Parser)]
#[command(
    name = "infojunkie",
    version,
    about = "Run the infojunkie site plugins over rendered pages.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Expand tags in a file, then run post-render hooks on the result.
    Render {
        /// File to render. Its extension decides which hooks apply.
        file: PathBuf,

        /// Write output here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Site root holding `_plugins.toml`.
        #[arg(long, default_value = ".", env = "INFOJUNKIE_SITE")]
        site: PathBuf,
    },

    /// Apply a named filter (e.g. `unchangelogify`) to a file.
    Filter {
        /// Filter name.
        name: String,

        /// Input file.
        file: PathBuf,

        /// Site root holding `_plugins.toml`.
        #[arg(long, default_value = ".", env = "INFOJUNKIE_SITE")]
        site: PathBuf,
    },

    /// Resolve URLs to embeddable HTML via oEmbed.
    Embed {
        /// URLs to resolve.
        #[arg(required = true)]
        urls: Vec<String>,

        /// Site root holding `_plugins.toml`.
        #[arg(long, default_value = ".", env = "INFOJUNKIE_SITE")]
        site: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,

        /// Site root holding `_plugins.toml`.
        #[arg(long, default_value = ".", env = "INFOJUNKIE_SITE", global = true)]
        site: PathBuf,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write `_plugins.toml` with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    // `oembed` is the target of embed failure diagnostics.
    let filter = match cli.verbose {
        0 => "infojunkie=info,oembed=info",
        1 => "infojunkie=debug,oembed=debug",
        _ => "infojunkie=trace,oembed=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Render { file, out, site } => cmd_render(&file, out.as_deref(), &site).await,
        Command::Filter { name, file, site } => cmd_filter(&name, &file, &site),
        Command::Embed { urls, site } => cmd_embed(&urls, &site).await,
        Command::Config { action, site } => match action {
            ConfigAction::Init => cmd_config_init(&site),
            ConfigAction::Show => cmd_config_show(&site),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn open_site(site_dir: &Path) -> Result<Site> {
    let config: PluginsConfig = load_config(site_dir)?;
    Ok(Site::new(config)?)
}

fn read_input(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).wrap_err_with(|| format!("failed to read {}", file.display()))
}

async fn cmd_render(file: &Path, out: Option<&Path>, site_dir: &Path) -> Result<()> {
    let site = open_site(site_dir)?;
    let template = read_input(file)?;

    let output = site.render_tags(&template).await?;
    let mut doc = RenderedDocument::from_path(file, output);
    site.post_render(&mut doc);

    match out {
        Some(path) => {
            std::fs::write(path, &doc.output)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            info!(
                path = %path.display(),
                embeds = site.embed_cache().len().await,
                "rendered"
            );
        }
        None => print!("{}", doc.output),
    }

    Ok(())
}

fn cmd_filter(name: &str, file: &Path, site_dir: &Path) -> Result<()> {
    let site = open_site(site_dir)?;
    let input = read_input(file)?;
    print!("{}", site.apply_filter(name, &input)?);
    Ok(())
}

async fn cmd_embed(urls: &[String], site_dir: &Path) -> Result<()> {
    let site = open_site(site_dir)?;
    let mut failed = 0;

    for url in urls {
        println!("{}", site.resolver().render(url).await);

        let outcome = site.embed_cache().get(url.trim()).await;
        if outcome.is_some_and(|e| e.is_failure()) {
            failed += 1;
        }
    }

    info!(resolved = urls.len() - failed, failed, "embed complete");
    Ok(())
}

fn cmd_config_init(site_dir: &Path) -> Result<()> {
    let path = init_config(site_dir)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(site_dir: &Path) -> Result<()> {
    let config: PluginsConfig = load_config(site_dir)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
