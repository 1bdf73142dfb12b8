//! A tool to collect GitHub usage statistics and render them as SVG cards.
//!
//! # Overview
//!
//! `gh-stats` aggregates statistics across every repository a user owns or
//! has contributed to: stars, forks, contributions, lines changed,
//! collaborators, language mix, and page views. The results are rendered as
//! two SVG cards suitable for embedding in a profile README, and optionally
//! printed as a text summary.
//!
//! # Quick Start
//!
//! ```bash
//! export GITHUB_ACTOR=octocat
//! export ACCESS_TOKEN=ghp_xxxxxxxxxxxxxxxxxxxx
//! gh-stats --summary
//! ```
//!
//! This writes `overview.svg` and `languages.svg` into `generated_images/`
//! and prints the text summary.
//!
//! # Configuration
//!
//! Every knob is available both as a flag and as an environment variable, so
//! the tool drops into CI workflows unchanged:
//!
//! ```yaml
//! - name: Generate statistics cards
//!   run: gh-stats
//!   env:
//!     ACCESS_TOKEN: ${{ secrets.ACCESS_TOKEN }}
//!     GITHUB_ACTOR: ${{ github.actor }}
//!     EXCLUDED: octocat/scratch,octocat/playground
//!     EXCLUDED_LANGS: HTML,TeX
//! ```
//!
//! Repository selection accepts comma-separated `owner/name` lists for
//! inclusion, exclusion, and manual addition; language selection supports a
//! global exclude list plus per-repository overrides
//! (`owner/name--lang1--lang2`). See `--help` for the full set.
//!
//! # View Tracking
//!
//! GitHub's traffic endpoint only covers the last 14 days, so cumulative view
//! counts are maintained in a small persisted document across runs. Each
//! fully-closed day is counted exactly once no matter how often the tool
//! runs; today's still-changing count is displayed but never persisted.

use chrono::Local;
use clap::Parser;
use clap::ValueEnum;
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use gh_stats::Result;
use gh_stats::config::{Settings, StatsArgs};
use gh_stats::github::Client;
use gh_stats::render;
use gh_stats::stats::Engine;
use gh_stats::store::FileStore;
use ohno::bail;
use std::path::PathBuf;

const GITHUB_API_BASE_URL: &str = "https://api.github.com";

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

#[derive(Parser, Debug)]
#[command(name = "gh-stats", author, version, about = "Collect GitHub usage statistics and render them as SVG cards")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    /// GitHub username to aggregate statistics for
    #[arg(long, value_name = "USER", env = "GITHUB_ACTOR")]
    user: Option<String>,

    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Directory the SVG cards are written to
    #[arg(long, value_name = "PATH", default_value = "generated_images")]
    output_dir: PathBuf,

    /// Path of the persisted counter document
    #[arg(long, value_name = "PATH")]
    store_path: Option<PathBuf>,

    /// Print the text summary to stdout
    #[arg(long)]
    summary: bool,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LogLevel,

    #[command(flatten)]
    stats: StatsArgs,
}

/// Initialize logger based on log level
fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let Some(user) = cli.user else {
        bail!("a GitHub username is required; pass --user or set GITHUB_ACTOR");
    };
    let Some(token) = cli.token else {
        bail!("a personal access token is required; pass --token or set ACCESS_TOKEN");
    };

    let store_path = match cli.store_path {
        Some(path) => path,
        None => FileStore::default_path()?,
    };
    let store = FileStore::open(store_path)?;

    let settings = Settings::resolve(user, &cli.stats, &store)?;
    let client = Client::new(Some(&token), GITHUB_API_BASE_URL)?;

    let engine = Engine::new(&client, &store, &settings);
    let summary = engine.run(Local::now().date_naive()).await?;

    render::generate_overview(&summary, &settings.username, &cli.output_dir)?;
    render::generate_languages(&summary, &cli.output_dir)?;

    if cli.summary {
        println!("{summary}");
    }

    Ok(())
}
