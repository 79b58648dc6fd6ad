mod analysis;
mod config;
mod dash_paths;
mod dashboard;
mod errors;
mod gateway;
mod logging;
mod snapshot;
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{ConfigOverrides, DashConfig, API_KEY_ENV};
use errors::DashError;
use gateway::GatewayClient;
use snapshot::SnapshotStore;
use std::path::{Path, PathBuf};
use ui::{Theme, ViewContext};

#[derive(Parser)]
#[command(name = "cborg-dash")]
#[command(about = "Terminal dashboard for the CBORG gateway: model catalog changes and spend")]
#[command(version)]
struct Cli {
    /// Gateway API key
    #[arg(long, env = "CBORG_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Gateway base URL (overrides the config file)
    #[arg(long, env = "CBORG_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Directory holding snapshot records
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (defaults to ~/.cborg-dash/config.yaml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show spend for every member of a roster file
    Team {
        /// YAML or JSON roster of {name, email, api_key, role}
        roster: PathBuf,
    },
    /// List keys with stored snapshots
    Keys,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "cborg-dash starting");

    let config = DashConfig::load_or_default(cli.config.as_deref())?.with_overrides(
        &ConfigOverrides {
            base_url: cli.base_url.clone(),
            data_dir: cli.data_dir.clone(),
            no_color: cli.no_color,
        },
    )?;
    let store = SnapshotStore::open(config.data_dir()?)?;
    let color = ui::color_enabled(config.color, cli.no_color);
    let ctx = ViewContext {
        base_url: config.base_url(),
        hosted_prefix: &config.hosted_prefix,
        now: chrono::Utc::now(),
        theme: Theme::default(),
    };

    match cli.command {
        Some(Command::Team { ref roster }) => run_team(&store, &config, &ctx, roster, color),
        Some(Command::Keys) => run_keys(&store, &ctx, color),
        None => {
            let api_key = match resolve_api_key(cli.api_key.as_deref()) {
                Ok(key) => key,
                Err(e) => {
                    tracing::error!(error = %e, "No API key");
                    eprintln!("Error: {}", e);
                    eprintln!("Set it with: export {}=your-key-here", API_KEY_ENV);
                    std::process::exit(1);
                }
            };
            run_single(&store, &config, &ctx, &api_key, color)
        }
    }
}

/// Returns the trimmed key, rejecting absent or blank values.
fn resolve_api_key(raw: Option<&str>) -> Result<String, DashError> {
    match raw.map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => Err(DashError::CredentialMissing {
            env_var: API_KEY_ENV,
        }),
    }
}

fn run_single(
    store: &SnapshotStore,
    config: &DashConfig,
    ctx: &ViewContext,
    api_key: &str,
    color: bool,
) -> Result<()> {
    let client = GatewayClient::new(config.base_url(), api_key, config.timeout());
    let report = dashboard::refresh_key(store, &client, api_key, ctx.now);
    tracing::info!(
        key_hash = %report.record.key_hash,
        models = report.catalog.len(),
        new_models = report.new_models.len(),
        stale = report.freshness.is_stale(),
        "Single-key run finished"
    );
    ui::print_lines(&ui::render_single(&report, ctx), color)
}

fn run_team(
    store: &SnapshotStore,
    config: &DashConfig,
    ctx: &ViewContext,
    roster_path: &Path,
    color: bool,
) -> Result<()> {
    let roster = analysis::load_roster(roster_path)?;
    tracing::info!(members = roster.len(), roster = %roster_path.display(), "Loaded roster");

    let report = dashboard::refresh_team(
        store,
        &roster,
        |api_key| GatewayClient::new(config.base_url(), api_key, config.timeout()),
        ctx.now,
    );
    tracing::info!(
        members = report.summary.rows.len(),
        refreshed = report.refreshed,
        "Team run finished"
    );
    ui::print_lines(&ui::render_team(&report, ctx), color)
}

fn run_keys(store: &SnapshotStore, ctx: &ViewContext, color: bool) -> Result<()> {
    let keys = store
        .list_tracked()
        .with_context(|| format!("Failed to list snapshots in {}", store.dir().display()))?;
    ui::print_lines(&ui::render_keys(&keys, ctx), color)
}
