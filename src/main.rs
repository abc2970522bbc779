use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use snack_tv::app::{App, AppEvent, SelectOutcome};
use snack_tv::config::Config;
use snack_tv::feed::{build_client, Category, FeedFetcher, Timeframe};
use snack_tv::storage::{Database, DatabaseError};
use snack_tv::ui;

/// Get the config directory path (~/.config/snack-tv/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("snack-tv"))
}

#[derive(Parser, Debug)]
#[command(name = "snack-tv", version, about = "Terminal viewer for subreddit video listings")]
struct Args {
    /// Listing category: top, hot, new, rising, controversial, none
    #[arg(long)]
    category: Option<Category>,

    /// Timeframe for top listings: hour, day, week, month, year, all
    #[arg(long)]
    timeframe: Option<Timeframe>,

    /// Only show videos with this flair
    #[arg(long)]
    flair: Option<String>,

    /// Config file (default: ~/.config/snack-tv/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip background fetching of the other listings at startup
    #[arg(long)]
    no_prewarm: bool,

    /// Delete all persisted listings before starting
    #[arg(long)]
    clear_cache: bool,

    /// Fetch the selection once, print it as text and exit
    #[arg(long)]
    print: bool,

    /// Write logs to this file (the TUI otherwise discards them)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

/// Logs go to `log_file` if given, else stderr in print mode. The TUI owns
/// the terminal, so without a log file it logs nowhere.
fn init_tracing(log_file: Option<&Path>, print_mode: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None if print_mode => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .init();
        }
    }
    Ok(())
}

/// Create the config directory with user-only permissions.
fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) =
            std::fs::set_permissions(config_dir, std::fs::Permissions::from_mode(0o700))
        {
            tracing::warn!(
                path = %config_dir.display(),
                error = %e,
                "Failed to set config directory permissions to 0700"
            );
        }
    }
    Ok(())
}

async fn open_database(path: &Path) -> Result<Database> {
    let path_str = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    match Database::open(path_str).await {
        Ok(db) => Ok(db),
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of snack-tv appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => Err(anyhow::anyhow!("Failed to open listing cache: {}", e)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref(), args.print)?;

    let config_dir = get_config_dir()?;
    ensure_config_dir(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path).context("Failed to load config")?;
    let base_url = config.base_url()?;

    let db = if config.persist_cache {
        Some(open_database(&config_dir.join("cache.db")).await?)
    } else {
        None
    };

    let mut persisted = Vec::new();
    if let Some(db) = &db {
        if args.clear_cache {
            let removed = db
                .clear_listings()
                .await
                .context("Failed to clear listing cache")?;
            tracing::info!(removed, "Cleared persisted listings");
        } else {
            match db.evict_expired_listings().await {
                Ok(0) => {}
                Ok(evicted) => tracing::debug!(evicted, "Evicted expired listings"),
                Err(e) => tracing::warn!(error = %e, "Failed to evict expired listings"),
            }
            persisted = db
                .load_all_listings()
                .await
                .context("Failed to load persisted listings")?;
        }
    } else if args.clear_cache {
        tracing::info!("persist_cache is disabled; nothing to clear");
    }

    let client = build_client(&config).context("Failed to build HTTP client")?;
    let fetcher = FeedFetcher::new(client, base_url, &config.subreddit);

    let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(32);
    let mut app = App::new(&config, fetcher, db, event_tx);
    app.hydrate(persisted);

    let outcome = app.select(args.category, args.timeframe, args.flair.clone());

    if args.print {
        if let SelectOutcome::Fetching(key) = outcome {
            let event = event_rx
                .recv()
                .await
                .context("Fetch task ended without a result")?;
            app.handle_event(event)
                .with_context(|| format!("Failed to load {}", key))?;
        }
        let width = crossterm::terminal::size()
            .map(|(w, _)| w as usize)
            .unwrap_or(100);
        print!(
            "{}",
            ui::format_grid(&app.render_state(), app.subreddit(), width)
        );
        return Ok(());
    }

    if !args.no_prewarm {
        app.pre_warm();
    }

    ui::run(&mut app, event_rx).await?;
    Ok(())
}
