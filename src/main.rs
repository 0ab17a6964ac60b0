use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use linkhub::app::{App, AppEvent};
use linkhub::config::Config;
use linkhub::opener::SystemLauncher;
use linkhub::preferences::PreferenceManager;
use linkhub::seed::SeedLoader;
use linkhub::storage::{
    atomic_write, export_to_dir, read_import, FileStore, KeyValueStore, LinkStore, STORAGE_KEY,
};

/// Get the config directory path (~/.config/linkhub/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("linkhub");
    Ok(config_dir)
}

/// Create the config directory if needed and restrict it to the current user.
fn prepare_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
        println!("Created config directory: {}", config_dir.display());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }

    Ok(())
}

/// Copy `src` over `dst` without ever leaving `dst` half written.
fn atomic_copy(src: &Path, dst: &Path) -> Result<()> {
    let content = std::fs::read(src).with_context(|| {
        format!(
            "Failed to read source file '{}': check file permissions",
            src.display()
        )
    })?;
    atomic_write(dst, &content)
        .with_context(|| format!("Failed to write '{}': check permissions", dst.display()))
}

#[derive(Parser, Debug)]
#[command(
    name = "linkhub",
    about = "Terminal bookmark dashboard with categories, search, and fallback URLs"
)]
struct Args {
    /// Clear the stored links and start from the seed again
    #[arg(long)]
    reset: bool,

    /// Replace the stored links with a JSON backup (the old store is backed up first)
    #[arg(long, value_name = "FILE")]
    import: Option<PathBuf>,

    /// Write a backup of the stored links into DIR and exit
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,

    /// Config file (default: ~/.config/linkhub/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; redirect it to keep them off the dashboard
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    prepare_config_dir(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let http_client = reqwest::Client::builder()
        .pool_max_idle_per_host(2)
        .pool_idle_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("linkhub/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let seed_file = config
        .seed_path
        .clone()
        .unwrap_or_else(|| config_dir.join("links.json"));
    let seed = SeedLoader::new(http_client)
        .with_remote(config.seed_url()?)
        .with_file(Some(seed_file));

    let file_store = FileStore::open(config_dir.join("store")).context("Failed to open store")?;
    let store_path = file_store.path_for(STORAGE_KEY);
    let store: Arc<dyn KeyValueStore> = Arc::new(file_store);

    // Handle --reset flag
    if args.reset {
        store
            .remove(STORAGE_KEY)
            .context("Failed to clear stored links")?;
        println!("Stored links cleared.");
    }

    // Read the import before touching the store so a bad file changes nothing
    let imported = match &args.import {
        Some(import_file) => {
            let canonical = import_file.canonicalize().with_context(|| {
                format!("Failed to resolve import file: {}", import_file.display())
            })?;
            let links = read_import(&canonical)
                .with_context(|| format!("Failed to import {}", canonical.display()))?;
            Some((canonical, links))
        }
        None => None,
    };

    let mut links = LinkStore::new(Arc::clone(&store));
    let outcome = links.load(&seed).await.context("Failed to load links")?;

    if let Some((source, imported)) = imported {
        if store_path.exists() {
            let backup_name = format!(
                "{}.backup.{}",
                STORAGE_KEY,
                Utc::now().format("%Y%m%d_%H%M%S")
            );
            let backup_path = config_dir.join(&backup_name);
            atomic_copy(&store_path, &backup_path).with_context(|| {
                format!(
                    "Failed to create backup at '{}'. Stored links are unchanged.",
                    backup_path.display()
                )
            })?;
            println!("Backed up stored links to: {}", backup_path.display());
        }

        let count = links
            .replace_all(imported)
            .context("Failed to save imported links")?;
        println!("Imported {} links from {}", count, source.display());
    }

    // Handle --export flag
    if let Some(dir) = &args.export {
        let path = export_to_dir(links.links(), dir)?;
        println!("Exported {} links to {}", links.len(), path.display());
        return Ok(());
    }

    let prefs = PreferenceManager::load(&config, Arc::clone(&store))
        .context("Failed to load preferences")?;

    let mut app = App::new(links, prefs, seed, Arc::new(SystemLauncher));
    app.fallback = config.fallback_policy();
    app.export_dir = match &config.export_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to resolve current directory")?,
    };
    app.report_load(&outcome);

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    // Run the TUI
    linkhub::ui::run(&mut app, event_tx, event_rx).await?;

    Ok(())
}
