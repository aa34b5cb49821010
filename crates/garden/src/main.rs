//! garden: publish Obsidian notes to a digital garden site repository.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use garden_publish::{
    Assembler, BatchOutcome, Config, DirectoryRemote, FileVault, Note, NoteStore, PublishSettings,
    PublishStatus, PublishStatusManager, Publisher,
};

#[derive(Parser, Debug)]
#[command(name = "garden")]
#[command(about = "Publish Obsidian notes to a digital garden")]
struct Args {
    /// Path to the vault directory
    #[arg(long, env = "GARDEN_VAULT_PATH")]
    vault: String,

    /// Path to the site repository checkout notes are published into
    #[arg(long, env = "GARDEN_REMOTE_PATH")]
    remote: String,

    /// Settings JSON (repo, user name, token, default note settings)
    #[arg(long, env = "GARDEN_SETTINGS")]
    settings: Option<String>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show which notes are unpublished, changed, published or deleted
    Status {
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },
    /// Publish candidate notes
    Publish {
        /// Only publish unpublished and changed notes
        #[arg(long)]
        changed_only: bool,
    },
    /// Delete remote notes that are no longer marked for publishing
    Delete,
}

struct App {
    store: Arc<FileVault>,
    remote: Arc<DirectoryRemote>,
    assembler: Arc<Assembler>,
    settings: PublishSettings,
}

impl App {
    async fn open(config: &Config) -> Result<Self> {
        let settings = match &config.settings_path {
            Some(path) => PublishSettings::load(path).await?,
            None => PublishSettings::default(),
        };

        let store = Arc::new(
            FileVault::open(config.vault_path.clone())
                .await
                .with_context(|| format!("Failed to open vault at {}", config.vault_path.display()))?,
        );
        let remote = Arc::new(DirectoryRemote::new(config.remote_path.clone()));
        let assembler = Arc::new(Assembler::new(
            store.clone(),
            store.clone(),
            settings.default_note_settings.clone(),
        ));

        Ok(Self {
            store,
            remote,
            assembler,
            settings,
        })
    }

    fn status_manager(&self) -> PublishStatusManager {
        PublishStatusManager::new(self.store.clone(), self.remote.clone(), self.assembler.clone())
    }

    fn publisher(&self) -> Result<Publisher> {
        let identity = self.settings.remote_identity()?;
        Ok(Publisher::new(self.remote.clone(), self.assembler.clone(), identity))
    }
}

fn print_status(status: &PublishStatus) {
    let sections: [(&str, Vec<&str>); 4] = [
        ("Unpublished", status.unpublished_notes.iter().map(|n| n.path.as_str()).collect()),
        ("Changed", status.changed_notes.iter().map(|n| n.path.as_str()).collect()),
        ("Published", status.published_notes.iter().map(|n| n.path.as_str()).collect()),
        ("Deleted", status.deleted_remote_paths.iter().map(String::as_str).collect()),
    ];

    for (title, paths) in sections {
        println!("{} ({})", title, paths.len());
        for path in paths {
            println!("  {}", path);
        }
    }
}

fn report(action: &str, outcomes: &[BatchOutcome]) -> Result<()> {
    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|o| !o.ok)
        .map(|o| o.path.as_str())
        .collect();

    info!("{} {} of {}", action, outcomes.len() - failed.len(), outcomes.len());
    for path in &failed {
        warn!("Failed: {}", path);
    }

    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} of {} items failed", failed.len(), outcomes.len())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging - respects RUST_LOG env var, defaults to info (or debug with --verbose)
    let default_filter = if args.verbose {
        "debug,garden_publish=debug"
    } else {
        "info,garden_publish=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::new(&args.vault, &args.remote, args.settings.as_deref());
    let app = App::open(&config).await?;
    info!("Vault path: {:?}", app.store.root());
    info!("Remote path: {:?}", app.remote.root());

    match args.command {
        Command::Status { json } => {
            let status = app.status_manager().compute_status().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }
        Command::Publish { changed_only } => {
            // Validate the remote identity before doing any work
            let publisher = app.publisher()?;
            let notes: Vec<Note> = if changed_only {
                let status = app.status_manager().compute_status().await?;
                status
                    .unpublished_notes
                    .into_iter()
                    .chain(status.changed_notes)
                    .collect()
            } else {
                app.store.list_candidate_notes().await?
            };
            report("Published", &publisher.publish_all(&notes).await)?;
        }
        Command::Delete => {
            let publisher = app.publisher()?;
            let orphans = app.status_manager().deleted_note_paths().await?;
            report("Deleted", &publisher.delete_all(&orphans).await)?;
        }
    }

    Ok(())
}
