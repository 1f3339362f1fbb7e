//! bookshelf - serve a personal book-review shelf over HTTP.
//!
//! Configuration comes from an optional TOML file, then command-line flags
//! and `BOOKSHELF_*` environment variables override it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bookshelf::{
    http, seed_if_empty, BookshelfConfig, Bookshelf, FileRecordStore, InMemoryRecordStore,
    PreferenceFile, RecordStore, StoreError, TracingNotifier,
};

#[derive(Parser, Debug)]
#[command(name = "bookshelf", version, about = "Personal book-review tracker")]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "BOOKSHELF_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:3000
    #[arg(short, long, env = "BOOKSHELF_BIND")]
    bind: Option<String>,

    /// JSON file backing the record store (in-memory when omitted)
    #[arg(short, long, env = "BOOKSHELF_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Load the sample books into an empty store
    #[arg(long)]
    seed: bool,
}

impl Args {
    fn into_config(self) -> Result<BookshelfConfig> {
        let mut config = match &self.config {
            Some(path) => BookshelfConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => BookshelfConfig::default(),
        };
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if self.data_file.is_some() {
            config.data_file = self.data_file;
        }
        config.seed |= self.seed;
        Ok(config)
    }
}

fn open_store(config: &BookshelfConfig) -> Result<Arc<dyn RecordStore>, StoreError> {
    match &config.data_file {
        Some(path) => Ok(Arc::new(FileRecordStore::open(path)?)),
        None => Ok(Arc::new(InMemoryRecordStore::new())),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {}", e);
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bookshelf=info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting bookshelf v{}", env!("CARGO_PKG_VERSION"));

    let config = Args::parse().into_config()?;
    let bind = config.bind.clone();
    let preferences = PreferenceFile::new(&config.preferences_file);

    let shelf = tokio::task::spawn_blocking(move || -> Result<Bookshelf> {
        let mut shelf = Bookshelf::new(Arc::new(TracingNotifier));
        let state = shelf.connect(&config.retry.policy(), || open_store(&config));
        if !state.is_connected() {
            warn!(?state, "serving without a record store");
            return Ok(shelf);
        }

        let gateway = shelf.gateway()?;
        if let Some(year) = config.prune_year {
            gateway.prune_outside_year(year)?;
        }
        if config.seed {
            seed_if_empty(gateway.store().as_ref())?;
        }
        info!(books = shelf.cached_len()?, "record store ready");
        Ok(shelf)
    })
    .await??;

    let app = http::router(Arc::new(shelf), preferences);
    http::serve(app, &bind, shutdown_signal())
        .await
        .with_context(|| format!("serving on {}", bind))?;

    Ok(())
}
