//! `meal serve`: HTTP surface over the catalog and the shopping-list engine.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;

use crate::catalog::{Catalog, CatalogError};
use crate::telemetry::{self};
use crate::telemetry::ops::serve::Phase as ServePhase;

mod error;
mod handlers;
mod routes;

pub use routes::create_router;

const DEFAULT_BIND: &str = "127.0.0.1:5000";

#[derive(Args, Debug)]
pub struct ServeCmd {
    /// Address to listen on (overrides MEAL_BIND)
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Directory of front-end assets served for non-API paths
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
}

/// Shared, read-only request state. Each request re-reads the catalog and
/// builds its own aggregates, so nothing mutable crosses requests.
#[derive(Debug, Clone)]
pub struct ServerState {
    pub catalog_path: PathBuf,
    pub static_dir: Option<PathBuf>,
}

impl ServerState {
    pub fn new(catalog_path: PathBuf, static_dir: Option<PathBuf>) -> Self {
        ServerState { catalog_path, static_dir }
    }

    pub async fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        Catalog::load(&self.catalog_path).await
    }
}

pub async fn run(catalog_path: &Path, args: ServeCmd) -> Result<()> {
    let log = telemetry::serve();
    let bind = match args.bind {
        Some(addr) => addr,
        None => std::env::var("MEAL_BIND")
            .unwrap_or_else(|_| DEFAULT_BIND.to_string())
            .parse()
            .context("parse MEAL_BIND")?,
    };
    let _g = log
        .root_span_kv([
            ("bind", bind.to_string()),
            ("catalog", catalog_path.display().to_string()),
            ("static_dir", format!("{:?}", args.static_dir)),
        ])
        .entered();

    // fail fast on a broken catalog instead of on the first request
    let catalog = Catalog::load(catalog_path).await.context("load recipe catalog")?;
    log.info(format!("📖 Catalog ready: {} recipe(s)", catalog.len()));

    let state = Arc::new(ServerState::new(catalog_path.to_path_buf(), args.static_dir));
    let app = create_router(state);

    let listener = {
        let _s = log.span(&ServePhase::Bind).entered();
        tokio::net::TcpListener::bind(bind)
            .await
            .with_context(|| format!("bind {bind}"))?
    };
    log.info(format!("🍳 Serving on http://{bind}"));

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await
        .context("http server")?;

    let _s = log.span(&ServePhase::Shutdown).entered();
    log.info("👋 Server stopped");
    Ok(())
}

async fn cancel_on_ctrl_c(token: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        return;
    }
    token.cancel();
}
