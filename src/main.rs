#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]
// #![doc = include_str!("../README.md")]

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use axum::Extension;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::api::router;
use crate::storage::Memory;
use crate::storage::SqliteConfig;
use crate::storage::Sqlite;
use crate::storage::Storage;
use crate::store::NoteStore;
use crate::store::SharedStore;
use crate::tier::Tier;
use crate::utils::env_var_or_else;

mod api;
mod graceful_shutdown;
mod markup;
mod notes;
mod storage;
mod store;
#[cfg(test)]
mod tests;
mod tier;
mod transfer;
mod utils;

const DEFAULT_RUST_LOG: &str = "quicknotes=debug,tower_http=debug";
const DEFAULT_ADDRESS: &str = "127.0.0.1:6010";
const DEFAULT_STORAGE_BACKEND: &str = "sqlite";

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let tier = Tier::from_env();
    tracing::info!("Running with the {tier:?} tier");

    let backend = env_var_or_else("STORAGE_BACKEND", || DEFAULT_STORAGE_BACKEND.to_string());
    tracing::info!("Using the `{backend}` storage backend");

    match backend.as_str() {
        "sqlite" => serve(setup_app::<Sqlite>(SqliteConfig::DetectConfig, tier).await?).await,
        "memory" => {
            tracing::warn!("Using in-memory storage, notes are lost on shutdown");

            serve(setup_app::<Memory>((), tier).await?).await
        }
        backend => bail!("Unknown `STORAGE_BACKEND`: {backend}"),
    }
}

/// Serve the app until a shutdown signal is received
async fn serve(app: Router) -> Result<()> {
    let address = setup_address()?;
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Could not listen on {address}"))?;

    tracing::info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler())
        .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` when the note storage can not be opened
pub async fn setup_app<S: Storage>(options: S::Options, tier: Tier) -> Result<Router> {
    let store = Arc::new(NoteStore::<S>::new(options));

    // open early, an unavailable storage should stop the service from starting
    store
        .open()
        .await
        .context("Could not open the note storage")?;

    Ok(create_router(store, tier))
}

/// Create the router for Quick Notes
fn create_router<S: Storage>(store: SharedStore<S>, tier: Tier) -> Router {
    Router::new()
        .nest("/api", router::<S>())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(store))
        .layer(Extension(tier))
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(env_var_or_else("RUST_LOG", || {
            DEFAULT_RUST_LOG.into()
        })))
        .with(fmt::layer())
        .init();
}

fn setup_address() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    // optional override of just the port
    if let Ok(port) = std::env::var("PORT") {
        // only check non-empty strings
        if !port.is_empty() {
            let port = port.parse::<u16>()?;

            address.set_port(port);
        }
    }

    Ok(address)
}
