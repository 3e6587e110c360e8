//! breedd — Breedscope daemon.
//!
//! Serves the upload form and prediction pages over HTTP, classifying
//! photos with whichever provider the configuration selects.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};

use breedscope::server::config::Config;
use breedscope::server::{AppState, router};
use breedscope::{BreedscopeError, PageRenderer, PredictionHandler, UploadStore};

/// Breedscope daemon — dog breed prediction web app.
#[derive(Parser)]
#[command(name = "breedd")]
#[command(version = breedscope::PKG_VERSION)]
#[command(about = "Breedscope prediction web server")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address from the configuration.
    #[arg(short, long, env = "BREEDSCOPE_ADDRESS")]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;
    let address = args.address.unwrap_or_else(|| config.server.address.clone());
    let addr: SocketAddr = address
        .parse()
        .map_err(|e| BreedscopeError::Configuration(format!("Invalid address {address}: {e}")))?;

    // The provider is built once; a local model is fully loaded here.
    let classifier = config.provider.build()?;

    let store = UploadStore::new(&config.storage.upload_dir);
    tokio::fs::create_dir_all(store.root()).await?;
    if store.path_of(&config.storage.sample_photo)?.exists() {
        info!(sample = %config.storage.sample_photo, "sample photo found");
    } else {
        warn!(
            sample = %config.storage.sample_photo,
            dir = %store.root().display(),
            "sample photo missing; the landing page will show no prediction"
        );
    }

    let handler = PredictionHandler::new(store, classifier, config.storage.sample_photo.clone());
    let state =
        AppState::with_upload_limit(handler, PageRenderer::new()?, config.server.max_upload_bytes);

    info!(
        version = breedscope::version_string(),
        %addr,
        provider = state.handler().provider_name(),
        "breedd starting"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("breedd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
