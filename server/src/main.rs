use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use reviewdex_core::{Config, DocumentStore, SledStore};
use server::build_app;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

/// Exit status when the document store cannot be opened.
const EXIT_STORE_UNAVAILABLE: u8 = 2;

#[derive(Parser)]
struct Args {
    /// Path to the TOML configuration file (defaults apply when it is missing)
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = %args.config.display(), error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    let docs = match SledStore::open(config.db.store_path(), &config.db.collection) {
        // the store handle drops here, releasing the lock for the crawler
        Ok(store) => match store.snapshot() {
            Ok(docs) => docs,
            Err(e) => {
                tracing::error!(error = %e, "failed to read document snapshot");
                return ExitCode::FAILURE;
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "cannot reach the document store, aborting");
            return ExitCode::from(EXIT_STORE_UNAVAILABLE);
        }
    };

    match serve(&args, build_app(&docs)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(args: &Args, app: Router) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse().context("invalid bind address")?;
    let listener = TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
