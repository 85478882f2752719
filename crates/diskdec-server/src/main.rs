//! `diskdec` entry point.
//!
//! `diskdec daemon` loads TLS material and serves the unlock API and web UI
//! over HTTPS with graceful shutdown. `diskdec install` provisions a fresh
//! device from the bundle in the asset directory.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum_server::Handle;
use clap::{Parser, Subcommand};
use tracing::info;

use diskdec_assets::{AssetProvider, DirectoryAssets};
use diskdec_core::gate::CredentialGate;
use diskdec_core::veracrypt::VeraCryptController;

use diskdec_server::config::ServerConfig;
use diskdec_server::hardening;
use diskdec_server::install;
use diskdec_server::routes;
use diskdec_server::state::AppState;
use diskdec_server::tls;

/// Time allowed for in-flight requests to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// diskdec: unlock an encrypted volume over HTTPS.
#[derive(Parser)]
#[command(name = "diskdec", version, about = "Unlock and manage an encrypted volume over HTTPS")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the unlock API and web UI.
    Daemon,
    /// Install the tool, service, and this binary on a fresh device.
    Install,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ServerConfig::from_env();

    match cli.command {
        Commands::Daemon => daemon(config).await,
        Commands::Install => {
            init_logging(&config);
            let assets = DirectoryAssets::new(&config.asset_dir);
            install::run_install(&assets, &config.install_config()).await?;
            info!("install complete");
            Ok(())
        }
    }
}

async fn daemon(config: ServerConfig) -> anyhow::Result<()> {
    // Runs before logging is initialized, so warnings go to stderr.
    apply_hardening(&config);

    init_logging(&config);

    info!(
        assets = %config.asset_dir.display(),
        tool = %config.veracrypt.program.display(),
        volume = %config.veracrypt.volume.display(),
        "diskdec starting"
    );

    let assets: Arc<dyn AssetProvider> = Arc::new(DirectoryAssets::new(&config.asset_dir));
    let tls_config = tls::load_rustls_config(assets.as_ref())
        .await
        .context("failed to load TLS material")?;

    let controller = Arc::new(VeraCryptController::new(config.veracrypt.clone()));
    let gate = Arc::new(CredentialGate::new(config.policy.clone(), controller));
    let state = Arc::new(AppState { gate, assets });

    let app = routes::router(state, config.api_concurrency);

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    info!(addr = %config.bind_addr, "diskdec listening");

    axum_server::bind_rustls(config.bind_addr, tls_config)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .with_context(|| format!("server error on {}", config.bind_addr))?;

    info!("diskdec stopped");
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging(config: &ServerConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();
}

/// Wait for SIGINT or SIGTERM, then drain connections.
async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

/// Apply process hardening before logging is initialized.
///
/// Uses `eprintln` because structured logging is not yet available.
#[allow(clippy::print_stderr)]
fn apply_hardening(config: &ServerConfig) {
    if let Err(e) = hardening::disable_core_dumps() {
        eprintln!("WARNING: {e}");
    }

    if config.disable_mlock {
        eprintln!("WARNING: mlock disabled via DISKDEC_DISABLE_MLOCK, passwords may be swapped to disk");
    } else if let Err(e) = hardening::lock_memory() {
        eprintln!("WARNING: {e} (set DISKDEC_DISABLE_MLOCK=true for dev)");
    }
}
