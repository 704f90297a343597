//! Preview server binary.
//!
//! Serves a build directory with the placeholder SSR responder, so the
//! static half of a build can be smoke-tested before the application is
//! linked in. A real deployment embeds [`ssr_gateway::Gateway`] with its
//! own [`ssr_gateway::AppServer`] instead.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use ssr_gateway::app::{BuildManifest, StaticPreview};
use ssr_gateway::{config, observability, Gateway};

#[derive(Parser)]
#[command(name = "ssr-gateway")]
#[command(about = "Serve a framework build directory", long_about = None)]
struct Cli {
    /// Build directory produced by the framework's build phase.
    #[arg(default_value = "build")]
    build_dir: PathBuf,

    /// Override the configured bind address (host:port).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = config::load(&cli.build_dir)?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    observability::logging::init(&config.observability);
    tracing::info!(build_dir = %cli.build_dir.display(), "ssr-gateway v0.1.0 starting");

    let manifest = BuildManifest::load_or_default(&config.paths.manifest());

    tracing::info!(
        bind_address = %config.listener.bind_address,
        app_dir = %manifest.app_dir,
        prerendered = manifest.prerendered.len(),
        assets = config.assets.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let gateway = Gateway::new(config, manifest, Arc::new(StaticPreview));
    gateway.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
