use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use llms_txt_core::LlmsTxtConfig;
use llms_txt_server::{AppState, app, with_service_layers};
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

const DEFAULT_ROOT: &str = "./public";
const DEFAULT_ADDR: &str = "127.0.0.1:8080";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::var("LLMS_TXT_CONFIG") {
        Ok(path) => LlmsTxtConfig::load(&path).with_context(|| format!("Failed to load config: {}", path))?,
        Err(_) => LlmsTxtConfig::discover().context("Failed to load config")?,
    }
    .with_env_overrides()
    .context("Invalid LLMS_TXT_* environment override")?;

    let root = PathBuf::from(std::env::var("LLMS_TXT_ROOT").unwrap_or_else(|_| DEFAULT_ROOT.to_string()));
    let addr: SocketAddr = std::env::var("LLMS_TXT_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()
        .context("LLMS_TXT_ADDR is not a socket address")?;

    let site = Router::new().fallback_service(ServeDir::new(&root).append_index_html_on_directories(true));
    let app = with_service_layers(app(AppState::new(config.clone()), site), REQUEST_TIMEOUT);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!(
        %addr,
        root = %root.display(),
        discovery = %format!("/{}", config.path),
        trigger = %config.machine_view_trigger,
        "serving site"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
