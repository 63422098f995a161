//! axum integration for llms.txt.
//!
//! [`app`] wraps an existing site [`Router`] with the discovery document route,
//! the machine-view middleware and, when configured, the `Link` header.
//!
//! ```rust,no_run
//! use axum::{Router, routing::get, response::Html};
//! use llms_txt_core::LlmsTxtConfig;
//! use llms_txt_server::{AppState, app};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let site = Router::new().route("/", get(|| async { Html("<main><h1>Home</h1></main>") }));
//! let app = app(AppState::new(LlmsTxtConfig::default()), site);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod discovery;
pub mod machine_view;
pub mod response;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use llms_txt_core::{CacheConfig, LlmsTxt, LlmsTxtConfig, MachineView, MarkdownConverter};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Shared, read-only state of the llms.txt layer.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<LlmsTxtConfig>,
    pub view: MachineView,
    /// Cache headers for Markdown responses, `None` when disabled.
    pub cache: Option<CacheConfig>,
    /// Discovery document, rendered once at startup.
    pub discovery_document: Arc<str>,
}

impl AppState {
    pub fn new(config: LlmsTxtConfig) -> Self {
        let view = MachineView::new(config.machine_view());
        Self::with_view(config, view)
    }

    /// State whose machine view uses `converter`.
    pub fn with_converter(config: LlmsTxtConfig, converter: Arc<dyn MarkdownConverter>) -> Self {
        let view = MachineView::with_converter(config.machine_view(), converter);
        Self::with_view(config, view)
    }

    fn with_view(config: LlmsTxtConfig, view: MachineView) -> Self {
        let cache = config.cache();
        let discovery_document = LlmsTxt::generate(&config).into();
        Self { config: Arc::new(config), view, cache, discovery_document }
    }
}

/// Wraps `site` with the llms.txt layer.
///
/// The site is mounted as the fallback of an outer router so the
/// machine-view middleware sees, and may rewrite, the request before the
/// site routes it. Nothing is added when `enabled` is false.
pub fn app(state: AppState, site: Router) -> Router {
    if !state.config.enabled {
        return site;
    }

    let inner = site.merge(discovery::routes(state.clone()));
    let router = Router::new()
        .fallback_service(inner)
        .layer(from_fn_with_state(state.clone(), machine_view::machine_view));

    if state.config.add_link_header {
        router.layer(from_fn_with_state(state, discovery::link_header))
    } else {
        router
    }
}

/// Request tracing, a timeout answering `408`, and response compression.
///
/// Compression is outermost so the machine-view middleware always sees
/// uncompressed bodies.
pub fn with_service_layers(router: Router, timeout: Duration) -> Router {
    router
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(CompressionLayer::new())
}
