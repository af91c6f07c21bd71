//! Eclaire Web Server
//!
//! Axum-based REST API over the Eclaire analysis engine.
//!
//! - Stateless analysis endpoints (one snapshot in, one result out)
//! - Bounded fingerprint cache in front of the engine
//! - Restrictive CORS policy and security headers
//! - Sanitized error responses: invalid input is a 400 with a reason,
//!   everything else a generic 500

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

use eclaire_core::AnalysisEngine;

mod cache;
mod handlers;

pub use cache::{AnalysisCache, DEFAULT_CACHE_CAPACITY};

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Cached analysis results (0 disables the cache)
    pub cache_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl ServerConfig {
    /// Read `ECLAIRE_ALLOWED_ORIGINS` (comma separated) and
    /// `ECLAIRE_CACHE_CAPACITY`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(origins) = std::env::var("ECLAIRE_ALLOWED_ORIGINS") {
            config.allowed_origins = parse_origins(&origins);
        }
        if let Some(capacity) = std::env::var("ECLAIRE_CACHE_CAPACITY")
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            config.cache_capacity = capacity;
        }
        config
    }
}

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Shared application state
pub struct AppState {
    pub engine: AnalysisEngine,
    pub cache: AnalysisCache,
}

/// Create the application router
pub fn create_router(engine: AnalysisEngine, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        engine,
        cache: AnalysisCache::new(config.cache_capacity),
    });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/analyze", post(handlers::analyze))
        .route("/analyze/ledger", post(handlers::analyze_ledger))
        .route("/scenario", post(handlers::evaluate_scenario))
        .route("/rules", get(handlers::list_rules));

    let cors = if config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        ))
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    engine: AnalysisEngine,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    match engine.rules().source() {
        Some(path) => info!(
            "Rule table: {} ({} rules)",
            path.display(),
            engine.rules().len()
        ),
        None => info!("Rule table: built-in ({} rules)", engine.rules().len()),
    }

    let app = create_router(engine, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    kind: &'static str,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "invalid_input",
            message: msg.to_string(),
            internal: None,
        }
    }

}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message,
            "kind": self.kind,
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Rejected input is the caller's to fix, so they get the reason
        if let Some(core) = err.downcast_ref::<eclaire_core::Error>() {
            if core.is_invalid_input() {
                return Self {
                    status: StatusCode::BAD_REQUEST,
                    kind: core.kind(),
                    message: core.to_string(),
                    internal: None,
                };
            }
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "internal",
            message: "An internal error occurred".to_string(),
            internal: Some(err),
        }
    }
}
