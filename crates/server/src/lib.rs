pub mod auth;
pub mod cors;
pub mod handler;
pub mod middleware;

use axum::{Router, middleware as axum_mw};
use gateway_core::config::Config;
use gateway_core::provider::UpstreamForwarder;
use secrecy::SecretString;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Immutable per-process state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Secret clients must present. The upstream key lives only inside the forwarder.
    pub shared_secret: Arc<SecretString>,
    pub forwarder: Arc<dyn UpstreamForwarder>,
}

pub fn build_router(state: AppState) -> Router {
    // Every path and method lands in the gateway handler, which runs
    // preflight → authenticate → forward. Layers run outer → inner:
    // trace, CORS envelope, request context, request logging.
    Router::new()
        .fallback(handler::gateway::gateway)
        .layer(axum_mw::from_fn(
            middleware::request_logging::request_logging_middleware,
        ))
        .layer(axum_mw::from_fn(
            middleware::request_context::request_context_middleware,
        ))
        .layer(axum_mw::from_fn(cors::cors_envelope))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
