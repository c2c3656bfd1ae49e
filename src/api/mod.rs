pub mod error;
pub mod health;
pub mod networks;
pub mod response;
pub mod simulator;
pub mod solar_grids;
pub mod states;
pub mod v1;

use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use serde::Deserialize;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::warn;

use crate::{app::AppState, config::ServerConfig};

/// Uploaded batches may be larger than ordinary JSON bodies.
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// `?elapsed_days=N` on the load endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LoadQuery {
    pub elapsed_days: Option<u32>,
}

pub fn router(state: AppState) -> Router {
    let server = state.cfg.server.clone();
    let mut router = Router::new().nest("/api/v1", v1::router(state));

    if server.enable_cors {
        if let Some(cors) = cors_layer(&server) {
            router = router.layer(cors);
        }
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
                .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs))),
        )
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(server: &ServerConfig) -> Option<CorsLayer> {
    let origin = match server.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => origin,
        Err(e) => {
            warn!(origin = %server.cors_origin, error = %e, "invalid CORS origin, CORS disabled");
            return None;
        }
    };
    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
            ])
            .allow_headers([
                axum::http::header::AUTHORIZATION,
                axum::http::header::CONTENT_TYPE,
            ]),
    )
}
