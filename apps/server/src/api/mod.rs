mod health;
mod prices;

use std::sync::Arc;

use crate::{config::Config, main_lib::AppState};
use axum::{
    http::{HeaderValue, StatusCode},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let v1 = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/status", get(health::polling_status));

    Router::new()
        .route("/api/price", get(prices::get_price))
        .route("/api/assets", get(prices::list_assets))
        .nest("/api/v1", v1)
        .with_state(state)
        .layer(cors)
        .layer(timeout_layer(config))
        .layer(TraceLayer::new_for_http())
}

/// Requests running past the configured timeout are answered with 408.
fn timeout_layer(config: &Config) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, config.request_timeout)
}
