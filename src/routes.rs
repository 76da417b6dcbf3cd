use axum::{
    Router,
    http::{Method, header},
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{coingecko, health, news};
use crate::AppState;

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/coingecko",
            get(coingecko::proxy_coingecko).options(coingecko::preflight),
        )
        .route(
            "/api/coingecko/{*path}",
            get(coingecko::proxy_coingecko_path).options(coingecko::preflight),
        )
        .route(
            "/api/news",
            get(news::get_news).options(coingecko::preflight),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Browsers on any origin may call the proxy.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
