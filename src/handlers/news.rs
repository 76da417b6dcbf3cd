use axum::{extract::State, response::Response};

use crate::handlers::{NEWS_CACHE_CONTROL, relay};
use crate::error::ProxyError;
use crate::AppState;

/// Handler for GET /api/news
/// Injects the fixed query and the server-held key, then relays GNews JSON
pub async fn get_news(State(state): State<AppState>) -> Result<Response, ProxyError> {
    let upstream = state.news.search().await?;

    tracing::info!("Relaying {} bytes of news", upstream.body.len());

    Ok(relay(upstream, NEWS_CACHE_CONTROL))
}
