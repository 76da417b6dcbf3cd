pub mod coingecko;
pub mod health;
pub mod news;

use axum::{
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};

use crate::services::coingecko::UpstreamResponse;

/// Shared caches may keep market data for 5 minutes.
pub const MARKET_CACHE_CONTROL: &str = "s-maxage=300, stale-while-revalidate";
/// News changes slowly; shared caches may keep it for an hour.
pub const NEWS_CACHE_CONTROL: &str = "s-maxage=3600, stale-while-revalidate";

/// Relays an upstream reply. Only successful replies are marked cacheable.
pub(crate) fn relay(upstream: UpstreamResponse, cache_control: &'static str) -> Response {
    let success = upstream.status.is_success();
    let content_type = upstream
        .content_type
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    let mut response = (upstream.status, upstream.body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    if success {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(cache_control),
        );
    }

    response
}
