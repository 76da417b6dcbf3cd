use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};

use crate::error::ProxyError;
use crate::handlers::{MARKET_CACHE_CONTROL, relay};
use crate::AppState;

const PATH_PARAM: &str = "path";

/// Handler for GET /api/coingecko?path=<subpath>&<params>
/// `path` selects the upstream endpoint; every other parameter is forwarded
pub async fn proxy_coingecko(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, ProxyError> {
    let (path, params) = split_path_param(query);
    let path = path.ok_or(ProxyError::MissingPath)?;

    forward(&state, &path, params).await
}

/// Handler for GET /api/coingecko/<subpath>?<params>
pub async fn proxy_coingecko_path(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ProxyError> {
    if path.trim_matches('/').is_empty() {
        return Err(ProxyError::MissingPath);
    }

    forward(&state, &path, params).await
}

/// OPTIONS answers before any upstream call; the CORS layer adds the headers
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn forward(
    state: &AppState,
    path: &str,
    params: Vec<(String, String)>,
) -> Result<Response, ProxyError> {
    let upstream = state.coingecko.forward(path, &params).await?;

    Ok(relay(upstream, MARKET_CACHE_CONTROL))
}

/// Takes the first non-empty `path` out of the query, keeping the rest in order.
fn split_path_param(query: Vec<(String, String)>) -> (Option<String>, Vec<(String, String)>) {
    let mut path = None;
    let mut params = Vec::with_capacity(query.len());

    for (key, value) in query {
        if key == PATH_PARAM {
            if path.is_none() && !value.trim_matches('/').is_empty() {
                path = Some(value);
            }
        } else {
            params.push((key, value));
        }
    }

    (path, params)
}
