//! Error taxonomy of the proxy. Every variant renders as a JSON body with an
//! explicit status, so nothing raised by an upstream escapes a handler.

use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::proxy::{DegradedResponse, ErrorResponse, UpstreamErrorResponse};

const UPSTREAM_ERROR: &str = "Failed to fetch data from CoinGecko via proxy.";

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Path parameter is required")]
    MissingPath,

    #[error("upstream request for {path} failed: {details}")]
    Upstream {
        status: Option<StatusCode>,
        details: String,
        path: String,
        params: Vec<(String, String)>,
    },

    #[error("upstream request for {path} timed out after {}s", .after.as_secs())]
    UpstreamTimeout {
        after: Duration,
        path: String,
        params: Vec<(String, String)>,
    },

    /// Both the primary and the fallback attempt were refused with 403.
    #[error("API temporarily unavailable")]
    UpstreamBlocked,

    #[error("API key is not configured.")]
    MissingApiKey,

    #[error("Failed to fetch news from GNews API.")]
    NewsUpstream(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::MissingPath | ProxyError::MissingApiKey | ProxyError::NewsUpstream(_) => {
                let status = match self {
                    ProxyError::MissingPath => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let body = ErrorResponse {
                    error: self.to_string(),
                };
                (status, Json(body)).into_response()
            }
            ProxyError::Upstream {
                status,
                details,
                path,
                params,
            } => upstream_error_response(
                status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                details,
                path,
                params,
                false,
            ),
            ProxyError::UpstreamTimeout {
                after,
                path,
                params,
            } => upstream_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("timeout of {}ms exceeded", after.as_millis()),
                path,
                params,
                true,
            ),
            // 200 on purpose: clients show a notice instead of retrying on their own
            ProxyError::UpstreamBlocked => (
                StatusCode::OK,
                Json(DegradedResponse {
                    error: "API temporarily unavailable".to_string(),
                    message: "CoinGecko API is experiencing high traffic. Please try again in a few moments."
                        .to_string(),
                    status: StatusCode::FORBIDDEN.as_u16(),
                    fallback: true,
                }),
            )
                .into_response(),
        }
    }
}

fn upstream_error_response(
    status: StatusCode,
    details: String,
    path: String,
    params: Vec<(String, String)>,
    timeout: bool,
) -> Response {
    let body = UpstreamErrorResponse {
        error: UPSTREAM_ERROR.to_string(),
        details,
        path,
        params,
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        timeout,
    };

    (status, Json(body)).into_response()
}
