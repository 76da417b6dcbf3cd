use serde_json::Value;
use thiserror::Error;

/// Why a dashboard fetch failed, as far as the client can tell.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// HTTP 403, or the proxy's degraded `{status: 403, fallback: true}` body.
    #[error("upstream is blocking requests")]
    UpstreamBlocked,

    #[error("request timed out")]
    Timeout,

    #[error("network unreachable")]
    Offline,

    #[error("proxy answered {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

impl FetchError {
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_connect() {
            FetchError::Offline
        } else if error.is_decode() {
            FetchError::Decode(error.without_url().to_string())
        } else {
            FetchError::Other(error.without_url().to_string())
        }
    }

    /// Classifies a non-success HTTP answer from the proxy. The proxy flags
    /// upstream timeouts with `timeout: true` in its error body.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        if status == 403 {
            return FetchError::UpstreamBlocked;
        }

        let value = serde_json::from_slice::<Value>(body).ok();
        let timed_out = matches!(
            value.as_ref().and_then(|value| value.get("timeout")),
            Some(Value::Bool(true))
        );
        if timed_out || status == 504 {
            return FetchError::Timeout;
        }

        let message = value
            .and_then(|value| {
                value
                    .get("details")
                    .or_else(|| value.get("error"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("HTTP {}", status));

        FetchError::Upstream { status, message }
    }

    /// Text shown in the error banner next to the retry button.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::UpstreamBlocked => {
                "The data provider is temporarily unavailable because it is receiving too many requests. Please try again in a few moments.".to_string()
            }
            FetchError::Timeout => {
                "The request took too long to complete. Please check your connection and try again.".to_string()
            }
            FetchError::Offline => {
                "You appear to be offline. Reconnect to the internet and try again.".to_string()
            }
            FetchError::Upstream { status, .. } => {
                format!("Failed to load data (HTTP {}). Please try again.", status)
            }
            FetchError::Decode(_) | FetchError::Other(_) => {
                "Failed to load data. Please try again.".to_string()
            }
        }
    }
}

/// True when a 200 body is really the proxy's degraded-availability notice.
pub fn is_blocked_signal(body: &Value) -> bool {
    let status_403 = body.get("status").and_then(Value::as_u64) == Some(403);
    let fallback = body.get("fallback").and_then(Value::as_bool) == Some(true);
    status_403 || fallback
}
