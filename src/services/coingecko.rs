use std::time::Duration;

use axum::body::Bytes;
use reqwest::{
    Client, Response, StatusCode,
    header::{self, HeaderMap, HeaderName, HeaderValue},
    redirect,
};
use serde_json::Value;

use crate::config::Config;
use crate::error::ProxyError;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const FALLBACK_USER_AGENT: &str = "curl/7.68.0";
const COINGECKO_SITE: &str = "https://www.coingecko.com";

/// Raw upstream reply, relayed to the caller without reinterpreting the body.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub(crate) async fn read(response: Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let body = response.bytes().await?;

        Ok(Self {
            status,
            content_type,
            body,
        })
    }
}

/// Forwards market-data requests to CoinGecko.
///
/// A 403 from the upstream gets exactly one more attempt with a bare header
/// set after `fallback_delay`. Any other status below 500 is relayed as-is.
#[derive(Clone)]
pub struct CoinGeckoProxy {
    client: Client,
    base_url: String,
    timeout: Duration,
    fallback_timeout: Duration,
    fallback_delay: Duration,
}

impl CoinGeckoProxy {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            base_url: config.coingecko_base_url.trim_end_matches('/').to_string(),
            timeout: config.upstream_timeout,
            fallback_timeout: config.fallback_timeout,
            fallback_delay: config.fallback_delay,
        })
    }

    pub fn upstream_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn forward(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<UpstreamResponse, ProxyError> {
        let url = self.upstream_url(path);
        tracing::info!("Fetching: {} with params: {:?}", url, params);

        let result = self
            .client
            .get(&url)
            .headers(browser_headers())
            .query(params)
            .timeout(self.timeout)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => return Err(self.transport_error(e, self.timeout, path, params)),
        };

        let status = response.status();

        if status == StatusCode::FORBIDDEN {
            tracing::warn!("403 from CoinGecko for {}, trying fallback request", path);
            return self.fallback(&url, path, params).await;
        }

        if status.is_server_error() {
            let body = response.bytes().await.unwrap_or_default();
            let details = upstream_error_details(&body)
                .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
            tracing::error!(
                "Error proxying CoinGecko API for path: {} (status {}): {}",
                path,
                status,
                details
            );
            return Err(ProxyError::Upstream {
                status: Some(status),
                details,
                path: path.to_string(),
                params: params.to_vec(),
            });
        }

        let upstream = UpstreamResponse::read(response)
            .await
            .map_err(|e| self.transport_error(e, self.timeout, path, params))?;

        tracing::debug!(
            "CoinGecko answered {} for {} ({} bytes)",
            upstream.status,
            path,
            upstream.body.len()
        );

        Ok(upstream)
    }

    async fn fallback(
        &self,
        url: &str,
        path: &str,
        params: &[(String, String)],
    ) -> Result<UpstreamResponse, ProxyError> {
        tokio::time::sleep(self.fallback_delay).await;

        let result = self
            .client
            .get(url)
            .headers(fallback_headers())
            .query(params)
            .timeout(self.fallback_timeout)
            .send()
            .await
            .and_then(Response::error_for_status);

        let upstream = match result {
            Ok(response) => UpstreamResponse::read(response).await,
            Err(e) => Err(e),
        };

        match upstream {
            Ok(upstream) => {
                tracing::info!("Fallback request for {} succeeded", path);
                Ok(upstream)
            }
            Err(e) => {
                tracing::error!("Fallback also failed for {}: {}", path, e.without_url());
                Err(ProxyError::UpstreamBlocked)
            }
        }
    }

    fn transport_error(
        &self,
        error: reqwest::Error,
        after: Duration,
        path: &str,
        params: &[(String, String)],
    ) -> ProxyError {
        tracing::error!(
            "Error proxying CoinGecko API for path: {}: {}",
            path,
            error
        );

        if error.is_timeout() {
            return ProxyError::UpstreamTimeout {
                after,
                path: path.to_string(),
                params: params.to_vec(),
            };
        }

        ProxyError::Upstream {
            status: error.status(),
            details: error.without_url().to_string(),
            path: path.to_string(),
            params: params.to_vec(),
        }
    }
}

/// Header set of an ordinary browser tab on coingecko.com. Accept-Encoding is
/// left to reqwest so compressed bodies are decoded transparently.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(header::DNT, HeaderValue::from_static("1"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("empty"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("cors"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("cross-site"),
    );
    headers.insert(
        header::REFERER,
        HeaderValue::from_static("https://www.coingecko.com/"),
    );
    headers.insert(header::ORIGIN, HeaderValue::from_static(COINGECKO_SITE));
    headers
}

fn fallback_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(FALLBACK_USER_AGENT));
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers
}

/// CoinGecko reports failures as `{"error": ...}`; pull that out when present.
fn upstream_error_details(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("error")? {
        Value::String(message) => Some(message.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
