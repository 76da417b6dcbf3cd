use std::time::Duration;

use reqwest::{Client, Response};

use crate::config::Config;
use crate::error::ProxyError;
use crate::services::coingecko::UpstreamResponse;

/// Fixed GNews query: English crypto headlines, ten at a time.
const NEWS_TOPIC: &str = "cryptocurrencies";
const NEWS_LANGUAGE: &str = "en";
const NEWS_MAX_RESULTS: u32 = 10;

/// Calls GNews `search` with the server-held API key so it never reaches the browser.
#[derive(Clone)]
pub struct NewsService {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl NewsService {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: config.gnews_base_url.trim_end_matches('/').to_string(),
            api_key: config.gnews_api_key.clone(),
            timeout: config.upstream_timeout,
        })
    }

    pub async fn search(&self) -> Result<UpstreamResponse, ProxyError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::error!("GNEWS_API_KEY is not set, refusing news request");
            return Err(ProxyError::MissingApiKey);
        };

        let url = format!("{}/search", self.base_url);
        tracing::info!("Fetching news from GNews ({} results)", NEWS_MAX_RESULTS);

        let max_results = NEWS_MAX_RESULTS.to_string();
        let result = self
            .client
            .get(&url)
            .query(&[
                ("q", NEWS_TOPIC),
                ("lang", NEWS_LANGUAGE),
                ("max", max_results.as_str()),
                ("apikey", api_key),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .and_then(Response::error_for_status);

        let upstream = match result {
            Ok(response) => UpstreamResponse::read(response).await,
            Err(e) => Err(e),
        };

        // without_url keeps the key out of the logs
        upstream.map_err(|e| {
            let e = e.without_url();
            tracing::error!("Failed to fetch news from GNews: {}", e);
            ProxyError::NewsUpstream(e.to_string())
        })
    }
}
