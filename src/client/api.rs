use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::client::error::{FetchError, is_blocked_signal};
use crate::models::market::{Article, Category, Coin, NewsResponse};
use crate::models::proxy::{CategoriesQuery, MarketsQuery};

/// What the dashboard needs from the proxy, one call per data source.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn fetch_coins(&self, query: &MarketsQuery) -> Result<Vec<Coin>, FetchError>;

    async fn fetch_categories(&self, query: &CategoriesQuery)
    -> Result<Vec<Category>, FetchError>;

    async fn fetch_news(&self) -> Result<Vec<Article>, FetchError>;
}

/// HTTP client for the proxy endpoints.
#[derive(Clone)]
pub struct ProxyClient {
    client: Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        // longer than the proxy's own 15s upstream timeout plus its fallback
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(FetchError::from_reqwest)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_market<T, Q>(&self, path: &str, query: &Q) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = format!("{}/api/coingecko", self.base_url);
        let request = self
            .client
            .get(&url)
            .query(&[("path", path)])
            .query(query);

        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, FetchError> {
        let response = request.send().await.map_err(FetchError::from_reqwest)?;
        let status = response.status();
        let body = response.bytes().await.map_err(FetchError::from_reqwest)?;

        if !status.is_success() {
            return Err(FetchError::from_status(status.as_u16(), &body));
        }

        let value: Value =
            serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))?;

        if is_blocked_signal(&value) {
            return Err(FetchError::UpstreamBlocked);
        }

        serde_json::from_value(value).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DashboardApi for ProxyClient {
    async fn fetch_coins(&self, query: &MarketsQuery) -> Result<Vec<Coin>, FetchError> {
        self.get_market("coins/markets", query).await
    }

    async fn fetch_categories(
        &self,
        query: &CategoriesQuery,
    ) -> Result<Vec<Category>, FetchError> {
        self.get_market("coins/categories", query).await
    }

    async fn fetch_news(&self) -> Result<Vec<Article>, FetchError> {
        let url = format!("{}/api/news", self.base_url);
        let news: NewsResponse = self.send(self.client.get(&url)).await?;
        Ok(news.articles)
    }
}
