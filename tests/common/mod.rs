#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use cryptoinfo_backend::client::{DashboardApi, FetchError};
use cryptoinfo_backend::config::Config;
use cryptoinfo_backend::models::market::{Article, Category, Coin, Source};
use cryptoinfo_backend::models::proxy::{CategoriesQuery, MarketsQuery};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::oneshot;

pub const TEST_NEWS_KEY: &str = "test-gnews-key";

/// One request as seen by the fake upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub query: String,
    pub user_agent: String,
}

/// In-process stand-in for CoinGecko (`/api/v3/...`) and GNews (`/gnews/...`).
#[derive(Clone, Default)]
pub struct FakeUpstream {
    pub hits: Arc<AtomicUsize>,
    pub requests: Arc<Mutex<Vec<Recorded>>>,
    /// When set, `coins/markets` refuses every caller with 403.
    pub block_markets: Arc<AtomicBool>,
    /// When set, `coins/markets` answers only after the proxy has given up.
    pub slow_markets: Arc<AtomicBool>,
}

impl FakeUpstream {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }
}

/// Serves `router` on an ephemeral local port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });

    addr
}

pub async fn spawn_fake_upstream() -> (FakeUpstream, String) {
    let fake = FakeUpstream::default();
    let router = Router::new()
        .fallback(fake_handler)
        .with_state(fake.clone());

    let addr = serve(router).await;
    (fake, format!("http://{}", addr))
}

/// Proxy config pointing at the fake upstream, with short policy timings.
pub fn test_config(upstream_base: &str) -> Config {
    Config {
        coingecko_base_url: format!("{}/api/v3", upstream_base),
        gnews_base_url: format!("{}/gnews", upstream_base),
        gnews_api_key: Some(TEST_NEWS_KEY.to_string()),
        upstream_timeout: Duration::from_millis(500),
        fallback_timeout: Duration::from_millis(500),
        fallback_delay: Duration::from_millis(10),
        ..Config::default()
    }
}

/// A port nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind throwaway listener");
    let addr = listener.local_addr().expect("throwaway addr");
    drop(listener);
    format!("http://{}", addr)
}

async fn fake_handler(State(fake): State<FakeUpstream>, uri: Uri, headers: HeaderMap) -> Response {
    fake.hits.fetch_add(1, Ordering::SeqCst);

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let query = uri.query().unwrap_or_default().to_string();
    fake.requests.lock().push(Recorded {
        path: uri.path().to_string(),
        query: query.clone(),
        user_agent: user_agent.clone(),
    });

    let browser = user_agent.starts_with("Mozilla/5.0");

    match uri.path() {
        "/api/v3/coins/markets" => {
            if fake.block_markets.load(Ordering::SeqCst) {
                return forbidden();
            }
            if fake.slow_markets.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(3)).await;
            }
            let category = query_value(&query, "category");
            Json(markets_payload(category.as_deref())).into_response()
        }
        "/api/v3/coins/categories" => Json(categories_payload(30)).into_response(),
        "/api/v3/coins/missing" => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "coin not found" })),
        )
            .into_response(),
        "/api/v3/limited" => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "status": { "error_code": 429, "error_message": "rate limited" } })),
        )
            .into_response(),
        "/api/v3/broken" => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "service unavailable" })),
        )
            .into_response(),
        "/api/v3/blocked" => forbidden(),
        "/api/v3/blocked-browser" if browser => forbidden(),
        "/api/v3/blocked-browser" => Json(json!({ "gecko_says": "(V3) To the Moon!" })).into_response(),
        "/api/v3/slow" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "late": true })).into_response()
        }
        "/gnews/search" => {
            if query_value(&query, "apikey").as_deref() != Some(TEST_NEWS_KEY) {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "errors": ["invalid api key"] })),
                )
                    .into_response();
            }
            Json(news_payload()).into_response()
        }
        _ => (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response(),
    }
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "forbidden" })),
    )
        .into_response()
}

fn query_value(query: &str, key: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| v.to_string())
    })
}

pub fn markets_payload(category: Option<&str>) -> Value {
    match category {
        Some(category) => json!([{
            "id": format!("{}-coin", category),
            "symbol": "cat",
            "name": format!("{} Coin", category),
            "image": "https://assets.example/cat.png",
            "current_price": 2.5,
            "market_cap": 1000000,
            "market_cap_rank": 40,
            "price_change_percentage_24h": 1.25,
            "price_change_percentage_7d_in_currency": -3.5
        }]),
        None => json!([
            {
                "id": "bitcoin",
                "symbol": "btc",
                "name": "Bitcoin",
                "image": "https://assets.example/btc.png",
                "current_price": 64000.12,
                "market_cap": 1260000000000u64,
                "market_cap_rank": 1,
                "price_change_percentage_24h": 2.1,
                "price_change_percentage_7d_in_currency": 5.4
            },
            {
                "id": "ethereum",
                "symbol": "eth",
                "name": "Ethereum",
                "image": "https://assets.example/eth.png",
                "current_price": 3100.5,
                "market_cap": 372000000000u64,
                "market_cap_rank": 2,
                "price_change_percentage_24h": -0.8,
                "price_change_percentage_7d_in_currency": null
            }
        ]),
    }
}

pub fn categories_payload(count: usize) -> Value {
    let categories: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": format!("category-{}", i),
                "name": format!("Category {}", i),
                "market_cap": 1_000_000_000u64 - i as u64,
                "market_cap_change_24h": 0.5,
                "volume_24h": 1000
            })
        })
        .collect();
    Value::Array(categories)
}

pub fn news_payload() -> Value {
    json!({
        "totalArticles": 2,
        "articles": [
            {
                "title": "Bitcoin hits a new high",
                "description": "BTC rallies",
                "content": "Bitcoin rallied today...",
                "url": "https://news.example/btc-high",
                "image": "https://news.example/btc.jpg",
                "publishedAt": "2024-03-01T08:30:00Z",
                "source": { "name": "Example Wire", "url": "https://news.example" }
            },
            {
                "title": "Ethereum upgrade ships",
                "description": "ETH devs deliver",
                "content": "The upgrade went live...",
                "url": "https://news.example/eth-upgrade",
                "image": null,
                "publishedAt": "2024-03-01T09:00:00Z",
                "source": { "name": "Chain Daily", "url": "https://chain.example" }
            }
        ]
    })
}

pub fn coin(id: &str) -> Coin {
    Coin {
        id: id.to_string(),
        name: Some(id.to_string()),
        symbol: Some(id.chars().take(3).collect()),
        image: None,
        current_price: None,
        market_cap: None,
        market_cap_rank: None,
        price_change_percentage_24h: None,
        price_change_percentage_7d_in_currency: None,
    }
}

pub fn category(id: &str) -> Category {
    Category {
        id: id.to_string(),
        name: id.to_string(),
        market_cap: None,
    }
}

pub fn article(title: &str) -> Article {
    Article {
        title: title.to_string(),
        description: None,
        content: None,
        url: format!("https://news.example/{}", title),
        image: None,
        published_at: chrono::Utc::now(),
        source: Source {
            name: "Example Wire".to_string(),
            url: None,
        },
    }
}

/// `DashboardApi` double. Each source answers from its queue (or a default
/// when the queue is empty); coin requests for a gated category wait until
/// the test releases them.
#[derive(Default)]
pub struct ScriptedApi {
    pub coin_results: Mutex<VecDeque<Result<Vec<Coin>, FetchError>>>,
    pub category_results: Mutex<VecDeque<Result<Vec<Category>, FetchError>>>,
    pub news_results: Mutex<VecDeque<Result<Vec<Article>, FetchError>>>,
    pub coin_gates: Mutex<HashMap<String, oneshot::Receiver<Vec<Coin>>>>,
    pub coin_queries: Mutex<Vec<MarketsQuery>>,
    pub category_calls: AtomicUsize,
    pub news_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn push_coins(&self, result: Result<Vec<Coin>, FetchError>) {
        self.coin_results.lock().push_back(result);
    }

    pub fn push_categories(&self, result: Result<Vec<Category>, FetchError>) {
        self.category_results.lock().push_back(result);
    }

    pub fn push_news(&self, result: Result<Vec<Article>, FetchError>) {
        self.news_results.lock().push_back(result);
    }

    /// Holds coin requests for `category` until the returned sender fires.
    pub fn gate_category(&self, category: &str) -> oneshot::Sender<Vec<Coin>> {
        let (tx, rx) = oneshot::channel();
        self.coin_gates.lock().insert(category.to_string(), rx);
        tx
    }

    pub fn pending_gates(&self) -> usize {
        self.coin_gates.lock().len()
    }

    pub fn coin_calls(&self) -> usize {
        self.coin_queries.lock().len()
    }

    pub fn news_calls(&self) -> usize {
        self.news_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DashboardApi for ScriptedApi {
    async fn fetch_coins(&self, query: &MarketsQuery) -> Result<Vec<Coin>, FetchError> {
        self.coin_queries.lock().push(query.clone());

        let key = query.category.clone().unwrap_or_else(|| "all".to_string());
        let gate = self.coin_gates.lock().remove(&key);
        if let Some(gate) = gate {
            return gate
                .await
                .map_err(|_| FetchError::Other("gate dropped".to_string()));
        }

        let scripted = self.coin_results.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(vec![coin(&format!("{}-coin", key))]))
    }

    async fn fetch_categories(
        &self,
        _query: &CategoriesQuery,
    ) -> Result<Vec<Category>, FetchError> {
        self.category_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.category_results.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(vec![category("layer-1"), category("defi")]))
    }

    async fn fetch_news(&self) -> Result<Vec<Article>, FetchError> {
        self.news_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.news_results.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(vec![article("headline")]))
    }
}
