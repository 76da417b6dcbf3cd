use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::client::api::DashboardApi;
use crate::client::source::{DataSource, FetchState};
use crate::client::view::{SortKey, ViewState};
use crate::models::market::{Article, Category, Coin};
use crate::models::proxy::{CategoriesQuery, MarketsQuery};

pub const NEWS_REFRESH_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);
/// Only the largest categories are offered in the filter.
pub const TOP_CATEGORIES: usize = 25;

#[derive(Debug, Default)]
pub struct DashboardState {
    pub coins: DataSource<Vec<Coin>>,
    pub categories: DataSource<Vec<Category>>,
    pub news: DataSource<Vec<Article>>,
    pub view: ViewState,
    categories_requested: bool,
}

/// Client-side state of the dashboard.
///
/// Cloning is cheap and clones share state. The lock is only taken between
/// awaits, and each source's fields are only written by that source's fetch.
pub struct Dashboard<A: ?Sized> {
    api: Arc<A>,
    state: Arc<Mutex<DashboardState>>,
}

impl<A: ?Sized> Clone for Dashboard<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A: DashboardApi + ?Sized> Dashboard<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(DashboardState::default())),
        }
    }

    /// Initial load: the category list and the unfiltered market.
    pub async fn start(&self) {
        self.load_categories().await;
        self.fetch_coins().await;
    }

    /// Fetches categories once per session; later calls do nothing.
    pub async fn load_categories(&self) {
        {
            let mut state = self.state.lock();
            if state.categories_requested {
                tracing::debug!("Categories already requested this session");
                return;
            }
            state.categories_requested = true;
        }

        self.request_categories(false).await;
    }

    pub async fn retry_categories(&self) {
        let attempt = self.state.lock().categories.record_retry();
        tracing::info!("Retrying categories (attempt {})", attempt);
        self.request_categories(true).await;
    }

    async fn request_categories(&self, silent: bool) {
        let ticket = self.state.lock().categories.begin(silent);

        let result = self
            .api
            .fetch_categories(&CategoriesQuery::default())
            .await
            .map(|mut categories| {
                categories.truncate(TOP_CATEGORIES);
                categories
            });

        if let Err(e) = &result {
            tracing::error!("Error fetching categories: {}", e);
        }
        self.state.lock().categories.complete(ticket, result);
    }

    /// Fetches market data for the selected category, showing the loading state.
    pub async fn fetch_coins(&self) {
        self.request_coins(false).await;
    }

    /// Refetches without blanking the table first.
    pub async fn retry_coins(&self) {
        let attempt = self.state.lock().coins.record_retry();
        tracing::info!("Retrying market data (attempt {})", attempt);
        self.request_coins(true).await;
    }

    async fn request_coins(&self, silent: bool) {
        let (ticket, query) = {
            let mut state = self.state.lock();
            let ticket = state.coins.begin(silent);
            (ticket, MarketsQuery::for_category(&state.view.category))
        };

        let result = self.api.fetch_coins(&query).await;

        match &result {
            Ok(coins) => tracing::debug!(
                "Fetched {} coins (category: {:?})",
                coins.len(),
                query.category
            ),
            Err(e) => tracing::error!("Error fetching coin data: {}", e),
        }

        let applied = self.state.lock().coins.complete(ticket, result);
        if !applied {
            tracing::debug!(
                "Discarded market data for superseded category {:?}",
                query.category
            );
        }
    }

    /// Changes the filter and refetches when it actually changed.
    pub async fn select_category(&self, category: &str) {
        let changed = self.state.lock().view.select_category(category);
        if changed {
            self.fetch_coins().await;
        }
    }

    /// Periodic news refresh; silent once articles are on screen.
    pub async fn refresh_news(&self) {
        let silent = self
            .state
            .lock()
            .news
            .state()
            .data()
            .is_some_and(|articles| !articles.is_empty());

        self.request_news(silent).await;
    }

    pub async fn retry_news(&self) {
        let attempt = self.state.lock().news.record_retry();
        tracing::info!("Retrying news (attempt {})", attempt);
        self.request_news(true).await;
    }

    async fn request_news(&self, silent: bool) {
        let ticket = self.state.lock().news.begin(silent);
        let result = self.api.fetch_news().await;

        match &result {
            Ok(articles) => tracing::debug!("Fetched {} articles", articles.len()),
            Err(e) => tracing::error!("Error fetching news: {}", e),
        }
        self.state.lock().news.complete(ticket, result);
    }

    pub fn set_search(&self, term: &str) {
        self.state.lock().view.set_search(term);
    }

    pub fn sort_by(&self, key: SortKey) {
        self.state.lock().view.sort_by(key);
    }

    /// Rows to render; empty unless market data is ready.
    pub fn visible_coins(&self) -> Vec<Coin> {
        let state = self.state.lock();
        match state.coins.state() {
            FetchState::Ready(coins) => state.view.visible(coins).into_iter().cloned().collect(),
            _ => Vec::new(),
        }
    }

    pub fn coins(&self) -> FetchState<Vec<Coin>> {
        self.state.lock().coins.state().clone()
    }

    pub fn categories(&self) -> FetchState<Vec<Category>> {
        self.state.lock().categories.state().clone()
    }

    pub fn news(&self) -> FetchState<Vec<Article>> {
        self.state.lock().news.state().clone()
    }

    pub fn view(&self) -> ViewState {
        self.state.lock().view.clone()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        f(&self.state.lock())
    }
}
