// src/lib.rs

use services::{coingecko::CoinGeckoProxy, news::NewsService};

#[derive(Clone)]
pub struct AppState {
    pub coingecko: CoinGeckoProxy,
    pub news: NewsService,
}

impl AppState {
    pub fn from_config(config: config::Config) -> Result<Self, reqwest::Error> {
        let coingecko = CoinGeckoProxy::new(&config)?;
        let news = NewsService::new(&config)?;

        Ok(Self {
            coingecko,
            news,
        })
    }
}

pub mod services {
    pub mod coingecko;
    pub mod news;
}

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
