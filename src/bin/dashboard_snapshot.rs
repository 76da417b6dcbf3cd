use std::env;
use std::sync::Arc;

use cryptoinfo_backend::client::{
    Dashboard, FetchState, ProxyClient, SortKey,
    format::{
        Trend, display_name, display_symbol, format_market_cap, format_percent, format_price,
        format_rank, trend,
    },
};

/// Renders the dashboard once as a text table, using a running proxy.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let mut search = None;
    let mut category = None;
    let mut sort = None;
    let mut descending = false;
    let mut with_news = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--search" => {
                search = args.get(i + 1).cloned();
                i += 1;
            }
            "--category" => {
                category = args.get(i + 1).cloned();
                i += 1;
            }
            "--sort" => {
                let key = args.get(i + 1).map(String::as_str).unwrap_or_default();
                sort = Some(key.parse::<SortKey>().map_err(anyhow::Error::msg)?);
                i += 1;
            }
            "--desc" => descending = true,
            "--news" => with_news = true,
            other => {
                eprintln!(
                    "Usage: {} [--search TEXT] [--category ID] [--sort rank|name|symbol|price|24h|7d|market_cap] [--desc] [--news]",
                    args[0]
                );
                anyhow::bail!("unexpected argument: {}", other);
            }
        }
        i += 1;
    }

    let proxy_url = env::var("PROXY_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
    let api = ProxyClient::new(proxy_url)?;
    let dashboard = Dashboard::new(Arc::new(api));

    dashboard.load_categories().await;
    match category {
        Some(category) => dashboard.select_category(&category).await,
        None => dashboard.fetch_coins().await,
    }

    if let Some(term) = &search {
        dashboard.set_search(term);
    }
    if let Some(key) = sort {
        if dashboard.view().sort.key != Some(key) {
            dashboard.sort_by(key);
        }
        if descending {
            dashboard.sort_by(key);
        }
    } else if descending {
        dashboard.sort_by(SortKey::MarketCapRank);
    }

    if let FetchState::Ready(categories) = dashboard.categories() {
        let names: Vec<&str> = categories.iter().map(|c| c.id.as_str()).collect();
        println!("Categories: {}", names.join(", "));
    }

    match dashboard.coins() {
        FetchState::Failed(message) => println!("Error: {}", message),
        FetchState::Idle | FetchState::Loading => println!("Loading data..."),
        FetchState::Ready(_) => {
            let view = dashboard.view();
            println!(
                "{:>5}  {:<28} {:>16} {:>9} {:>9} {:>22}",
                "#", "Coin", "Price", "24h %", "7d %", "Market Cap"
            );
            if let Some(key) = view.sort.key {
                println!("(sorted by {} {:?})", key, view.sort.direction);
            }
            for coin in dashboard.visible_coins() {
                let change_24h = coin.price_change_percentage_24h;
                let arrow = match trend(change_24h) {
                    Trend::Up => "+",
                    Trend::Down => "-",
                };
                let label = format!(
                    "{} ({})",
                    display_name(coin.name.as_deref()),
                    display_symbol(coin.symbol.as_deref())
                );
                println!(
                    "{:>5}  {:<28} {:>16} {:>8}{} {:>9} {:>22}",
                    format_rank(coin.market_cap_rank),
                    label,
                    format_price(coin.current_price),
                    format_percent(change_24h),
                    arrow,
                    format_percent(coin.price_change_percentage_7d_in_currency),
                    format_market_cap(coin.market_cap),
                );
            }
        }
    }

    if with_news {
        dashboard.refresh_news().await;
        match dashboard.news() {
            FetchState::Ready(articles) => {
                println!();
                println!("Trending News");
                for article in articles {
                    println!("- {} ({})", article.title, article.source.name);
                }
            }
            FetchState::Failed(message) => println!("News error: {}", message),
            FetchState::Idle | FetchState::Loading => {}
        }
    }

    Ok(())
}
