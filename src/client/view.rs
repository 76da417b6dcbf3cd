use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::models::market::Coin;

/// Category id meaning "no filter".
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    MarketCapRank,
    Name,
    Symbol,
    CurrentPrice,
    PriceChange24h,
    PriceChange7d,
    MarketCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: Some(SortKey::MarketCapRank),
            direction: SortDirection::Ascending,
        }
    }
}

/// Search, category and sort settings. Changing them never hits the network
/// except for the category, which the dashboard refetches on.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub search: String,
    pub category: String,
    pub sort: SortConfig,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL_CATEGORIES.to_string(),
            sort: SortConfig::default(),
        }
    }
}

impl ViewState {
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Returns true when the selection actually changed.
    pub fn select_category(&mut self, category: &str) -> bool {
        let category = if category.is_empty() {
            ALL_CATEGORIES
        } else {
            category
        };

        if self.category == category {
            return false;
        }
        self.category = category.to_string();
        true
    }

    /// Column click: the active key flips direction, a new key starts ascending.
    pub fn sort_by(&mut self, key: SortKey) {
        let direction = if self.sort.key == Some(key)
            && self.sort.direction == SortDirection::Ascending
        {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };

        self.sort = SortConfig {
            key: Some(key),
            direction,
        };
    }

    pub fn clear_sort(&mut self) {
        self.sort.key = None;
    }

    pub fn visible<'a>(&self, coins: &'a [Coin]) -> Vec<&'a Coin> {
        derive_rows(coins, &self.search, self.sort)
    }
}

/// Filters by search term and orders by the sort config.
///
/// The sort is stable, so rows with equal keys keep their incoming order in
/// both directions. Absent numbers order as zero, absent text as "".
pub fn derive_rows<'a>(coins: &'a [Coin], search: &str, sort: SortConfig) -> Vec<&'a Coin> {
    let needle = search.to_lowercase();
    let mut rows: Vec<&Coin> = coins
        .iter()
        .filter(|coin| matches_search(coin, &needle))
        .collect();

    if let Some(key) = sort.key {
        rows.sort_by(|a, b| {
            let ordering = compare(a, b, key);
            match sort.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    rows
}

/// `needle` must already be lower-cased.
fn matches_search(coin: &Coin, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    let name = coin.name.as_deref().unwrap_or_default().to_lowercase();
    let symbol = coin.symbol.as_deref().unwrap_or_default().to_lowercase();
    name.contains(needle) || symbol.contains(needle)
}

fn compare(a: &Coin, b: &Coin, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => text(&a.name).cmp(&text(&b.name)),
        SortKey::Symbol => text(&a.symbol).cmp(&text(&b.symbol)),
        _ => number(a, key).cmp(&number(b, key)),
    }
}

fn text(value: &Option<String>) -> String {
    value.as_deref().unwrap_or_default().to_lowercase()
}

fn number(coin: &Coin, key: SortKey) -> Decimal {
    let value = match key {
        SortKey::MarketCapRank => coin.market_cap_rank.map(Decimal::from),
        SortKey::CurrentPrice => coin.current_price,
        SortKey::PriceChange24h => coin.price_change_percentage_24h,
        SortKey::PriceChange7d => coin.price_change_percentage_7d_in_currency,
        SortKey::MarketCap => coin.market_cap,
        SortKey::Name | SortKey::Symbol => None,
    };
    value.unwrap_or(Decimal::ZERO)
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::MarketCapRank => "#",
            SortKey::Name => "Coin",
            SortKey::Symbol => "Symbol",
            SortKey::CurrentPrice => "Price",
            SortKey::PriceChange24h => "24h %",
            SortKey::PriceChange7d => "7d %",
            SortKey::MarketCap => "Market Cap",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rank" | "market_cap_rank" => Ok(SortKey::MarketCapRank),
            "name" => Ok(SortKey::Name),
            "symbol" => Ok(SortKey::Symbol),
            "price" | "current_price" => Ok(SortKey::CurrentPrice),
            "24h" | "price_change_percentage_24h" => Ok(SortKey::PriceChange24h),
            "7d" | "price_change_percentage_7d_in_currency" => Ok(SortKey::PriceChange7d),
            "market_cap" | "mcap" => Ok(SortKey::MarketCap),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}
