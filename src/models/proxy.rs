use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body returned when an upstream call fails outright.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamErrorResponse {
    pub error: String,
    pub details: String,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub timestamp: String,
    /// Set when the upstream never answered within the proxy's timeout.
    #[serde(default)]
    pub timeout: bool,
}

/// Body returned with HTTP 200 when both the primary and the fallback attempt
/// were blocked. Clients detect it through `status` and `fallback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradedResponse {
    pub error: String,
    pub message: String,
    pub status: u16,
    pub fallback: bool,
}

/// Parameters of `coins/markets`, named the way the upstream expects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketsQuery {
    #[serde(rename = "vs_currency")]
    pub currency: String,
    #[serde(rename = "order")]
    pub sort_order: String,
    #[serde(rename = "per_page")]
    pub page_size: u32,
    #[serde(rename = "page")]
    pub page_number: u32,
    pub sparkline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        rename = "price_change_percentage",
        skip_serializing_if = "Option::is_none"
    )]
    pub price_change_window: Option<String>,
}

impl Default for MarketsQuery {
    fn default() -> Self {
        Self {
            currency: "usd".to_string(),
            sort_order: "market_cap_desc".to_string(),
            page_size: 100,
            page_number: 1,
            sparkline: false,
            category: None,
            price_change_window: Some("7d".to_string()),
        }
    }
}

impl MarketsQuery {
    /// `"all"` (or an empty id) means no category filter.
    pub fn for_category(category: &str) -> Self {
        let category = match category {
            "" | crate::client::view::ALL_CATEGORIES => None,
            id => Some(id.to_string()),
        };

        Self {
            category,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoriesQuery {
    pub order: String,
}

impl Default for CategoriesQuery {
    fn default() -> Self {
        Self {
            order: "market_cap_desc".to_string(),
        }
    }
}
