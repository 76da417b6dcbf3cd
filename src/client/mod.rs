//! Dashboard client: talks to the proxy, tracks per-source fetch state and
//! derives the visible coin table from the user's view settings.

pub mod api;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod news_refresh;
pub mod source;
pub mod view;

pub use api::{DashboardApi, ProxyClient};
pub use dashboard::{Dashboard, DashboardState};
pub use error::FetchError;
pub use news_refresh::NewsRefresh;
pub use source::{DataSource, FetchState, Ticket};
pub use view::{SortConfig, SortDirection, SortKey, ViewState};
