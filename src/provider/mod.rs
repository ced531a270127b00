pub mod http_client;
pub mod yahoo;

use crate::models::{BalanceSheetHistory, PriceBar, QuoteSummary};
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

pub use self::yahoo::YahooClient;

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("rate limited by provider ({url})")]
    RateLimited { url: String },

    #[error("provider rejected credentials ({url})")]
    Unauthorized { url: String },

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("provider error for {symbol}: {message}")]
    Api { symbol: String, message: String },

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("no data for {0}")]
    NoData(String),
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Parse(e.to_string())
    }
}

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable market-data provider. One call per question; nothing is cached.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Most recent daily close.
    async fn latest_close(&self, symbol: &str) -> Result<f64, ProviderError>;

    /// Metrics and company metadata; absent fields stay `None`.
    async fn quote_summary(&self, symbol: &str) -> Result<QuoteSummary, ProviderError>;

    /// Daily bars in `[start, end)`, oldest first.
    async fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, ProviderError>;

    /// Annual debt and cash line items by fiscal year end.
    async fn balance_sheet_history(&self, symbol: &str) -> Result<BalanceSheetHistory, ProviderError>;
}
