use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::Bar;

/// Errors a market-data provider can report. An empty series is not an error.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("provider error {code}: {description}")]
    Api { code: String, description: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// Source of daily and intraday closing prices.
///
/// `Ok(vec![])` means the provider has no data for the symbol, `Err` means the
/// fetch itself failed.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Daily closes for the sessions in `[start, end)`.
    async fn daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, ProviderError>;

    /// Minute closes of the most recent session.
    async fn intraday(&self, symbol: &str) -> Result<Vec<Bar>, ProviderError>;
}
