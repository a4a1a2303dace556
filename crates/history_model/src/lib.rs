use chrono::NaiveDateTime;
use serde::Serialize;

pub mod provider;

pub use provider::{MarketDataClient, ProviderError};

/// One closing price observation. Daily bars carry midnight of the session date,
/// intraday bars the minute they close; both in exchange-local time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub close: f64,
}

impl Bar {
    pub fn new(timestamp: NaiveDateTime, close: f64) -> Self {
        Bar { timestamp, close }
    }
}

/// Everything one chart request needs: both series, the peaks found in the
/// historical closes and the current-price statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockChartData {
    pub symbol: String,
    pub historical: Vec<Bar>,
    pub intraday: Vec<Bar>,
    /// Indices into `historical`.
    pub peaks: Vec<usize>,
    pub current_price: f64,
    pub price_change: f64,
    pub percentage_change: f64,
}

impl StockChartData {
    pub fn peak_bars(&self) -> impl Iterator<Item = &Bar> {
        self.peaks.iter().filter_map(|&i| self.historical.get(i))
    }
}
