use history_model::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("cannot render chart for {0}: empty series")]
    EmptySeries(String),

    #[error("image storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("drawing error: {0}")]
    Drawing(String),
}

/// Every way a chart request can fail.
#[derive(Debug, Error)]
pub enum StockChartError {
    #[error("Invalid input. Expecting '{0}' query parameter.")]
    MissingParameter(&'static str),

    #[error("Invalid period specified.")]
    InvalidPeriod,

    #[error("No data found for symbol: {0}. Check if it may be delisted.")]
    NotFound(String),

    #[error("No historical data found for symbol: {0}.")]
    InsufficientHistory(String),

    #[error("Previous close for {0} is zero, percentage change is undefined.")]
    ZeroPreviousClose(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Chart(#[from] ChartError),
}
