use chrono::NaiveDate;
use history_model::{MarketDataClient, StockChartData};
use log::{debug, info};

use crate::error::StockChartError;
use crate::peaks::find_peaks;

/// Fetches both series for `symbol`, finds the historical peaks and derives
/// today's change against the last completed session.
///
/// The historical window is `[start, today)`, so today's unfinished session
/// never becomes the previous close.
pub async fn assemble<C>(
    client: &C,
    symbol: &str,
    start: NaiveDate,
    today: NaiveDate,
) -> Result<StockChartData, StockChartError>
where
    C: MarketDataClient + ?Sized,
{
    let historical = client.daily_history(symbol, start, today).await?;
    let closes: Vec<f64> = historical.iter().map(|bar| bar.close).collect();
    let peaks = find_peaks(&closes);

    debug!(
        "assemble | symbol: {} | historical bars: {} | peaks: {}",
        symbol,
        historical.len(),
        peaks.len()
    );

    let intraday = client.intraday(symbol).await?;
    let Some(current) = intraday.last() else {
        return Err(StockChartError::NotFound(symbol.to_string()));
    };
    let Some(previous) = historical.last() else {
        return Err(StockChartError::InsufficientHistory(symbol.to_string()));
    };
    if previous.close == 0.0 {
        return Err(StockChartError::ZeroPreviousClose(symbol.to_string()));
    }

    let current_price = current.close;
    let price_change = current_price - previous.close;
    let percentage_change = price_change / previous.close * 100.0;

    info!("{} | Current Price: {:.2}", symbol, current_price);
    info!(
        "{} | Change: {:.2} ({:.2}%)",
        symbol, price_change, percentage_change
    );

    Ok(StockChartData {
        symbol: symbol.to_string(),
        historical,
        intraday,
        peaks,
        current_price,
        price_change,
        percentage_change,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use history_model::{Bar, ProviderError};

    struct FakeClient {
        historical: Vec<f64>,
        intraday: Vec<f64>,
        fail: bool,
    }

    fn at(day: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(9, minute, 0)
            .unwrap()
    }

    #[async_trait]
    impl MarketDataClient for FakeClient {
        async fn daily_history(
            &self,
            _symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<Bar>, ProviderError> {
            if self.fail {
                return Err(ProviderError::Request("connection reset".to_string()));
            }
            Ok(self
                .historical
                .iter()
                .enumerate()
                .map(|(i, close)| Bar::new(at(i as u32 + 1, 0), *close))
                .collect())
        }

        async fn intraday(&self, _symbol: &str) -> Result<Vec<Bar>, ProviderError> {
            Ok(self
                .intraday
                .iter()
                .enumerate()
                .map(|(i, close)| Bar::new(at(28, i as u32), *close))
                .collect())
        }
    }

    fn dates() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 28).unwrap(),
        )
    }

    #[tokio::test]
    async fn assemble_pass_computes_change() {
        let client = FakeClient {
            historical: vec![98.0, 102.0, 100.0],
            intraday: vec![101.0, 104.0, 105.0],
            fail: false,
        };
        let (start, today) = dates();
        let data = assemble(&client, "TCS.NS", start, today).await.unwrap();

        assert_eq!(data.symbol, "TCS.NS");
        assert_eq!(data.current_price, 105.0);
        assert_eq!(data.price_change, 5.0);
        assert_eq!(data.percentage_change, 5.0);
        assert_eq!(data.peaks, vec![1]);
        assert_eq!(data.historical.len(), 3);
        assert_eq!(data.intraday.len(), 3);
    }

    #[tokio::test]
    async fn assemble_pass_negative_change() {
        let client = FakeClient {
            historical: vec![200.0],
            intraday: vec![150.0],
            fail: false,
        };
        let (start, today) = dates();
        let data = assemble(&client, "X", start, today).await.unwrap();

        assert_eq!(data.price_change, -50.0);
        assert_eq!(data.percentage_change, -25.0);
        assert!(data.peaks.is_empty());
    }

    #[tokio::test]
    async fn assemble_fail_empty_intraday() {
        let (start, today) = dates();
        for historical in [vec![], vec![1.0, 3.0, 2.0]] {
            let client = FakeClient {
                historical,
                intraday: vec![],
                fail: false,
            };
            let err = assemble(&client, "GONE", start, today).await.unwrap_err();
            assert!(matches!(err, StockChartError::NotFound(ref s) if s == "GONE"));
        }
    }

    #[tokio::test]
    async fn assemble_fail_empty_history() {
        let client = FakeClient {
            historical: vec![],
            intraday: vec![10.0],
            fail: false,
        };
        let (start, today) = dates();
        let err = assemble(&client, "NEW", start, today).await.unwrap_err();
        assert!(matches!(err, StockChartError::InsufficientHistory(_)));
    }

    #[tokio::test]
    async fn assemble_fail_zero_previous_close() {
        let client = FakeClient {
            historical: vec![0.0],
            intraday: vec![10.0],
            fail: false,
        };
        let (start, today) = dates();
        let err = assemble(&client, "ZERO", start, today).await.unwrap_err();
        assert!(matches!(err, StockChartError::ZeroPreviousClose(_)));
    }

    #[tokio::test]
    async fn assemble_fail_provider_error() {
        let client = FakeClient {
            historical: vec![1.0],
            intraday: vec![1.0],
            fail: true,
        };
        let (start, today) = dates();
        let err = assemble(&client, "TCS.NS", start, today).await.unwrap_err();
        assert_eq!(err.to_string(), "request failed: connection reset");
    }
}
