use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use history_model::{Bar, MarketDataClient, ProviderError};
use log::debug;
use serde::Deserialize;

const YAHOO_BASE_API_URL: &str = "https://query1.finance.yahoo.com";
const NOT_FOUND_CODE: &str = "Not Found";

#[derive(Debug, Deserialize)]
struct YahooChartJSON {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Meta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Granularity {
    Daily,
    Minute,
}

#[derive(Clone)]
pub struct YahooAPI {
    base_url: String,
    client: reqwest::Client,
    headers: reqwest::header::HeaderMap,
}

impl YahooAPI {
    pub fn new() -> Self {
        Self::with_base_url(YAHOO_BASE_API_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
            ),
        );

        YahooAPI {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            headers,
        }
    }

    async fn get_chart(&self, url: &str, granularity: Granularity) -> Result<Vec<Bar>, ProviderError> {
        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        match parse_chart(&body, granularity) {
            Err(ProviderError::Malformed(_)) if !status.is_success() => Err(ProviderError::Api {
                code: status.to_string(),
                description: body,
            }),
            other => other,
        }
    }
}

impl Default for YahooAPI {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataClient for YahooAPI {
    async fn daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, ProviderError> {
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url,
            symbol,
            midnight_timestamp(start),
            midnight_timestamp(end)
        );

        debug!("daily_history | url: {}", url);

        self.get_chart(&url, Granularity::Daily).await
    }

    async fn intraday(&self, symbol: &str) -> Result<Vec<Bar>, ProviderError> {
        let url = format!(
            "{}/v8/finance/chart/{}?range=1d&interval=1m",
            self.base_url, symbol
        );

        debug!("intraday | url: {}", url);

        self.get_chart(&url, Granularity::Minute).await
    }
}

fn midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn parse_chart(body: &str, granularity: Granularity) -> Result<Vec<Bar>, ProviderError> {
    let json: YahooChartJSON =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    if let Some(error) = json.chart.error {
        // unknown or delisted symbols come back as an error, not an empty result
        if error.code == NOT_FOUND_CODE {
            return Ok(vec![]);
        }
        return Err(ProviderError::Api {
            code: error.code,
            description: error.description.unwrap_or_default(),
        });
    }

    let Some(result) = json.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(vec![]);
    };

    let closes = match result.indicators.quote.into_iter().next() {
        Some(quote) => quote.close,
        None => return Ok(vec![]),
    };

    let offset = result.meta.gmtoffset;
    let history = result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(t, close)| {
            let timestamp = local_time(*t, offset, granularity)?;
            Some(Bar::new(timestamp, close?))
        })
        .collect();

    Ok(history)
}

fn local_time(timestamp: i64, gmtoffset: i64, granularity: Granularity) -> Option<NaiveDateTime> {
    let local = DateTime::from_timestamp(timestamp.checked_add(gmtoffset)?, 0)?.naive_utc();
    match granularity {
        Granularity::Daily => Some(local.date().and_time(NaiveTime::MIN)),
        Granularity::Minute => Some(local),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAILY_JSON: &str = r#"{"chart":{"result":[{"meta":{"currency":"INR","symbol":"TCS.NS","gmtoffset":19800},
        "timestamp":[1704253500,1704339900,1704426300],
        "indicators":{"quote":[{"open":[1.0,2.0,3.0],"close":[3700.5,null,3750.25]}]}}],"error":null}}"#;

    const INTRADAY_JSON: &str = r#"{"chart":{"result":[{"meta":{"gmtoffset":19800},
        "timestamp":[1704253500,1704253560],
        "indicators":{"quote":[{"close":[3701.0,3702.5]}]}}],"error":null}}"#;

    const NOT_FOUND_JSON: &str = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;

    const BAD_REQUEST_JSON: &str = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input - interval=1x is not supported"}}}"#;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn parse_chart_pass_daily_truncates_to_session_date() {
        let bars = parse_chart(DAILY_JSON, Granularity::Daily).unwrap();
        assert_eq!(
            bars,
            vec![
                Bar::new(ymd_hms(2024, 1, 3, 0, 0), 3700.5),
                Bar::new(ymd_hms(2024, 1, 5, 0, 0), 3750.25),
            ]
        );
    }

    #[test]
    fn parse_chart_pass_intraday_shifts_to_exchange_time() {
        let bars = parse_chart(INTRADAY_JSON, Granularity::Minute).unwrap();
        assert_eq!(bars.len(), 2);
        // 03:45 UTC + 05:30
        assert_eq!(bars[0].timestamp, ymd_hms(2024, 1, 3, 9, 15));
        assert_eq!(bars[1].timestamp, ymd_hms(2024, 1, 3, 9, 16));
        assert_eq!(bars[1].close, 3702.5);
    }

    #[test]
    fn parse_chart_pass_not_found_is_empty() {
        let bars = parse_chart(NOT_FOUND_JSON, Granularity::Minute).unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn parse_chart_pass_missing_quote_is_empty() {
        let json = r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[]}}],"error":null}}"#;
        assert!(parse_chart(json, Granularity::Daily).unwrap().is_empty());
    }

    #[test]
    fn parse_chart_fail_provider_error() {
        let err = parse_chart(BAD_REQUEST_JSON, Granularity::Minute).unwrap_err();
        match err {
            ProviderError::Api { code, description } => {
                assert_eq!(code, "Bad Request");
                assert!(description.contains("interval"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_chart_fail_not_json() {
        let err = parse_chart("<html>Too Many Requests</html>", Granularity::Daily).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn midnight_timestamp_pass_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(midnight_timestamp(date), 1704067200);
    }

    #[tokio::test]
    async fn daily_history_fail_unreachable_host() {
        let api = YahooAPI::with_base_url("http://127.0.0.1:9");
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let err = api.daily_history("TCS.NS", start, end).await.unwrap_err();
        assert!(matches!(err, ProviderError::Request(_)));
    }
}
