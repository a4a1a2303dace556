use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CURRENCY: &str = "INR";
const DEFAULT_IMAGE_SUBDIR: &str = "stock_chart";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub image_dir: PathBuf,
    /// `None` keeps rendered charts forever.
    pub image_ttl: Option<Duration>,
    pub currency: String,
    pub yahoo_url: Option<String>,
}

impl Config {
    pub fn new() -> Result<Config, ConfigError> {
        dotenv().ok();
        Config::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
        // blank values count as unset
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("STOCK_CHART_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_number(&var, "STOCK_CHART_PORT")?.unwrap_or(DEFAULT_PORT);

        let mut workers = parse_number(&var, "STOCK_CHART_WORKERS")?.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        if workers == 0 {
            workers = 1;
        }

        let image_dir = var("STOCK_CHART_IMAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join(DEFAULT_IMAGE_SUBDIR));

        let image_ttl = parse_number::<u64>(&var, "STOCK_CHART_IMAGE_TTL_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let currency = var("STOCK_CHART_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        let yahoo_url = var("STOCK_CHART_YAHOO_URL");

        Ok(Config {
            host,
            port,
            workers,
            image_dir,
            image_ttl,
            currency,
            yahoo_url,
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match var(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}
