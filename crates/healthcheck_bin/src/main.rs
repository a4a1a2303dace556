use dotenvy::dotenv;
use serde::Deserialize;

const DEFAULT_PORT: &str = "8080";

#[derive(Debug)]
enum CustomError {
    ReqwestError(String),
    NotOk,
}

#[derive(Debug, Deserialize)]
struct StatusJSON {
    status: String,
}

impl std::fmt::Display for CustomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CustomError::ReqwestError(e) => write!(f, "Reqwest error: {}", e),
            CustomError::NotOk => write!(f, "Status code != 200 or no healthcheck"),
        }
    }
}

impl From<reqwest::Error> for CustomError {
    fn from(err: reqwest::Error) -> CustomError {
        CustomError::ReqwestError(err.to_string())
    }
}

fn healthcheck_url(port: Option<String>) -> String {
    let port = port
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PORT.to_string());
    format!("http://localhost:{}/healthcheck", port.trim())
}

fn main() -> Result<(), CustomError> {
    dotenv().ok();
    let url = healthcheck_url(std::env::var("STOCK_CHART_PORT").ok());

    let res = reqwest::blocking::get(url)?;
    if res.status() != 200 {
        return Err(CustomError::NotOk);
    }
    let ok_str: StatusJSON = res.json::<StatusJSON>()?;
    if ok_str.status != "ok" {
        return Err(CustomError::NotOk);
    }
    Ok(())
}
