use std::sync::Arc;

use actix_web::{HttpResponse, Responder, error::InternalError, get, web};
use chrono::Local;
use history_model::MarketDataClient;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use stock_chart::{ChartRenderer, ImageStore, StockChartError, assemble};

use crate::error::{ApiError, ErrorResponse};
use crate::utils;

pub struct AppState {
    pub client: Arc<dyn MarketDataClient>,
    pub renderer: ChartRenderer,
    pub store: ImageStore,
}

#[derive(Debug, Default, PartialEq)]
pub struct ChartQuery {
    symbol: Option<String>,
    period: Option<String>,
}

impl ChartQuery {
    /// The first value wins when a key repeats.
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = ChartQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "symbol" => &mut query.symbol,
                "period" => &mut query.period,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChartResponse {
    pub current_price: f64,
    pub price_change: f64,
    pub percentage_change: f64,
    /// Filesystem path of the rendered PNG.
    pub image_url: String,
}

#[derive(Serialize)]
struct HealthcheckResponse {
    status: String,
}

#[get("/fetch-stock-chart")]
async fn fetch_stock_chart(
    query: web::Query<Vec<(String, String)>>,
    state: web::Data<AppState>,
) -> Result<web::Json<ChartResponse>, ApiError> {
    let ChartQuery { symbol, period } = ChartQuery::from_pairs(query.into_inner());

    let symbol = symbol
        .map(utils::sanitize_ticker)
        .filter(|s| !s.is_empty())
        .ok_or(StockChartError::MissingParameter("symbol"))?;
    if symbol.len() > utils::MAX_TICKER_LEN {
        warn!("fetch_stock_chart | symbol too long: {}", symbol);
        return Err(StockChartError::MissingParameter("symbol").into());
    }
    let period = period
        .filter(|p| !p.is_empty())
        .ok_or(StockChartError::MissingParameter("period"))?;

    let today = Local::now().date_naive();
    let start = stock_chart::period::resolve(&period, today)?;
    info!("fetch_stock_chart | symbol: {} | period: {} | start: {}", symbol, period, start);

    let data = Arc::new(assemble(state.client.as_ref(), &symbol, start, today).await?);

    let render_state = state.clone();
    let render_data = data.clone();
    let image = web::block(move || render_state.renderer.render(&render_data, &render_state.store))
        .await
        .map_err(|e| ApiError::Blocking(e.to_string()))?
        .map_err(StockChartError::from)?;

    Ok(web::Json(ChartResponse {
        current_price: data.current_price,
        price_change: data.price_change,
        percentage_change: data.percentage_change,
        image_url: image.to_string_lossy().into_owned(),
    }))
}

#[get("/healthcheck")]
async fn healthcheck() -> impl Responder {
    web::Json(HealthcheckResponse {
        status: "ok".to_string(),
    })
}

pub async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(ErrorResponse {
        error: "Not found".to_string(),
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ErrorResponse {
            error: err.to_string(),
        });
        InternalError::from_response(err, response).into()
    });

    cfg.app_data(query_config)
        .service(healthcheck)
        .service(fetch_stock_chart);
}
