use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use log::{error, warn};
use serde::Serialize;
use stock_chart::StockChartError;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// The single place a failed request is classified into an HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    StockChart(#[from] StockChartError),

    #[error("chart rendering failed: {0}")]
    Blocking(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::StockChart(e) => match e {
                StockChartError::MissingParameter(_) | StockChartError::InvalidPeriod => {
                    StatusCode::BAD_REQUEST
                }
                StockChartError::NotFound(_) | StockChartError::InsufficientHistory(_) => {
                    StatusCode::NOT_FOUND
                }
                StockChartError::ZeroPreviousClose(_)
                | StockChartError::Provider(_)
                | StockChartError::Chart(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("request failed | {}: {}", status, self);
        } else {
            warn!("request rejected | {}: {}", status, self);
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
