use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime};
use history_model::{Bar, StockChartData};
use itertools::{Itertools, MinMaxResult};
use log::debug;
use plotters::prelude::*;

use crate::error::ChartError;
use crate::image_store::ImageStore;

const DEFAULT_WIDTH: u32 = 1200;
const DEFAULT_HEIGHT: u32 = 600;
/// Padding above and below the price range, in price units.
const PRICE_PADDING: f64 = 5.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

const HISTORICAL_COLOR: RGBColor = RGBColor(0, 128, 0);
const GRID_COLOR: RGBColor = RGBColor(105, 105, 105);

/// Visible range of both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisBounds {
    pub x: (NaiveDateTime, NaiveDateTime),
    pub y: (f64, f64),
}

/// x spans the first historical to the last intraday timestamp, y spans
/// every close of both series plus a fixed padding.
pub fn axis_bounds(data: &StockChartData) -> Result<AxisBounds, ChartError> {
    let (Some(first), Some(last)) = (data.historical.first(), data.intraday.last()) else {
        return Err(ChartError::EmptySeries(data.symbol.clone()));
    };

    let closes = data.historical.iter().chain(&data.intraday).map(|bar| bar.close);
    let (low, high) = match closes.minmax_by(|a, b| a.total_cmp(b)) {
        MinMaxResult::NoElements => return Err(ChartError::EmptySeries(data.symbol.clone())),
        MinMaxResult::OneElement(close) => (close, close),
        MinMaxResult::MinMax(low, high) => (low, high),
    };

    Ok(AxisBounds {
        x: (first.timestamp, last.timestamp),
        y: (low - PRICE_PADDING, high + PRICE_PADDING),
    })
}

/// Draws the historical closes as a filled area, the intraday closes as a
/// line and the historical peaks as dots, all on one time axis.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    width: u32,
    height: u32,
    currency: String,
}

impl ChartRenderer {
    pub fn new(currency: impl Into<String>) -> Self {
        ChartRenderer {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            currency: currency.into(),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Renders `data` into a new PNG owned by `store` and returns its path.
    /// Nothing is left in the store when drawing fails.
    pub fn render(&self, data: &StockChartData, store: &ImageStore) -> Result<PathBuf, ChartError> {
        let bounds = axis_bounds(data)?;
        let path = store.write_with(|path| self.draw(data, &bounds, path))?;

        debug!("render | symbol: {} | path: {}", data.symbol, path.display());
        Ok(path)
    }

    fn draw(&self, data: &StockChartData, bounds: &AxisBounds, path: &Path) -> Result<(), ChartError> {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&BLACK).map_err(drawing)?;

        let x_start = to_x(&bounds.x.0);
        let mut x_end = to_x(&bounds.x.1);
        if x_end <= x_start {
            x_end = x_start + 60.0;
        }
        let (y_start, y_end) = bounds.y;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("{} Stock Price (Intraday + Historical)", data.symbol),
                ("sans-serif", 22).into_font().color(&WHITE),
            )
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d(x_start..x_end, y_start..y_end)
            .map_err(drawing)?;

        let time_format = if x_end - x_start > 2.0 * SECONDS_PER_DAY {
            "%Y-%m-%d"
        } else {
            "%H:%M"
        };
        let label_style = ("sans-serif", 14).into_font().color(&WHITE);

        chart
            .configure_mesh()
            .bold_line_style(GRID_COLOR.mix(0.7))
            .light_line_style(TRANSPARENT)
            .axis_style(WHITE)
            .label_style(label_style.clone())
            .axis_desc_style(label_style)
            .x_desc("Date/Time")
            .y_desc(format!("Price ({})", self.currency))
            .x_labels(8)
            .x_label_formatter(&|x| format_time(*x, time_format))
            .y_label_formatter(&|y| format!("{:.2}", y))
            .draw()
            .map_err(drawing)?;

        chart
            .draw_series(
                AreaSeries::new(data.historical.iter().map(point), y_start, HISTORICAL_COLOR.mix(0.5))
                    .border_style(HISTORICAL_COLOR),
            )
            .map_err(drawing)?;

        chart
            .draw_series(LineSeries::new(data.intraday.iter().map(point), &BLUE))
            .map_err(drawing)?;

        // peaks go last so they sit above the fill
        chart
            .draw_series(
                data.peak_bars()
                    .map(|bar| Circle::new(point(bar), 2, WHITE.filled())),
            )
            .map_err(drawing)?;

        root.present().map_err(drawing)?;
        Ok(())
    }
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new("INR")
    }
}

fn to_x(timestamp: &NaiveDateTime) -> f64 {
    timestamp.and_utc().timestamp() as f64
}

fn point(bar: &Bar) -> (f64, f64) {
    (to_x(&bar.timestamp), bar.close)
}

fn format_time(x: f64, format: &str) -> String {
    DateTime::from_timestamp(x as i64, 0)
        .map(|t| t.naive_utc().format(format).to_string())
        .unwrap_or_default()
}

fn drawing<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Drawing(e.to_string())
}
