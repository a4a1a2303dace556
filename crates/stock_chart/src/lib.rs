pub mod assembler;
pub mod chart;
pub mod error;
pub mod image_store;
pub mod peaks;
pub mod period;

pub use assembler::assemble;
pub use chart::ChartRenderer;
pub use error::{ChartError, StockChartError};
pub use image_store::ImageStore;
