//! # EV Forecast
//!
//! A Rust library for recursive, feature-engineered forecasting of monthly
//! electric-vehicle registration counts per geographic region.
//!
//! ## Features
//!
//! - Region history loading from preprocessed CSV datasets
//! - Rolling-window feature engineering (lags, rolling mean, percent
//!   changes, cumulative trend slope)
//! - An autoregressive forecast engine driven by an opaque pre-trained
//!   predictor: each prediction feeds the next step's features
//! - Multi-region aggregation with cumulative-trajectory stitching and
//!   growth summaries
//!
//! ## Quick Start
//!
//! ```no_run
//! use ev_forecast::{forecast, DataLoader, TrendPredictor};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load per-region history
//!     let dataset = DataLoader::from_csv("preprocessed_ev_data.csv")?;
//!     let series = dataset.region("King").expect("region present");
//!
//!     // Forecast three years ahead with a baseline predictor
//!     let result = forecast(series, 36, &TrendPredictor)?;
//!     for point in result.points() {
//!         println!("{}: {}", point.date, point.rounded());
//!     }
//!
//!     // Continue the cumulative trend past the end of history
//!     let stitched = result.stitch_cumulative(series.final_cumulative());
//!     println!("Final cumulative: {:.0}", stitched.last().unwrap().cumulative);
//!     Ok(())
//! }
//! ```
//!
//! The predictor is any type implementing [`Predictor`]; plain closures work
//! as adapters to external model runtimes.

pub mod aggregate;
pub mod data;
pub mod engine;
pub mod error;
pub mod features;
pub mod predictor;

// Re-export commonly used types
pub use crate::aggregate::{aggregate, GrowthSummary, RegionForecast, SeriesSource, TrajectoryPoint};
pub use crate::data::{cumulative, CumulativePoint, DataLoader, Dataset, HistoryPoint, RegionSeries};
pub use crate::engine::{forecast, ForecastPoint, ForecastSeries};
pub use crate::error::ForecastError;
pub use crate::features::{FeatureRow, RollingWindow, WINDOW_SIZE};
pub use crate::predictor::{NaivePredictor, Predictor, TrendPredictor};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
