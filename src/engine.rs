//! Recursive autoregressive forecast engine

use crate::data::{CumulativePoint, RegionSeries};
use crate::error::{ForecastError, Result};
use crate::features::RollingWindow;
use crate::predictor::Predictor;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// One forecasted month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Forecasted month
    pub date: NaiveDate,
    /// Unrounded model prediction
    pub predicted: f64,
}

impl ForecastPoint {
    /// Prediction rounded to a whole registration count for display
    pub fn rounded(&self) -> i64 {
        self.predicted.round() as i64
    }
}

/// Ordered forecast for one region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSeries {
    region: String,
    region_code: i64,
    points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    /// Region the forecast belongs to
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Encoded region identifier
    pub fn region_code(&self) -> i64 {
        self.region_code
    }

    /// Forecasted months in chronological order
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Number of forecasted months
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the forecast holds no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Running totals continued from the historical series.
    ///
    /// `offset` must be the historical series' final cumulative value; the
    /// forecast's totals are never built independently of history. Totals
    /// accumulate the unrounded predictions.
    pub fn stitch_cumulative(&self, offset: f64) -> Vec<CumulativePoint> {
        let mut total = offset;
        self.points
            .iter()
            .map(|point| {
                total += point.predicted;
                CumulativePoint {
                    date: point.date,
                    cumulative: total,
                }
            })
            .collect()
    }

    /// Serialize the forecast for downstream consumers
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ForecastError::DataError(format!("JSON serialization failed: {}", e)))
    }
}

/// Forecast `horizon` months past the end of a region's history.
///
/// The loop is strictly autoregressive: each prediction re-enters the rolling
/// window and shapes the next step's lag features. The windows keep unrounded
/// predictions throughout; rounding is display-only and would otherwise
/// compound across long horizons.
pub fn forecast<P: Predictor>(
    series: &RegionSeries,
    horizon: usize,
    predictor: &P,
) -> Result<ForecastSeries> {
    if horizon < 1 {
        return Err(ForecastError::InvalidHorizon(format!(
            "Horizon must be at least 1, got {}",
            horizon
        )));
    }

    let mut window = RollingWindow::seed(series)?;
    let mut months_since_start = series.last_period_index();
    let mut date = series.last_date();
    let mut points = Vec::with_capacity(horizon);

    for _ in 0..horizon {
        months_since_start += 1;
        date = next_month(date)?;

        let features = window.features(months_since_start, series.code());
        let predicted = match predictor.predict(&features) {
            Ok(value) => value,
            Err(err @ ForecastError::PredictorFailure(_)) => return Err(err),
            Err(err) => return Err(ForecastError::PredictorFailure(err.to_string())),
        };
        if !predicted.is_finite() {
            return Err(ForecastError::PredictorFailure(format!(
                "Predictor returned a non-finite value: {}",
                predicted
            )));
        }

        // The windows only advance once the prediction is known good
        points.push(ForecastPoint { date, predicted });
        window.push_prediction(predicted);
    }

    Ok(ForecastSeries {
        region: series.name().to_string(),
        region_code: series.code(),
        points,
    })
}

fn next_month(date: NaiveDate) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(1)).ok_or_else(|| {
        ForecastError::InvalidHorizon("Forecast date overflows the calendar".to_string())
    })
}
