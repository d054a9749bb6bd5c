//! Multi-region forecast aggregation

use crate::data::Dataset;
use crate::engine::{forecast, ForecastSeries};
use crate::error::{ForecastError, Result};
use crate::predictor::Predictor;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which half of a combined trajectory a point belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesSource {
    /// Observed history
    Historical,
    /// Engine output
    Forecast,
}

/// One point of a region's combined cumulative trajectory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    /// Calendar month
    pub date: NaiveDate,
    /// Running total of registrations
    pub cumulative: f64,
    /// Whether the point is observed or forecasted
    pub source: SeriesSource,
}

/// Forecasted growth over the horizon, relative to the historical total.
///
/// A zero or negative historical total makes the ratio meaningless, which is
/// reported as `Unavailable` rather than as an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GrowthSummary {
    /// Percentage change from the historical to the forecasted final total
    Available {
        /// Growth over the forecast window, in percent
        percent: f64,
    },
    /// No meaningful baseline to compare against
    Unavailable,
}

impl GrowthSummary {
    /// Compare final cumulative totals
    pub fn from_totals(historical: f64, forecasted: f64) -> Self {
        if historical > 0.0 {
            GrowthSummary::Available {
                percent: (forecasted - historical) / historical * 100.0,
            }
        } else {
            GrowthSummary::Unavailable
        }
    }

    /// Growth percentage, if a baseline existed
    pub fn percent(&self) -> Option<f64> {
        match self {
            GrowthSummary::Available { percent } => Some(*percent),
            GrowthSummary::Unavailable => None,
        }
    }
}

impl fmt::Display for GrowthSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrowthSummary::Available { percent } => {
                let trend = if *percent >= 0.0 { "increase" } else { "decrease" };
                write!(f, "{} of {:.2}%", trend, percent)
            }
            GrowthSummary::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// One region's forecast, combined trajectory, and growth summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionForecast {
    region: String,
    forecast: ForecastSeries,
    trajectory: Vec<TrajectoryPoint>,
    growth: GrowthSummary,
}

impl RegionForecast {
    /// Region name
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The engine's forecast for this region
    pub fn forecast(&self) -> &ForecastSeries {
        &self.forecast
    }

    /// Historical then forecasted cumulative points, chronological
    pub fn trajectory(&self) -> &[TrajectoryPoint] {
        &self.trajectory
    }

    /// Growth summary over the forecast window
    pub fn growth(&self) -> GrowthSummary {
        self.growth
    }

    /// Serialize the region result for downstream consumers
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ForecastError::DataError(format!("JSON serialization failed: {}", e)))
    }
}

/// Run the forecast engine over several regions and stitch each result onto
/// its history.
///
/// Regions are processed independently with no shared state, so each entry
/// matches what a standalone [`forecast`] call on that region produces. The
/// growth baseline is the region's final historical cumulative total, which
/// always exists once the engine's minimum-history precondition holds.
pub fn aggregate<P: Predictor>(
    dataset: &Dataset,
    regions: &[&str],
    predictor: &P,
    horizon: usize,
) -> Result<BTreeMap<String, RegionForecast>> {
    let mut results = BTreeMap::new();

    for &name in regions {
        let series = dataset
            .region(name)
            .ok_or_else(|| ForecastError::UnknownRegion(name.to_string()))?;

        let forecasted = forecast(series, horizon, predictor)?;

        let historical = series.cumulative();
        let historical_final = series.final_cumulative();
        let stitched = forecasted.stitch_cumulative(historical_final);
        // horizon >= 1, so the stitched series is never empty
        let forecast_final = stitched[stitched.len() - 1].cumulative;
        let growth = GrowthSummary::from_totals(historical_final, forecast_final);

        let trajectory = historical
            .into_iter()
            .map(|point| TrajectoryPoint {
                date: point.date,
                cumulative: point.cumulative,
                source: SeriesSource::Historical,
            })
            .chain(stitched.into_iter().map(|point| TrajectoryPoint {
                date: point.date,
                cumulative: point.cumulative,
                source: SeriesSource::Forecast,
            }))
            .collect();

        results.insert(
            name.to_string(),
            RegionForecast {
                region: name.to_string(),
                forecast: forecasted,
                trajectory,
                growth,
            },
        );
    }

    Ok(results)
}
