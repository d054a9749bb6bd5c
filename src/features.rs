//! Rolling-window feature engineering for the forecast engine

use crate::data::RegionSeries;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::VecDeque;

/// Number of recent observations kept in each rolling window
pub const WINDOW_SIZE: usize = 6;

/// Number of lag features fed to the predictor
pub const LAG_COUNT: usize = 3;

/// Bounded last-N buffer with push-and-evict semantics
#[derive(Debug, Clone)]
pub struct BoundedWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl BoundedWindow {
    /// Create an empty window holding at most `capacity` values
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, evicting the oldest once the window is full
    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Number of values currently held
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the window holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the window has reached its capacity
    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Value `k` positions back from the newest; `back(0)` is the newest
    pub fn back(&self, k: usize) -> Option<f64> {
        if k < self.values.len() {
            Some(self.values[self.values.len() - 1 - k])
        } else {
            None
        }
    }

    /// Values in window order, oldest first
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }
}

/// One step's engineered model inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Months elapsed since the region's series began
    pub months_since_start: i64,
    /// Encoded region identifier the model was trained with
    pub region_code: i64,
    /// Most recent monthly count
    pub lag1: f64,
    /// Count from two months back
    pub lag2: f64,
    /// Count from three months back
    pub lag3: f64,
    /// Mean of the three lags
    pub roll_mean_3: f64,
    /// Relative change from lag2 to lag1; 0 when lag2 is 0
    pub pct_change_1: f64,
    /// Relative change from lag3 to lag1; 0 when lag3 is 0
    pub pct_change_3: f64,
    /// Linear trend of the cumulative window; 0 until 6 points exist
    pub growth_slope: f64,
}

/// Paired raw and cumulative windows driving one region's forecast.
///
/// The raw window holds the most recent monthly counts, the cumulative window
/// the matching running totals. After seeding, each forecast step pushes one
/// predicted value into both, so the features grow out of the engine's own
/// output rather than ground truth.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    raw: BoundedWindow,
    cumulative: BoundedWindow,
    total: f64,
}

impl RollingWindow {
    /// Seed the windows from a region's history.
    ///
    /// Keeps the last `WINDOW_SIZE` raw values and running totals; the totals
    /// accumulate over the entire series so the cumulative window's newest
    /// entry always equals the full running total. Requires at least
    /// `LAG_COUNT` points.
    pub fn seed(series: &RegionSeries) -> Result<Self> {
        let points = series.points();
        if points.len() < LAG_COUNT {
            return Err(ForecastError::InsufficientHistory {
                needed: LAG_COUNT,
                got: points.len(),
            });
        }

        let mut raw = BoundedWindow::new(WINDOW_SIZE);
        let mut cumulative = BoundedWindow::new(WINDOW_SIZE);
        let mut total = 0.0;
        for point in points {
            let value = point.value as f64;
            raw.push(value);
            total += value;
            cumulative.push(total);
        }

        Ok(Self {
            raw,
            cumulative,
            total,
        })
    }

    /// The three most recent values, most recent first
    pub fn lags(&self) -> (f64, f64, f64) {
        // seed() guarantees at least LAG_COUNT values and pushes never shrink
        let lag1 = self.raw.back(0).unwrap();
        let lag2 = self.raw.back(1).unwrap();
        let lag3 = self.raw.back(2).unwrap();
        (lag1, lag2, lag3)
    }

    /// Running total as of the newest value
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Append one predicted value to both windows
    pub fn push_prediction(&mut self, prediction: f64) {
        self.raw.push(prediction);
        self.total += prediction;
        self.cumulative.push(self.total);
    }

    /// Engineer the feature row for the next forecast step.
    ///
    /// Pure with respect to the window: repeated calls with the same
    /// arguments yield identical rows.
    pub fn features(&self, months_since_start: i64, region_code: i64) -> FeatureRow {
        let (lag1, lag2, lag3) = self.lags();
        let roll_mean_3 = [lag1, lag2, lag3].mean();
        let pct_change_1 = pct_change(lag1, lag2);
        let pct_change_3 = pct_change(lag1, lag3);
        let growth_slope = if self.cumulative.is_full() {
            let totals: Vec<f64> = self.cumulative.iter().collect();
            linear_slope(&totals)
        } else {
            0.0
        };

        FeatureRow {
            months_since_start,
            region_code,
            lag1,
            lag2,
            lag3,
            roll_mean_3,
            pct_change_1,
            pct_change_3,
            growth_slope,
        }
    }
}

/// Relative change between the current and a prior value.
///
/// A zero prior yields 0 rather than NaN/infinity: "no prior change signal"
/// is encoded as zero so the predictor never sees a non-finite input. This
/// matches the feature pipeline the model was trained against and is a known
/// approximation, not a defect.
fn pct_change(current: f64, prior: f64) -> f64 {
    if prior != 0.0 {
        (current - prior) / prior
    } else {
        0.0
    }
}

/// Least-squares slope of `values` against their indices 0..n-1
fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;

    let sum_x: f64 = (0..values.len()).map(|i| i as f64).sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, &y)| i as f64 * y).sum();
    let sum_x2: f64 = (0..values.len()).map(|i| (i * i) as f64).sum();

    let mean_x = sum_x / n;
    let mean_y = values.mean();

    let ss_xx = sum_x2 - n * mean_x * mean_x;
    let ss_xy = sum_xy - n * mean_x * mean_y;

    ss_xy / ss_xx
}
