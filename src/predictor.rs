//! The trained-model contract consumed by the forecast engine

use crate::error::Result;
use crate::features::FeatureRow;

/// A pre-trained regression model able to score one feature row.
///
/// Implementations must be deterministic for a given input, advance no
/// internal state across calls, and fail closed: a malformed row yields an
/// error, never a silent placeholder value. The engine is agnostic to how
/// the model was trained or stored.
pub trait Predictor {
    /// Predict the next month's registration count
    fn predict(&self, features: &FeatureRow) -> Result<f64>;
}

impl<F> Predictor for F
where
    F: Fn(&FeatureRow) -> Result<f64>,
{
    fn predict(&self, features: &FeatureRow) -> Result<f64> {
        self(features)
    }
}

/// Baseline that repeats the most recent value
#[derive(Debug, Clone, Copy, Default)]
pub struct NaivePredictor;

impl Predictor for NaivePredictor {
    fn predict(&self, features: &FeatureRow) -> Result<f64> {
        Ok(features.lag1)
    }
}

/// Baseline that projects the recent cumulative trend forward
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendPredictor;

impl Predictor for TrendPredictor {
    fn predict(&self, features: &FeatureRow) -> Result<f64> {
        // The cumulative slope is the fitted average monthly increment; fall
        // back to the lag mean until the slope window has filled.
        let rate = if features.growth_slope > 0.0 {
            features.growth_slope
        } else {
            features.roll_mean_3
        };

        Ok(rate.max(0.0))
    }
}
