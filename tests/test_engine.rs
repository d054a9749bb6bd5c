use approx::assert_relative_eq;
use chrono::NaiveDate;
use ev_forecast::error::Result;
use ev_forecast::{
    forecast, FeatureRow, ForecastError, HistoryPoint, NaivePredictor, RegionSeries,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;

fn month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

fn series_from(start: NaiveDate, values: &[u64]) -> RegionSeries {
    let points = values
        .iter()
        .enumerate()
        .map(|(i, &value)| HistoryPoint {
            date: start + chrono::Months::new(i as u32),
            value,
        })
        .collect();

    RegionSeries::new("King", 1, points).unwrap()
}

fn series(values: &[u64]) -> RegionSeries {
    series_from(month(2023, 1), values)
}

#[test]
fn test_forecast_returns_horizon_points_with_consecutive_months() {
    let history = series(&[100, 120, 150, 180, 210, 250]);
    let result = forecast(&history, 36, &NaivePredictor).unwrap();

    assert_eq!(result.len(), 36);
    assert_eq!(result.region(), "King");
    assert_eq!(result.region_code(), 1);

    // Dates start one month after the last historical month and advance by
    // exactly one month per point, across year boundaries
    assert_eq!(result.points()[0].date, month(2023, 7));
    for (i, pair) in result.points().windows(2).enumerate() {
        let expected = pair[0].date + chrono::Months::new(1);
        assert_eq!(pair[1].date, expected, "gap after point {}", i);
    }
    assert_eq!(result.points()[35].date, month(2026, 6));
}

#[test]
fn test_forecast_rejects_short_history() {
    let history = series(&[100, 120]);
    let result = forecast(&history, 12, &NaivePredictor);

    match result {
        Err(ForecastError::InsufficientHistory { needed, got }) => {
            assert_eq!(needed, 3);
            assert_eq!(got, 2);
        }
        other => panic!("expected InsufficientHistory, got {:?}", other),
    }
}

#[test]
fn test_forecast_rejects_zero_horizon() {
    let history = series(&[100, 120, 150]);
    let result = forecast(&history, 0, &NaivePredictor);

    assert!(matches!(result, Err(ForecastError::InvalidHorizon(_))));
}

#[test]
fn test_forecast_is_autoregressive_on_its_own_output() {
    // The naive baseline repeats lag1, so every forecasted month must equal
    // the last historical value — each step consuming the previous output
    let history = series(&[100, 120, 150]);
    let result = forecast(&history, 5, &NaivePredictor).unwrap();

    for point in result.points() {
        assert_eq!(point.predicted, 150.0);
    }
}

#[test]
fn test_single_step_against_hand_computed_features() {
    // history = [100, 120, 150], predictor pinned at 160
    let history = series(&[100, 120, 150]);
    let seen = RefCell::new(Vec::new());
    let predictor = |row: &FeatureRow| -> Result<f64> {
        seen.borrow_mut().push(*row);
        Ok(160.0)
    };

    let result = forecast(&history, 1, &predictor).unwrap();

    let rows = seen.borrow();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.lag1, 150.0);
    assert_eq!(row.lag2, 120.0);
    assert_eq!(row.lag3, 100.0);
    assert_relative_eq!(row.roll_mean_3, 123.333333333, max_relative = 1e-9);
    assert_relative_eq!(row.pct_change_1, 0.25, max_relative = 1e-12);
    assert_relative_eq!(row.pct_change_3, 0.5, max_relative = 1e-12);
    assert_eq!(row.growth_slope, 0.0);
    assert_eq!(row.months_since_start, 3);
    assert_eq!(row.region_code, 1);

    assert_eq!(result.len(), 1);
    assert_eq!(result.points()[0].rounded(), 160);
    assert_eq!(result.points()[0].date, month(2023, 4));

    let stitched = result.stitch_cumulative(history.final_cumulative());
    assert_eq!(stitched[0].cumulative, 530.0);
}

#[test]
fn test_predictor_error_surfaces_as_predictor_failure() {
    let history = series(&[100, 120, 150]);
    let predictor = |_row: &FeatureRow| -> Result<f64> {
        Err(ForecastError::DataError("model backend offline".to_string()))
    };

    let result = forecast(&history, 3, &predictor);
    match result {
        Err(ForecastError::PredictorFailure(message)) => {
            assert!(message.contains("model backend offline"));
        }
        other => panic!("expected PredictorFailure, got {:?}", other),
    }
}

#[test]
fn test_non_finite_prediction_is_predictor_failure() {
    let history = series(&[100, 120, 150]);
    let predictor = |_row: &FeatureRow| -> Result<f64> { Ok(f64::NAN) };

    let result = forecast(&history, 3, &predictor);
    assert!(matches!(result, Err(ForecastError::PredictorFailure(_))));
}

#[test]
fn test_failure_aborts_without_partial_output() {
    // Fail on the third call; the caller must see an error, not two points
    let history = series(&[100, 120, 150]);
    let calls = RefCell::new(0usize);
    let predictor = |row: &FeatureRow| -> Result<f64> {
        *calls.borrow_mut() += 1;
        if *calls.borrow() == 3 {
            Err(ForecastError::DataError("timeout".to_string()))
        } else {
            Ok(row.lag1 + 10.0)
        }
    };

    let result = forecast(&history, 5, &predictor);
    assert!(result.is_err());
    assert_eq!(*calls.borrow(), 3);
}

#[test]
fn test_rounding_never_feeds_back_into_the_window() {
    // Predictions carry a fractional part; the next step's lag1 must see the
    // unrounded value while the display output rounds
    let history = series(&[100, 120, 150]);
    let seen = RefCell::new(Vec::new());
    let returned = RefCell::new(Vec::new());
    let predictor = |row: &FeatureRow| -> Result<f64> {
        seen.borrow_mut().push(*row);
        let prediction = row.lag1 + 10.4;
        returned.borrow_mut().push(prediction);
        Ok(prediction)
    };

    let result = forecast(&history, 3, &predictor).unwrap();

    let rows = seen.borrow();
    let predictions = returned.borrow();
    assert_eq!(rows[1].lag1, predictions[0]);
    assert_eq!(rows[2].lag1, predictions[1]);
    assert_eq!(rows[2].lag2, predictions[0]);

    assert_eq!(result.points()[0].rounded(), 160);
    assert_eq!(result.points()[0].predicted, predictions[0]);
}

#[test]
fn test_stitched_cumulative_deltas_equal_unrounded_predictions() {
    let history = series(&[100, 120, 150, 180, 200, 230]);
    let predictor =
        |row: &FeatureRow| -> Result<f64> { Ok(row.roll_mean_3 + 0.25) };

    let result = forecast(&history, 6, &predictor).unwrap();
    let offset = history.final_cumulative();
    let stitched = result.stitch_cumulative(offset);

    assert_relative_eq!(
        stitched[0].cumulative,
        offset + result.points()[0].predicted,
        max_relative = 1e-12
    );
    for i in 1..stitched.len() {
        assert_relative_eq!(
            stitched[i].cumulative - stitched[i - 1].cumulative,
            result.points()[i].predicted,
            max_relative = 1e-9
        );
    }
}

#[test]
fn test_forecast_series_json_export() {
    let history = series(&[100, 120, 150]);
    let result = forecast(&history, 2, &NaivePredictor).unwrap();

    let json = result.to_json().unwrap();
    assert!(json.contains("\"region\":\"King\""));
    assert!(json.contains("2023-04-01"));
}
