//! Region history data handling for forecasting

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// One month of registration history for a region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Calendar month of the observation
    pub date: NaiveDate,
    /// Registrations recorded in that month
    pub value: u64,
}

/// A running total paired with its month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    /// Calendar month of the total
    pub date: NaiveDate,
    /// Running total of registrations up to and including this month
    pub cumulative: f64,
}

/// Running totals for a historical series
pub fn cumulative(points: &[HistoryPoint]) -> Vec<CumulativePoint> {
    let mut total = 0.0;
    points
        .iter()
        .map(|point| {
            total += point.value as f64;
            CumulativePoint {
                date: point.date,
                cumulative: total,
            }
        })
        .collect()
}

/// Historical series for a single region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionSeries {
    /// Region name as it appears in the dataset
    name: String,
    /// Encoded region identifier the model was trained with
    code: i64,
    /// Monthly observations, sorted ascending by date
    points: Vec<HistoryPoint>,
}

impl RegionSeries {
    /// Create a series from collected points, sorting them by month.
    ///
    /// Dates are assumed unique and gap-free by month once sorted; the
    /// engine does not re-check this.
    pub fn new(name: impl Into<String>, code: i64, mut points: Vec<HistoryPoint>) -> Result<Self> {
        let name = name.into();
        if points.is_empty() {
            return Err(ForecastError::DataError(format!(
                "Region '{}' has no history points",
                name
            )));
        }
        points.sort_by_key(|point| point.date);

        Ok(Self { name, code, points })
    }

    /// Region name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encoded region identifier
    pub fn code(&self) -> i64 {
        self.code
    }

    /// Monthly observations, oldest first
    pub fn points(&self) -> &[HistoryPoint] {
        &self.points
    }

    /// Number of observed months
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Month of the most recent observation
    pub fn last_date(&self) -> NaiveDate {
        // new() rejects empty point sets
        self.points[self.points.len() - 1].date
    }

    /// Months elapsed from the first to the last observation.
    ///
    /// Gap-free monthly data makes this the series length minus one.
    pub fn last_period_index(&self) -> i64 {
        self.points.len() as i64 - 1
    }

    /// Running totals over the full history
    pub fn cumulative(&self) -> Vec<CumulativePoint> {
        cumulative(&self.points)
    }

    /// Final running total over the full history
    pub fn final_cumulative(&self) -> f64 {
        self.points.iter().map(|point| point.value as f64).sum()
    }
}

/// All regions' history, keyed by region name
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    regions: BTreeMap<String, RegionSeries>,
}

impl Dataset {
    /// Build a dataset from per-region series
    pub fn new(series: Vec<RegionSeries>) -> Self {
        let mut regions = BTreeMap::new();
        for entry in series {
            regions.insert(entry.name().to_string(), entry);
        }
        Self { regions }
    }

    /// Add or replace one region's series
    pub fn insert(&mut self, series: RegionSeries) {
        self.regions.insert(series.name().to_string(), series);
    }

    /// Region names in sorted order
    pub fn regions(&self) -> Vec<&str> {
        self.regions.keys().map(String::as_str).collect()
    }

    /// Look up one region's series by name
    pub fn region(&self, name: &str) -> Option<&RegionSeries> {
        self.regions.get(name)
    }

    /// Number of regions
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the dataset holds no regions
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Data loader for preprocessed region history files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a region history dataset from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df)
    }

    /// Build a dataset from an existing DataFrame
    pub fn from_dataframe(df: DataFrame) -> Result<Dataset> {
        let date_column = Self::detect_column(&df, &["date"], &[])?;
        let code_column = Self::detect_column(&df, &["encoded", "code"], &[])?;
        let region_column =
            Self::detect_column(&df, &["county", "region", "state"], &["encoded", "code"])?;
        // "county" contains "count", so region-style names must be excluded here
        let value_column =
            Self::detect_column(&df, &["total", "value", "count"], &["county", "region", "code"])?;

        let dates = Self::column_as_str(&df, &date_column)?;
        let codes = Self::column_as_i64(&df, &code_column)?;
        let names = Self::column_as_str(&df, &region_column)?;
        let values = Self::column_as_f64(&df, &value_column)?;

        let mut grouped: BTreeMap<String, (i64, Vec<HistoryPoint>)> = BTreeMap::new();
        for i in 0..df.height() {
            // Rows with missing fields are dropped, matching the source data's
            // dropna handling
            let (name, code, date_str, value) = match (&names[i], codes[i], &dates[i], values[i]) {
                (Some(name), Some(code), Some(date), Some(value)) => (name, code, date, value),
                _ => continue,
            };

            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                ForecastError::DataError(format!("Unparseable date '{}': {}", date_str, e))
            })?;
            if value < 0.0 {
                return Err(ForecastError::DataError(format!(
                    "Negative registration count {} for region '{}'",
                    value, name
                )));
            }

            grouped
                .entry(name.clone())
                .or_insert_with(|| (code, Vec::new()))
                .1
                .push(HistoryPoint {
                    date,
                    value: value.round() as u64,
                });
        }

        if grouped.is_empty() {
            return Err(ForecastError::DataError(
                "No usable rows found in data".to_string(),
            ));
        }

        let mut series = Vec::with_capacity(grouped.len());
        for (name, (code, points)) in grouped {
            series.push(RegionSeries::new(name, code, points)?);
        }

        Ok(Dataset::new(series))
    }

    /// Find a column whose lowercased name contains one of `keywords` and
    /// none of `exclude`
    fn detect_column(df: &DataFrame, keywords: &[&str], exclude: &[&str]) -> Result<String> {
        for name in df.get_column_names() {
            let lower_name = name.to_lowercase();
            if keywords.iter().any(|k| lower_name.contains(k))
                && !exclude.iter().any(|k| lower_name.contains(k))
            {
                return Ok(name.to_string());
            }
        }

        Err(ForecastError::DataError(format!(
            "No column matching {:?} found in data",
            keywords
        )))
    }

    fn column_as_str(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
        let col = df.column(name)?;
        match col.dtype() {
            DataType::Utf8 => Ok(col
                .utf8()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()),
            _ => Err(ForecastError::DataError(format!(
                "Column '{}' must contain text values",
                name
            ))),
        }
    }

    fn column_as_i64(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
        let col = df.column(name)?;
        match col.dtype() {
            DataType::Int64 => Ok(col.i64()?.into_iter().collect()),
            DataType::Int32 => Ok(col
                .i32()?
                .into_iter()
                .map(|v| v.map(|x| x as i64))
                .collect()),
            DataType::Float64 => Ok(col
                .f64()?
                .into_iter()
                .map(|v| v.map(|x| x as i64))
                .collect()),
            _ => Err(ForecastError::DataError(format!(
                "Column '{}' must contain numeric values",
                name
            ))),
        }
    }

    fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
        let col = df.column(name)?;
        match col.dtype() {
            DataType::Float64 => Ok(col.f64()?.into_iter().collect()),
            DataType::Float32 => Ok(col
                .f32()?
                .into_iter()
                .map(|v| v.map(|x| x as f64))
                .collect()),
            DataType::Int64 => Ok(col
                .i64()?
                .into_iter()
                .map(|v| v.map(|x| x as f64))
                .collect()),
            DataType::Int32 => Ok(col
                .i32()?
                .into_iter()
                .map(|v| v.map(|x| x as f64))
                .collect()),
            _ => Err(ForecastError::DataError(format!(
                "Column '{}' must contain numeric values",
                name
            ))),
        }
    }
}
