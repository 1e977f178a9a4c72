//! Linear trend forecast over daily totals.
//!
//! The only feature is the day index; there is no seasonality term.

use crate::archive::DailyTotals;
use crate::error::{DemandError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Horizon
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    Weekly,
    Monthly,
}

impl Horizon {
    pub fn all() -> &'static [Horizon] {
        &[Horizon::Weekly, Horizon::Monthly]
    }

    pub fn days(self) -> usize {
        match self {
            Horizon::Weekly => 7,
            Horizon::Monthly => 30,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Horizon::Weekly => "weekly",
            Horizon::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Horizon {
    type Err = DemandError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "weekly" => Ok(Horizon::Weekly),
            "monthly" => Ok(Horizon::Monthly),
            other => Err(DemandError::UnknownPeriod(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// LinearTrend
// ---------------------------------------------------------------------------

/// Ordinary least squares line `y = slope * x + intercept` with `x` the
/// zero-based day index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    pub fn fit(values: &[f64]) -> Self {
        let n = values.len() as f64;
        if values.len() < 2 {
            return Self {
                slope: 0.0,
                intercept: values.first().copied().unwrap_or(0.0),
            };
        }

        let sum_x: f64 = (0..values.len()).map(|i| i as f64).sum();
        let sum_y: f64 = values.iter().sum();
        let sum_xy: f64 = values.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
        let sum_x2: f64 = (0..values.len()).map(|i| (i * i) as f64).sum();

        let denominator = n * sum_x2 - sum_x * sum_x;
        if denominator.abs() < f64::EPSILON {
            return Self {
                slope: 0.0,
                intercept: sum_y / n,
            };
        }

        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n;
        Self { slope, intercept }
    }

    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Evaluate at indices `start..start + horizon`, clipped at zero and
    /// rounded to two decimals.
    pub fn project(&self, start: usize, horizon: usize) -> Vec<f64> {
        (start..start + horizon)
            .map(|x| round_dp(self.at(x as f64).max(0.0), 2))
            .collect()
    }
}

/// Round to `places` decimals, ties to even on the exact binary value, so
/// `0.125` becomes `0.12` and `2.675` (stored just below) becomes `2.67`.
pub fn round_dp(value: f64, places: usize) -> f64 {
    format!("{value:.places$}").parse().unwrap_or(value)
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// The `n` calendar days following `last_date`.
pub fn future_dates(last_date: &str, n: usize) -> Result<Vec<String>> {
    let start = NaiveDate::parse_from_str(last_date, "%Y-%m-%d")
        .map_err(|_| DemandError::InvalidDate(last_date.to_string()))?;
    (1..=n as i64)
        .map(|offset| {
            start
                .checked_add_signed(Duration::days(offset))
                .map(|d| d.format("%Y-%m-%d").to_string())
                .ok_or_else(|| DemandError::InvalidDate(last_date.to_string()))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// ForecastPoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub date: String,
    pub predicted_servings: f64,
}

/// Fit the daily totals and project them `horizon.days()` days past the
/// last archived date.
pub fn forecast(totals: &DailyTotals, horizon: Horizon) -> Result<Vec<ForecastPoint>> {
    let last_date = totals.last_date().ok_or(DemandError::InsufficientHistory {
        needed: crate::archive::MIN_FORECAST_DAYS,
        found: 0,
    })?;
    let trend = LinearTrend::fit(&totals.totals);
    let predictions = trend.project(totals.len(), horizon.days());
    let dates = future_dates(last_date, horizon.days())?;
    Ok(dates
        .into_iter()
        .zip(predictions)
        .map(|(date, predicted_servings)| ForecastPoint {
            date,
            predicted_servings,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
