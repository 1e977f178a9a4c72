use crate::forecast::round_dp;
use serde::{Deserialize, Serialize};

/// Relative error below which a day counts as a successful prediction.
pub const SUCCESS_THRESHOLD: f64 = 0.1;

/// Placeholder value of one plate in dollars.
pub const DEFAULT_AMOUNT_PER_UNIT: f64 = 10.0;

// ---------------------------------------------------------------------------
// MetricRecord
// ---------------------------------------------------------------------------

/// One dashboard card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub name: String,
    pub icon: String,
    pub value: f64,
    /// Change against the previous period. Not tracked yet, always 0.
    pub change: f64,
    pub unit: String,
}

impl MetricRecord {
    fn new(name: &str, icon: &str, value: f64, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            icon: icon.to_string(),
            value,
            change: 0.0,
            unit: unit.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// AccuracyMetrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyMetrics {
    /// Percent, one decimal.
    pub accuracy_rate: f64,
    /// Whole units.
    pub quantity_saved: f64,
    /// Dollars, two decimals.
    pub amount_saved: f64,
    pub successful_predictions: usize,
}

impl AccuracyMetrics {
    /// Score `predicted` against `actual`, pairing elements by position.
    /// Extra elements in the longer slice are ignored.
    pub fn evaluate(actual: &[f64], predicted: &[f64], amount_per_unit: f64) -> Self {
        let pairs = || actual.iter().copied().zip(predicted.iter().copied());

        // Days with no actual demand have no defined relative error.
        let rates: Vec<f64> = pairs()
            .filter(|(a, _)| *a > 0.0)
            .map(|(a, p)| 1.0 - (p - a).abs() / a)
            .collect();
        let accuracy_rate = if rates.is_empty() {
            0.0
        } else {
            round_dp(100.0 * rates.iter().sum::<f64>() / rates.len() as f64, 1)
        };

        let quantity_saved = pairs()
            .map(|(a, p)| (a - p).max(0.0))
            .sum::<f64>()
            .round_ties_even();
        let amount_saved = round_dp(quantity_saved * amount_per_unit, 2);

        let successful_predictions = pairs()
            .filter(|(a, p)| *a > 0.0 && (p - a).abs() / a < SUCCESS_THRESHOLD)
            .count();

        Self {
            accuracy_rate,
            quantity_saved,
            amount_saved,
            successful_predictions,
        }
    }

    /// The four dashboard cards in display order.
    pub fn to_records(&self) -> Vec<MetricRecord> {
        vec![
            MetricRecord::new("Accuracy Rate", "chart", self.accuracy_rate, "%"),
            MetricRecord::new("Ingredients Saved", "carrot", self.quantity_saved, ""),
            MetricRecord::new("Amount Saved", "dollar", self.amount_saved, "$"),
            MetricRecord::new(
                "Successful Predictions",
                "check",
                self.successful_predictions as f64,
                "",
            ),
        ]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
