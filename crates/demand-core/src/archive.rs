use crate::error::{DemandError, Result};
use crate::store::{self, ArtifactStore};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_earning: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_plates: f64,
}

/// Missing and `null` yields both count as zero.
fn null_as_zero<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayRecord {
    /// ISO calendar date, zero-padded so lexical order is calendar order.
    pub date: String,
    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

impl DayRecord {
    pub fn total(&self, field: YieldField) -> f64 {
        self.items.iter().map(|item| field.value(item)).sum()
    }
}

// ---------------------------------------------------------------------------
// YieldField
// ---------------------------------------------------------------------------

/// Which numeric item field a computation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum YieldField {
    TotalEarning,
    TotalPlates,
}

impl YieldField {
    pub fn value(self, item: &ItemRecord) -> f64 {
        match self {
            YieldField::TotalEarning => item.total_earning,
            YieldField::TotalPlates => item.total_plates,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            YieldField::TotalEarning => "totalEarning",
            YieldField::TotalPlates => "totalPlates",
        }
    }
}

impl std::fmt::Display for YieldField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Archive
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Archive {
    pub days: Vec<DayRecord>,
}

impl Archive {
    pub fn new(days: Vec<DayRecord>) -> Self {
        Self { days }
    }

    /// Load the archive stored under `key`. A missing entry is
    /// [`DemandError::ArchiveNotFound`], never an empty archive.
    pub fn load(store: &impl ArtifactStore, key: &str) -> Result<Self> {
        store::read_json(store, key)?.ok_or_else(|| DemandError::ArchiveNotFound(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Days ordered by date. The sort is stable, so same-date days keep
    /// their file order.
    pub fn sorted_days(&self) -> Vec<&DayRecord> {
        let mut days: Vec<&DayRecord> = self.days.iter().collect();
        days.sort_by(|a, b| a.date.cmp(&b.date));
        days
    }

    /// Per-date totals; repeated dates are summed.
    pub fn totals_by_date(&self, field: YieldField) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for day in &self.days {
            *totals.entry(day.date.clone()).or_insert(0.0) += day.total(field);
        }
        totals
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Index-aligned dates and daily totals, ascending by date.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyTotals {
    pub dates: Vec<String>,
    pub totals: Vec<f64>,
}

impl DailyTotals {
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn last_date(&self) -> Option<&str> {
        self.dates.last().map(String::as_str)
    }
}

/// A linear trend needs two points.
pub const MIN_FORECAST_DAYS: usize = 2;

pub fn aggregate(archive: &Archive, field: YieldField) -> Result<DailyTotals> {
    if archive.len() < MIN_FORECAST_DAYS {
        return Err(DemandError::InsufficientHistory {
            needed: MIN_FORECAST_DAYS,
            found: archive.len(),
        });
    }
    let days = archive.sorted_days();
    Ok(DailyTotals {
        dates: days.iter().map(|d| d.date.clone()).collect(),
        totals: days.iter().map(|d| d.total(field)).collect(),
    })
}

// ---------------------------------------------------------------------------
// Dish history
// ---------------------------------------------------------------------------

/// Every observation per dish, dishes in first-appearance order
/// (days in file order, items in listed order).
#[derive(Debug, Clone, Default)]
pub struct DishHistory {
    pub dishes: Vec<String>,
    pub observations: Vec<Vec<f64>>,
}

impl DishHistory {
    pub fn from_archive(archive: &Archive, field: YieldField) -> Self {
        let mut history = DishHistory::default();
        let mut index: HashMap<String, usize> = HashMap::new();
        for day in &archive.days {
            for item in &day.items {
                let slot = *index.entry(item.name.clone()).or_insert_with(|| {
                    history.dishes.push(item.name.clone());
                    history.observations.push(Vec::new());
                    history.dishes.len() - 1
                });
                history.observations[slot].push(field.value(item));
            }
        }
        history
    }

    pub fn len(&self) -> usize {
        self.dishes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dishes.is_empty()
    }

    /// Mean yield of the dish at `action`; 0.0 when it has no observations.
    pub fn mean(&self, action: usize) -> f64 {
        match self.observations.get(action) {
            Some(obs) if !obs.is_empty() => obs.iter().sum::<f64>() / obs.len() as f64,
            _ => 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Recent series
// ---------------------------------------------------------------------------

/// One day of realized history as the dashboard charts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: String,
    /// Total plates served.
    pub actual: f64,
    /// Total earnings, rounded to cents.
    pub actual_earning: f64,
}

/// The last `window` days of the archive, oldest first.
pub fn recent_series(archive: &Archive, window: usize) -> Vec<SeriesPoint> {
    let days = archive.sorted_days();
    let start = days.len().saturating_sub(window);
    days[start..]
        .iter()
        .map(|day| SeriesPoint {
            date: day.date.clone(),
            actual: day.total(YieldField::TotalPlates),
            actual_earning: crate::forecast::round_dp(day.total(YieldField::TotalEarning), 2),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
