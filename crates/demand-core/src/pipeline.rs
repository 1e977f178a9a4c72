//! Batch entry points. Each one loads the archive fresh, computes
//! everything in memory, and only then writes; a failure before the write
//! phase leaves the store untouched.

use crate::archive::{self, Archive, DishHistory, SeriesPoint, MIN_FORECAST_DAYS};
use crate::bandit::{self, ModelSnapshot, PredictionSummary, TrainedModel};
use crate::config::Config;
use crate::error::{DemandError, Result};
use crate::forecast::{self, ForecastPoint, Horizon};
use crate::metrics::{AccuracyMetrics, MetricRecord};
use crate::store::{self, ArtifactStore};
use chrono::Utc;
use rand::Rng;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Train
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum TrainOutcome {
    Trained(PredictionSummary),
    /// Nothing to learn from; nothing was written.
    Skipped(String),
}

pub fn train<S: ArtifactStore, R: Rng>(
    config: &Config,
    store: &mut S,
    rng: R,
) -> Result<TrainOutcome> {
    let archive = Archive::load(store, &config.archive)?;
    let history = DishHistory::from_archive(&archive, config.bandit.yield_field);
    if history.is_empty() {
        tracing::info!(archive = %config.archive, "no historical items, skipping training");
        return Ok(TrainOutcome::Skipped(
            "No historical data found.".to_string(),
        ));
    }

    let model = bandit::train(
        &history,
        config.bandit.epsilon,
        config.bandit.episodes,
        config.bandit.reward,
        rng,
    )?;
    let snapshot = ModelSnapshot::from_model(&model);
    let summary = PredictionSummary::from_model(&model, Utc::now())?;

    store::write_json(store, &config.outputs.model, &snapshot)?;
    store::write_json(store, &config.outputs.summary, &summary)?;
    tracing::info!(
        model = %config.outputs.model,
        summary = %config.outputs.summary,
        best = %summary.best_action.dish,
        "saved bandit model"
    );

    if let Some(mirror) = &config.outputs.summary_mirror {
        match store::write_json(store, mirror, &summary) {
            Ok(()) => tracing::info!(mirror = %mirror, "mirrored summary"),
            Err(e) => tracing::warn!(mirror = %mirror, error = %e, "failed to mirror summary"),
        }
    }

    Ok(TrainOutcome::Trained(summary))
}

/// Load the estimator saved by the last [`train`] run.
pub fn load_model<S: ArtifactStore>(config: &Config, store: &S) -> Result<TrainedModel> {
    let key = &config.outputs.model;
    let data = store
        .read(key)?
        .ok_or_else(|| DemandError::ArtifactNotFound(key.clone()))?;
    Ok(ModelSnapshot::from_json(&data)?.into_model())
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct HorizonReport {
    pub horizon: Horizon,
    pub points: Vec<ForecastPoint>,
    pub metrics: Vec<MetricRecord>,
}

#[derive(Debug, Clone)]
pub enum ForecastOutcome {
    Written(Vec<HorizonReport>),
    Skipped(String),
}

pub fn forecast<S: ArtifactStore>(config: &Config, store: &mut S) -> Result<ForecastOutcome> {
    let archive = Archive::load(store, &config.archive)?;
    if archive.len() < MIN_FORECAST_DAYS {
        tracing::info!(days = archive.len(), "not enough history to forecast");
        return Ok(ForecastOutcome::Skipped(
            "Not enough history to model.".to_string(),
        ));
    }
    let totals = archive::aggregate(&archive, config.forecast.yield_field)?;

    let mut reports = Vec::with_capacity(config.forecast.horizons.len());
    for &horizon in &config.forecast.horizons {
        let points = forecast::forecast(&totals, horizon)?;
        let predicted: Vec<f64> = points.iter().map(|p| p.predicted_servings).collect();
        // Realized values for future dates do not exist yet, so the
        // projection is scored against itself; `reconcile` scores it later
        // against what was actually served.
        let metrics = AccuracyMetrics::evaluate(
            &predicted,
            &predicted,
            config.forecast.amount_per_unit,
        )
        .to_records();
        reports.push(HorizonReport {
            horizon,
            points,
            metrics,
        });
    }

    for report in &reports {
        let outputs = &config.outputs;
        store::write_json(store, &outputs.forecast_key(report.horizon), &report.points)?;
        store::write_json(store, &outputs.metrics_key(report.horizon), &report.metrics)?;
    }
    tracing::info!(
        horizons = reports.len(),
        days = totals.len(),
        "wrote forecasts and metrics"
    );

    Ok(ForecastOutcome::Written(reports))
}

// ---------------------------------------------------------------------------
// Reconcile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    pub horizon: Horizon,
    /// Forecast days that have a realized total in the archive.
    pub matched_days: usize,
    pub forecast_days: usize,
    pub metrics: Vec<MetricRecord>,
}

/// Score the stored forecast for `horizon` against realized archive totals
/// on the same dates. Read-only.
pub fn reconcile<S: ArtifactStore>(
    config: &Config,
    store: &S,
    horizon: Horizon,
) -> Result<Reconciliation> {
    let archive = Archive::load(store, &config.archive)?;
    let key = config.outputs.forecast_key(horizon);
    let points: Vec<ForecastPoint> =
        store::read_json(store, &key)?.ok_or(DemandError::ArtifactNotFound(key))?;

    let realized = archive.totals_by_date(config.forecast.yield_field);
    let (actual, predicted): (Vec<f64>, Vec<f64>) = points
        .iter()
        .filter_map(|p| realized.get(&p.date).map(|a| (*a, p.predicted_servings)))
        .unzip();

    tracing::debug!(
        %horizon,
        matched = actual.len(),
        forecast_days = points.len(),
        "reconciled forecast"
    );

    Ok(Reconciliation {
        horizon,
        matched_days: actual.len(),
        forecast_days: points.len(),
        metrics: AccuracyMetrics::evaluate(&actual, &predicted, config.forecast.amount_per_unit)
            .to_records(),
    })
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// Realized plates and earnings for the trailing `horizon.days()` days.
pub fn series<S: ArtifactStore>(
    config: &Config,
    store: &S,
    horizon: Horizon,
) -> Result<Vec<SeriesPoint>> {
    let archive = Archive::load(store, &config.archive)?;
    Ok(archive::recent_series(&archive, horizon.days()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
