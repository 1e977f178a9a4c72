use crate::forecast::Horizon;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const DEMAND_DIR: &str = ".demand";
pub const CONFIG_FILE: &str = ".demand/config.yaml";

// ---------------------------------------------------------------------------
// Default artifact keys (relative to the store root)
// ---------------------------------------------------------------------------

pub const ARCHIVE_KEY: &str = "dataformodel.json";
pub const MODEL_KEY: &str = "model.json";
pub const SUMMARY_KEY: &str = "predicted.json";
pub const SUMMARY_MIRROR_KEY: &str = "frontend/predicted.json";
pub const FORECAST_PREFIX: &str = "predicted_";
pub const METRICS_PREFIX: &str = "metrics_";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// `{prefix}{horizon}.json`, e.g. `predicted_weekly.json`.
pub fn horizon_key(prefix: &str, horizon: Horizon) -> String {
    format!("{prefix}{}.json", horizon.as_str())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
