use crate::archive::YieldField;
use crate::bandit::{RewardSignal, DEFAULT_EPISODES, DEFAULT_EPSILON};
use crate::error::Result;
use crate::forecast::Horizon;
use crate::metrics::DEFAULT_AMOUNT_PER_UNIT;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// BanditConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BanditConfig {
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    #[serde(default = "default_episodes")]
    pub episodes: usize,
    #[serde(default = "default_bandit_field")]
    pub yield_field: YieldField,
    #[serde(default)]
    pub reward: RewardSignal,
    /// Fixed seed for reproducible runs; OS entropy when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

fn default_episodes() -> usize {
    DEFAULT_EPISODES
}

fn default_bandit_field() -> YieldField {
    YieldField::TotalEarning
}

impl Default for BanditConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            episodes: default_episodes(),
            yield_field: default_bandit_field(),
            reward: RewardSignal::default(),
            seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ForecastConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_forecast_field")]
    pub yield_field: YieldField,
    #[serde(default = "default_horizons")]
    pub horizons: Vec<Horizon>,
    #[serde(default = "default_amount_per_unit")]
    pub amount_per_unit: f64,
}

fn default_forecast_field() -> YieldField {
    YieldField::TotalPlates
}

fn default_horizons() -> Vec<Horizon> {
    Horizon::all().to_vec()
}

fn default_amount_per_unit() -> f64 {
    DEFAULT_AMOUNT_PER_UNIT
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            yield_field: default_forecast_field(),
            horizons: default_horizons(),
            amount_per_unit: default_amount_per_unit(),
        }
    }
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

/// Store keys for every written artifact. Per-horizon keys are
/// `{prefix}{horizon}.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_model_key")]
    pub model: String,
    #[serde(default = "default_summary_key")]
    pub summary: String,
    /// Second copy of the summary for the dashboard. `null` disables it.
    #[serde(default = "default_summary_mirror")]
    pub summary_mirror: Option<String>,
    #[serde(default = "default_forecast_prefix")]
    pub forecast_prefix: String,
    #[serde(default = "default_metrics_prefix")]
    pub metrics_prefix: String,
}

impl OutputConfig {
    pub fn forecast_key(&self, horizon: Horizon) -> String {
        paths::horizon_key(&self.forecast_prefix, horizon)
    }

    pub fn metrics_key(&self, horizon: Horizon) -> String {
        paths::horizon_key(&self.metrics_prefix, horizon)
    }
}

fn default_model_key() -> String {
    paths::MODEL_KEY.to_string()
}

fn default_summary_key() -> String {
    paths::SUMMARY_KEY.to_string()
}

fn default_summary_mirror() -> Option<String> {
    Some(paths::SUMMARY_MIRROR_KEY.to_string())
}

fn default_forecast_prefix() -> String {
    paths::FORECAST_PREFIX.to_string()
}

fn default_metrics_prefix() -> String {
    paths::METRICS_PREFIX.to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            model: default_model_key(),
            summary: default_summary_key(),
            summary_mirror: default_summary_mirror(),
            forecast_prefix: default_forecast_prefix(),
            metrics_prefix: default_metrics_prefix(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_archive_key")]
    pub archive: String,
    #[serde(default)]
    pub bandit: BanditConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub outputs: OutputConfig,
}

fn default_version() -> u32 {
    1
}

fn default_archive_key() -> String {
    paths::ARCHIVE_KEY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            archive: default_archive_key(),
            bandit: BanditConfig::default(),
            forecast: ForecastConfig::default(),
            outputs: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load `.demand/config.yaml` under `root`, falling back to defaults
    /// when the file is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Write the default config unless one exists. Returns true if written.
    pub fn init(root: &Path) -> Result<bool> {
        let data = serde_yaml::to_string(&Self::default())?;
        crate::io::write_if_missing(&paths::config_path(root), data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if !(0.0..=1.0).contains(&self.bandit.epsilon) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "bandit.epsilon is {} but must be within [0, 1]",
                    self.bandit.epsilon
                ),
            });
        }

        if self.bandit.episodes == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "bandit.episodes is 0; every estimate will stay at 0".to_string(),
            });
        }

        if self.forecast.horizons.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "forecast.horizons is empty; forecast writes nothing".to_string(),
            });
        }

        if !self.forecast.amount_per_unit.is_finite() || self.forecast.amount_per_unit < 0.0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "forecast.amount_per_unit is {} but must be a non-negative number",
                    self.forecast.amount_per_unit
                ),
            });
        }

        let mut keys = vec![
            ("archive", &self.archive),
            ("outputs.model", &self.outputs.model),
            ("outputs.summary", &self.outputs.summary),
        ];
        if let Some(mirror) = &self.outputs.summary_mirror {
            keys.push(("outputs.summary_mirror", mirror));
        }
        for (field, key) in &keys {
            if key.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("{field} is empty"),
                });
            }
        }
        for (i, (field, key)) in keys.iter().enumerate() {
            if let Some((other, _)) = keys[..i].iter().find(|(_, k)| k == key) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("{field} and {other} both point at '{key}'"),
                });
            }
        }

        if self.outputs.forecast_prefix == self.outputs.metrics_prefix {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "outputs.forecast_prefix and outputs.metrics_prefix are both '{}'; metrics would overwrite forecasts",
                    self.outputs.forecast_prefix
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
