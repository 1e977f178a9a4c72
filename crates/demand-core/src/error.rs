use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemandError {
    #[error("archive not found: {0}")]
    ArchiveNotFound(String),

    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("not enough history: need at least {needed} day(s), found {found}")]
    InsufficientHistory { needed: usize, found: usize },

    #[error("invalid epsilon {0}: must be within [0, 1]")]
    InvalidEpsilon(f64),

    #[error("action index {index} out of range for {actions} action(s)")]
    ActionOutOfRange { index: usize, actions: usize },

    #[error("estimator has no actions")]
    NoActions,

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("unknown period '{0}': expected weekly or monthly")]
    UnknownPeriod(String),

    #[error("unsupported snapshot version {0}")]
    UnsupportedSnapshot(u32),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DemandError>;
