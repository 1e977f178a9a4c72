pub mod archive;
pub mod bandit;
pub mod config;
pub mod error;
pub mod forecast;
pub mod io;
pub mod metrics;
pub mod paths;
pub mod pipeline;
pub mod store;

pub use error::{DemandError, Result};
