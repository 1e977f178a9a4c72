pub mod config;
pub mod forecast;
pub mod model;
pub mod reconcile;
pub mod series;
pub mod train;
