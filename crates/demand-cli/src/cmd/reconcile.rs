use crate::output::{format_metric, print_json};
use anyhow::Context;
use demand_core::config::Config;
use demand_core::forecast::Horizon;
use demand_core::pipeline;
use demand_core::store::FsStore;
use std::path::Path;

pub fn run(root: &Path, period: &str, json: bool) -> anyhow::Result<()> {
    let horizon: Horizon = period.parse()?;
    let config = Config::load(root).context("failed to load config")?;
    let store = FsStore::new(root);
    let rec = pipeline::reconcile(&config, &store, horizon)
        .with_context(|| format!("failed to reconcile {horizon} forecast"))?;

    if json {
        print_json(&rec)?;
        return Ok(());
    }

    println!(
        "{} forecast: {} of {} day(s) have realized totals",
        rec.horizon, rec.matched_days, rec.forecast_days
    );
    if rec.matched_days == 0 {
        println!("Nothing to score yet.");
        return Ok(());
    }
    for m in &rec.metrics {
        println!("  {:<24} {}", m.name, format_metric(m.value, &m.unit));
    }
    Ok(())
}
