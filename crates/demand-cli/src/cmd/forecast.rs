use crate::output::{format_metric, print_json};
use anyhow::Context;
use demand_core::config::Config;
use demand_core::pipeline::{self, ForecastOutcome};
use demand_core::store::FsStore;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let mut store = FsStore::new(root);
    let outcome = pipeline::forecast(&config, &mut store).context("forecast failed")?;

    let reports = match outcome {
        ForecastOutcome::Skipped(reason) => {
            if json {
                print_json(&serde_json::json!({ "skipped": reason }))?;
            } else {
                println!("{reason}");
            }
            return Ok(());
        }
        ForecastOutcome::Written(reports) => reports,
    };

    if json {
        print_json(&reports)?;
        return Ok(());
    }

    for report in &reports {
        let first = report.points.first();
        let last = report.points.last();
        println!(
            "{} forecast: {} day(s), {} .. {}",
            report.horizon,
            report.points.len(),
            first.map(|p| p.date.as_str()).unwrap_or("-"),
            last.map(|p| p.date.as_str()).unwrap_or("-"),
        );
        if let (Some(first), Some(last)) = (first, last) {
            println!(
                "  servings: {:.2} -> {:.2}",
                first.predicted_servings, last.predicted_servings
            );
        }
        for m in &report.metrics {
            println!("  {:<24} {}", m.name, format_metric(m.value, &m.unit));
        }
        println!(
            "  wrote {} and {}",
            config.outputs.forecast_key(report.horizon),
            config.outputs.metrics_key(report.horizon)
        );
    }
    Ok(())
}
