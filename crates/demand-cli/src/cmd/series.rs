use crate::output::{print_json, print_table};
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
    let points = pipeline::series(&config, &store, horizon).context("failed to load series")?;

    if json {
        print_json(&points)?;
        return Ok(());
    }

    if points.is_empty() {
        println!("No archived days.");
        return Ok(());
    }

    let rows = points
        .iter()
        .map(|p| {
            vec![
                p.date.clone(),
                format!("{}", p.actual),
                format!("{:.2}", p.actual_earning),
            ]
        })
        .collect();
    print_table(&["DATE", "PLATES", "EARNINGS"], rows);
    Ok(())
}
