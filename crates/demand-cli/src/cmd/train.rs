use crate::output::{print_json, print_table};
use anyhow::Context;
use demand_core::bandit;
use demand_core::config::Config;
use demand_core::pipeline::{self, TrainOutcome};
use demand_core::store::FsStore;
use std::path::Path;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub seed: Option<u64>,
    pub episodes: Option<usize>,
    pub epsilon: Option<f64>,
}

pub fn run(root: &Path, overrides: Overrides, json: bool) -> anyhow::Result<()> {
    let mut config = Config::load(root).context("failed to load config")?;
    if let Some(seed) = overrides.seed {
        config.bandit.seed = Some(seed);
    }
    if let Some(episodes) = overrides.episodes {
        config.bandit.episodes = episodes;
    }
    if let Some(epsilon) = overrides.epsilon {
        config.bandit.epsilon = epsilon;
    }

    let mut store = FsStore::new(root);
    let rng = bandit::rng_from_seed(config.bandit.seed);
    let outcome = pipeline::train(&config, &mut store, rng).context("training failed")?;

    let summary = match outcome {
        TrainOutcome::Skipped(reason) => {
            if json {
                print_json(&serde_json::json!({ "skipped": reason }))?;
            } else {
                println!("{reason}");
            }
            return Ok(());
        }
        TrainOutcome::Trained(summary) => summary,
    };

    if json {
        print_json(&summary)?;
        return Ok(());
    }

    let rows = summary
        .dishes
        .iter()
        .zip(summary.q_values.iter().zip(&summary.counts))
        .map(|(dish, (q, n))| vec![dish.clone(), format!("{q:.2}"), n.to_string()])
        .collect();
    print_table(&["DISH", "ESTIMATE", "VISITS"], rows);
    println!();
    println!(
        "Best action: {} ({:.2})",
        summary.best_action.dish, summary.best_action.value
    );
    println!("Saved model to {}", store.path_for(&config.outputs.model).display());
    println!(
        "Saved summary to {}",
        store.path_for(&config.outputs.summary).display()
    );
    Ok(())
}
