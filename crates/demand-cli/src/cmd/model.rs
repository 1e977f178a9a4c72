use crate::output::{print_json, print_table};
use anyhow::Context;
use demand_core::config::Config;
use demand_core::pipeline;
use demand_core::store::FsStore;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let store = FsStore::new(root);
    let model = pipeline::load_model(&config, &store)
        .context("failed to load model (run `demand train` first)")?;
    let best = model.best_action();

    if json {
        print_json(&serde_json::json!({
            "dishes": model.dishes,
            "epsilon": model.epsilon,
            "q_values": model.q_values,
            "counts": model.counts,
            "bestAction": best,
        }))?;
        return Ok(());
    }

    let rows = model
        .dishes
        .iter()
        .zip(model.q_values.iter().zip(&model.counts))
        .map(|(dish, (q, n))| vec![dish.clone(), format!("{q:.2}"), n.to_string()])
        .collect();
    print_table(&["DISH", "ESTIMATE", "VISITS"], rows);
    println!();
    println!("Epsilon: {}", model.epsilon);
    match best {
        Some(best) => println!("Best action: {} ({:.2})", best.dish, best.value),
        None => println!("Best action: -"),
    }
    Ok(())
}
