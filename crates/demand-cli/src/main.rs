mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "demand",
    about = "Train the dish bandit, forecast servings, and score forecasts for the dashboard",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data root holding the archive and artifacts (default: auto-detect from .demand/ or dataformodel.json)
    #[arg(long, global = true, env = "DEMAND_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log progress at info level (RUST_LOG still applies)
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the epsilon-greedy dish estimator and write the model and summary
    Train {
        /// Seed for exploration (overrides bandit.seed)
        #[arg(long)]
        seed: Option<u64>,
        /// Number of training episodes (overrides bandit.episodes)
        #[arg(long)]
        episodes: Option<usize>,
        /// Exploration probability in [0, 1] (overrides bandit.epsilon)
        #[arg(long)]
        epsilon: Option<f64>,
    },

    /// Show the estimator saved by the last training run
    Model,

    /// Forecast daily servings and write forecasts and metrics per horizon
    Forecast,

    /// Score a stored forecast against realized archive totals
    Reconcile {
        /// weekly or monthly
        #[arg(long, default_value = "weekly")]
        period: String,
    },

    /// Show realized servings and earnings for the trailing period
    Series {
        /// weekly or monthly
        #[arg(long, default_value = "weekly")]
        period: String,
    },

    /// Inspect and validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Train {
            seed,
            episodes,
            epsilon,
        } => cmd::train::run(
            &root,
            cmd::train::Overrides {
                seed,
                episodes,
                epsilon,
            },
            cli.json,
        ),
        Commands::Model => cmd::model::run(&root, cli.json),
        Commands::Forecast => cmd::forecast::run(&root, cli.json),
        Commands::Reconcile { period } => cmd::reconcile::run(&root, &period, cli.json),
        Commands::Series { period } => cmd::series::run(&root, &period, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
