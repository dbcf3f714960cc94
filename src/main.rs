use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use cohort_match::utils::logging::print_pairs;
use cohort_match::{BalanceCalculator, MatchingConfig, MatchingContext, write_pairs_csv};
use log::{info, warn};

/// Pair treated patients with their nearest not-yet-treated controls
#[derive(Debug, Parser)]
#[command(name = "cohort-match", version, about)]
struct Cli {
    /// Input table (.csv or .parquet)
    input: PathBuf,

    /// Write matched pairs to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write the balance report to this CSV file
    #[arg(long)]
    balance: Option<PathBuf>,

    /// Print the matching result as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Never evaluate distances in parallel
    #[arg(long)]
    sequential: bool,

    /// Show a progress bar while matching
    #[arg(long)]
    progress: bool,

    /// Absolute standardized difference above which a covariate is imbalanced
    #[arg(long, default_value_t = 0.1)]
    imbalance_threshold: f64,

    /// Fewest matched pairs needed to assess a covariate's balance
    #[arg(long, default_value_t = 2)]
    min_pairs: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = MatchingConfig::builder()
        .use_parallel(!cli.sequential)
        .show_progress(cli.progress)
        .build();
    info!("{}", config.to_string_representation());

    let context = MatchingContext::load(&cli.input, config)
        .with_context(|| format!("Failed to load data: {}", cli.input.display()))?;

    let result = context.run().context("Matching failed")?;

    if let Some(notice) = &result.exhausted {
        warn!("{notice}");
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_pairs(&result);
    }

    if let Some(path) = &cli.output {
        write_pairs_csv(&result, path)
            .with_context(|| format!("Failed to write pairs to {}", path.display()))?;
        info!("Wrote {} pairs to {}", result.len(), path.display());
    }

    let report = BalanceCalculator::new()
        .with_imbalance_threshold(cli.imbalance_threshold)
        .with_min_observations(cli.min_pairs)
        .calculate_balance(&context.paired_values(&result));
    if !cli.json {
        println!();
        print!("{report}");
    }

    if let Some(path) = &cli.balance {
        report
            .write_to_csv(path)
            .with_context(|| format!("Failed to write balance report to {}", path.display()))?;
        info!("Wrote balance report to {}", path.display());
    }

    Ok(())
}
