//! RuleForge: prescription pattern mining CLI
//!
//! Loads prescriptions, mines frequent drug combinations and association
//! rules, and prints or exports the results.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use ruleforge::report::{self, JsonReport};
use ruleforge::{viz, AnalysisSession, Args, MiningParameters};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let config = args.resolve_config()?;

    println!("=== Prescription Pattern Mining ===\n");
    let start_time = Instant::now();

    // Step 1: Load and encode data
    let session = AnalysisSession::from_csv(&args.input, &config)
        .with_context(|| format!("failed to load transactions from {}", args.input))?;
    println!(
        "✓ Data loaded: {} prescriptions, {} distinct items",
        session.n_transactions(),
        session.vocabulary().len()
    );

    // Step 2: Mine itemsets and rules
    let result = session.analyze(MiningParameters::from(&config))?;
    report::print_report(&session, &result, config.top);

    // Step 3: Raw sample
    if args.sample > 0 && !session.records().is_empty() {
        println!("\n=== Raw Data Sample ===");
        println!("First {} rows of the uploaded data:", args.sample.min(session.records().len()));
        println!("{}", report::sample_table(session.records(), args.sample));
    }

    // Step 4: Exports
    if let Some(json_path) = &args.json {
        report::write_json_report(&JsonReport::new(&session, &result), json_path)
            .with_context(|| format!("failed to write {}", json_path))?;
        println!("\nJSON report saved to: {}", json_path);
    }

    if let Some(plot_path) = &args.plot {
        let rules = report::rule_views(&result.rules, session.vocabulary());
        let itemsets = report::itemset_views(&result.frequent, session.vocabulary());
        let written = viz::generate_visualization_report(&rules, &itemsets, plot_path, config.top)?;
        if written.is_empty() {
            println!("\nNo charts written: nothing to plot at the current thresholds.");
        }
        for path in written {
            println!("Chart saved to: {}", path);
        }
    }

    info!("Total processing time: {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}
