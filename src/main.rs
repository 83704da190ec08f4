//! Salescope - Retail Sales CSV Analysis
//!
//! Reads a retail transactions CSV, prints exploratory diagnostics,
//! renders the standard chart set and writes summary CSV files.
//!
//! The pipeline is a single forward pass: load -> explore -> aggregate ->
//! chart -> export. The first error aborts the run.

mod analysis;
mod charts;
mod cli;
mod data;
mod export;
mod stats;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use data::{DataLoader, Explorer};
use tracing::{debug, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    init_logging(&args);

    info!("Salescope v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    run(args)
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete analysis pipeline.
fn run(args: Args) -> Result<()> {
    let mut loader = DataLoader::new();
    let table = loader
        .load_csv(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    info!("Loaded {} rows from {}", table.height(), args.input.display());

    Explorer::print_overview(table);

    let aggregates = analysis::Aggregates::compute(table).context("Aggregation failed")?;

    let specs = charts::build_all(table, &aggregates).context("Chart generation failed")?;
    for spec in &specs {
        charts::render(spec).with_context(|| format!("Failed to render '{}'", spec.title))?;
    }
    info!("Rendered {} charts", specs.len());

    print_insights(&aggregates);

    let writer = export::SummaryWriter::new(&args.out_dir);
    let written = writer.write_all(&aggregates).context("Export failed")?;

    println!("\nSummaries saved to:");
    for path in &written {
        println!("  {}", path.display());
    }

    Ok(())
}

/// Print the headline aggregate tables and their argmax answers.
fn print_insights(agg: &analysis::Aggregates) {
    println!("\n--- Branch with Highest Sales ---");
    println!("{}", agg.branch_totals);
    if let Some((branch, _)) = analysis::max_row(&agg.branch_totals) {
        println!("Highest sales branch: {}", branch);
    }

    println!("\n--- Most Popular Product Line ---");
    println!("{}", agg.product_line_quantities);
    if let Some((line, _)) = analysis::max_row(&agg.product_line_quantities) {
        println!("Most sold product line: {}", line);
    }

    println!("\n--- Top 5 Products by Sales ---");
    println!("{}", agg.top_products);

    println!("\n--- Average Sales per Branch ---");
    println!("{}", agg.branch_means);

    println!("\n--- Monthly Sales Trend ---");
    println!("{}", agg.monthly_trend);
}
