//! Dataset Explorer Module
//! Prints schema, summary statistics, head rows and null counts to stdout.

use polars::prelude::*;

use crate::data::loader;
use crate::stats::StatsCalculator;

/// Number of rows shown in the preview section.
const HEAD_ROWS: usize = 5;

/// Prints human-readable diagnostics for a loaded table.
///
/// Purely observational: nothing downstream consumes this output.
pub struct Explorer;

impl Explorer {
    pub fn print_overview(df: &DataFrame) {
        Self::print_info(df);
        Self::print_summary_stats(df);
        Self::print_head(df);
        Self::print_null_counts(df);
    }

    fn print_info(df: &DataFrame) {
        println!("\n--- Dataset Info ---");
        println!("{} rows x {} columns", df.height(), df.width());
        for column in df.get_columns() {
            let non_null = df.height() - column.null_count();
            println!(
                "  {:<16} {:<10} {} non-null",
                column.name(),
                format!("{}", column.dtype()),
                non_null
            );
        }
    }

    fn print_summary_stats(df: &DataFrame) {
        println!("\n--- Summary Statistics ---");
        println!(
            "{:<16} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        );
        for name in loader::numeric_columns(df) {
            let values = StatsCalculator::column_values(df, &name);
            let summary = StatsCalculator::describe(&values);
            println!(
                "{:<16} {:>8} {:>12.3} {:>12.3} {:>12.3} {:>12.3} {:>12.3} {:>12.3} {:>12.3}",
                name,
                summary.count,
                summary.mean,
                summary.std,
                summary.min,
                summary.q25,
                summary.median,
                summary.q75,
                summary.max
            );
        }
    }

    fn print_head(df: &DataFrame) {
        println!("\n--- First {} Rows ---", HEAD_ROWS);
        println!("{}", df.head(Some(HEAD_ROWS)));
    }

    fn print_null_counts(df: &DataFrame) {
        println!("\n--- Missing Values ---");
        for column in df.get_columns() {
            println!("  {:<16} {}", column.name(), column.null_count());
        }
    }
}
