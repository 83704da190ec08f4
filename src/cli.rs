//! Command-line interface argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// Salescope - retail sales CSV analysis
///
/// Reads a retail transactions CSV, prints exploratory statistics,
/// renders the standard chart set and writes four summary CSV files.
///
/// Examples:
///   salescope
///   salescope --input data/sales.csv --out-dir reports
///   salescope -q
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the transactions CSV file
    #[arg(
        short,
        long,
        default_value = "supermarket_sales.csv",
        value_name = "FILE"
    )]
    pub input: PathBuf,

    /// Directory the summary CSV files are written to
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }
        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["salescope"]).unwrap();
        assert_eq!(args.input, PathBuf::from("supermarket_sales.csv"));
        assert_eq!(args.out_dir, PathBuf::from("."));
        assert!(!args.verbose);
        assert!(!args.quiet);
    }

    #[test]
    fn validation_rejects_conflicting_verbosity() {
        let args = Args::try_parse_from(["salescope", "-v", "-q"]).unwrap();
        assert!(args.validate().is_err());
    }

    #[test]
    fn log_level_follows_flags() {
        let args = Args::try_parse_from(["salescope"]).unwrap();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        let args = Args::try_parse_from(["salescope", "--verbose"]).unwrap();
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        let args = Args::try_parse_from(["salescope", "--quiet"]).unwrap();
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
