//! Statistics module - descriptive summaries, histograms and correlation

mod calculator;

pub use calculator::{ColumnSummary, CorrelationMatrix, HistogramBin, StatsCalculator};
