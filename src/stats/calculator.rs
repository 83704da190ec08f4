//! Statistics Calculator Module
//! Descriptive summaries, percentiles, histogram binning and correlation.

use polars::prelude::*;
use statrs::statistics::Statistics;

/// Descriptive summary of a numeric column.
#[derive(Debug, Clone)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Default for ColumnSummary {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// A single fixed-width histogram bin over `[lower, upper)`; the last bin
/// also includes its upper edge.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Pairwise Pearson correlation over a set of numeric columns.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// `values[i][j]` is the coefficient of `labels[i]` vs `labels[j]`;
    /// None when fewer than two complete observation pairs exist or a
    /// column has zero variance.
    pub values: Vec<Vec<Option<f64>>>,
}

/// Handles statistical calculations over column values.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Non-null values of a column, cast to f64.
    pub fn column_values(df: &DataFrame, name: &str) -> Vec<f64> {
        let Ok(column) = df.column(name) else {
            return Vec::new();
        };
        let Ok(casted) = column.cast(&DataType::Float64) else {
            return Vec::new();
        };
        match casted.f64() {
            Ok(ca) => ca.into_iter().flatten().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Per-row optional values of a column, cast to f64. Length always
    /// matches the frame height so rows can be paired across columns.
    fn column_options(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        let Ok(column) = df.column(name) else {
            return Vec::new();
        };
        let Ok(casted) = column.cast(&DataType::Float64) else {
            return Vec::new();
        };
        match casted.f64() {
            Ok(ca) => ca.into_iter().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Pairwise-complete observations of two columns: rows where both
    /// values are present.
    pub fn paired_values(df: &DataFrame, a: &str, b: &str) -> Vec<(f64, f64)> {
        let xs = Self::column_options(df, a);
        let ys = Self::column_options(df, b);
        xs.into_iter()
            .zip(ys)
            .filter_map(|(x, y)| Some((x?, y?)))
            .collect()
    }

    /// Compute descriptive statistics for an array of values.
    pub fn describe(values: &[f64]) -> ColumnSummary {
        let n = values.len();
        if n == 0 {
            return ColumnSummary::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        ColumnSummary {
            count: n,
            mean: values.mean(),
            std: values.std_dev(),
            min: sorted[0],
            q25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            q75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile over pre-sorted values using linear
    /// interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Bin values into `bins` equal-width intervals spanning [min, max].
    /// Empty input produces no bins.
    pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
        if values.is_empty() || bins == 0 {
            return Vec::new();
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let width = if max > min { (max - min) / bins as f64 } else { 1.0 };

        let mut counts = vec![0usize; bins];
        for &v in values {
            let mut idx = ((v - min) / width) as usize;
            if idx >= bins {
                idx = bins - 1;
            }
            counts[idx] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: min + i as f64 * width,
                upper: min + (i + 1) as f64 * width,
                count,
            })
            .collect()
    }

    /// Pearson correlation coefficient of paired observations.
    pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
        let n = pairs.len();
        if n < 2 {
            return None;
        }

        let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
        let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;

        let mut cov = 0.0;
        let mut var_x = 0.0;
        let mut var_y = 0.0;
        for (x, y) in pairs {
            let dx = x - mean_x;
            let dy = y - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x == 0.0 || var_y == 0.0 {
            return None;
        }
        Some(cov / (var_x.sqrt() * var_y.sqrt()))
    }

    /// Pairwise-complete Pearson correlation over the given columns,
    /// computed one column pair at a time.
    pub fn correlation_matrix(df: &DataFrame, names: &[String]) -> CorrelationMatrix {
        let mut values = Vec::with_capacity(names.len());
        for a in names {
            let mut row = Vec::with_capacity(names.len());
            for b in names {
                let pairs = Self::paired_values(df, a, b);
                row.push(Self::pearson(&pairs));
            }
            values.push(row);
        }

        CorrelationMatrix {
            labels: names.to_vec(),
            values,
        }
    }
}
