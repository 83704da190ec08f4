//! Chart Specification Module
//! Builds the fixed chart set as pure values, decoupled from rendering.

use polars::prelude::*;
use thiserror::Error;

use crate::analysis::{self, Aggregates};
use crate::data::{columns, numeric_columns};
use crate::stats::{HistogramBin, StatsCalculator};

/// Bin count of the sales distribution histogram.
pub const SALES_HISTOGRAM_BINS: usize = 30;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Chart references missing column: {0}")]
    MissingColumn(String),
    #[error("Aggregation failed: {0}")]
    Aggregate(#[from] analysis::AggregateError),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Render failed: {0}")]
    Render(String),
}

/// A labelled data point (bar and line charts).
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledValue {
    pub label: String,
    pub value: f64,
}

/// One pie slice with its share of the total.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub fraction: f64,
}

/// Row-major grid for heatmap charts. `cells[r][c]` pairs `row_labels[r]`
/// with `col_labels[c]`; None marks an absent combination.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapGrid {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

/// The typed series of one chart.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesData {
    Bars(Vec<LabeledValue>),
    Histogram(Vec<HistogramBin>),
    Line(Vec<LabeledValue>),
    Pie(Vec<PieSlice>),
    Heatmap(HeatmapGrid),
}

/// A renderable chart: everything the presentation layer needs and
/// nothing it computes.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: SeriesData,
}

/// Build the full fixed chart set in presentation order.
pub fn build_all(df: &DataFrame, agg: &Aggregates) -> Result<Vec<ChartSpec>, ChartError> {
    Ok(vec![
        branch_sales_bar(agg),
        sales_histogram(df)?,
        payment_count_bar(df)?,
        product_quantity_bar(agg),
        branch_product_heatmap(df)?,
        correlation_heatmap(df),
        monthly_trend_line(agg),
        grouped_sales_bar(df, columns::CUSTOMER_TYPE, "Sales by Customer Type")?,
        grouped_sales_bar(df, columns::GENDER, "Sales by Gender")?,
        payment_sales_pie(df)?,
    ])
}

fn require_column(df: &DataFrame, name: &str) -> Result<(), ChartError> {
    if df.column(name).is_err() {
        return Err(ChartError::MissingColumn(name.to_string()));
    }
    Ok(())
}

fn bars_from_view(view: &DataFrame) -> Vec<LabeledValue> {
    analysis::key_value_pairs(view)
        .into_iter()
        .map(|(label, value)| LabeledValue { label, value })
        .collect()
}

fn branch_sales_bar(agg: &Aggregates) -> ChartSpec {
    ChartSpec {
        title: "Total Sales by Branch".into(),
        x_label: columns::BRANCH.into(),
        y_label: "Total Sales".into(),
        series: SeriesData::Bars(bars_from_view(&agg.branch_totals)),
    }
}

fn sales_histogram(df: &DataFrame) -> Result<ChartSpec, ChartError> {
    require_column(df, columns::SALES)?;
    let values = StatsCalculator::column_values(df, columns::SALES);
    Ok(ChartSpec {
        title: "Distribution of Sales".into(),
        x_label: columns::SALES.into(),
        y_label: "Frequency".into(),
        series: SeriesData::Histogram(StatsCalculator::histogram(
            &values,
            SALES_HISTOGRAM_BINS,
        )),
    })
}

fn payment_count_bar(df: &DataFrame) -> Result<ChartSpec, ChartError> {
    require_column(df, columns::PAYMENT)?;
    let view = analysis::count_by(df, columns::PAYMENT)?;
    Ok(ChartSpec {
        title: "Transactions by Payment Method".into(),
        x_label: columns::PAYMENT.into(),
        y_label: "Transactions".into(),
        series: SeriesData::Bars(bars_from_view(&view)),
    })
}

fn product_quantity_bar(agg: &Aggregates) -> ChartSpec {
    ChartSpec {
        title: "Total Quantity Sold by Product Line".into(),
        x_label: columns::PRODUCT_LINE.into(),
        y_label: "Total Quantity".into(),
        series: SeriesData::Bars(bars_from_view(&agg.product_line_quantities)),
    }
}

/// Sum of sales per branch-and-product-line pair, pivoted into a grid with
/// lexicographically sorted axes.
fn branch_product_heatmap(df: &DataFrame) -> Result<ChartSpec, ChartError> {
    require_column(df, columns::BRANCH)?;
    require_column(df, columns::PRODUCT_LINE)?;
    require_column(df, columns::SALES)?;

    let long = df
        .clone()
        .lazy()
        .group_by_stable([col(columns::BRANCH), col(columns::PRODUCT_LINE)])
        .agg([col(columns::SALES).sum()])
        .collect()?;

    let branches = long.column(columns::BRANCH)?.str()?;
    let lines = long.column(columns::PRODUCT_LINE)?.str()?;
    let sales = long.column(columns::SALES)?.f64()?;

    let mut row_labels: Vec<String> = Vec::new();
    let mut col_labels: Vec<String> = Vec::new();
    let mut triples: Vec<(String, String, f64)> = Vec::new();
    for i in 0..long.height() {
        if let (Some(b), Some(l)) = (branches.get(i), lines.get(i)) {
            if !row_labels.iter().any(|r| r == b) {
                row_labels.push(b.to_string());
            }
            if !col_labels.iter().any(|c| c == l) {
                col_labels.push(l.to_string());
            }
            triples.push((b.to_string(), l.to_string(), sales.get(i).unwrap_or(0.0)));
        }
    }
    row_labels.sort();
    col_labels.sort();

    let mut cells = vec![vec![None; col_labels.len()]; row_labels.len()];
    for (b, l, v) in triples {
        if let (Some(r), Some(c)) = (
            row_labels.iter().position(|x| x == &b),
            col_labels.iter().position(|x| x == &l),
        ) {
            cells[r][c] = Some(v);
        }
    }

    Ok(ChartSpec {
        title: "Branch vs Product Line Sales".into(),
        x_label: columns::PRODUCT_LINE.into(),
        y_label: columns::BRANCH.into(),
        series: SeriesData::Heatmap(HeatmapGrid {
            row_labels,
            col_labels,
            cells,
        }),
    })
}

fn correlation_heatmap(df: &DataFrame) -> ChartSpec {
    let names = numeric_columns(df);
    let matrix = StatsCalculator::correlation_matrix(df, &names);
    ChartSpec {
        title: "Correlation Heatmap".into(),
        x_label: String::new(),
        y_label: String::new(),
        series: SeriesData::Heatmap(HeatmapGrid {
            row_labels: matrix.labels.clone(),
            col_labels: matrix.labels,
            cells: matrix.values,
        }),
    }
}

fn monthly_trend_line(agg: &Aggregates) -> ChartSpec {
    ChartSpec {
        title: "Monthly Sales Trend".into(),
        x_label: "Month".into(),
        y_label: columns::SALES.into(),
        series: SeriesData::Line(bars_from_view(&agg.monthly_trend)),
    }
}

fn grouped_sales_bar(df: &DataFrame, key: &str, title: &str) -> Result<ChartSpec, ChartError> {
    require_column(df, key)?;
    require_column(df, columns::SALES)?;
    let view = analysis::sum_by(df, key, columns::SALES)?;
    Ok(ChartSpec {
        title: title.into(),
        x_label: key.into(),
        y_label: "Total Sales".into(),
        series: SeriesData::Bars(bars_from_view(&view)),
    })
}

fn payment_sales_pie(df: &DataFrame) -> Result<ChartSpec, ChartError> {
    require_column(df, columns::PAYMENT)?;
    require_column(df, columns::SALES)?;

    let view = analysis::sum_by(df, columns::PAYMENT, columns::SALES)?;
    let pairs = analysis::key_value_pairs(&view);
    let total: f64 = pairs.iter().map(|(_, v)| v).sum();

    let slices = pairs
        .into_iter()
        .map(|(label, value)| PieSlice {
            label,
            value,
            fraction: if total > 0.0 { value / total } else { 0.0 },
        })
        .collect();

    Ok(ChartSpec {
        title: "Sales by Payment Method".into(),
        x_label: String::new(),
        y_label: String::new(),
        series: SeriesData::Pie(slices),
    })
}
