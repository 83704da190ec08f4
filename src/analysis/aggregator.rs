//! Aggregator Module
//! Pure group-by-aggregate views over the loaded transactions table.

use polars::prelude::*;
use thiserror::Error;

use crate::data::columns;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// How many product lines the top-products view keeps.
pub const TOP_PRODUCTS: usize = 5;

/// The aggregate views of one run, in export-ready shape.
///
/// Each view is a two-column frame: the group key followed by the measure.
/// Views are computed once per run and never mutated afterwards. Keyed
/// views are sorted lexicographically ascending, so argmax queries resolve
/// ties to the smallest key.
#[derive(Debug, Clone)]
pub struct Aggregates {
    /// Sum of sales per branch. Columns: Branch, Sales.
    pub branch_totals: DataFrame,
    /// Sum of quantity per product line. Columns: Product line, Quantity.
    pub product_line_quantities: DataFrame,
    /// Sum of sales per product line, highest first, first five entries.
    /// Columns: Product line, Sales.
    pub top_products: DataFrame,
    /// Mean of sales per branch. Columns: Branch, Sales.
    pub branch_means: DataFrame,
    /// Sum of sales per calendar month, chronological. Columns: Date, Sales.
    pub monthly_trend: DataFrame,
}

impl Aggregates {
    pub fn compute(df: &DataFrame) -> Result<Self, AggregateError> {
        Ok(Self {
            branch_totals: sum_by(df, columns::BRANCH, columns::SALES)?,
            product_line_quantities: sum_by(df, columns::PRODUCT_LINE, columns::QUANTITY)?,
            top_products: top_products(df)?,
            branch_means: mean_by(df, columns::BRANCH, columns::SALES)?,
            monthly_trend: monthly_trend(df)?,
        })
    }
}

/// Sum of `measure` grouped by `key`, sorted ascending by key.
///
/// Null measures are skipped by the sum; an all-null group sums to zero.
pub fn sum_by(df: &DataFrame, key: &str, measure: &str) -> Result<DataFrame, AggregateError> {
    let out = df
        .clone()
        .lazy()
        .group_by_stable([col(key)])
        .agg([col(measure).sum()])
        .sort([key], SortMultipleOptions::default())
        .collect()?;
    Ok(out)
}

/// Mean of `measure` grouped by `key`, sorted ascending by key. Nulls are
/// excluded from both the numerator and the denominator.
pub fn mean_by(df: &DataFrame, key: &str, measure: &str) -> Result<DataFrame, AggregateError> {
    let out = df
        .clone()
        .lazy()
        .group_by_stable([col(key)])
        .agg([col(measure).mean()])
        .sort([key], SortMultipleOptions::default())
        .collect()?;
    Ok(out)
}

/// Rows per `key` value, sorted ascending by key. Columns: key, Count.
pub fn count_by(df: &DataFrame, key: &str) -> Result<DataFrame, AggregateError> {
    let out = df
        .clone()
        .lazy()
        .group_by_stable([col(key)])
        .agg([len().alias("Count")])
        .sort([key], SortMultipleOptions::default())
        .collect()?;
    Ok(out)
}

/// Sales totals per product line, highest first, truncated to
/// [`TOP_PRODUCTS`] entries. Equal totals fall back to product-line order
/// so the truncation stays deterministic.
fn top_products(df: &DataFrame) -> Result<DataFrame, AggregateError> {
    let out = df
        .clone()
        .lazy()
        .group_by_stable([col(columns::PRODUCT_LINE)])
        .agg([col(columns::SALES).sum()])
        .sort_by_exprs(
            [col(columns::SALES), col(columns::PRODUCT_LINE)],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .limit(TOP_PRODUCTS as u32)
        .collect()?;
    Ok(out)
}

/// Sales summed per calendar month, chronologically ascending. Month keys
/// are rendered as `YYYY-MM` strings.
fn monthly_trend(df: &DataFrame) -> Result<DataFrame, AggregateError> {
    let grouped = df
        .clone()
        .lazy()
        .with_columns([
            col(columns::DATE).dt().year().alias("year"),
            col(columns::DATE)
                .dt()
                .month()
                .cast(DataType::Int32)
                .alias("month"),
        ])
        .group_by_stable([col("year"), col("month")])
        .agg([col(columns::SALES).sum()])
        .sort(["year", "month"], SortMultipleOptions::default())
        .collect()?;

    let years = grouped.column("year")?.i32()?;
    let months = grouped.column("month")?.i32()?;
    let sales = grouped.column(columns::SALES)?.f64()?;

    let mut keys: Vec<String> = Vec::with_capacity(grouped.height());
    let mut totals: Vec<f64> = Vec::with_capacity(grouped.height());
    for i in 0..grouped.height() {
        if let (Some(y), Some(m)) = (years.get(i), months.get(i)) {
            keys.push(format!("{y}-{m:02}"));
            totals.push(sales.get(i).unwrap_or(0.0));
        }
    }

    let out = DataFrame::new(vec![
        Column::new(columns::DATE.into(), keys),
        Column::new(columns::SALES.into(), totals),
    ])?;
    Ok(out)
}

/// View rows as (label, value) pairs. The measure is cast to f64; rows
/// with a null key or measure are skipped.
pub fn key_value_pairs(view: &DataFrame) -> Vec<(String, f64)> {
    let cols = view.get_columns();
    let (Some(key_col), Some(value_col)) = (cols.first(), cols.get(1)) else {
        return Vec::new();
    };
    let Ok(keys) = key_col.str() else {
        return Vec::new();
    };
    let Ok(casted) = value_col.cast(&DataType::Float64) else {
        return Vec::new();
    };
    let Ok(values) = casted.f64() else {
        return Vec::new();
    };

    let mut pairs = Vec::with_capacity(view.height());
    for i in 0..view.height() {
        if let (Some(k), Some(v)) = (keys.get(i), values.get(i)) {
            pairs.push((k.to_string(), v));
        }
    }
    pairs
}

/// First row holding the maximum measure value, as (key, value).
///
/// Views are keyed ascending, so ties resolve to the lexicographically
/// smallest key. Returns None for an empty view.
pub fn max_row(view: &DataFrame) -> Option<(String, f64)> {
    let mut best: Option<(String, f64)> = None;
    for (key, value) in key_value_pairs(view) {
        match &best {
            Some((_, current)) if *current >= value => {}
            _ => best = Some((key, value)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataLoader;

    fn scenario_frame() -> DataFrame {
        let df = df!(
            columns::DATE => ["2024-01-05", "2024-01-20", "2024-02-01"],
            columns::BRANCH => ["BranchA", "BranchA", "BranchB"],
            columns::PRODUCT_LINE => ["Food", "Food", "Drinks"],
            columns::SALES => [10.0, 20.0, 5.0],
            columns::QUANTITY => [1i64, 2, 3],
            columns::PAYMENT => ["Cash", "Card", "Cash"],
            columns::CUSTOMER_TYPE => ["Member", "Normal", "Member"],
            columns::GENDER => ["F", "M", "F"],
        )
        .unwrap();
        DataLoader::prepare(df).unwrap()
    }

    fn empty_frame() -> DataFrame {
        let df = df!(
            columns::DATE => Vec::<String>::new(),
            columns::BRANCH => Vec::<String>::new(),
            columns::PRODUCT_LINE => Vec::<String>::new(),
            columns::SALES => Vec::<f64>::new(),
            columns::QUANTITY => Vec::<i64>::new(),
            columns::PAYMENT => Vec::<String>::new(),
            columns::CUSTOMER_TYPE => Vec::<String>::new(),
            columns::GENDER => Vec::<String>::new(),
        )
        .unwrap();
        DataLoader::prepare(df).unwrap()
    }

    #[test]
    fn branch_totals_match_scenario() {
        let agg = Aggregates::compute(&scenario_frame()).unwrap();
        let totals = key_value_pairs(&agg.branch_totals);
        assert_eq!(
            totals,
            vec![("BranchA".to_string(), 30.0), ("BranchB".to_string(), 5.0)]
        );
    }

    #[test]
    fn branch_totals_sum_to_table_total() {
        let df = scenario_frame();
        let agg = Aggregates::compute(&df).unwrap();
        let view_sum: f64 = key_value_pairs(&agg.branch_totals)
            .iter()
            .map(|(_, v)| v)
            .sum();
        let table_sum = df
            .column(columns::SALES)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .sum::<f64>();
        assert!((view_sum - table_sum).abs() < 1e-9);
    }

    #[test]
    fn monthly_trend_is_chronological() {
        let agg = Aggregates::compute(&scenario_frame()).unwrap();
        let trend = key_value_pairs(&agg.monthly_trend);
        assert_eq!(
            trend,
            vec![
                ("2024-01".to_string(), 30.0),
                ("2024-02".to_string(), 5.0)
            ]
        );
        let keys: Vec<&String> = trend.iter().map(|(k, _)| k).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn top_products_is_truncated_and_descending() {
        let lines = ["A", "B", "C", "D", "E", "F"];
        let n = lines.len();
        let df = df!(
            columns::DATE => vec!["2024-03-01"; n],
            columns::BRANCH => vec!["X"; n],
            columns::PRODUCT_LINE => lines.to_vec(),
            columns::SALES => [60.0, 50.0, 40.0, 30.0, 20.0, 10.0],
            columns::QUANTITY => vec![1i64; n],
            columns::PAYMENT => vec!["Cash"; n],
            columns::CUSTOMER_TYPE => vec!["Member"; n],
            columns::GENDER => vec!["F"; n],
        )
        .unwrap();
        let df = DataLoader::prepare(df).unwrap();

        let agg = Aggregates::compute(&df).unwrap();
        let top = key_value_pairs(&agg.top_products);
        assert_eq!(top.len(), TOP_PRODUCTS);
        assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
        assert_eq!(top[0], ("A".to_string(), 60.0));
        assert!(!top.iter().any(|(k, _)| k == "F"));

        // Fewer distinct lines than the cutoff returns all of them.
        let small = Aggregates::compute(&scenario_frame()).unwrap();
        assert_eq!(key_value_pairs(&small.top_products).len(), 2);
    }

    #[test]
    fn null_sales_are_excluded_from_sum_and_mean() {
        let df = df!(
            columns::DATE => ["2024-01-05", "2024-01-06"],
            columns::BRANCH => ["BranchA", "BranchA"],
            columns::PRODUCT_LINE => ["Food", "Food"],
            columns::SALES => [Some(10.0), None::<f64>],
            columns::QUANTITY => [1i64, 2],
            columns::PAYMENT => ["Cash", "Cash"],
            columns::CUSTOMER_TYPE => ["Member", "Member"],
            columns::GENDER => ["F", "F"],
        )
        .unwrap();
        let df = DataLoader::prepare(df).unwrap();

        let totals = key_value_pairs(&sum_by(&df, columns::BRANCH, columns::SALES).unwrap());
        assert_eq!(totals, vec![("BranchA".to_string(), 10.0)]);

        // Mean denominator excludes the null row as well.
        let means = key_value_pairs(&mean_by(&df, columns::BRANCH, columns::SALES).unwrap());
        assert_eq!(means, vec![("BranchA".to_string(), 10.0)]);
    }

    #[test]
    fn empty_table_yields_empty_views() {
        let agg = Aggregates::compute(&empty_frame()).unwrap();
        assert_eq!(agg.branch_totals.height(), 0);
        assert_eq!(agg.product_line_quantities.height(), 0);
        assert_eq!(agg.top_products.height(), 0);
        assert_eq!(agg.branch_means.height(), 0);
        assert_eq!(agg.monthly_trend.height(), 0);
        assert!(max_row(&agg.branch_totals).is_none());
    }

    #[test]
    fn count_by_counts_rows_per_key() {
        let counts = key_value_pairs(&count_by(&scenario_frame(), columns::PAYMENT).unwrap());
        assert_eq!(
            counts,
            vec![("Card".to_string(), 1.0), ("Cash".to_string(), 2.0)]
        );
    }

    #[test]
    fn max_row_breaks_ties_lexicographically() {
        let view = DataFrame::new(vec![
            Column::new(columns::BRANCH.into(), ["Alpha", "Beta"].to_vec()),
            Column::new(columns::SALES.into(), [7.0, 7.0].to_vec()),
        ])
        .unwrap();
        assert_eq!(max_row(&view), Some(("Alpha".to_string(), 7.0)));
    }
}
