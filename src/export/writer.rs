//! Summary Writer Module
//! Persists aggregate views as flat CSV files.

use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::analysis::Aggregates;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// Export file stems, written as `<stem>.csv`.
pub const BRANCH_SALES: &str = "branch_sales_summary";
pub const PRODUCT_SALES: &str = "product_sales_summary";
pub const TOP_PRODUCTS: &str = "top_products_summary";
pub const MONTHLY_SALES: &str = "monthly_sales_summary";

/// Writes aggregate views into an output directory.
///
/// Existing files at the same paths are overwritten without warning. A
/// failure is fatal to the run; files written before it remain on disk.
pub struct SummaryWriter {
    out_dir: PathBuf,
}

impl SummaryWriter {
    pub fn new(out_dir: &Path) -> Self {
        Self {
            out_dir: out_dir.to_path_buf(),
        }
    }

    /// Write the four exported views. Returns the paths written, in order.
    pub fn write_all(&self, agg: &Aggregates) -> Result<Vec<PathBuf>, ExportError> {
        Ok(vec![
            self.write_view(BRANCH_SALES, &agg.branch_totals)?,
            self.write_view(PRODUCT_SALES, &agg.product_line_quantities)?,
            self.write_view(TOP_PRODUCTS, &agg.top_products)?,
            self.write_view(MONTHLY_SALES, &agg.monthly_trend)?,
        ])
    }

    /// Write one view as `<out_dir>/<stem>.csv` with a header row.
    fn write_view(&self, stem: &str, view: &DataFrame) -> Result<PathBuf, ExportError> {
        let path = self.out_dir.join(format!("{stem}.csv"));
        let mut file = File::create(&path).map_err(|source| ExportError::Create {
            path: path.clone(),
            source,
        })?;

        let mut out = view.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut out)?;

        info!("Wrote {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Aggregates;
    use crate::data::{columns, DataLoader};

    fn scenario_aggregates() -> Aggregates {
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
        Aggregates::compute(&DataLoader::prepare(df).unwrap()).unwrap()
    }

    #[test]
    fn writes_four_files_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SummaryWriter::new(dir.path());
        let written = writer.write_all(&scenario_aggregates()).unwrap();
        assert_eq!(written.len(), 4);

        let branch = std::fs::read_to_string(&written[0]).unwrap();
        assert!(branch.starts_with("Branch,Sales"));
        assert!(branch.contains("BranchA,30"));

        let product = std::fs::read_to_string(&written[1]).unwrap();
        assert!(product.starts_with("Product line,Quantity"));
        assert!(product.contains("Food,3"));

        let top = std::fs::read_to_string(&written[2]).unwrap();
        assert!(top.starts_with("Product line,Sales"));

        let monthly = std::fs::read_to_string(&written[3]).unwrap();
        assert!(monthly.starts_with("Date,Sales"));
        assert!(monthly.contains("2024-01,30"));
    }

    #[test]
    fn export_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SummaryWriter::new(dir.path());
        let agg = scenario_aggregates();

        let first = writer.write_all(&agg).unwrap();
        let snapshot: Vec<Vec<u8>> = first
            .iter()
            .map(|p| std::fs::read(p).unwrap())
            .collect();

        let second = writer.write_all(&agg).unwrap();
        for (path, before) in second.iter().zip(snapshot) {
            assert_eq!(std::fs::read(path).unwrap(), before);
        }
    }

    #[test]
    fn empty_views_export_header_only_files() {
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
        let agg = Aggregates::compute(&DataLoader::prepare(df).unwrap()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let writer = SummaryWriter::new(dir.path());
        let written = writer.write_all(&agg).unwrap();

        let branch = std::fs::read_to_string(&written[0]).unwrap();
        assert_eq!(branch.trim_end(), "Branch,Sales");
    }

    #[test]
    fn unwritable_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let writer = SummaryWriter::new(&missing);
        let err = writer.write_all(&scenario_aggregates()).unwrap_err();
        assert!(matches!(err, ExportError::Create { .. }));
    }
}
