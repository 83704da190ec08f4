//! CSV Data Loader Module
//! Handles CSV file loading and schema coercion using Polars.

use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

use crate::data::columns;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Missing expected column: {0}")]
    MissingColumn(String),
    #[error("Date column has unsupported type: {0}")]
    DateType(DataType),
    #[error("No data loaded")]
    NoData,
}

/// Handles CSV file loading with Polars.
pub struct DataLoader {
    df: Option<DataFrame>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self { df: None }
    }

    /// Load a CSV file and coerce it to the transaction schema.
    ///
    /// A missing file, malformed CSV, absent column or unparseable date
    /// column is fatal; there are no retries.
    pub fn load_csv(&mut self, file_path: &Path) -> Result<&DataFrame, LoaderError> {
        let df = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        let df = Self::prepare(df)?;
        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Validate required columns and coerce dtypes: `Date` into calendar
    /// dates, `Sales` into Float64, `Quantity` into Int64. Unparseable
    /// measure values become nulls; unparseable dates are an error.
    ///
    /// Exposed separately so in-memory tables can go through the same
    /// coercion as files.
    pub fn prepare(df: DataFrame) -> Result<DataFrame, LoaderError> {
        for name in columns::REQUIRED {
            if df.column(name).is_err() {
                return Err(LoaderError::MissingColumn(name.to_string()));
            }
        }

        let date_expr = match df.column(columns::DATE)?.dtype() {
            DataType::Date => col(columns::DATE),
            // An empty column has no format to infer from.
            DataType::String if df.is_empty() => col(columns::DATE).cast(DataType::Date),
            DataType::String => col(columns::DATE).str().to_date(StrptimeOptions {
                strict: true,
                ..Default::default()
            }),
            other => return Err(LoaderError::DateType(other.clone())),
        };

        let df = df
            .lazy()
            .with_columns([
                date_expr,
                col(columns::SALES).cast(DataType::Float64),
                col(columns::QUANTITY).cast(DataType::Int64),
            ])
            .collect()?;

        Ok(df)
    }
}

/// Names of numeric columns, in schema order.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|column| {
            matches!(
                column.dtype(),
                DataType::Float32
                    | DataType::Float64
                    | DataType::Int8
                    | DataType::Int16
                    | DataType::Int32
                    | DataType::Int64
                    | DataType::UInt8
                    | DataType::UInt16
                    | DataType::UInt32
                    | DataType::UInt64
            )
        })
        .map(|column| column.name().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn raw_frame() -> DataFrame {
        df!(
            columns::DATE => ["2024-01-05", "2024-01-20", "2024-02-01"],
            columns::BRANCH => ["BranchA", "BranchA", "BranchB"],
            columns::PRODUCT_LINE => ["Food", "Food", "Drinks"],
            columns::SALES => [10.0, 20.0, 5.0],
            columns::QUANTITY => [1i64, 2, 3],
            columns::PAYMENT => ["Cash", "Card", "Cash"],
            columns::CUSTOMER_TYPE => ["Member", "Normal", "Member"],
            columns::GENDER => ["F", "M", "F"],
        )
        .unwrap()
    }

    #[test]
    fn prepare_parses_dates_and_coerces_measures() {
        let df = DataLoader::prepare(raw_frame()).unwrap();
        assert_eq!(df.column(columns::DATE).unwrap().dtype(), &DataType::Date);
        assert_eq!(
            df.column(columns::SALES).unwrap().dtype(),
            &DataType::Float64
        );
        assert_eq!(
            df.column(columns::QUANTITY).unwrap().dtype(),
            &DataType::Int64
        );
    }

    #[test]
    fn prepare_rejects_missing_column() {
        let df = raw_frame().drop(columns::PAYMENT).unwrap();
        let err = DataLoader::prepare(df).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn(name) if name == columns::PAYMENT));
    }

    #[test]
    fn prepare_rejects_unparseable_dates() {
        let mut df = raw_frame();
        df.replace(
            columns::DATE,
            Series::new(columns::DATE.into(), ["not-a-date", "also-bad", "nope"]),
        )
        .unwrap();
        assert!(DataLoader::prepare(df).is_err());
    }

    #[test]
    fn load_csv_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Date,Branch,Product line,Sales,Quantity,Payment,Customer type,Gender").unwrap();
        writeln!(file, "2024-01-05,BranchA,Food,10.5,1,Cash,Member,F").unwrap();
        drop(file);

        let mut loader = DataLoader::new();
        let df = loader.load_csv(&path).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.column(columns::DATE).unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn load_csv_fails_on_absent_file() {
        let mut loader = DataLoader::new();
        assert!(loader.load_csv(Path::new("does-not-exist.csv")).is_err());
    }

    #[test]
    fn numeric_columns_excludes_text_and_dates() {
        let df = DataLoader::prepare(raw_frame()).unwrap();
        let numeric = numeric_columns(&df);
        assert_eq!(numeric, vec![columns::SALES, columns::QUANTITY]);
    }
}
