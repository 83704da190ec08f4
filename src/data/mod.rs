//! Data module - CSV loading and exploration

mod explorer;
mod loader;

pub use explorer::Explorer;
pub use loader::{numeric_columns, DataLoader, LoaderError};

/// Column names of the transactions table, case- and spacing-sensitive.
pub mod columns {
    pub const DATE: &str = "Date";
    pub const BRANCH: &str = "Branch";
    pub const PRODUCT_LINE: &str = "Product line";
    pub const SALES: &str = "Sales";
    pub const QUANTITY: &str = "Quantity";
    pub const PAYMENT: &str = "Payment";
    pub const CUSTOMER_TYPE: &str = "Customer type";
    pub const GENDER: &str = "Gender";

    /// Every column the loader requires to be present.
    pub const REQUIRED: [&str; 8] = [
        DATE,
        BRANCH,
        PRODUCT_LINE,
        SALES,
        QUANTITY,
        PAYMENT,
        CUSTOMER_TYPE,
        GENDER,
    ];
}
