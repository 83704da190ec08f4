//! Analysis module - aggregate views over the transactions table

mod aggregator;

pub use aggregator::{
    count_by, key_value_pairs, max_row, mean_by, sum_by, AggregateError, Aggregates, TOP_PRODUCTS,
};
