//! Export module - summary CSV writing

mod writer;

pub use writer::{ExportError, SummaryWriter};
