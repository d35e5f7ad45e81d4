//! Record Source Module
//!
//! Boundary module that materializes the payout list from a CSV file.

mod reader;

pub use reader::read_records;
