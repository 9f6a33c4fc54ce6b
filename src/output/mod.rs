//! Output module for reporting on the record store
//!
//! This module handles summarizing stored records for `--stats`.

pub mod stats;

pub use stats::{load_statistics, print_statistics, read_statistics, StoreStatistics};
