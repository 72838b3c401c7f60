//! Pipeline composition: table to report.

mod runner;

pub use runner::{profile_table, summarize_table, TableProfile};
