//! OTU Table Summarizer Library
//!
//! Computes descriptive statistics of OTU/feature count tables and renders
//! them as a static HTML report with a sampling-depth histogram and an OTU
//! rank-abundance plot.
//!
//! # Overview
//!
//! - **data**: Count tables (TSV and BIOM 1.0 JSON) and per-sample depths
//! - **profile**: Summary statistics and rank abundance
//! - **report**: Charts, templating and report assembly
//! - **pipeline**: Table-to-report composition
//!
//! # Example
//!
//! ```no_run
//! use otu_summarizer::prelude::*;
//! use std::path::Path;
//!
//! let counts = CountMatrix::load("feature-table.biom").unwrap();
//! let report = summarize_table(Path::new("summary"), &counts, &ReportConfig::default()).unwrap();
//! println!("report written to {}", report.index.display());
//! ```

pub mod data;
pub mod error;
pub mod pipeline;
pub mod profile;
pub mod report;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::data::{CountMatrix, DepthRecord, SampleDepth};
    pub use crate::error::{Result, SummaryError};
    pub use crate::pipeline::{profile_table, summarize_table, TableProfile};
    pub use crate::profile::{
        compute, rank, relative_abundances, AbundanceRanking, RankedFeature, SummaryStats,
        DEFAULT_TOP_N,
    };
    pub use crate::report::{
        ChartFiles, Report, ReportBuilder, ReportConfig, Rounding, RoundingMode, RoundingPolicy,
        Skin,
    };
}
