//! Static HTML report generation.

pub mod assets;
mod builder;
pub mod chart;
pub mod config;
pub mod template;

pub use builder::{Report, ReportBuilder};
pub use chart::{histogram_bins, ChartFiles, HistogramBin};
pub use config::{ChartSize, ReportConfig, Rounding, RoundingMode, RoundingPolicy, Skin};

/// Report page, relative to the output directory.
pub const INDEX_FILE: &str = "index.html";
/// Histogram file name without extension, inside the resources directory.
pub const HISTOGRAM_STEM: &str = "histogram";
/// Rank-abundance chart file name without extension.
pub const RANK_ABUNDANCE_STEM: &str = "rank_abundance";
/// Per-sample depth table, inside the resources directory.
pub const DEPTH_TABLE_FILE: &str = "sample_depths.tsv";
