//! Sampling depth summary statistics for count tables.

use crate::data::{CountMatrix, DepthRecord};
use crate::error::{Result, SummaryError};
use log::debug;
use serde::{Deserialize, Serialize};

/// Descriptive statistics of a count table and its per-sample depths.
///
/// Values are kept at full precision except `density_percent`, which is
/// rounded to two decimal places. Display rounding happens in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Number of samples.
    pub sample_count: usize,
    /// Number of features (OTUs).
    pub feature_count: usize,
    /// Sum of all counts in the table.
    pub total_count: u64,
    /// Mean sampling depth.
    pub mean_depth: f64,
    /// Median sampling depth.
    pub median_depth: f64,
    /// Minimum sampling depth.
    pub min_depth: u64,
    /// Maximum sampling depth.
    pub max_depth: u64,
    /// Sample (n - 1) standard deviation of sampling depths.
    pub stddev_depth: f64,
    /// Percentage of non-zero entries, rounded to 2 decimals.
    pub density_percent: f64,
}

impl std::fmt::Display for SummaryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Table Summary")?;
        writeln!(f, "  Samples:  {}", self.sample_count)?;
        writeln!(f, "  Features: {}", self.feature_count)?;
        writeln!(f, "  Total:    {}", self.total_count)?;
        writeln!(f, "  Density:  {:.2}%", self.density_percent)?;
        writeln!(f, "Sampling Depth")?;
        writeln!(f, "  Mean:    {:.2}", self.mean_depth)?;
        writeln!(f, "  Median:  {:.1}", self.median_depth)?;
        writeln!(f, "  Min:     {}", self.min_depth)?;
        writeln!(f, "  Max:     {}", self.max_depth)?;
        writeln!(f, "  Std Dev: {:.2}", self.stddev_depth)?;
        Ok(())
    }
}

/// Compute summary statistics and the per-sample depth record of a table.
///
/// Fails with [`SummaryError::EmptyTable`] when the table has no samples and
/// with [`SummaryError::InsufficientSamples`] when it has only one, since the
/// sample standard deviation is undefined there.
pub fn compute(counts: &CountMatrix) -> Result<(SummaryStats, DepthRecord)> {
    let n_samples = counts.n_samples();
    if n_samples == 0 {
        return Err(SummaryError::EmptyTable(
            "table has no samples".to_string(),
        ));
    }
    if n_samples < 2 {
        return Err(SummaryError::InsufficientSamples {
            required: 2,
            actual: n_samples,
        });
    }

    let depths = counts.col_sums();
    let record = DepthRecord::new(counts.sample_ids(), &depths);

    let total_count: u64 = depths.iter().sum();
    let mean_depth = total_count as f64 / n_samples as f64;

    let variance = depths
        .iter()
        .map(|&x| {
            let diff = x as f64 - mean_depth;
            diff * diff
        })
        .sum::<f64>()
        / (n_samples - 1) as f64;
    let stddev_depth = variance.sqrt();

    let median_depth = median_u64(&depths);
    let min_depth = *depths.iter().min().unwrap_or(&0);
    let max_depth = *depths.iter().max().unwrap_or(&0);

    let n_features = counts.n_features();
    let total_entries = n_features * n_samples;
    let density_percent = if total_entries == 0 {
        0.0
    } else {
        round_to(counts.nonzero_count() as f64 / total_entries as f64 * 100.0, 2)
    };

    let stats = SummaryStats {
        sample_count: n_samples,
        feature_count: n_features,
        total_count,
        mean_depth,
        median_depth,
        min_depth,
        max_depth,
        stddev_depth,
        density_percent,
    };
    debug!(
        "summarized {} samples x {} features: mean depth {:.2}, density {:.2}%",
        stats.sample_count, stats.feature_count, stats.mean_depth, stats.density_percent
    );

    Ok((stats, record))
}

fn median_u64(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0
    } else {
        sorted[n / 2] as f64
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
