//! Rank-abundance ranking of features.

use crate::data::CountMatrix;
use crate::error::{Result, SummaryError};
use log::debug;
use serde::{Deserialize, Serialize};

/// Number of features kept in a ranking unless configured otherwise.
pub const DEFAULT_TOP_N: usize = 30;

/// A feature with its share of all counts in the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFeature {
    /// Rank (1 = most abundant).
    pub rank: usize,
    pub feature_id: String,
    /// Feature total divided by the table total.
    pub relative_abundance: f64,
}

/// Features ordered by descending relative abundance, truncated to the top N.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AbundanceRanking {
    pub entries: Vec<RankedFeature>,
}

impl AbundanceRanking {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Combined share of all counts held by the ranked features.
    pub fn covered_fraction(&self) -> f64 {
        self.entries.iter().map(|e| e.relative_abundance).sum()
    }
}

impl std::fmt::Display for AbundanceRanking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Rank Abundance (top {})", self.entries.len())?;
        for entry in &self.entries {
            writeln!(
                f,
                "  {:>3}. {:<30} {:>8.4}%",
                entry.rank,
                entry.feature_id,
                entry.relative_abundance * 100.0
            )?;
        }
        Ok(())
    }
}

/// Relative abundance of every feature, in table order.
///
/// Fails with [`SummaryError::EmptyTable`] when the table total is zero.
pub fn relative_abundances(counts: &CountMatrix) -> Result<Vec<f64>> {
    let row_sums = counts.row_sums();
    let total: u64 = row_sums.iter().sum();
    if total == 0 {
        return Err(SummaryError::EmptyTable(
            "all counts are zero".to_string(),
        ));
    }
    Ok(row_sums
        .iter()
        .map(|&s| s as f64 / total as f64)
        .collect())
}

/// Rank features by relative abundance and keep the `top_n` most abundant.
///
/// Ties keep the original feature order. Tables with fewer than `top_n`
/// features return every feature.
pub fn rank(counts: &CountMatrix, top_n: usize) -> Result<AbundanceRanking> {
    if top_n == 0 {
        return Err(SummaryError::InvalidParameter(
            "top_n must be greater than 0".to_string(),
        ));
    }

    let abundances = relative_abundances(counts)?;
    let mut order: Vec<usize> = (0..abundances.len()).collect();
    // sort_by is stable, so equal abundances stay in feature order
    order.sort_by(|&a, &b| abundances[b].total_cmp(&abundances[a]));

    let entries: Vec<RankedFeature> = order
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, idx)| RankedFeature {
            rank: i + 1,
            feature_id: counts.feature_ids()[idx].clone(),
            relative_abundance: abundances[idx],
        })
        .collect();

    debug!(
        "ranked {} of {} features (top_n = {})",
        entries.len(),
        counts.n_features(),
        top_n
    );

    Ok(AbundanceRanking { entries })
}
