//! End-to-end summarization of a count table.

use crate::data::{CountMatrix, DepthRecord};
use crate::error::Result;
use crate::profile::{compute, rank, AbundanceRanking, SummaryStats};
use crate::report::{Report, ReportBuilder, ReportConfig};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Statistics, depths and ranking derived from one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableProfile {
    pub stats: SummaryStats,
    pub depths: DepthRecord,
    pub ranking: AbundanceRanking,
}

/// Compute the summary statistics and the top-`top_n` ranking of a table.
pub fn profile_table(counts: &CountMatrix, top_n: usize) -> Result<TableProfile> {
    let (stats, depths) = compute(counts)?;
    let ranking = rank(counts, top_n)?;
    Ok(TableProfile {
        stats,
        depths,
        ranking,
    })
}

/// Summarize a table into a static report under `output_dir`.
///
/// Runs the statistics, the ranking (with `config.top_n`) and the report
/// build in sequence; the first failure aborts the run.
pub fn summarize_table(
    output_dir: &Path,
    counts: &CountMatrix,
    config: &ReportConfig,
) -> Result<Report> {
    let builder = ReportBuilder::new(config.clone())?;
    let profile = profile_table(counts, config.top_n)?;
    info!(
        "summarized {} samples and {} features",
        profile.stats.sample_count, profile.stats.feature_count
    );
    builder.build(&profile.stats, &profile.depths, &profile.ranking, output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SummaryError;
    use sprs::TriMat;
    use tempfile::TempDir;

    fn create_test_matrix() -> CountMatrix {
        let mut tri_mat = TriMat::new((3, 3));
        tri_mat.add_triplet(0, 0, 6);
        tri_mat.add_triplet(1, 0, 4);
        tri_mat.add_triplet(0, 1, 15);
        tri_mat.add_triplet(2, 1, 5);
        tri_mat.add_triplet(0, 2, 30);
        CountMatrix::new(
            tri_mat.to_csr(),
            vec!["OTU_1".into(), "OTU_2".into(), "OTU_3".into()],
            vec!["A".into(), "B".into(), "C".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_profile_table() {
        let profile = profile_table(&create_test_matrix(), 2).unwrap();
        assert_eq!(profile.depths.depths(), vec![10, 20, 30]);
        assert!((profile.stats.stddev_depth - 10.0).abs() < 1e-10);
        assert_eq!(profile.ranking.len(), 2);
        assert_eq!(profile.ranking.entries[0].feature_id, "OTU_1");
    }

    #[test]
    fn test_summarize_table() {
        let dir = TempDir::new().unwrap();
        let mut config = ReportConfig::default();
        config.chart_size.width = 320;
        config.chart_size.height = 240;
        let report = summarize_table(dir.path(), &create_test_matrix(), &config).unwrap();
        assert!(report.index.is_file());
        assert!(report.histogram.svg.is_file());
    }

    #[test]
    fn test_summarize_rejects_bad_config_before_writing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("report");
        let config = ReportConfig {
            top_n: 0,
            ..ReportConfig::default()
        };
        let err = summarize_table(&out, &create_test_matrix(), &config).unwrap_err();
        assert!(matches!(err, SummaryError::InvalidParameter(_)));
        assert!(!out.exists());
    }
}
