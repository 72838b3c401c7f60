//! Integration tests for the table-to-report pipeline.

use otu_summarizer::prelude::*;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};

/// Write a synthetic OTU table in `biom convert --to-tsv` layout.
///
/// 40 features × 6 samples with a steep abundance gradient: feature `i`
/// has base count `1000 / (i + 1)`, and every third cell of the rare half
/// of the table is zero.
fn write_synthetic_tsv() -> NamedTempFile {
    let n_features = 40;
    let n_samples = 6;
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "# Constructed from biom file").unwrap();
    let header: Vec<String> = (1..=n_samples).map(|s| format!("Sample{}", s)).collect();
    writeln!(file, "#OTU ID\t{}", header.join("\t")).unwrap();
    for feat in 0..n_features {
        let row: Vec<String> = (0..n_samples)
            .map(|sample| {
                if feat >= n_features / 2 && (feat + sample) % 3 == 0 {
                    "0.0".to_string()
                } else {
                    format!("{}.0", 1000 / (feat + 1) + sample * 3)
                }
            })
            .collect();
        writeln!(file, "OTU_{:02}\t{}", feat, row.join("\t")).unwrap();
    }
    file.flush().unwrap();
    file
}

fn small_config() -> ReportConfig {
    let mut config = ReportConfig::default();
    config.chart_size.width = 400;
    config.chart_size.height = 300;
    config
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_tsv_to_report() {
    let tsv = write_synthetic_tsv();
    let counts = CountMatrix::load(tsv.path()).unwrap();
    assert_eq!(counts.n_features(), 40);
    assert_eq!(counts.n_samples(), 6);

    let out = TempDir::new().unwrap();
    let report = summarize_table(out.path(), &counts, &small_config()).unwrap();

    let html = read(&report.index);
    assert!(html.contains("<h3>6</h3>"));
    assert!(html.contains("<h3>40</h3>"));
    assert!(html.contains("Sample1"));
    assert!(html.contains("OTU_00"));
    assert!(html.contains("Top 30 OTUs"));

    let depth_rows = read(&report.depth_table).lines().count();
    assert_eq!(depth_rows, 7);
    assert!(report.rank_abundance.png.is_file());
    assert!(read(&report.rank_abundance.svg).contains("<svg"));
    assert!(report.histogram.pdf.is_file());
    assert!(report.rank_abundance.pdf.is_file());
}

#[test]
fn test_profile_matches_report_inputs() {
    let tsv = write_synthetic_tsv();
    let counts = CountMatrix::load(tsv.path()).unwrap();
    let profile = profile_table(&counts, DEFAULT_TOP_N).unwrap();

    assert_eq!(profile.ranking.len(), 30);
    assert_eq!(profile.ranking.entries[0].feature_id, "OTU_00");
    assert!(profile.stats.min_depth as f64 <= profile.stats.mean_depth);
    assert!(profile.stats.mean_depth <= profile.stats.max_depth as f64);
    assert!(profile.stats.density_percent > 0.0 && profile.stats.density_percent < 100.0);

    let full: f64 = relative_abundances(&counts).unwrap().iter().sum();
    assert!((full - 1.0).abs() < 1e-9);
    assert!(profile.ranking.covered_fraction() < 1.0);
}

#[test]
fn test_biom_to_report_with_custom_config() {
    let json = r#"{
        "id": "tiny",
        "format": "Biological Observation Matrix 1.0.0",
        "matrix_type": "sparse",
        "matrix_element_type": "int",
        "shape": [2, 3],
        "rows": [{"id": "OTU_A", "metadata": null}, {"id": "OTU_B", "metadata": null}],
        "columns": [{"id": "A"}, {"id": "B"}, {"id": "C"}],
        "data": [[0, 0, 10], [0, 1, 15], [1, 1, 5], [0, 2, 30]]
    }"#;
    let mut file = tempfile::Builder::new().suffix(".biom").tempfile().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file.flush().unwrap();

    let counts = CountMatrix::load(file.path()).unwrap();
    let config = ReportConfig::from_yaml(
        "title: Tiny table\nresources_dir: assets\ntop_n: 1\nchart_size:\n  width: 300\n  height: 200\n",
    )
    .unwrap();

    let out = TempDir::new().unwrap();
    let report = summarize_table(out.path(), &counts, &config).unwrap();
    assert_eq!(report.resources, out.path().join("assets"));

    let html = read(&report.index);
    assert!(html.contains("<title>Tiny table</title>"));
    assert!(html.contains("assets/histogram.png"));
    // depths 10, 20, 30
    assert!(html.contains("<h3>20</h3>"));
    assert!(html.contains("<h3>10-30</h3>"));
    assert!(html.contains("<h3>10.00</h3>"));
    assert!(html.contains("Top 1 OTUs"));
}

#[test]
fn test_single_sample_fails_before_writing() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "#OTU ID\tOnly").unwrap();
    writeln!(file, "OTU_1\t12").unwrap();
    file.flush().unwrap();

    let counts = CountMatrix::load(file.path()).unwrap();
    let out = TempDir::new().unwrap();
    let err = summarize_table(out.path(), &counts, &small_config()).unwrap_err();
    assert!(matches!(err, SummaryError::InsufficientSamples { .. }));
    assert!(!out.path().join("index.html").exists());
}

#[test]
fn test_all_zero_table_fails_ranking() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "#OTU ID\tS1\tS2").unwrap();
    writeln!(file, "OTU_1\t0\t0").unwrap();
    writeln!(file, "OTU_2\t0\t0").unwrap();
    file.flush().unwrap();

    let counts = CountMatrix::load(file.path()).unwrap();
    assert!(compute(&counts).is_ok());
    let err = rank(&counts, DEFAULT_TOP_N).unwrap_err();
    assert!(matches!(err, SummaryError::EmptyTable(_)));
}

#[test]
fn test_unwritable_output_leaves_no_index() {
    let tsv = write_synthetic_tsv();
    let counts = CountMatrix::load(tsv.path()).unwrap();

    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("occupied");
    fs::write(&blocker, "file in the way").unwrap();
    let out = blocker.join("summary");

    let err = summarize_table(&out, &counts, &small_config()).unwrap_err();
    assert!(matches!(err, SummaryError::OutputWrite { .. }));
    assert!(err.to_string().contains("summary"));
    assert!(!out.join("index.html").exists());
}
