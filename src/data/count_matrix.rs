//! Count matrix with sparse storage for OTU abundance tables.

use crate::error::{Result, SummaryError};
use rayon::prelude::*;
use sprs::{CsMat, TriMat};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// A sparse count matrix storing feature abundances across samples.
///
/// Rows represent features (OTUs), columns represent samples.
/// Uses CSR (Compressed Sparse Row) format for efficient row-wise operations.
#[derive(Debug, Clone)]
pub struct CountMatrix {
    /// Sparse matrix in CSR format (features × samples)
    data: CsMat<u64>,
    /// Feature identifiers (row names)
    feature_ids: Vec<String>,
    /// Sample identifiers (column names)
    sample_ids: Vec<String>,
}

impl CountMatrix {
    /// Create a new CountMatrix from a sparse matrix and identifiers.
    pub fn new(
        data: CsMat<u64>,
        feature_ids: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if nrows != feature_ids.len() {
            return Err(SummaryError::DimensionMismatch {
                expected: nrows,
                actual: feature_ids.len(),
            });
        }
        if ncols != sample_ids.len() {
            return Err(SummaryError::DimensionMismatch {
                expected: ncols,
                actual: sample_ids.len(),
            });
        }
        check_unique("feature", &feature_ids)?;
        check_unique("sample", &sample_ids)?;
        Ok(Self {
            data,
            feature_ids,
            sample_ids,
        })
    }

    /// Build a matrix from `(feature, sample, count)` triplets.
    ///
    /// Zero counts are dropped so they never occupy sparse storage.
    pub fn from_triplets(
        triplets: impl IntoIterator<Item = (usize, usize, u64)>,
        feature_ids: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        let shape = (feature_ids.len(), sample_ids.len());
        let mut tri_mat = TriMat::new(shape);
        for (row, col, val) in triplets {
            if row >= shape.0 {
                return Err(SummaryError::DimensionMismatch {
                    expected: shape.0,
                    actual: row + 1,
                });
            }
            if col >= shape.1 {
                return Err(SummaryError::DimensionMismatch {
                    expected: shape.1,
                    actual: col + 1,
                });
            }
            if val > 0 {
                tri_mat.add_triplet(row, col, val);
            }
        }
        Self::new(tri_mat.to_csr(), feature_ids, sample_ids)
    }

    /// Load a count table, choosing the parser from the file extension.
    ///
    /// `.biom` and `.json` files are read as BIOM 1.0 JSON, anything else as TSV.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("biom") || ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Self::from_biom_json(path)
        } else {
            Self::from_tsv(path)
        }
    }

    /// Load a count matrix from a TSV file.
    ///
    /// Expected format:
    /// - Optional banner lines starting with `"# "` (as written by `biom convert`)
    /// - Header row: feature ID column header followed by sample IDs
    /// - Subsequent rows: feature ID followed by counts
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader
            .lines()
            .filter(|line| match line {
                Ok(l) => !(l.trim().is_empty() || l.starts_with("# ")),
                Err(_) => true,
            });

        // Parse header
        let header_line = lines
            .next()
            .ok_or_else(|| SummaryError::EmptyTable("Empty TSV file".to_string()))??;
        let header: Vec<&str> = header_line.trim_end_matches('\r').split('\t').collect();
        if header.len() < 2 {
            return Err(SummaryError::EmptyTable(
                "TSV must have at least one sample".to_string(),
            ));
        }
        let sample_ids: Vec<String> = header[1..].iter().map(|s| s.trim().to_string()).collect();
        let n_samples = sample_ids.len();

        // Parse data rows into triplets for sparse matrix construction
        let mut triplets: Vec<(usize, usize, u64)> = Vec::new();
        let mut feature_ids: Vec<String> = Vec::new();

        for (row_idx, line_result) in lines.enumerate() {
            let line = line_result?;
            let fields: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
            if fields.len() != n_samples + 1 {
                return Err(SummaryError::DimensionMismatch {
                    expected: n_samples + 1,
                    actual: fields.len(),
                });
            }

            feature_ids.push(fields[0].trim().to_string());

            for (col_idx, value_str) in fields[1..].iter().enumerate() {
                let value = parse_count(value_str).ok_or_else(|| SummaryError::InvalidCount {
                    value: value_str.to_string(),
                    row: row_idx,
                    col: col_idx,
                })?;
                if value > 0 {
                    triplets.push((row_idx, col_idx, value));
                }
            }
        }

        if feature_ids.is_empty() {
            return Err(SummaryError::EmptyTable("No features in TSV".to_string()));
        }

        Self::from_triplets(triplets, feature_ids, sample_ids)
    }

    /// Write the count matrix to a TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        write!(writer, "#OTU ID")?;
        for sample_id in &self.sample_ids {
            write!(writer, "\t{}", sample_id)?;
        }
        writeln!(writer)?;

        for (row_idx, feature_id) in self.feature_ids.iter().enumerate() {
            write!(writer, "{}", feature_id)?;
            for col_idx in 0..self.n_samples() {
                write!(writer, "\t{}", self.get(row_idx, col_idx))?;
            }
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Get the value at (row, col), returning 0 for missing entries.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u64 {
        self.data.get(row, col).copied().unwrap_or(0)
    }

    /// Number of features (rows).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.data.rows()
    }

    /// Number of samples (columns).
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.data.cols()
    }

    /// Number of stored non-zero entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.data.nnz()
    }

    /// Feature identifiers.
    #[inline]
    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    /// Sample identifiers.
    #[inline]
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Get the underlying sparse matrix.
    #[inline]
    pub fn data(&self) -> &CsMat<u64> {
        &self.data
    }

    /// Compute row sums (total counts per feature).
    pub fn row_sums(&self) -> Vec<u64> {
        (0..self.n_features())
            .into_par_iter()
            .map(|row| {
                self.data
                    .outer_view(row)
                    .map(|v| v.iter().map(|(_, &val)| val).sum())
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Compute column sums (sampling depth per sample).
    pub fn col_sums(&self) -> Vec<u64> {
        let mut sums = vec![0u64; self.n_samples()];
        for row_vec in self.data.outer_iterator() {
            for (col, &val) in row_vec.iter() {
                sums[col] += val;
            }
        }
        sums
    }

    /// Sum of every entry in the table.
    pub fn total(&self) -> u64 {
        self.data.data().iter().sum()
    }

    /// Number of entries that are actually non-zero.
    ///
    /// Differs from [`nnz`](Self::nnz) only when explicit zeros were stored.
    pub fn nonzero_count(&self) -> usize {
        self.data.data().iter().filter(|&&v| v > 0).count()
    }
}

/// Parse a count cell. Accepts integers and integral floats such as `12.0`.
pub(crate) fn parse_count(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<u64>() {
        return Some(v);
    }
    let v: f64 = trimmed.parse().ok()?;
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 {
        Some(v as u64)
    } else {
        None
    }
}

/// Identifiers must be unique along each axis.
fn check_unique(axis: &str, ids: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(SummaryError::InvalidParameter(format!(
                "duplicate {} ID '{}'",
                axis, id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_matrix() -> CountMatrix {
        // 3 features × 4 samples
        let mut tri_mat = TriMat::new((3, 4));
        tri_mat.add_triplet(0, 0, 10);
        tri_mat.add_triplet(0, 1, 20);
        tri_mat.add_triplet(0, 3, 5);
        tri_mat.add_triplet(1, 0, 100);
        tri_mat.add_triplet(1, 1, 200);
        tri_mat.add_triplet(1, 2, 150);
        tri_mat.add_triplet(1, 3, 175);
        tri_mat.add_triplet(2, 0, 1);
        // OTU_3 only present in sample1

        let feature_ids = vec!["OTU_1".to_string(), "OTU_2".to_string(), "OTU_3".to_string()];
        let sample_ids = vec![
            "sample1".to_string(),
            "sample2".to_string(),
            "sample3".to_string(),
            "sample4".to_string(),
        ];

        CountMatrix::new(tri_mat.to_csr(), feature_ids, sample_ids).unwrap()
    }

    #[test]
    fn test_dimensions() {
        let mat = create_test_matrix();
        assert_eq!(mat.n_features(), 3);
        assert_eq!(mat.n_samples(), 4);
        assert_eq!(mat.nnz(), 8);
    }

    #[test]
    fn test_get_values() {
        let mat = create_test_matrix();
        assert_eq!(mat.get(0, 0), 10);
        assert_eq!(mat.get(0, 2), 0);
        assert_eq!(mat.get(2, 0), 1);
        assert_eq!(mat.get(2, 1), 0);
    }

    #[test]
    fn test_sums() {
        let mat = create_test_matrix();
        assert_eq!(mat.col_sums(), vec![111, 220, 150, 180]);
        assert_eq!(mat.row_sums(), vec![35, 625, 1]);
        assert_eq!(mat.total(), 661);
    }

    #[test]
    fn test_from_triplets_drops_zeros() {
        let mat = CountMatrix::from_triplets(
            vec![(0, 0, 3), (0, 1, 0), (1, 1, 4)],
            vec!["a".into(), "b".into()],
            vec!["s1".into(), "s2".into()],
        )
        .unwrap();
        assert_eq!(mat.nnz(), 2);
        assert_eq!(mat.nonzero_count(), 2);
    }

    #[test]
    fn test_from_triplets_out_of_bounds() {
        let err = CountMatrix::from_triplets(
            vec![(2, 0, 1)],
            vec!["a".into(), "b".into()],
            vec!["s1".into()],
        )
        .unwrap_err();
        assert!(matches!(err, SummaryError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_tsv_roundtrip() {
        let mat = create_test_matrix();

        let temp_file = NamedTempFile::new().unwrap();
        mat.to_tsv(temp_file.path()).unwrap();

        let loaded = CountMatrix::from_tsv(temp_file.path()).unwrap();
        assert_eq!(loaded.feature_ids(), mat.feature_ids());
        assert_eq!(loaded.sample_ids(), mat.sample_ids());
        assert_eq!(loaded.col_sums(), mat.col_sums());
    }

    #[test]
    fn test_tsv_biom_banner_and_float_counts() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# Constructed from biom file").unwrap();
        writeln!(file, "#OTU ID\tS1\tS2").unwrap();
        writeln!(file, "OTU_1\t10.0\t0.0").unwrap();
        writeln!(file, "OTU_2\t5\t7").unwrap();
        file.flush().unwrap();

        let mat = CountMatrix::from_tsv(file.path()).unwrap();
        assert_eq!(mat.sample_ids(), &["S1", "S2"]);
        assert_eq!(mat.feature_ids(), &["OTU_1", "OTU_2"]);
        assert_eq!(mat.col_sums(), vec![15, 7]);
    }

    #[test]
    fn test_tsv_rejects_duplicate_ids() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "#OTU ID\tS1\tS2\tS1").unwrap();
        writeln!(file, "OTU_1\t1\t2\t3").unwrap();
        file.flush().unwrap();
        let err = CountMatrix::from_tsv(file.path()).unwrap_err();
        assert!(matches!(err, SummaryError::InvalidParameter(_)));

        let err = CountMatrix::from_triplets(
            vec![(0, 0, 1)],
            vec!["OTU_1".into(), "OTU_1".into()],
            vec!["S1".into()],
        )
        .unwrap_err();
        assert!(matches!(err, SummaryError::InvalidParameter(_)));
    }

    #[test]
    fn test_tsv_rejects_fractional_count() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "#OTU ID\tS1").unwrap();
        writeln!(file, "OTU_1\t1.5").unwrap();
        file.flush().unwrap();

        let err = CountMatrix::from_tsv(file.path()).unwrap_err();
        assert!(matches!(err, SummaryError::InvalidCount { row: 0, col: 0, .. }));
    }

    #[test]
    fn test_tsv_rejects_negative_count() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "#OTU ID\tS1\tS2").unwrap();
        writeln!(file, "OTU_1\t3\t-2").unwrap();
        file.flush().unwrap();

        let err = CountMatrix::from_tsv(file.path()).unwrap_err();
        assert!(matches!(err, SummaryError::InvalidCount { col: 1, .. }));
    }

    #[test]
    fn test_tsv_without_samples() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "#OTU ID").unwrap();
        writeln!(file, "OTU_1").unwrap();
        file.flush().unwrap();

        let err = CountMatrix::from_tsv(file.path()).unwrap_err();
        assert!(matches!(err, SummaryError::EmptyTable(_)));
    }

    #[test]
    fn test_tsv_ragged_row() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "#OTU ID\tS1\tS2").unwrap();
        writeln!(file, "OTU_1\t3").unwrap();
        file.flush().unwrap();

        let err = CountMatrix::from_tsv(file.path()).unwrap_err();
        assert!(matches!(
            err,
            SummaryError::DimensionMismatch { expected: 3, actual: 2 }
        ));
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("42"), Some(42));
        assert_eq!(parse_count(" 7.0 "), Some(7));
        assert_eq!(parse_count("0.5"), None);
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count("abc"), None);
        assert_eq!(parse_count("NaN"), None);
    }
}
