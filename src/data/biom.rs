//! BIOM 1.0 (JSON) table loading.

use super::CountMatrix;
use crate::error::{Result, SummaryError};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum MatrixType {
    Sparse,
    Dense,
}

#[derive(Debug, Deserialize)]
struct BiomAxisEntry {
    id: String,
}

#[derive(Debug, Deserialize)]
struct BiomTable {
    shape: [usize; 2],
    matrix_type: MatrixType,
    rows: Vec<BiomAxisEntry>,
    columns: Vec<BiomAxisEntry>,
    data: Vec<Vec<f64>>,
}

impl CountMatrix {
    /// Load a count matrix from a BIOM 1.0 JSON document.
    ///
    /// Both `sparse` (`[row, col, value]` triplets) and `dense` (row-major)
    /// layouts are accepted. Observations become features, columns become samples.
    pub fn from_biom_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let table: BiomTable = serde_json::from_reader(BufReader::new(file))?;
        Self::from_biom_table(table)
    }

    /// Parse a BIOM 1.0 JSON document held in memory.
    pub fn from_biom_str(json: &str) -> Result<Self> {
        let table: BiomTable = serde_json::from_str(json)?;
        Self::from_biom_table(table)
    }

    fn from_biom_table(table: BiomTable) -> Result<Self> {
        let [n_rows, n_cols] = table.shape;
        if table.rows.len() != n_rows {
            return Err(SummaryError::DimensionMismatch {
                expected: n_rows,
                actual: table.rows.len(),
            });
        }
        if table.columns.len() != n_cols {
            return Err(SummaryError::DimensionMismatch {
                expected: n_cols,
                actual: table.columns.len(),
            });
        }

        let mut triplets = Vec::with_capacity(table.data.len());
        match table.matrix_type {
            MatrixType::Sparse => {
                for entry in &table.data {
                    if entry.len() != 3 {
                        return Err(SummaryError::DimensionMismatch {
                            expected: 3,
                            actual: entry.len(),
                        });
                    }
                    let row = to_index(entry[0], n_rows)?;
                    let col = to_index(entry[1], n_cols)?;
                    let value = to_count(entry[2], row, col)?;
                    triplets.push((row, col, value));
                }
            }
            MatrixType::Dense => {
                if table.data.len() != n_rows {
                    return Err(SummaryError::DimensionMismatch {
                        expected: n_rows,
                        actual: table.data.len(),
                    });
                }
                for (row, values) in table.data.iter().enumerate() {
                    if values.len() != n_cols {
                        return Err(SummaryError::DimensionMismatch {
                            expected: n_cols,
                            actual: values.len(),
                        });
                    }
                    for (col, &v) in values.iter().enumerate() {
                        triplets.push((row, col, to_count(v, row, col)?));
                    }
                }
            }
        }

        let feature_ids = table.rows.into_iter().map(|r| r.id).collect();
        let sample_ids = table.columns.into_iter().map(|c| c.id).collect();
        Self::from_triplets(triplets, feature_ids, sample_ids)
    }
}

fn to_index(raw: f64, bound: usize) -> Result<usize> {
    if raw.fract() != 0.0 || raw < 0.0 || raw as usize >= bound {
        return Err(SummaryError::InvalidParameter(format!(
            "BIOM index {} outside 0..{}",
            raw, bound
        )));
    }
    Ok(raw as usize)
}

fn to_count(raw: f64, row: usize, col: usize) -> Result<u64> {
    if raw.is_finite() && raw >= 0.0 && raw.fract() == 0.0 {
        Ok(raw as u64)
    } else {
        Err(SummaryError::InvalidCount {
            value: raw.to_string(),
            row,
            col,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPARSE: &str = r#"{
        "id": "test-table",
        "format": "Biological Observation Matrix 1.0.0",
        "type": "OTU table",
        "matrix_type": "sparse",
        "matrix_element_type": "float",
        "shape": [3, 2],
        "rows": [
            {"id": "OTU_1", "metadata": null},
            {"id": "OTU_2", "metadata": {"taxonomy": ["k__Bacteria"]}},
            {"id": "OTU_3", "metadata": null}
        ],
        "columns": [
            {"id": "S1", "metadata": null},
            {"id": "S2", "metadata": null}
        ],
        "data": [[0, 0, 5.0], [1, 1, 12.0], [2, 0, 3.0]]
    }"#;

    #[test]
    fn test_sparse_biom() {
        let mat = CountMatrix::from_biom_str(SPARSE).unwrap();
        assert_eq!(mat.n_features(), 3);
        assert_eq!(mat.n_samples(), 2);
        assert_eq!(mat.feature_ids(), &["OTU_1", "OTU_2", "OTU_3"]);
        assert_eq!(mat.sample_ids(), &["S1", "S2"]);
        assert_eq!(mat.col_sums(), vec![8, 12]);
        assert_eq!(mat.get(1, 1), 12);
    }

    #[test]
    fn test_dense_biom() {
        let json = r#"{
            "matrix_type": "dense",
            "shape": [2, 3],
            "rows": [{"id": "a"}, {"id": "b"}],
            "columns": [{"id": "x"}, {"id": "y"}, {"id": "z"}],
            "data": [[1, 0, 2], [0, 0, 4]]
        }"#;
        let mat = CountMatrix::from_biom_str(json).unwrap();
        assert_eq!(mat.nnz(), 3);
        assert_eq!(mat.col_sums(), vec![1, 0, 6]);
        assert_eq!(mat.row_sums(), vec![3, 4]);
    }

    #[test]
    fn test_shape_mismatch() {
        let json = r#"{
            "matrix_type": "sparse",
            "shape": [2, 1],
            "rows": [{"id": "a"}],
            "columns": [{"id": "x"}],
            "data": []
        }"#;
        let err = CountMatrix::from_biom_str(json).unwrap_err();
        assert!(matches!(
            err,
            SummaryError::DimensionMismatch { expected: 2, actual: 1 }
        ));
    }

    #[test]
    fn test_fractional_value_rejected() {
        let json = r#"{
            "matrix_type": "sparse",
            "shape": [1, 1],
            "rows": [{"id": "a"}],
            "columns": [{"id": "x"}],
            "data": [[0, 0, 0.25]]
        }"#;
        let err = CountMatrix::from_biom_str(json).unwrap_err();
        assert!(matches!(err, SummaryError::InvalidCount { .. }));
    }

    #[test]
    fn test_duplicate_sample_ids_rejected() {
        let json = r#"{
            "matrix_type": "dense",
            "shape": [1, 2],
            "rows": [{"id": "a"}],
            "columns": [{"id": "S1"}, {"id": "S1"}],
            "data": [[3, 4]]
        }"#;
        let err = CountMatrix::from_biom_str(json).unwrap_err();
        match err {
            SummaryError::InvalidParameter(msg) => assert!(msg.contains("S1")),
            other => panic!("unexpected error: {}", other),
        }
    }
}
