//! Per-sample sampling depths.

use serde::{Deserialize, Serialize};

/// Sampling depth (total count) for a single sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleDepth {
    pub sample_id: String,
    pub depth: u64,
}

/// Mapping from sample ID to sampling depth, in table sample order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DepthRecord {
    entries: Vec<SampleDepth>,
}

impl DepthRecord {
    /// Pair sample IDs with their depths.
    pub fn new(sample_ids: &[String], depths: &[u64]) -> Self {
        let entries = sample_ids
            .iter()
            .zip(depths)
            .map(|(id, &depth)| SampleDepth {
                sample_id: id.clone(),
                depth,
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SampleDepth] {
        &self.entries
    }

    /// Depth values in sample order.
    pub fn depths(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.depth).collect()
    }

    /// Depth of a sample by ID.
    pub fn get(&self, sample_id: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.sample_id == sample_id)
            .map(|e| e.depth)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SampleDepth> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_order() {
        let ids = vec!["B".to_string(), "A".to_string()];
        let record = DepthRecord::new(&ids, &[20, 10]);
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("A"), Some(10));
        assert_eq!(record.get("C"), None);
        assert_eq!(record.depths(), vec![20, 10]);
        assert_eq!(record.entries()[0].sample_id, "B");
    }
}
