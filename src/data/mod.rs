//! Data structures for OTU table summaries.

mod biom;
mod count_matrix;
mod depth_record;

pub use count_matrix::CountMatrix;
pub use depth_record::{DepthRecord, SampleDepth};
