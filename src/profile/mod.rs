//! Table profiling: sampling depth statistics and rank abundance.

mod ranking;
mod summary;

pub use ranking::{
    rank, relative_abundances, AbundanceRanking, RankedFeature, DEFAULT_TOP_N,
};
pub use summary::{compute, SummaryStats};
