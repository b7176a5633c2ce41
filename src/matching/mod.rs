//! Fingerprint matching and candidate ranking.
//!
//! - [`alignment`] - Best-offset search and scoring between two fingerprints
//! - [`ranking`] - Matching a query against every stored song and ordering the results
//!
//! Matching is an exhaustive linear pass over the library; there is no index.

pub mod alignment;
pub mod ranking;

pub use alignment::{
    AlignmentScore, MatchResult, MatchStrategy, MatcherConfig, SearchStrategy, alignment_score,
    match_fingerprint, match_fingerprint_with,
};
pub use ranking::{MatchReport, RankedMatch, Ranking, identify, rank, rank_with};
