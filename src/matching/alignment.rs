//! Alignment search between two fingerprints.
//!
//! The shorter fingerprint is slid across the longer one. At each offset
//! the aligned pairs are scored: small differences count as good matches at
//! half weight, large ones at full weight, and sustained runs of good
//! matches earn a bonus at every step they continue. The score is then
//! normalized by the compared length and penalized by the fraction of bad
//! matches, so candidates of different lengths can be ranked together.
//!
//! ## Search
//!
//! Offsets are first visited at a stride of `compare_length / 20` (at least
//! one). The neighbourhood of the best coarse offset is then scanned one
//! offset at a time. This is a heuristic; [`SearchStrategy::Exhaustive`]
//! visits every offset instead.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How offsets are visited during the alignment search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchStrategy {
    /// Strided pass followed by a local refinement around the best offset
    #[default]
    CoarseToFine,
    /// Every valid offset
    Exhaustive,
}

/// Which side of the comparison was slid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    /// The query is no longer than the candidate and slides across it;
    /// positions index into the candidate.
    SlideInput,
    /// The candidate is shorter and slides across the query;
    /// positions index into the query.
    SlideWindow,
}

impl MatchStrategy {
    /// Orientation used for a query of `input_len` against a candidate of `target_len`.
    pub const fn for_lengths(input_len: usize, target_len: usize) -> Self {
        if input_len <= target_len {
            Self::SlideInput
        } else {
            Self::SlideWindow
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlideInput => f.write_str("slide-input"),
            Self::SlideWindow => f.write_str("slide-window"),
        }
    }
}

/// Scoring weights and search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Largest absolute difference still counted as a good match
    pub good_match_threshold: i32,
    /// Weight applied to the difference of a good match
    pub good_match_weight: f64,
    /// Consecutive good matches needed before the streak bonus applies
    pub streak_threshold: usize,
    /// Bonus per consecutive good match, subtracted at every step of a streak
    pub streak_bonus: f64,
    /// The coarse stride is `compare_length / coarse_divisions`
    pub coarse_divisions: usize,
    /// How offsets are visited
    pub strategy: SearchStrategy,
}

impl MatcherConfig {
    /// Create a matcher configuration with default settings.
    pub const fn new() -> Self {
        Self {
            good_match_threshold: 2,
            good_match_weight: 0.5,
            streak_threshold: 5,
            streak_bonus: 0.1,
            coarse_divisions: 20,
            strategy: SearchStrategy::CoarseToFine,
        }
    }

    /// Default weights with an exhaustive offset search.
    pub const fn exhaustive() -> Self {
        let mut config = Self::new();
        config.strategy = SearchStrategy::Exhaustive;
        config
    }

    /// Validate the matcher configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.good_match_threshold < 0 {
            return Err("Good match threshold must be non-negative".to_string());
        }
        if !self.good_match_weight.is_finite() || self.good_match_weight < 0.0 {
            return Err("Good match weight must be a non-negative number".to_string());
        }
        if !self.streak_bonus.is_finite() {
            return Err("Streak bonus must be finite".to_string());
        }
        if self.coarse_divisions == 0 {
            return Err("Coarse divisions must be greater than 0".to_string());
        }
        Ok(())
    }

    fn step_size(&self, compare_length: usize) -> usize {
        match self.strategy {
            SearchStrategy::Exhaustive => 1,
            SearchStrategy::CoarseToFine => (compare_length / self.coarse_divisions.max(1)).max(1),
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Score of a single alignment before normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentScore {
    /// Accumulated weighted differences minus streak bonuses
    pub raw_score: f64,
    /// Fraction of compared pairs that were good matches
    pub match_quality: f64,
}

impl AlignmentScore {
    /// `(raw_score / compare_length) × (2 − match_quality)`.
    pub fn normalized(&self, compare_length: usize) -> f64 {
        let avg_diff = self.raw_score / compare_length as f64;
        avg_diff * (2.0 - self.match_quality)
    }
}

/// Best alignment of one candidate against the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Raw score at the best offset; not comparable across candidate lengths
    pub raw_score: f64,
    /// Length- and quality-normalized score; lower is better
    pub normalized_score: f64,
    /// Best offset into the slid-over sequence, `None` for no match
    pub position: Option<usize>,
    /// Fraction of good matches at the best offset
    pub match_quality: f64,
    /// Orientation used for the search
    pub strategy: MatchStrategy,
    /// Length of the shorter sequence
    pub compare_length: usize,
}

impl MatchResult {
    /// The no-match result: infinite scores, no position, zero quality.
    pub const fn no_match(strategy: MatchStrategy) -> Self {
        Self {
            raw_score: f64::INFINITY,
            normalized_score: f64::INFINITY,
            position: None,
            match_quality: 0.0,
            strategy,
            compare_length: 0,
        }
    }

    /// Returns true if an alignment was found.
    pub const fn is_match(&self) -> bool {
        self.position.is_some()
    }

    /// Average raw score per compared pair, infinite for no match.
    pub fn avg_diff(&self) -> f64 {
        if self.compare_length == 0 {
            return f64::INFINITY;
        }
        self.raw_score / self.compare_length as f64
    }
}

/// Score two equal-length aligned windows.
///
/// `a` and `b` are the aligned slices; only `min(a.len(), b.len())` pairs
/// are compared. Returns zero quality for empty windows.
pub fn alignment_score(a: &[i32], b: &[i32], config: &MatcherConfig) -> AlignmentScore {
    let compare_length = a.len().min(b.len());
    if compare_length == 0 {
        return AlignmentScore {
            raw_score: 0.0,
            match_quality: 0.0,
        };
    }

    let mut raw_score = 0.0;
    let mut consecutive = 0usize;
    let mut total_good = 0usize;

    for (&x, &y) in a.iter().zip(b.iter()) {
        let diff = (i64::from(x) - i64::from(y)).abs();

        if diff <= i64::from(config.good_match_threshold) {
            consecutive += 1;
            total_good += 1;
            raw_score += diff as f64 * config.good_match_weight;
        } else {
            consecutive = 0;
            raw_score += diff as f64;
        }

        // applies at every step while the streak holds
        if consecutive >= config.streak_threshold {
            raw_score -= consecutive as f64 * config.streak_bonus;
        }
    }

    AlignmentScore {
        raw_score,
        match_quality: total_good as f64 / compare_length as f64,
    }
}

/// Find the best alignment of `input` against `target` with default settings.
///
/// # Examples
///
/// ```rust
/// use melodic_fingerprint::matching::{MatchStrategy, match_fingerprint};
///
/// let song = [4, -2, 7, 1, -9, 3, 3, -5];
/// let clip = [7, 1, -9];
/// let result = match_fingerprint(&clip, &song);
/// assert_eq!(result.position, Some(2));
/// assert_eq!(result.match_quality, 1.0);
/// assert_eq!(result.strategy, MatchStrategy::SlideInput);
/// ```
pub fn match_fingerprint(input: &[i32], target: &[i32]) -> MatchResult {
    match_fingerprint_with(input, target, &MatcherConfig::default())
}

/// Find the best alignment of `input` against `target`.
///
/// Either side empty yields [`MatchResult::no_match`].
pub fn match_fingerprint_with(input: &[i32], target: &[i32], config: &MatcherConfig) -> MatchResult {
    let strategy = MatchStrategy::for_lengths(input.len(), target.len());
    if input.is_empty() || target.is_empty() {
        return MatchResult::no_match(strategy);
    }

    let (window, scanned) = match strategy {
        MatchStrategy::SlideInput => (input, target),
        MatchStrategy::SlideWindow => (target, input),
    };
    let compare_length = window.len();
    let max_offset = scanned.len() - compare_length;
    let step = config.step_size(compare_length);

    let score_at = |offset: usize| {
        let score = alignment_score(window, &scanned[offset..offset + compare_length], config);
        (score, score.normalized(compare_length))
    };

    let mut best = MatchResult {
        compare_length,
        ..MatchResult::no_match(strategy)
    };
    let consider = |offset: usize, best: &mut MatchResult| {
        let (score, normalized) = score_at(offset);
        if normalized < best.normalized_score {
            best.normalized_score = normalized;
            best.raw_score = score.raw_score;
            best.match_quality = score.match_quality;
            best.position = Some(offset);
        }
    };

    for offset in (0..=max_offset).step_by(step) {
        consider(offset, &mut best);
    }

    if step > 1 {
        if let Some(coarse) = best.position {
            let start = coarse.saturating_sub(step);
            let end = max_offset.min(coarse + step);
            for offset in start..=end {
                consider(offset, &mut best);
            }
        }
    }

    best
}
