//! Ranking of every stored song against a query fingerprint.
//!
//! Each song is matched independently, results are sorted by normalized
//! score (lower is better) and given a confidence relative to the current
//! candidate set: the best finite score maps to 100, the worst to 0, and a
//! set whose scores are all equal gets 50 across the board.

use serde::Serialize;
use tracing::debug;

#[cfg(feature = "parallel-processing")]
use rayon::prelude::*;

use super::alignment::{MatchResult, MatchStrategy, MatcherConfig, match_fingerprint_with};
use crate::library::SongRecord;
use crate::operations::types::DEFAULT_TOP_RESULTS;
use crate::{FingerprintError, FingerprintResult};

/// Confidence assigned to every candidate when all scores are equal.
pub const DEGENERATE_CONFIDENCE: f64 = 50.0;

/// One song's result within a ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMatch<'a> {
    /// The candidate song
    pub song: &'a SongRecord,
    /// Its best alignment against the query
    pub result: MatchResult,
    /// Confidence in `[0, 100]`, relative to the other candidates
    pub confidence: f64,
}

impl RankedMatch<'_> {
    /// Flatten into the tuple a presentation layer renders.
    pub fn report(&self) -> MatchReport {
        MatchReport {
            id: self.song.id.clone(),
            name: self.song.name.clone(),
            fingerprint_len: self.song.fingerprint.len(),
            avg_diff: self.result.avg_diff(),
            match_quality_percent: self.result.match_quality * 100.0,
            confidence: self.confidence,
            position: self.result.position,
            strategy: self.result.strategy,
        }
    }
}

/// Per-song summary handed to a CLI or UI; the core does no formatting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    /// Song id
    pub id: String,
    /// Song name
    pub name: String,
    /// Number of values in the stored fingerprint
    pub fingerprint_len: usize,
    /// Raw score divided by the compared length
    pub avg_diff: f64,
    /// Share of good matches at the best offset, as a percentage
    pub match_quality_percent: f64,
    /// Relative confidence percentage
    pub confidence: f64,
    /// Best offset, if any
    pub position: Option<usize>,
    /// Which side was slid
    pub strategy: MatchStrategy,
}

/// Candidates ordered best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking<'a> {
    entries: Vec<RankedMatch<'a>>,
}

impl<'a> Ranking<'a> {
    /// The best candidate.
    pub fn best(&self) -> Option<&RankedMatch<'a>> {
        self.entries.first()
    }

    /// Consume the ranking, returning the best candidate.
    pub fn into_best(self) -> Option<RankedMatch<'a>> {
        self.entries.into_iter().next()
    }

    /// The first `n` candidates (fewer if the ranking is shorter).
    pub fn top(&self, n: usize) -> &[RankedMatch<'a>] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// All candidates, best first.
    pub fn entries(&self) -> &[RankedMatch<'a>] {
        &self.entries
    }

    /// Number of ranked candidates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was ranked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over candidates, best first.
    pub fn iter(&self) -> std::slice::Iter<'_, RankedMatch<'a>> {
        self.entries.iter()
    }

    /// Presentation tuples for the first `n` candidates.
    pub fn reports(&self, n: usize) -> Vec<MatchReport> {
        self.top(n).iter().map(RankedMatch::report).collect()
    }

    /// Presentation tuples for the first [`DEFAULT_TOP_RESULTS`] candidates.
    pub fn default_reports(&self) -> Vec<MatchReport> {
        self.reports(DEFAULT_TOP_RESULTS)
    }
}

impl<'a> IntoIterator for Ranking<'a> {
    type Item = RankedMatch<'a>;
    type IntoIter = std::vec::IntoIter<RankedMatch<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Rank `songs` against `query` with default matcher settings.
pub fn rank<'a>(query: &[i32], songs: &'a [SongRecord]) -> Ranking<'a> {
    rank_validated(query, songs, &MatcherConfig::default())
}

/// Best candidate for `query`, or `None` for an empty query or song list.
pub fn identify<'a>(query: &[i32], songs: &'a [SongRecord]) -> Option<RankedMatch<'a>> {
    rank(query, songs).into_best()
}

/// Rank `songs` against `query`.
///
/// An empty query or an empty song list yields an empty ranking. Songs
/// whose stored fingerprint is empty cannot be aligned; they are ranked
/// after every real match with confidence 0 and do not affect the
/// confidence of the others. Equal scores keep their library order.
///
/// # Errors
/// Returns [`FingerprintError::InvalidParameter`] if `config` fails
/// [`MatcherConfig::validate`]; no song is matched in that case.
pub fn rank_with<'a>(
    query: &[i32],
    songs: &'a [SongRecord],
    config: &MatcherConfig,
) -> FingerprintResult<Ranking<'a>> {
    config
        .validate()
        .map_err(|e| FingerprintError::invalid_parameter("matcher_config", e))?;
    Ok(rank_validated(query, songs, config))
}

fn rank_validated<'a>(query: &[i32], songs: &'a [SongRecord], config: &MatcherConfig) -> Ranking<'a> {
    if query.is_empty() || songs.is_empty() {
        return Ranking::default();
    }

    let results = match_all(query, songs, config);

    let mut entries: Vec<RankedMatch<'a>> = songs
        .iter()
        .zip(results)
        .map(|(song, result)| RankedMatch {
            song,
            result,
            confidence: 0.0,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.result
            .is_match()
            .cmp(&a.result.is_match())
            .then(a.result.normalized_score.total_cmp(&b.result.normalized_score))
    });

    assign_confidence(&mut entries);

    debug!(
        candidates = entries.len(),
        best_score = entries.first().map(|e| e.result.normalized_score),
        "ranked query against library"
    );

    Ranking { entries }
}

#[cfg(feature = "parallel-processing")]
fn match_all(query: &[i32], songs: &[SongRecord], config: &MatcherConfig) -> Vec<MatchResult> {
    songs
        .par_iter()
        .map(|song| match_fingerprint_with(query, &song.fingerprint, config))
        .collect()
}

#[cfg(not(feature = "parallel-processing"))]
fn match_all(query: &[i32], songs: &[SongRecord], config: &MatcherConfig) -> Vec<MatchResult> {
    songs
        .iter()
        .map(|song| match_fingerprint_with(query, &song.fingerprint, config))
        .collect()
}

fn assign_confidence(entries: &mut [RankedMatch<'_>]) {
    let (min, max) = entries
        .iter()
        .filter(|e| e.result.is_match())
        .map(|e| e.result.normalized_score)
        .fold(None, |acc: Option<(f64, f64)>, score| match acc {
            None => Some((score, score)),
            Some((lo, hi)) => Some((lo.min(score), hi.max(score))),
        })
        .unwrap_or((f64::NAN, f64::NAN));

    let range = max - min;
    for entry in entries.iter_mut().filter(|e| e.result.is_match()) {
        entry.confidence = if range == 0.0 {
            DEGENERATE_CONFIDENCE
        } else {
            100.0 * (1.0 - (entry.result.normalized_score - min) / range)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::Fingerprint;
    use crate::fingerprint::tests::generate_melody;
    use crate::library::SongLibrary;
    use crate::operations::{AudioFingerprinting, FingerprintConfig};
    use approx_eq::assert_approx_eq;

    fn song(id: &str, values: Vec<i32>) -> SongRecord {
        SongRecord::with_id(id, format!("{id}.mp3"), Fingerprint::from(values))
    }

    #[test]
    fn test_empty_library_has_no_result() {
        let ranking = rank(&[1, 2, 3], &[]);
        assert!(ranking.is_empty());
        assert!(ranking.best().is_none());
        assert!(identify(&[1, 2, 3], &[]).is_none());
    }

    #[test]
    fn test_empty_query_has_no_result() {
        let songs = vec![song("a", vec![1, 2, 3])];
        assert!(rank(&[], &songs).is_empty());
    }

    #[test]
    fn test_best_is_100_and_worst_is_0() {
        let query = vec![5, -3, 8, 2];
        let songs = vec![
            song("far", vec![-20, 30, -40, 25]),
            song("exact", vec![1, 5, -3, 8, 2, 0]),
            song("near", vec![6, -2, 9, 3]),
        ];
        let ranking = rank(&query, &songs);
        let names: Vec<&str> = ranking.iter().map(|e| e.song.id.as_str()).collect();
        assert_eq!(names, vec!["exact", "near", "far"]);

        assert_eq!(ranking.entries()[0].confidence, 100.0);
        assert_eq!(ranking.entries()[2].confidence, 0.0);
        let middle = ranking.entries()[1].confidence;
        assert!(middle > 0.0 && middle < 100.0);
        assert_eq!(ranking.entries()[0].result.position, Some(1));
    }

    #[test]
    fn test_equal_scores_get_50() {
        let songs = vec![song("a", vec![1, 2, 3]), song("b", vec![1, 2, 3])];
        let ranking = rank(&[1, 2, 3], &songs);
        assert!(ranking.iter().all(|e| e.confidence == DEGENERATE_CONFIDENCE));
        // ties keep library order
        assert_eq!(ranking.entries()[0].song.id, "a");
    }

    #[test]
    fn test_single_candidate_gets_50() {
        let songs = vec![song("only", vec![9, 9, 9])];
        let ranking = rank(&[1, 2], &songs);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking.entries()[0].confidence, 50.0);
    }

    #[test]
    fn test_empty_stored_fingerprint_ranks_last() {
        let songs = vec![
            song("empty", vec![]),
            song("good", vec![1, 2, 3]),
            song("bad", vec![40, -40, 40]),
        ];
        let ranking = rank(&[1, 2, 3], &songs);
        let last = &ranking.entries()[2];
        assert_eq!(last.song.id, "empty");
        assert!(!last.result.is_match());
        assert_eq!(last.confidence, 0.0);
        assert_eq!(ranking.entries()[0].confidence, 100.0);
        assert_eq!(ranking.entries()[1].confidence, 0.0);
    }

    #[test]
    fn test_top_and_reports() {
        let songs: Vec<SongRecord> = (0..8).map(|i| song(&format!("s{i}"), vec![i, i, i])).collect();
        let ranking = rank(&[0, 0, 0], &songs);
        assert_eq!(ranking.top(5).len(), 5);
        assert_eq!(ranking.top(50).len(), 8);

        assert_eq!(ranking.default_reports().len(), 5);

        let reports = ranking.reports(3);
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].name, "s0.mp3");
        assert_eq!(reports[0].match_quality_percent, 100.0);
        assert_eq!(reports[0].avg_diff, 0.0);
        assert_eq!(reports[0].strategy, MatchStrategy::SlideInput);
        assert_eq!(reports[0].fingerprint_len, 3);
    }

    #[test]
    fn test_report_avg_diff() {
        let songs = vec![song("a", vec![0, 0, 0, 0]), song("b", vec![10, 10, 10, 10])];
        let ranking = rank(&[1, 1, 1, 1], &songs);
        let report = ranking.entries()[0].report();
        assert_approx_eq!(report.avg_diff, 0.5, 1e-12);
        assert_approx_eq!(ranking.entries()[1].report().avg_diff, 9.0, 1e-12);
    }

    #[test]
    fn test_invalid_matcher_config_rejected() {
        let songs = vec![song("a", vec![1, 2, 3])];
        let mut config = MatcherConfig::new();
        config.good_match_weight = f64::NAN;
        let err = rank_with(&[1, 2, 3], &songs, &config).unwrap_err();
        assert!(err.is_configuration_error());

        let ranking = rank_with(&[1, 2, 3], &songs, &MatcherConfig::exhaustive()).unwrap();
        assert_eq!(ranking.best().unwrap().confidence, DEGENERATE_CONFIDENCE);
    }

    #[test]
    fn test_end_to_end_identifies_recording() {
        let config = FingerprintConfig::default();
        let melodies: [(&str, [f64; 8]); 3] = [
            ("rising", [440.0, 660.0, 520.0, 880.0, 700.0, 990.0, 600.0, 1200.0]),
            ("leaping", [1500.0, 1000.0, 1800.0, 800.0, 1600.0, 500.0, 1400.0, 700.0]),
            ("high", [2500.0, 2600.0, 2700.0, 2800.0, 2900.0, 3000.0, 3100.0, 3200.0]),
        ];

        let mut library = SongLibrary::new();
        for (name, notes) in &melodies {
            let fingerprint = generate_melody(notes, 0.5, 8000).fingerprint(&config).unwrap();
            library
                .insert(SongRecord::with_id(*name, *name, fingerprint))
                .unwrap();
        }

        let query = generate_melody(&melodies[0].1, 0.5, 8000)
            .fingerprint(&config)
            .unwrap();
        assert_eq!(query, library.get("rising").unwrap().fingerprint);

        let best = library.identify(&query).unwrap();
        assert_eq!(best.song.id, "rising");
        assert_eq!(best.confidence, 100.0);
        assert_eq!(best.result.position, Some(0));
        assert_eq!(best.result.match_quality, 1.0);
    }

    #[test]
    fn test_end_to_end_identifies_excerpt() {
        let config = FingerprintConfig::default();
        let rising = [440.0, 660.0, 520.0, 880.0, 700.0, 990.0, 600.0, 1200.0];
        let leaping = [1500.0, 1000.0, 1800.0, 800.0, 1600.0, 500.0, 1400.0, 700.0];

        let mut library = SongLibrary::new();
        library.index("rising", generate_melody(&rising, 0.5, 8000).fingerprint(&config).unwrap());
        library.index("leaping", generate_melody(&leaping, 0.5, 8000).fingerprint(&config).unwrap());

        let excerpt = generate_melody(&rising[2..7], 0.5, 8000).fingerprint(&config).unwrap();
        let ranking = library.rank(&excerpt);
        assert_eq!(ranking.best().unwrap().song.name, "rising");
        assert_eq!(ranking.best().unwrap().confidence, 100.0);
    }
}
