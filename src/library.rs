//! Song records and the in-memory library matched against.
//!
//! Records are created once per indexed recording and never modified. The
//! core does not read or write storage; records serialize with serde so a
//! persistence layer can round-trip them. On the wire the fingerprint is
//! stored under `frequencies` and a library is `{ "songs": [...] }`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fingerprint::Fingerprint;
use crate::matching::ranking::{Ranking, rank, rank_with};
use crate::matching::{MatcherConfig, RankedMatch};
use crate::{FingerprintError, FingerprintResult};

static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// A fingerprinted recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    /// Opaque id, unique within a library
    pub id: String,
    /// Display name, usually the source file name
    pub name: String,
    /// Fingerprint of the full recording
    #[serde(rename = "frequencies")]
    pub fingerprint: Fingerprint,
}

impl SongRecord {
    /// Create a record with a freshly generated id.
    pub fn new(name: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            fingerprint,
        }
    }

    /// Create a record with a caller-supplied id.
    pub fn with_id(id: impl Into<String>, name: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fingerprint,
        }
    }
}

/// `<unix millis>_<base36 suffix>`; the suffix mixes sub-millisecond time
/// with a process-wide sequence so ids from one process never repeat.
fn generate_id() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let sequence = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let suffix = (u64::from(now.subsec_nanos() % 1_000_000) << 24) | (sequence & 0xFF_FFFF);
    format!("{}_{}", now.as_millis(), to_base36(suffix))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Ordered collection of song records.
///
/// Ids are unique within a library; deserializing a document that repeats
/// an id fails the same way [`SongLibrary::insert`] does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SongLibraryDocument")]
pub struct SongLibrary {
    songs: Vec<SongRecord>,
}

/// Wire shape of a library before id uniqueness is checked.
#[derive(Deserialize)]
struct SongLibraryDocument {
    songs: Vec<SongRecord>,
}

impl TryFrom<SongLibraryDocument> for SongLibrary {
    type Error = FingerprintError;

    fn try_from(document: SongLibraryDocument) -> Result<Self, Self::Error> {
        Self::from_songs(document.songs)
    }
}

impl SongLibrary {
    /// Create an empty library.
    pub const fn new() -> Self {
        Self { songs: Vec::new() }
    }

    /// Build a library from existing records.
    ///
    /// # Errors
    /// Returns [`FingerprintError::DuplicateSong`] if two records share an id.
    pub fn from_songs(songs: Vec<SongRecord>) -> FingerprintResult<Self> {
        let mut library = Self::new();
        for song in songs {
            library.insert(song)?;
        }
        Ok(library)
    }

    /// Append a record.
    ///
    /// # Errors
    /// Returns [`FingerprintError::DuplicateSong`] if the id is already present.
    pub fn insert(&mut self, song: SongRecord) -> FingerprintResult<()> {
        if self.get(&song.id).is_some() {
            return Err(FingerprintError::DuplicateSong(song.id));
        }
        self.songs.push(song);
        Ok(())
    }

    /// Index a newly fingerprinted recording under a generated id.
    ///
    /// Empty fingerprints carry nothing to match against and are not stored.
    pub fn index(&mut self, name: impl Into<String>, fingerprint: Fingerprint) -> Option<&SongRecord> {
        let name = name.into();
        if fingerprint.is_empty() {
            debug!(%name, "skipping empty fingerprint");
            return None;
        }

        let mut song = SongRecord::new(name, fingerprint);
        while self.get(&song.id).is_some() {
            song.id = generate_id();
        }
        debug!(id = %song.id, name = %song.name, values = song.fingerprint.len(), "indexed song");
        self.songs.push(song);
        self.songs.last()
    }

    /// Look up a record by id.
    pub fn get(&self, id: &str) -> Option<&SongRecord> {
        self.songs.iter().find(|song| song.id == id)
    }

    /// All records in insertion order.
    pub fn songs(&self) -> &[SongRecord] {
        &self.songs
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Returns true if the library holds no records.
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Iterate over records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, SongRecord> {
        self.songs.iter()
    }

    /// Rank every record against `query` with default matcher settings.
    pub fn rank(&self, query: &[i32]) -> Ranking<'_> {
        rank(query, &self.songs)
    }

    /// Rank every record against `query` with custom matcher settings.
    ///
    /// # Errors
    /// Returns [`FingerprintError::InvalidParameter`] if `config` is invalid.
    pub fn rank_with(&self, query: &[i32], config: &MatcherConfig) -> FingerprintResult<Ranking<'_>> {
        rank_with(query, &self.songs, config)
    }

    /// Best candidate for `query`, or `None` if nothing can be ranked.
    pub fn identify(&self, query: &[i32]) -> Option<RankedMatch<'_>> {
        self.rank(query).into_best()
    }
}

impl<'a> IntoIterator for &'a SongLibrary {
    type Item = &'a SongRecord;
    type IntoIter = std::slice::Iter<'a, SongRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.songs.iter()
    }
}
