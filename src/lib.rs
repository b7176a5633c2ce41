// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)] // Duplicate match arms

// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains

// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![warn(clippy::unwrap_used)] // Avoids using `unwrap()`

// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![warn(missing_docs)] // Documentation is a must for release

//! # MelodicFingerprint
//!
//! Identifies an unknown audio clip by comparing a compact melodic
//! fingerprint against fingerprints of known recordings.
//!
//! ## Overview
//!
//! A fingerprint is built in five stages:
//!
//! 1. The mono stream is cut into overlapping power-of-two windows and each
//!    window's power spectrum is computed.
//! 2. Each frame contributes its strongest frequency between 300 Hz and 5000 Hz.
//! 3. Peaks are rounded to 10 Hz below 2000 Hz and to 20 Hz above.
//! 4. Runs of equal values collapse to one value; values that last a single
//!    frame are dropped.
//! 5. The remaining notes become successive differences divided by 10.
//!
//! Matching slides the shorter fingerprint across the longer one, scores
//! every alignment with a length-independent metric and ranks all stored
//! songs by it.
//!
//! Decoding, audio capture, storage and rendering are left to the caller;
//! the crate consumes a [`SampleStream`] and [`SongRecord`]s and hands back a
//! [`Ranking`](matching::Ranking).
//!
//! ## Features
//!
//! - `parallel-processing`: match songs on the `rayon` thread pool
//!
//! ## Error Handling
//!
//! Configuration mistakes are the only errors the pipeline raises:
//!
//! ```rust
//! use melodic_fingerprint::{FingerprintError, Fingerprinter};
//! use melodic_fingerprint::operations::FingerprintConfig;
//!
//! let result = Fingerprinter::new(FingerprintConfig::with_window(100.0, 1.0));
//! match result {
//!     Err(FingerprintError::InvalidParameter(msg)) => eprintln!("bad config: {msg}"),
//!     Err(other) => eprintln!("other error: {other}"),
//!     Ok(_) => unreachable!(),
//! }
//! ```
//!
//! Empty inputs are not errors. They produce empty fingerprints, and an empty
//! fingerprint matches nothing.
//!
//! ## Quick Start
//!
//! ```rust
//! use melodic_fingerprint::{Fingerprint, SampleStream, SongLibrary, SongRecord};
//! use melodic_fingerprint::operations::{AudioFingerprinting, FingerprintConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FingerprintConfig::default();
//! let recording = SampleStream::from_vec(vec![0.0; 88200], 44100)?;
//!
//! let mut library = SongLibrary::new();
//! library.insert(SongRecord::new("song.mp3", Fingerprint::from(vec![4, -2, 7, 1])))?;
//!
//! let query = recording.fingerprint(&config)?;
//! if let Some(best) = library.identify(&query) {
//!     println!("{} ({:.1}%)", best.song.name, best.confidence);
//! }
//! # Ok(())
//! # }
//! ```

pub mod conversions;
pub mod error;
pub mod fingerprint;
pub mod library;
pub mod matching;
pub mod observer;
pub mod operations;
pub mod repr;

pub use error::{FingerprintError, FingerprintResult};
pub use fingerprint::{Fingerprint, Fingerprinter};
pub use library::{SongLibrary, SongRecord};
pub use matching::{MatchResult, MatchStrategy, MatcherConfig, RankedMatch, Ranking};
pub use observer::{NoopObserver, PipelineObserver, PipelineStage, TracingObserver};
pub use operations::{AudioFingerprinting, AudioSpectral, FingerprintConfig};
pub use repr::SampleStream;
