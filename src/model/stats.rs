//! Aggregate statistics over the session corpus.

use serde::{Deserialize, Serialize};

/// A snapshot of corpus-wide aggregate counts.
///
/// Derived from aggregate queries at request time; never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    /// Total number of sessions in the corpus.
    pub total_sessions: u64,

    /// Sessions that have a transcript row.
    pub sessions_with_transcripts: u64,

    /// Sum of transcript word counts.
    pub total_word_count: u64,

    /// Mean session duration in seconds, if any session carries one.
    pub average_duration_seconds: Option<f64>,

    /// Earliest session year present.
    pub min_year: Option<i32>,

    /// Latest session year present.
    pub max_year: Option<i32>,

    /// Number of distinct session types.
    pub distinct_session_types: u64,
}

impl CorpusStats {
    /// Returns the covered year range as an inclusive pair, if known.
    #[must_use]
    pub const fn year_range(&self) -> Option<(i32, i32)> {
        match (self.min_year, self.max_year) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        }
    }
}
