//! Session and search result value types.
//!
//! A [`Session`] is one WWDC talk: a row in `sessions` plus, when available,
//! its transcript row. A [`SearchResult`] pairs a session with its BM25
//! relevance score and the excerpts that matched.

use serde::{Deserialize, Serialize};

/// One WWDC session.
///
/// Nullable columns map to `None`; absent values are never substituted with
/// defaults.
///
/// # Examples
///
/// ```
/// use sosumi_rs::model::Session;
///
/// let session = Session::new("wwdc2024-10102", "Whats new in SwiftUI", 2024, "10102");
/// assert_eq!(session.canonical_id(), "wwdc2024-10102");
/// assert!(!session.has_transcript());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Canonical identifier, e.g. `wwdc2024-10102`.
    pub id: String,

    /// Session title.
    pub title: String,

    /// Conference year.
    pub year: i32,

    /// Session number as stored (sorted numerically when listing).
    pub session_number: String,

    /// Optional session classifier (e.g. "Session", "Lab").
    pub session_type: Option<String>,

    /// Duration in seconds, when known.
    pub duration_seconds: Option<u32>,

    /// Short description, when available.
    pub description: Option<String>,

    /// Link into developer.apple.com, when available.
    pub web_url: Option<String>,

    /// Full transcript text, when available.
    pub transcript: Option<String>,

    /// Transcript word count, when available.
    pub word_count: Option<u32>,
}

impl Session {
    /// Creates a session with only the mandatory columns populated.
    #[must_use]
    pub fn new(id: &str, title: &str, year: i32, session_number: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            year,
            session_number: session_number.to_string(),
            session_type: None,
            duration_seconds: None,
            description: None,
            web_url: None,
            transcript: None,
            word_count: None,
        }
    }

    /// Returns the canonical display id formed from year and session number.
    ///
    /// This matches the stored `id` for `wwdc`-prefixed sessions and is the
    /// form shown in compact listings.
    #[must_use]
    pub fn canonical_id(&self) -> String {
        format!("wwdc{}-{}", self.year, self.session_number)
    }

    /// Returns true if a non-empty transcript is present.
    #[must_use]
    pub fn has_transcript(&self) -> bool {
        self.transcript.as_ref().is_some_and(|t| !t.is_empty())
    }
}

/// A session paired with its BM25 relevance.
///
/// The score is carried verbatim from `bm25(transcripts_fts)`; smaller values
/// denote more relevant hits. Row order is preserved as returned by `SQLite`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The matched session.
    pub session: Session,

    /// BM25 relevance score (lower = better).
    pub relevance_score: f64,

    /// Transcript excerpts around query-term matches, in transcript order.
    pub matching_text: Vec<String>,
}

impl SearchResult {
    /// Pairs a session with its relevance score.
    #[must_use]
    pub const fn new(session: Session, relevance_score: f64) -> Self {
        Self {
            session,
            relevance_score,
            matching_text: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_id() {
        let session = Session::new("wwdc2023-110", "Meet Swift Macros", 2023, "110");
        assert_eq!(session.canonical_id(), "wwdc2023-110");
    }

    #[test]
    fn test_canonical_id_for_alternative_prefix() {
        // tech-talks ids keep their stored id, but the canonical display id
        // is always derived from year + number.
        let session = Session::new("tech-talks-111456", "Explore ProRes", 2022, "111456");
        assert_eq!(session.id, "tech-talks-111456");
        assert_eq!(session.canonical_id(), "wwdc2022-111456");
    }

    #[test]
    fn test_has_transcript() {
        let mut session = Session::new("wwdc2024-10102", "SwiftUI", 2024, "10102");
        assert!(!session.has_transcript());

        session.transcript = Some(String::new());
        assert!(!session.has_transcript());

        session.transcript = Some("Welcome to WWDC.".to_string());
        assert!(session.has_transcript());
    }

    #[test]
    fn test_search_result_carries_score_verbatim() {
        let session = Session::new("wwdc2024-10102", "SwiftUI", 2024, "10102");
        let result = SearchResult::new(session, -4.25);
        assert!((result.relevance_score - -4.25).abs() < f64::EPSILON);
        assert!(result.matching_text.is_empty());
    }
}
