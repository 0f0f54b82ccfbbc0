//! Input validation and safe SQL construction.
//!
//! The FTS MATCH expression is embedded literally rather than bound, a
//! deliberate workaround for placeholder binding against the full-text
//! virtual table. Validation plus disciplined escaping is the security
//! boundary: every caller input is checked here, before any SQL string
//! exists, and the two escaping steps (FTS phrase quoting with `"` doubled,
//! SQL string literal with `'` doubled) are applied on the way in.

use crate::error::QueryError;
use regex::Regex;
use std::fmt::Write as _;
use std::sync::LazyLock;

/// Maximum accepted free-text query length, in characters.
pub const MAX_QUERY_CHARS: usize = 1000;

/// Earliest queryable conference year.
pub const MIN_YEAR: i32 = 2003;

/// Latest queryable conference year.
pub const MAX_YEAR: i32 = 2030;

/// Maximum result limit.
pub const MAX_LIMIT: usize = 1000;

/// Maximum result offset.
pub const MAX_OFFSET: usize = 100_000;

/// Default limit for free-text search.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Default limit for year listings.
pub const DEFAULT_YEAR_LIMIT: usize = 100;

/// Allowed session id shape. Deliberately permissive: `wwdc2024-10102` and
/// `tech-talks-111456` both pass; exact prefix enforcement belongs to the
/// data pipeline.
static SESSION_ID: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new("^[A-Za-z0-9_-]{1,100}$").unwrap()
});

/// Shared column projection for session rows.
const SESSION_PROJECTION: &str = "s.id, s.title, s.year, s.session_number, s.type, s.duration, \
     s.description, s.web_url, t.content, t.word_count";

/// A validated free-text search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    term: String,
    limit: usize,
    offset: usize,
}

impl SearchQuery {
    /// Validates a free-text search term with optional limit and offset.
    ///
    /// # Errors
    ///
    /// [`QueryError::Validation`] when the term is empty or whitespace-only,
    /// longer than 1000 characters, or contains control characters; when the
    /// limit is outside `1..=1000`; or when the offset exceeds `100000`.
    pub fn new(term: &str, limit: Option<usize>, offset: Option<usize>) -> Result<Self, QueryError> {
        if term.trim().is_empty() {
            return Err(invalid("query", "must not be empty"));
        }
        if term.chars().count() > MAX_QUERY_CHARS {
            return Err(invalid("query", "longer than 1000 characters"));
        }
        if term.chars().any(char::is_control) {
            return Err(invalid("query", "must not contain control characters"));
        }

        let limit = validate_limit(limit.unwrap_or(DEFAULT_SEARCH_LIMIT))?;
        let offset = offset.unwrap_or(0);
        if offset > MAX_OFFSET {
            return Err(invalid("offset", "must not exceed 100000"));
        }

        Ok(Self {
            term: term.to_string(),
            limit,
            offset,
        })
    }

    /// The original search term, verbatim.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Whitespace-separated term tokens, used for excerpt extraction.
    #[must_use]
    pub fn tokens(&self) -> Vec<&str> {
        self.term.split_whitespace().collect()
    }

    /// The validated result limit.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Builds the full-text search statement.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let match_expr = escape_sql_literal(&fts_expression(&self.term));
        let mut sql = String::new();
        let _ = write!(
            sql,
            "SELECT {SESSION_PROJECTION}, bm25(transcripts_fts) \
             FROM transcripts_fts \
             JOIN sessions s ON transcripts_fts.session_id = s.id \
             LEFT JOIN transcripts t ON s.id = t.session_id \
             WHERE transcripts_fts MATCH '{match_expr}' \
             ORDER BY bm25(transcripts_fts) \
             LIMIT {} OFFSET {}",
            self.limit, self.offset
        );
        sql
    }
}

/// A validated session id lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLookup {
    id: String,
}

impl SessionLookup {
    /// Validates a session id against the allowed character class.
    ///
    /// # Errors
    ///
    /// [`QueryError::Validation`] when the id contains characters outside
    /// `[A-Za-z0-9_-]` or is empty or longer than 100 characters.
    pub fn new(id: &str) -> Result<Self, QueryError> {
        if !SESSION_ID.is_match(id) {
            return Err(invalid(
                "session id",
                "must be 1-100 characters from [A-Za-z0-9_-]",
            ));
        }
        Ok(Self { id: id.to_string() })
    }

    /// The validated id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Builds the lookup statement.
    #[must_use]
    pub fn to_sql(&self) -> String {
        format!(
            "SELECT {SESSION_PROJECTION} \
             FROM sessions s \
             LEFT JOIN transcripts t ON s.id = t.session_id \
             WHERE s.id = '{}'",
            escape_sql_literal(&self.id)
        )
    }
}

/// A validated year listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearListing {
    year: i32,
    limit: usize,
}

impl YearListing {
    /// Validates a conference year with an optional limit.
    ///
    /// # Errors
    ///
    /// [`QueryError::Validation`] when the year is outside `2003..=2030` or
    /// the limit is outside `1..=1000`.
    pub fn new(year: i32, limit: Option<usize>) -> Result<Self, QueryError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(invalid("year", "must be between 2003 and 2030"));
        }
        let limit = validate_limit(limit.unwrap_or(DEFAULT_YEAR_LIMIT))?;
        Ok(Self { year, limit })
    }

    /// The validated year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Builds the listing statement, ordered by numeric session number.
    #[must_use]
    pub fn to_sql(&self) -> String {
        format!(
            "SELECT {SESSION_PROJECTION} \
             FROM sessions s \
             LEFT JOIN transcripts t ON s.id = t.session_id \
             WHERE s.year = {} \
             ORDER BY CAST(s.session_number AS INTEGER), s.session_number \
             LIMIT {}",
            self.year, self.limit
        )
    }
}

/// The fixed aggregate statements behind the statistics snapshot.
pub mod stats_sql {
    /// Total session count.
    pub const TOTAL_SESSIONS: &str = "SELECT COUNT(*) FROM sessions";
    /// Sessions that have a transcript row.
    pub const WITH_TRANSCRIPTS: &str = "SELECT COUNT(DISTINCT session_id) FROM transcripts";
    /// Sum of transcript word counts.
    pub const TOTAL_WORDS: &str = "SELECT COALESCE(SUM(word_count), 0) FROM transcripts";
    /// Mean duration over sessions that carry one.
    pub const AVG_DURATION: &str = "SELECT AVG(duration) FROM sessions WHERE duration IS NOT NULL";
    /// Covered year range.
    pub const YEAR_RANGE: &str = "SELECT MIN(year), MAX(year) FROM sessions";
    /// Number of distinct session types.
    pub const DISTINCT_TYPES: &str =
        "SELECT COUNT(DISTINCT type) FROM sessions WHERE type IS NOT NULL";
}

fn validate_limit(limit: usize) -> Result<usize, QueryError> {
    if (1..=MAX_LIMIT).contains(&limit) {
        Ok(limit)
    } else {
        Err(invalid("limit", "must be between 1 and 1000"))
    }
}

fn invalid(field: &'static str, reason: &str) -> QueryError {
    QueryError::Validation {
        field,
        reason: reason.to_string(),
    }
}

/// Builds the FTS5 expression for a free-text term.
///
/// Each whitespace-separated token becomes a quoted phrase with embedded `"`
/// doubled, and tokens are OR-joined so multi-word queries stay forgiving.
/// Quoting also neutralizes FTS5 operator characters (`*`, `^`, `-`, `:`).
fn fts_expression(term: &str) -> String {
    term.split_whitespace()
        .map(|token| format!("\"{}\"", token.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Doubles single quotes so a value can sit inside a SQL string literal.
fn escape_sql_literal(value: &str) -> String {
    value.replace('\'', "''")
}
