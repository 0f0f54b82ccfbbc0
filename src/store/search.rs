//! Statement execution and row mapping.
//!
//! Rows map to [`Session`] values with nullable columns normalized to
//! `None`; nothing is defaulted silently. Row order is preserved exactly as
//! `SQLite` returns it.

// SQLite stores all integers as i64. These casts are intentional and safe
// because the aggregate queries only produce non-negative counts.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use crate::error::StoreError;
use crate::model::{CorpusStats, SearchResult, Session};
use crate::store::query::{SearchQuery, SessionLookup, YearListing, stats_sql};
use regex::RegexBuilder;
use rusqlite::{Connection, Row};

/// Characters of context kept on each side of a matched term.
const EXCERPT_CONTEXT: usize = 80;

/// Maximum excerpts attached to one search result.
const MAX_EXCERPTS: usize = 3;

pub(crate) fn run_search(
    conn: &Connection,
    query: &SearchQuery,
) -> Result<Vec<SearchResult>, StoreError> {
    let sql = query.to_sql();
    tracing::debug!(term = query.term(), "executing search");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| Ok((map_session(row)?, row.get::<_, f64>(10)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let tokens = query.tokens();
    let results = rows
        .into_iter()
        .map(|(session, relevance_score)| {
            let matching_text = session
                .transcript
                .as_deref()
                .map(|content| extract_excerpts(content, &tokens, MAX_EXCERPTS))
                .unwrap_or_default();
            SearchResult {
                session,
                relevance_score,
                matching_text,
            }
        })
        .collect();

    Ok(results)
}

pub(crate) fn run_lookup(
    conn: &Connection,
    lookup: &SessionLookup,
) -> Result<Option<Session>, StoreError> {
    use rusqlite::OptionalExtension;

    let sql = lookup.to_sql();
    let session = conn
        .query_row(&sql, [], |row| map_session(row))
        .optional()?;
    Ok(session)
}

pub(crate) fn run_year_listing(
    conn: &Connection,
    listing: YearListing,
) -> Result<Vec<Session>, StoreError> {
    let sql = listing.to_sql();
    let mut stmt = conn.prepare(&sql)?;
    let sessions = stmt
        .query_map([], |row| map_session(row))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(sessions)
}

pub(crate) fn run_statistics(conn: &Connection) -> Result<CorpusStats, StoreError> {
    let total_sessions: i64 = conn.query_row(stats_sql::TOTAL_SESSIONS, [], |r| r.get(0))?;
    let with_transcripts: i64 = conn.query_row(stats_sql::WITH_TRANSCRIPTS, [], |r| r.get(0))?;
    let total_words: i64 = conn.query_row(stats_sql::TOTAL_WORDS, [], |r| r.get(0))?;
    let average_duration_seconds: Option<f64> =
        conn.query_row(stats_sql::AVG_DURATION, [], |r| r.get(0))?;
    let (min_year, max_year): (Option<i32>, Option<i32>) =
        conn.query_row(stats_sql::YEAR_RANGE, [], |r| Ok((r.get(0)?, r.get(1)?)))?;
    let distinct_types: i64 = conn.query_row(stats_sql::DISTINCT_TYPES, [], |r| r.get(0))?;

    Ok(CorpusStats {
        total_sessions: total_sessions as u64,
        sessions_with_transcripts: with_transcripts as u64,
        total_word_count: total_words as u64,
        average_duration_seconds,
        min_year,
        max_year,
        distinct_session_types: distinct_types as u64,
    })
}

/// Maps one projected row to a session value.
///
/// Column order is fixed by the shared projection in the query builder.
fn map_session(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        title: row.get(1)?,
        year: row.get(2)?,
        session_number: row.get(3)?,
        session_type: row.get(4)?,
        duration_seconds: row.get(5)?,
        description: row.get(6)?,
        web_url: row.get(7)?,
        transcript: row.get(8)?,
        word_count: row.get(9)?,
    })
}

/// Extracts up to `max` transcript excerpts around query-term matches.
///
/// Matching is case-insensitive over the literal tokens; windows are snapped
/// to character boundaries and overlapping windows are merged into the
/// earlier one. Output order follows transcript position, so extraction is
/// deterministic.
pub(crate) fn extract_excerpts(content: &str, tokens: &[&str], max: usize) -> Vec<String> {
    if content.is_empty() || tokens.is_empty() || max == 0 {
        return Vec::new();
    }

    let pattern = tokens
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    let Ok(matcher) = RegexBuilder::new(&pattern).case_insensitive(true).build() else {
        return Vec::new();
    };

    let mut excerpts = Vec::new();
    let mut covered_until = 0usize;
    for found in matcher.find_iter(content) {
        if excerpts.len() >= max {
            break;
        }
        if found.start() < covered_until {
            continue;
        }

        let (start, end) = context_window(content, found.start(), found.end());
        let mut excerpt = String::new();
        if start > 0 {
            excerpt.push_str("...");
        }
        excerpt.push_str(content[start..end].trim());
        if end < content.len() {
            excerpt.push_str("...");
        }
        excerpts.push(excerpt);
        covered_until = end;
    }

    excerpts
}

/// Expands a match to [`EXCERPT_CONTEXT`] characters on each side, snapped
/// to character boundaries.
fn context_window(content: &str, match_start: usize, match_end: usize) -> (usize, usize) {
    let start = content[..match_start]
        .char_indices()
        .rev()
        .nth(EXCERPT_CONTEXT - 1)
        .map_or(0, |(i, _)| i);
    let end = content[match_end..]
        .char_indices()
        .nth(EXCERPT_CONTEXT)
        .map_or(content.len(), |(i, _)| match_end + i);
    (start, end)
}
