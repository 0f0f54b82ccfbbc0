//! Output rendering across the (mode x format) matrix.
//!
//! The mode axis controls information density (compact, user, agent,
//! compact-agent); the format axis controls syntax (Markdown, JSON). Each of
//! the eight cells is a small pure function in [`markdown`] or [`json`].
//! Every non-empty rendering carries attribution to the source archive; the
//! facade re-verifies this before returning output.

pub mod format;
mod json;
mod markdown;

use crate::error::RenderError;
use crate::model::{CorpusStats, SearchResult, Session};
use chrono::Datelike;

/// Name of the corpus, stated in every attribution trailer.
pub const SOURCE_NAME: &str = "WWDC Sessions Archive";

/// Fallback link target; also the attribution URL.
pub const APPLE_DEVELOPER_URL: &str = "https://developer.apple.com/videos/";

/// Information-density axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// One line per session.
    Compact,
    /// Human-facing summary with a link.
    User,
    /// Full fidelity including the entire transcript.
    Agent,
    /// Dense digest for agents. Experimental.
    CompactAgent,
}

impl RenderMode {
    /// Parses a mode name. Accepts the CLI verbosity aliases `detailed` and
    /// `full`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "user" | "detailed" => Some(Self::User),
            "agent" | "full" => Some(Self::Agent),
            "compact-agent" | "compactagent" => Some(Self::CompactAgent),
            _ => None,
        }
    }

    /// Stable label used in JSON documents.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::User => "user",
            Self::Agent => "agent",
            Self::CompactAgent => "compact-agent",
        }
    }
}

/// Syntactic axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    /// Human-readable Markdown.
    #[default]
    Markdown,
    /// Machine-readable JSON with a stable shape.
    Json,
}

impl RenderFormat {
    /// Parses a format name, defaulting unknown values to Markdown.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Markdown,
        }
    }
}

/// Renders a search result list.
///
/// # Errors
///
/// [`RenderError::Json`] when JSON encoding fails.
pub fn render_results(
    query: &str,
    results: &[SearchResult],
    mode: RenderMode,
    format: RenderFormat,
) -> Result<String, RenderError> {
    render_results_at(query, results, mode, format, chrono::Utc::now().year())
}

/// Result-list rendering with an injected current year, for deterministic
/// recency grouping in tests.
pub(crate) fn render_results_at(
    query: &str,
    results: &[SearchResult],
    mode: RenderMode,
    format: RenderFormat,
    current_year: i32,
) -> Result<String, RenderError> {
    match format {
        RenderFormat::Markdown => Ok(markdown::results_list(query, results, mode, current_year)),
        RenderFormat::Json => json::results_list(query, results, mode),
    }
}

/// Renders a year listing in pipeline order, without relevance scores.
///
/// # Errors
///
/// [`RenderError::Json`] when JSON encoding fails.
pub fn render_year(
    year: i32,
    sessions: &[Session],
    mode: RenderMode,
    format: RenderFormat,
) -> Result<String, RenderError> {
    match format {
        RenderFormat::Markdown => Ok(markdown::year_listing(year, sessions, mode)),
        RenderFormat::Json => json::year_listing(year, sessions, mode),
    }
}

/// Renders one session.
///
/// # Errors
///
/// [`RenderError::Json`] when JSON encoding fails.
pub fn render_session(
    session: &Session,
    mode: RenderMode,
    format: RenderFormat,
) -> Result<String, RenderError> {
    match format {
        RenderFormat::Markdown => Ok(markdown::single_session(session, mode)),
        RenderFormat::Json => json::single_session(session, mode),
    }
}

/// Renders the statistics snapshot.
///
/// # Errors
///
/// [`RenderError::Json`] when JSON encoding fails.
pub fn render_stats(stats: &CorpusStats, format: RenderFormat) -> Result<String, RenderError> {
    match format {
        RenderFormat::Markdown => Ok(markdown::stats(stats)),
        RenderFormat::Json => json::stats(stats),
    }
}

/// True when the output carries the mandatory attribution link.
#[must_use]
pub fn has_attribution(output: &str) -> bool {
    output.contains("developer.apple.com")
}
