//! JSON rendering: a stable, additive document shape.
//!
//! Every document carries `query`, `mode`, `resultCount`, `generatedAt`, a
//! `source` block (the attribution), and `results`. Fields a lighter mode
//! does not populate are omitted entirely, never `null`, so the schema is
//! additive across modes.

use crate::error::RenderError;
use crate::model::{CorpusStats, SearchResult, Session};
use crate::render::format::{extract_topics, paragraphs, relevance_percent, snippet, truncate_graphemes};
use crate::render::{APPLE_DEVELOPER_URL, RenderMode, SOURCE_NAME};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Description cap for user mode.
const USER_SNIPPET_CHARS: usize = 200;

/// Description cap for compact-agent mode.
const COMPACT_AGENT_SUMMARY_CHARS: usize = 300;

/// Topic cap for compact-agent mode.
const COMPACT_AGENT_TOPICS: usize = 3;

/// Transcript paragraph cap for compact-agent mode.
const COMPACT_AGENT_PARAGRAPHS: usize = 2;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResultsDocument<'a> {
    query: &'a str,
    mode: &'a str,
    result_count: usize,
    generated_at: String,
    source: Source,
    results: Vec<SessionView>,
}

#[derive(Serialize)]
struct Source {
    name: &'static str,
    url: &'static str,
}

impl Source {
    const fn archive() -> Self {
        Self {
            name: SOURCE_NAME,
            url: APPLE_DEVELOPER_URL,
        }
    }
}

/// Session-shaped result object. Population varies by mode; the id, title,
/// year, and session number quartet is always present.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView {
    id: String,
    title: String,
    year: i32,
    session_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    topics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    web_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    relevance_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    relevance_percent: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    word_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    matching_excerpts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transcript_paragraphs: Option<Vec<String>>,
}

impl SessionView {
    fn base(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            title: session.title.clone(),
            year: session.year,
            session_number: session.session_number.clone(),
            session_type: None,
            duration_seconds: None,
            topics: None,
            description: None,
            summary: None,
            web_url: None,
            relevance_score: None,
            relevance_percent: None,
            word_count: None,
            matching_excerpts: None,
            transcript: None,
            transcript_paragraphs: None,
        }
    }
}

/// Renders a result list document.
pub(crate) fn results_list(
    query: &str,
    results: &[SearchResult],
    mode: RenderMode,
) -> Result<String, RenderError> {
    let views = results
        .iter()
        .map(|r| {
            view(
                &r.session,
                Some(r.relevance_score),
                &r.matching_text,
                mode,
            )
        })
        .collect();
    document(query, mode, views)
}

/// Renders a year-listing document.
pub(crate) fn year_listing(
    year: i32,
    sessions: &[Session],
    mode: RenderMode,
) -> Result<String, RenderError> {
    let views = sessions.iter().map(|s| view(s, None, &[], mode)).collect();
    document(&format!("year:{year}"), mode, views)
}

/// Renders a single-session document; the session id stands as the query.
pub(crate) fn single_session(session: &Session, mode: RenderMode) -> Result<String, RenderError> {
    let views = vec![view(session, None, &[], mode)];
    document(&session.id, mode, views)
}

/// Renders the statistics snapshot document.
pub(crate) fn stats(stats: &CorpusStats) -> Result<String, RenderError> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct StatsDocument {
        mode: &'static str,
        generated_at: String,
        source: Source,
        statistics: StatsView,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct StatsView {
        total_sessions: u64,
        sessions_with_transcripts: u64,
        total_word_count: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        average_duration_seconds: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        min_year: Option<i32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_year: Option<i32>,
        distinct_session_types: u64,
    }

    let doc = StatsDocument {
        mode: "stats",
        generated_at: timestamp(),
        source: Source::archive(),
        statistics: StatsView {
            total_sessions: stats.total_sessions,
            sessions_with_transcripts: stats.sessions_with_transcripts,
            total_word_count: stats.total_word_count,
            average_duration_seconds: stats.average_duration_seconds,
            min_year: stats.min_year,
            max_year: stats.max_year,
            distinct_session_types: stats.distinct_session_types,
        },
    };
    serde_json::to_string_pretty(&doc).map_err(RenderError::from)
}

fn document(query: &str, mode: RenderMode, results: Vec<SessionView>) -> Result<String, RenderError> {
    let doc = ResultsDocument {
        query,
        mode: mode.label(),
        result_count: results.len(),
        generated_at: timestamp(),
        source: Source::archive(),
        results,
    };
    serde_json::to_string_pretty(&doc).map_err(RenderError::from)
}

/// Builds the per-mode view. Dispatches to one small constructor per mode.
fn view(session: &Session, score: Option<f64>, excerpts: &[String], mode: RenderMode) -> SessionView {
    match mode {
        RenderMode::Compact => compact_view(session),
        RenderMode::User => user_view(session),
        RenderMode::Agent => agent_view(session, score, excerpts),
        RenderMode::CompactAgent => compact_agent_view(session, score),
    }
}

fn compact_view(session: &Session) -> SessionView {
    let mut v = SessionView::base(session);
    v.duration_seconds = session.duration_seconds;
    v.topics = Some(extract_topics(session));
    v
}

fn user_view(session: &Session) -> SessionView {
    let mut v = compact_view(session);
    v.description = snippet(session, USER_SNIPPET_CHARS);
    v.web_url = Some(
        session
            .web_url
            .clone()
            .unwrap_or_else(|| APPLE_DEVELOPER_URL.to_string()),
    );
    v
}

fn agent_view(session: &Session, score: Option<f64>, excerpts: &[String]) -> SessionView {
    let mut v = SessionView::base(session);
    v.session_type = session.session_type.clone();
    v.duration_seconds = session.duration_seconds;
    v.description = session.description.clone();
    v.web_url = session.web_url.clone();
    v.relevance_score = score;
    v.word_count = session.word_count;
    if !excerpts.is_empty() {
        v.matching_excerpts = Some(excerpts.to_vec());
    }
    v.transcript = session.transcript.clone();
    v
}

fn compact_agent_view(session: &Session, score: Option<f64>) -> SessionView {
    let mut v = SessionView::base(session);
    v.relevance_percent = score.map(relevance_percent);
    v.summary = session
        .description
        .as_deref()
        .map(|d| truncate_graphemes(d, COMPACT_AGENT_SUMMARY_CHARS));
    let topics: Vec<String> = extract_topics(session)
        .into_iter()
        .take(COMPACT_AGENT_TOPICS)
        .collect();
    if !topics.is_empty() {
        v.topics = Some(topics);
    }
    v.transcript_paragraphs = session.transcript.as_deref().map(|t| {
        paragraphs(t)
            .into_iter()
            .take(COMPACT_AGENT_PARAGRAPHS)
            .map(str::to_string)
            .collect()
    });
    v.web_url = Some(
        session
            .web_url
            .clone()
            .unwrap_or_else(|| APPLE_DEVELOPER_URL.to_string()),
    );
    v
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
