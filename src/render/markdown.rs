//! Markdown rendering: one small entry function per mode.

use crate::model::{CorpusStats, SearchResult, Session};
use crate::render::format::{
    extract_topics, first_sentences, format_duration, paragraphs, relevance_percent, snippet,
    truncate_graphemes,
};
use crate::render::{APPLE_DEVELOPER_URL, RenderMode, SOURCE_NAME};
use std::fmt::Write as _;

/// Description cap for user mode.
const USER_SNIPPET_CHARS: usize = 200;

/// Description cap for compact-agent mode.
const COMPACT_AGENT_SUMMARY_CHARS: usize = 300;

/// Topic cap for compact-agent mode.
const COMPACT_AGENT_TOPICS: usize = 3;

/// Transcript paragraph cap for compact-agent mode.
const COMPACT_AGENT_PARAGRAPHS: usize = 2;

/// Renders a result list grouped by recency.
pub(crate) fn results_list(
    query: &str,
    results: &[SearchResult],
    mode: RenderMode,
    current_year: i32,
) -> String {
    if results.is_empty() {
        return no_results(query);
    }

    let (recent, earlier): (Vec<&SearchResult>, Vec<&SearchResult>) = results
        .iter()
        .partition(|r| r.session.year >= current_year - 1);

    let mut out = String::new();
    for (header, group) in [("Recent Sessions", recent), ("Earlier Sessions", earlier)] {
        if group.is_empty() {
            continue;
        }
        let _ = writeln!(out, "## {header}");
        out.push('\n');
        for (i, result) in group.iter().enumerate() {
            out.push_str(&entry(
                Some(i + 1),
                &result.session,
                Some(result.relevance_score),
                &result.matching_text,
                mode,
            ));
            out.push('\n');
        }
    }

    out.push_str(&trailer(
        &format!("Query: \"{query}\""),
        Some(results.len()),
    ));
    out
}

/// Renders a year listing: no scores, no recency grouping, pipeline order.
pub(crate) fn year_listing(year: i32, sessions: &[Session], mode: RenderMode) -> String {
    if sessions.is_empty() {
        return format!(
            "No sessions found for {year}.\n\nTry a different year or search by keyword.\n"
        );
    }

    let mut out = format!("## Sessions from {year}\n\n");
    for (i, session) in sessions.iter().enumerate() {
        out.push_str(&entry(Some(i + 1), session, None, &[], mode));
        out.push('\n');
    }
    out.push_str(&trailer(&format!("Year: {year}"), Some(sessions.len())));
    out
}

/// Renders one session outside a result list.
pub(crate) fn single_session(session: &Session, mode: RenderMode) -> String {
    let mut out = entry(None, session, None, &[], mode);
    out.push('\n');
    out.push_str(&trailer(&format!("Session: {}", session.id), None));
    out
}

/// Renders the statistics snapshot.
pub(crate) fn stats(stats: &CorpusStats) -> String {
    let mut out = String::from("# WWDC Sessions Archive Statistics\n\n");
    let _ = writeln!(out, "- Total sessions: {}", stats.total_sessions);
    let _ = writeln!(
        out,
        "- Sessions with transcripts: {}",
        stats.sessions_with_transcripts
    );
    let _ = writeln!(out, "- Total word count: {}", stats.total_word_count);
    if let Some(avg) = stats.average_duration_seconds {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let avg_secs = avg.round() as u32;
        let _ = writeln!(out, "- Average duration: {}", format_duration(Some(avg_secs)));
    }
    if let Some((min, max)) = stats.year_range() {
        let _ = writeln!(out, "- Years covered: {min}-{max}");
    }
    let _ = writeln!(out, "- Session types: {}", stats.distinct_session_types);
    out.push('\n');
    out.push_str(&trailer("Statistics", None));
    out
}

/// The empty-result message. No attribution trailer: nothing was retrieved.
fn no_results(query: &str) -> String {
    format!("No results found for \"{query}\"\n\nTry different keywords or browse sessions by year.\n")
}

/// Dispatches to the per-mode entry renderer.
fn entry(
    ordinal: Option<usize>,
    session: &Session,
    score: Option<f64>,
    excerpts: &[String],
    mode: RenderMode,
) -> String {
    match mode {
        RenderMode::Compact => compact_entry(ordinal, session),
        RenderMode::User => user_entry(ordinal, session),
        RenderMode::Agent => agent_entry(ordinal, session, score, excerpts),
        RenderMode::CompactAgent => compact_agent_entry(ordinal, session, score),
    }
}

/// One line: index, bold title, canonical id, duration, topic tags.
fn compact_entry(ordinal: Option<usize>, session: &Session) -> String {
    let mut line = ordinal.map_or_else(|| "- ".to_string(), |i| format!("{i}. "));
    let _ = write!(
        line,
        "**{}** ({}) | {}",
        session.title,
        session.canonical_id(),
        format_duration(session.duration_seconds)
    );
    let topics = extract_topics(session);
    if !topics.is_empty() {
        let _ = write!(line, " | {}", topics.join(" \u{2022} "));
    }
    line.push('\n');
    line
}

/// Title with year and duration, a short snippet, and a labeled link.
fn user_entry(ordinal: Option<usize>, session: &Session) -> String {
    let mut out = match ordinal {
        Some(i) => format!("### {i}. {} ({})\n\n", session.title, session.year),
        None => format!("### {} ({})\n\n", session.title, session.year),
    };
    let _ = writeln!(out, "Duration: {}", format_duration(session.duration_seconds));
    out.push('\n');
    if let Some(text) = snippet(session, USER_SNIPPET_CHARS) {
        let _ = writeln!(out, "{text}");
        out.push('\n');
    }
    let url = session.web_url.as_deref().unwrap_or(APPLE_DEVELOPER_URL);
    let _ = writeln!(out, "[Watch on Apple Developer]({url})");
    out
}

/// Full metadata, matching excerpts, and the entire transcript.
fn agent_entry(
    ordinal: Option<usize>,
    session: &Session,
    score: Option<f64>,
    excerpts: &[String],
) -> String {
    let mut out = match ordinal {
        Some(i) => format!("## {i}. {}\n\n", session.title),
        None => format!("## {}\n\n", session.title),
    };

    let _ = writeln!(out, "- Session: {} ({})", session.canonical_id(), session.year);
    if let Some(kind) = &session.session_type {
        let _ = writeln!(out, "- Type: {kind}");
    }
    let _ = writeln!(out, "- Duration: {}", format_duration(session.duration_seconds));
    if let Some(score) = score {
        let _ = writeln!(out, "- Relevance score: {score:.4}");
    }
    if let Some(words) = session.word_count {
        let _ = writeln!(out, "- Word count: {words}");
    }
    if let Some(url) = &session.web_url {
        let _ = writeln!(out, "- Link: {url}");
    }

    if !excerpts.is_empty() {
        out.push_str("\n**Matching excerpts:**\n\n");
        for excerpt in excerpts {
            let _ = writeln!(out, "- {excerpt}");
        }
    }

    if let Some(transcript) = session.transcript.as_deref().filter(|t| !t.is_empty()) {
        out.push_str("\n### Transcript\n\n");
        for paragraph in paragraphs(transcript) {
            let _ = writeln!(out, "{paragraph}");
            out.push('\n');
        }
    }

    out
}

/// Relevance percentage, capped summary, up to three topics, and up to two
/// transcript paragraphs as block quotes. Experimental mode.
fn compact_agent_entry(ordinal: Option<usize>, session: &Session, score: Option<f64>) -> String {
    let mut out = ordinal.map_or_else(|| "- ".to_string(), |i| format!("{i}. "));
    let _ = write!(out, "**{}** ({})", session.title, session.canonical_id());
    if let Some(score) = score {
        let _ = write!(out, " | relevance {}%", relevance_percent(score));
    }
    out.push('\n');

    if let Some(description) = &session.description {
        out.push('\n');
        let _ = writeln!(
            out,
            "{}",
            truncate_graphemes(description, COMPACT_AGENT_SUMMARY_CHARS)
        );
    }

    let topics = extract_topics(session);
    if !topics.is_empty() {
        out.push('\n');
        let shown: Vec<String> = topics.into_iter().take(COMPACT_AGENT_TOPICS).collect();
        let _ = writeln!(out, "Topics: {}", shown.join(" \u{2022} "));
    }

    if let Some(transcript) = session.transcript.as_deref().filter(|t| !t.is_empty()) {
        let opening = first_sentences(transcript, 6);
        for paragraph in paragraphs(&opening).into_iter().take(COMPACT_AGENT_PARAGRAPHS) {
            out.push('\n');
            let _ = writeln!(out, "> {paragraph}");
        }
    }

    out.push('\n');
    let url = session.web_url.as_deref().unwrap_or(APPLE_DEVELOPER_URL);
    let _ = writeln!(out, "[Watch on Apple Developer]({url})");
    out
}

/// Mandatory provenance trailer.
fn trailer(context: &str, total: Option<usize>) -> String {
    let mut out = String::from("---\n");
    match total {
        Some(n) => {
            let _ = writeln!(out, "{context} | Total results: {n}");
        }
        None => {
            let _ = writeln!(out, "{context}");
        }
    }
    let _ = writeln!(out, "Source: {SOURCE_NAME} ({APPLE_DEVELOPER_URL})");
    out
}
