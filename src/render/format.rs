//! Rendering helpers: topic extraction, duration and snippet formatting.
//!
//! Topic extraction is a rule-based table mapping patterns over title and
//! description to canonical tag strings. It is deterministic and
//! order-stable: rules are evaluated in table order.

use crate::model::Session;
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

/// Pattern table, evaluated in order. Extend by appending rows.
static TOPIC_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    const RULES: &[(&str, &str)] = &[
        (r"swiftui", "SwiftUI"),
        (r"combine", "Combine"),
        (r"realitykit", "RealityKit"),
        (r"arkit", "ARKit"),
        (r"shareplay", "SharePlay"),
        (r"core\s+data", "Core Data"),
        (r"swiftdata", "SwiftData"),
        (r"concurrency|async[ /]?await", "Concurrency"),
        (r"visionos", "visionOS"),
        (r"core\s+ml|machine\s+learning", "Machine Learning"),
        (r"metal", "Metal"),
        (r"widget", "Widgets"),
        (r"xcode", "Xcode"),
        (r"accessibility", "Accessibility"),
        (r"privacy", "Privacy"),
    ];
    RULES
        .iter()
        .map(|(pattern, tag)| {
            #[allow(clippy::unwrap_used)]
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .unwrap();
            (regex, *tag)
        })
        .collect()
});

/// Extracts canonical topic tags from a session's title and description.
///
/// Falls back to the first two title words of at least four characters,
/// lowercased, when no rule matches.
#[must_use]
pub fn extract_topics(session: &Session) -> Vec<String> {
    let haystack = match &session.description {
        Some(description) => format!("{} {description}", session.title),
        None => session.title.clone(),
    };

    let tags: Vec<String> = TOPIC_RULES
        .iter()
        .filter(|(regex, _)| regex.is_match(&haystack))
        .map(|(_, tag)| (*tag).to_string())
        .collect();

    if !tags.is_empty() {
        return tags;
    }

    session
        .title
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| word.chars().count() >= 4)
        .take(2)
        .map(str::to_lowercase)
        .collect()
}

/// Formats a duration as `H:MM:SS` above one hour, `M:SS` below, or
/// `duration unknown` when absent.
#[must_use]
pub fn format_duration(seconds: Option<u32>) -> String {
    match seconds {
        None => "duration unknown".to_string(),
        Some(total) => {
            let hours = total / 3600;
            let minutes = (total % 3600) / 60;
            let secs = total % 60;
            if hours > 0 {
                format!("{hours}:{minutes:02}:{secs:02}")
            } else {
                format!("{minutes}:{secs:02}")
            }
        }
    }
}

/// Truncates to `max` grapheme clusters, appending `...` when shortened.
#[must_use]
pub fn truncate_graphemes(text: &str, max: usize) -> String {
    let mut clusters = text.grapheme_indices(true);
    match clusters.nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
    }
}

/// Returns the first `n` sentences, recognizing `.`, `!`, and `?` as
/// terminators.
#[must_use]
pub fn first_sentences(text: &str, n: usize) -> String {
    text.split_inclusive(['.', '!', '?'])
        .take(n)
        .collect::<String>()
        .trim()
        .to_string()
}

/// A short display snippet: the description when present, otherwise the
/// opening sentences of the transcript. Capped at `max` graphemes.
#[must_use]
pub fn snippet(session: &Session, max: usize) -> Option<String> {
    if let Some(description) = &session.description {
        return Some(truncate_graphemes(description, max));
    }
    session
        .transcript
        .as_deref()
        .map(|transcript| truncate_graphemes(&first_sentences(transcript, 2), max))
}

/// Splits a transcript into paragraphs on blank lines. A transcript without
/// blank lines is one paragraph.
#[must_use]
pub fn paragraphs(text: &str) -> Vec<&str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Maps a BM25 score (lower = better) onto a 0-100 display percentage.
#[must_use]
pub fn relevance_percent(score: f64) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = (100.0 / (1.0 + score.abs())).round() as u8;
    percent.min(100)
}
