//! Shared fixtures for integration tests.
//!
//! Builds plain fixture databases matching the pipeline schema, and wraps
//! them into encrypted bundles the same way the pipeline does.

#![allow(clippy::expect_used)]
#![allow(clippy::cast_possible_wrap)]
#![allow(dead_code)]

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Datelike;
use rusqlite::{Connection, params};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Key used to seal test bundles.
pub const TEST_KEY: [u8; 32] = [0x5a; 32];

/// One session row plus its optional transcript.
pub struct FixtureSession {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub number: String,
    pub session_type: Option<String>,
    pub duration: Option<i64>,
    pub description: Option<String>,
    pub transcript: Option<String>,
}

impl FixtureSession {
    pub fn new(year: i32, number: &str, title: &str, transcript: Option<&str>) -> Self {
        Self {
            id: format!("wwdc{year}-{number}"),
            title: title.to_string(),
            year,
            number: number.to_string(),
            session_type: Some("Session".to_string()),
            duration: Some(1500),
            description: None,
            transcript: transcript.map(str::to_string),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    fn web_url(&self) -> String {
        format!(
            "https://developer.apple.com/videos/play/wwdc{}/{}/",
            self.year, self.number
        )
    }
}

/// The year the renderer treats as current.
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// The standard corpus: five SwiftUI-matching sessions (three recent, two
/// from 2019), plus two non-matching sessions, one of which exercises
/// numeric session-number ordering.
pub fn standard_sessions() -> Vec<FixtureSession> {
    let recent = current_year();
    vec![
        FixtureSession::new(
            recent,
            "10101",
            "What's new in SwiftUI",
            Some("SwiftUI gains new animation APIs this year.\n\nScrolling also improved."),
        )
        .with_description("Discover the latest SwiftUI features."),
        FixtureSession::new(
            recent,
            "10102",
            "SwiftUI essentials",
            Some("SwiftUI essentials covers views and state. State drives the UI."),
        ),
        FixtureSession::new(
            recent,
            "10103",
            "Design with SwiftUI",
            Some("Designers and engineers meet in SwiftUI previews."),
        ),
        FixtureSession::new(
            2019,
            "204",
            "Introducing SwiftUI",
            Some("SwiftUI is a new declarative framework.\n\nIt runs on every platform."),
        ),
        FixtureSession::new(
            2019,
            "226",
            "Data Flow Through SwiftUI",
            Some("Data flows down through SwiftUI bindings."),
        ),
        FixtureSession::new(
            recent,
            "5",
            "Platforms State of the Union",
            Some("A tour of everything new across the platforms."),
        ),
        FixtureSession::new(
            2020,
            "10600",
            "Optimize Metal apps",
            Some("Metal shaders and GPU counters in depth."),
        ),
    ]
}

/// Writes a fixture database with the pipeline schema and FTS index.
pub fn write_database(path: &Path, sessions: &[FixtureSession]) {
    let conn = Connection::open(path).expect("create fixture db");
    conn.execute_batch(
        r"
        CREATE TABLE sessions (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            year INTEGER NOT NULL,
            session_number TEXT NOT NULL,
            type TEXT,
            duration INTEGER,
            description TEXT,
            web_url TEXT
        );
        CREATE TABLE transcripts (
            session_id TEXT REFERENCES sessions(id),
            language TEXT,
            content TEXT,
            word_count INTEGER,
            url TEXT,
            download_timestamp TEXT
        );
        CREATE VIRTUAL TABLE transcripts_fts USING fts5(
            session_id UNINDEXED,
            title,
            content,
            year UNINDEXED,
            session_type UNINDEXED,
            session_number UNINDEXED,
            duration UNINDEXED
        );
    ",
    )
    .expect("fixture schema");

    for session in sessions {
        conn.execute(
            "INSERT INTO sessions VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                session.id,
                session.title,
                session.year,
                session.number,
                session.session_type,
                session.duration,
                session.description,
                session.web_url(),
            ],
        )
        .expect("insert session");

        if let Some(transcript) = &session.transcript {
            let word_count = transcript.split_whitespace().count() as i64;
            conn.execute(
                "INSERT INTO transcripts VALUES (?, 'en', ?, ?, NULL, NULL)",
                params![session.id, transcript, word_count],
            )
            .expect("insert transcript");
        }
    }

    conn.execute_batch(
        r"
        INSERT INTO transcripts_fts (session_id, title, content, year, session_type, session_number, duration)
        SELECT s.id, s.title, COALESCE(t.content, ''), s.year, s.type, s.session_number, s.duration
        FROM sessions s LEFT JOIN transcripts t ON s.id = t.session_id;
    ",
    )
    .expect("fixture index");
}

/// Writes the standard corpus to `dir/wwdc.db` and returns the path.
pub fn standard_database(dir: &Path) -> PathBuf {
    let path = dir.join("wwdc.db");
    write_database(&path, &standard_sessions());
    path
}

/// Seals database bytes into an encrypted bundle the way the pipeline does:
/// payload JSON, LZFSE, AES-256-GCM under [`TEST_KEY`].
pub fn write_bundle(dir: &Path, database_bytes: &[u8]) -> PathBuf {
    let payload = serde_json::json!({
        "database": {
            "size": database_bytes.len(),
            "data": STANDARD.encode(database_bytes),
        },
        "markdown": {
            "count": 1,
            "files": { "README.md": STANDARD.encode(b"# WWDC corpus") }
        }
    });
    let payload_bytes = serde_json::to_vec(&payload).expect("payload json");

    let mut compressed = Vec::new();
    lzfse_rust::encode_bytes(&payload_bytes, &mut compressed).expect("lzfse encode");

    let nonce = [9u8; 12];
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&TEST_KEY));
    let mut sealed = cipher
        .encrypt(Nonce::from_slice(&nonce), compressed.as_ref())
        .expect("encrypt");
    let tag = sealed.split_off(sealed.len() - 16);

    let envelope = serde_json::json!({
        "metadata": {
            "version": "1.0",
            "createdAt": "2025-06-10T12:00:00Z",
            "totalSessions": 7,
            "totalYears": 3,
            "totalWordCount": 100,
            "uncompressedSize": payload_bytes.len(),
            "compressedSize": compressed.len(),
            "encryptionAlgorithm": "AES-256-GCM",
            "checksum": hex::encode(Sha256::digest(&payload_bytes)),
        },
        "encryptedData": STANDARD.encode(&sealed),
        "iv": STANDARD.encode(nonce),
        "tag": STANDARD.encode(&tag),
    });

    let path = dir.join("wwdc_bundle.encrypted");
    fs::write(&path, serde_json::to_vec(&envelope).expect("envelope json")).expect("write bundle");
    path
}
