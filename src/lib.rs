//! # sosumi-rs
//!
//! Offline WWDC session retrieval for Claude-style agents and humans.
//!
//! The corpus ships as a single encrypted bundle holding a `SQLite` database
//! with an FTS5 transcript index. This crate locates and opens the bundle,
//! runs BM25-ranked full-text search over it, and renders results across
//! four density modes in Markdown or JSON, always attributing the source.
//!
//! ## Features
//!
//! - **Encrypted bundle loader**: AES-256-GCM envelope, LZFSE payload,
//!   checksum verification, scoped working directory
//! - **FTS5 search**: BM25 ranking with validated, safely-escaped queries
//! - **Dual-mode rendering**: compact / user / agent / compact-agent, each
//!   in Markdown and JSON
//! - **Offline**: no network I/O anywhere in the core

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
// Note: unsafe is needed for memory-mapped I/O (memmap2)
#![warn(unsafe_code)]

pub mod bundle;
pub mod cancel;
pub mod cli;
pub mod error;
pub mod facade;
pub mod model;
pub mod render;
pub mod store;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use model::{CorpusStats, SearchResult, Session};

// Re-export bundle types
pub use bundle::{BundleSource, ExtractedBundle, KEY_ENV_VAR};

// Re-export storage types
pub use store::{SearchQuery, SessionLookup, WwdcStore, YearListing};

// Re-export rendering types
pub use render::{RenderFormat, RenderMode, SOURCE_NAME};

// Re-export facade types
pub use cancel::CancelFlag;
pub use facade::{BundleState, WwdcClient};

// Re-export CLI types
pub use cli::{Cli, Commands};
