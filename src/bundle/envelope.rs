//! On-disk envelope and payload formats.
//!
//! The envelope is a JSON object produced by the data pipeline: metadata plus
//! base64-encoded AEAD ciphertext, nonce, and authentication tag. The payload
//! is the JSON object recovered after decryption and LZFSE decompression,
//! holding the embedded `SQLite` database and optional Markdown assets.

use crate::error::BundleError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// AEAD nonce length in bytes.
pub const NONCE_LENGTH: usize = 12;

/// AEAD authentication tag length in bytes.
pub const TAG_LENGTH: usize = 16;

/// The only supported envelope algorithm tag.
pub const ENCRYPTION_ALGORITHM: &str = "AES-256-GCM";

/// Envelope metadata written by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetadata {
    /// Bundle format version string.
    pub version: String,
    /// When the pipeline produced this bundle.
    pub created_at: DateTime<Utc>,
    /// Number of sessions in the embedded database.
    pub total_sessions: u64,
    /// Number of distinct conference years covered.
    pub total_years: u64,
    /// Sum of transcript word counts.
    pub total_word_count: u64,
    /// Decompressed payload size in bytes.
    pub uncompressed_size: u64,
    /// Compressed (pre-encryption) payload size in bytes.
    pub compressed_size: u64,
    /// AEAD algorithm tag; must be `AES-256-GCM`.
    pub encryption_algorithm: String,
    /// Hex digest over the decompressed payload.
    pub checksum: String,
}

/// The outer on-disk container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Pipeline metadata, stored in the clear.
    pub metadata: BundleMetadata,
    /// Base64 AEAD ciphertext.
    pub encrypted_data: String,
    /// Base64 12-byte nonce.
    pub iv: String,
    /// Base64 16-byte authentication tag.
    pub tag: String,
}

impl Envelope {
    /// Parses envelope bytes and validates the algorithm tag.
    ///
    /// # Errors
    ///
    /// [`BundleError::DecryptionFailed`] on malformed JSON or an unsupported
    /// algorithm.
    pub fn parse(bytes: &[u8]) -> Result<Self, BundleError> {
        let envelope: Self =
            serde_json::from_slice(bytes).map_err(|e| BundleError::DecryptionFailed {
                reason: format!("malformed envelope: {e}"),
            })?;

        if envelope.metadata.encryption_algorithm != ENCRYPTION_ALGORITHM {
            return Err(BundleError::DecryptionFailed {
                reason: format!(
                    "unsupported encryption algorithm: {}",
                    envelope.metadata.encryption_algorithm
                ),
            });
        }

        Ok(envelope)
    }

    /// Decodes the AEAD ciphertext.
    pub fn ciphertext(&self) -> Result<Vec<u8>, BundleError> {
        decode_field(&self.encrypted_data, "encryptedData")
    }

    /// Decodes and length-checks the 12-byte nonce.
    pub fn nonce(&self) -> Result<[u8; NONCE_LENGTH], BundleError> {
        let bytes = decode_field(&self.iv, "iv")?;
        bytes
            .try_into()
            .map_err(|_| malformed("iv is not 12 bytes"))
    }

    /// Decodes and length-checks the 16-byte authentication tag.
    pub fn auth_tag(&self) -> Result<[u8; TAG_LENGTH], BundleError> {
        let bytes = decode_field(&self.tag, "tag")?;
        bytes
            .try_into()
            .map_err(|_| malformed("tag is not 16 bytes"))
    }
}

/// The decrypted, decompressed inner document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    /// The embedded `SQLite` database.
    pub database: DatabaseEntry,
    /// Optional Markdown assets shipped alongside the database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<MarkdownEntry>,
}

/// The embedded database bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseEntry {
    /// Decoded size in bytes.
    pub size: u64,
    /// Base64 `SQLite` file bytes.
    pub data: String,
}

/// Optional Markdown assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownEntry {
    /// Number of files.
    pub count: u64,
    /// Filename to base64 content. Ordered for deterministic extraction.
    pub files: BTreeMap<String, String>,
}

impl Payload {
    /// Parses the decompressed payload bytes.
    ///
    /// # Errors
    ///
    /// [`BundleError::DecryptionFailed`] on malformed JSON; the checksum has
    /// already vouched for the bytes at this point, so a parse failure means
    /// the bundle was built wrong.
    pub fn parse(bytes: &[u8]) -> Result<Self, BundleError> {
        serde_json::from_slice(bytes).map_err(|e| malformed(&format!("malformed payload: {e}")))
    }

    /// Decodes the embedded database bytes.
    pub fn database_bytes(&self) -> Result<Vec<u8>, BundleError> {
        decode_field(&self.database.data, "database.data")
    }
}

fn decode_field(value: &str, field: &str) -> Result<Vec<u8>, BundleError> {
    STANDARD
        .decode(value)
        .map_err(|_| malformed(&format!("{field} is not valid base64")))
}

fn malformed(reason: &str) -> BundleError {
    BundleError::DecryptionFailed {
        reason: reason.to_string(),
    }
}
