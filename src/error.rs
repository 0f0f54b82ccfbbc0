//! Error types for sosumi-rs operations.
//!
//! This module provides a comprehensive error hierarchy using `thiserror` for
//! all retrieval operations including bundle loading, storage, query
//! validation, and rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for retrieval operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Bundle-related errors (resolution, key, decryption).
    #[error("bundle error: {0}")]
    Bundle(#[from] BundleError),

    /// Storage-related errors (database operations).
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Query validation errors.
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    /// Rendering errors.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// The caller's cancellation signal was raised.
    #[error("operation cancelled")]
    Cancelled,
}

/// Bundle-specific errors covering resolution, key acquisition, and opening.
#[derive(Error, Debug)]
pub enum BundleError {
    /// No bundle found at any search location.
    #[error("{}", render_missing(.searched))]
    Missing {
        /// Every path that was checked, in search order.
        searched: Vec<PathBuf>,
    },

    /// No decryption key could be obtained from any source.
    #[error("no decryption key available. Set SOSUMI_ENCRYPTION_KEY (hex or base64)")]
    KeyAbsent,

    /// A key was found but is not exactly 32 bytes.
    #[error("decryption key must be 32 bytes, got {length}. Check SOSUMI_ENCRYPTION_KEY")]
    KeyInvalid {
        /// Decoded key length in bytes.
        length: usize,
    },

    /// AEAD authentication failed or the envelope is malformed.
    #[error("bundle decryption failed: {reason}. Verify the key matches this bundle")]
    DecryptionFailed {
        /// What stage of envelope processing rejected the input.
        reason: String,
    },

    /// The decrypted payload is not valid LZFSE data.
    #[error("bundle payload is not valid LZFSE data. Re-download the bundle")]
    DecompressionFailed,

    /// The payload checksum does not match the envelope metadata.
    #[error("bundle checksum mismatch. Re-download the bundle")]
    IntegrityFailure,

    /// The working directory could not be created or written.
    #[error("failed to materialize working directory: {reason}")]
    WorkingDir {
        /// Underlying filesystem failure.
        reason: String,
    },
}

/// Storage-specific errors for database operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The extracted database could not be opened.
    #[error("failed to open session database: {detail}")]
    OpenFailed {
        /// `SQLite` error detail.
        detail: String,
    },

    /// `SQLite` reported an error during prepare or step.
    #[error("query execution failed: {detail}")]
    ExecutionFailed {
        /// `SQLite` error detail.
        detail: String,
    },
}

/// Input validation errors raised before any SQL is constructed.
#[derive(Error, Debug)]
pub enum QueryError {
    /// A caller-supplied input was rejected.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Name of the rejected input.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Rendering errors.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Rendered output lacks the mandatory source attribution.
    #[error("rendered output is missing source attribution")]
    MissingAttribution,

    /// JSON encoding failed.
    #[error("JSON encoding failed: {0}")]
    Json(String),
}

impl Error {
    /// Maps the error to the process exit code contract.
    ///
    /// `2` invalid inputs / configuration, `3` decryption or integrity
    /// failure, `5` bundle missing, `1` everything else.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Bundle(e) => match e {
                BundleError::Missing { .. } => 5,
                BundleError::KeyAbsent | BundleError::KeyInvalid { .. } => 2,
                BundleError::DecryptionFailed { .. }
                | BundleError::DecompressionFailed
                | BundleError::IntegrityFailure => 3,
                BundleError::WorkingDir { .. } => 1,
            },
            Self::Query(_) => 2,
            Self::Store(_) | Self::Render(_) | Self::Cancelled => 1,
        }
    }
}

/// Formats the bundle-missing message with the search list and remediation.
fn render_missing(searched: &[PathBuf]) -> String {
    let mut msg = String::from("WWDC bundle not found. Searched:\n");
    for path in searched {
        msg.push_str("  - ");
        msg.push_str(&path.display().to_string());
        msg.push('\n');
    }
    msg.push_str(
        "Download wwdc_bundle.encrypted from the sosumi releases page and \
         place it at one of the locations above, or pass --bundle PATH",
    );
    msg
}

// Implement From traits for library errors

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(StoreError::ExecutionFailed {
            detail: err.to_string(),
        })
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::ExecutionFailed {
            detail: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_lists_paths_and_remediation() {
        let err = BundleError::Missing {
            searched: vec![
                PathBuf::from("./wwdc_bundle.encrypted"),
                PathBuf::from("/home/u/.sosumi/wwdc_bundle.encrypted"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("./wwdc_bundle.encrypted"));
        assert!(msg.contains("/home/u/.sosumi/wwdc_bundle.encrypted"));
        assert!(msg.contains("--bundle PATH"));
    }

    #[test]
    fn test_key_errors_never_leak_material() {
        let err = BundleError::KeyInvalid { length: 31 };
        let msg = err.to_string();
        assert!(msg.contains("31"));
        assert!(msg.contains("32 bytes"));

        let absent = BundleError::KeyAbsent.to_string();
        assert!(absent.contains("SOSUMI_ENCRYPTION_KEY"));
    }

    #[test]
    fn test_exit_codes() {
        let missing: Error = BundleError::Missing { searched: vec![] }.into();
        assert_eq!(missing.exit_code(), 5);

        let key: Error = BundleError::KeyAbsent.into();
        assert_eq!(key.exit_code(), 2);

        let key_len: Error = BundleError::KeyInvalid { length: 33 }.into();
        assert_eq!(key_len.exit_code(), 2);

        let decrypt: Error = BundleError::DecryptionFailed {
            reason: "tag mismatch".to_string(),
        }
        .into();
        assert_eq!(decrypt.exit_code(), 3);

        let integrity: Error = BundleError::IntegrityFailure.into();
        assert_eq!(integrity.exit_code(), 3);

        let validation: Error = QueryError::Validation {
            field: "query",
            reason: "empty".to_string(),
        }
        .into();
        assert_eq!(validation.exit_code(), 2);

        let exec: Error = StoreError::ExecutionFailed {
            detail: "disk I/O".to_string(),
        }
        .into();
        assert_eq!(exec.exit_code(), 1);
    }

    #[test]
    fn test_validation_display() {
        let err = QueryError::Validation {
            field: "limit",
            reason: "must be between 1 and 1000".to_string(),
        };
        assert_eq!(err.to_string(), "invalid limit: must be between 1 and 1000");
    }

    #[test]
    fn test_error_from_rusqlite() {
        let err: Error = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(
            err,
            Error::Store(StoreError::ExecutionFailed { .. })
        ));
    }

    #[test]
    fn test_render_error_display() {
        let err = RenderError::MissingAttribution;
        assert!(err.to_string().contains("attribution"));
    }
}
