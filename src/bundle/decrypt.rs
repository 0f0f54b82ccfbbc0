//! Bundle opening: authenticate, decrypt, decompress, extract.
//!
//! Opening is a once-per-process operation owned by the facade; this module
//! performs one full pass from envelope bytes to an extracted working
//! directory. The directory is named unguessably, lives under a fixed parent
//! in the system temp location, is removed on clean shutdown, and stale
//! siblings older than seven days are swept on startup.

use crate::bundle::envelope::{BundleMetadata, Envelope, Payload};
use crate::cancel::CancelFlag;
use crate::error::{BundleError, Result};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use memmap2::Mmap;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Directory under the system temp location holding working directories.
const WORKDIR_PARENT: &str = "sosumi-wwdc";

/// Extracted database file name inside the working directory.
const DATABASE_FILE_NAME: &str = "wwdc.db";

/// Subdirectory for extracted Markdown assets.
const MARKDOWN_DIR_NAME: &str = "markdown";

/// Working directories older than this are swept on startup.
const STALE_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// A decrypted bundle materialized on disk.
///
/// Owns the working directory; dropping the value removes the directory and
/// everything extracted into it.
#[derive(Debug)]
pub struct ExtractedBundle {
    database_path: PathBuf,
    markdown_dir: Option<PathBuf>,
    metadata: BundleMetadata,
    _workdir: TempDir,
}

impl ExtractedBundle {
    /// Path of the extracted `SQLite` database.
    #[must_use]
    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    /// Directory holding extracted Markdown assets, if the payload had any.
    #[must_use]
    pub fn markdown_dir(&self) -> Option<&Path> {
        self.markdown_dir.as_deref()
    }

    /// Envelope metadata parsed during opening.
    #[must_use]
    pub const fn metadata(&self) -> &BundleMetadata {
        &self.metadata
    }
}

/// Opens an encrypted bundle end to end.
///
/// Parses the envelope, authenticates and decrypts with AES-256-GCM, runs
/// LZFSE decompression, verifies the payload checksum, and extracts the
/// embedded database and Markdown assets into a fresh working directory.
///
/// # Errors
///
/// Returns the matching [`BundleError`] kind for each stage, or
/// [`crate::Error::Cancelled`] when the caller's flag is raised at an I/O
/// boundary.
pub fn open(envelope_path: &Path, key: &[u8; 32], cancel: &CancelFlag) -> Result<ExtractedBundle> {
    sweep_stale_workdirs(&workdir_parent());

    let file = fs::File::open(envelope_path).map_err(|e| BundleError::DecryptionFailed {
        reason: format!("cannot read envelope: {e}"),
    })?;
    // SAFETY: the envelope is a distribution artifact opened read-only and
    // not modified for the lifetime of the map.
    #[allow(unsafe_code)]
    let mapped = unsafe { Mmap::map(&file) }.map_err(|e| BundleError::DecryptionFailed {
        reason: format!("cannot map envelope: {e}"),
    })?;

    let envelope = Envelope::parse(&mapped)?;
    tracing::debug!(
        version = %envelope.metadata.version,
        sessions = envelope.metadata.total_sessions,
        "envelope parsed"
    );

    cancel.check()?;
    let compressed = decrypt(&envelope, key)?;

    cancel.check()?;
    let payload_bytes = decompress(&compressed, envelope.metadata.uncompressed_size)?;
    verify_checksum(&payload_bytes, &envelope.metadata.checksum)?;

    cancel.check()?;
    let payload = Payload::parse(&payload_bytes)?;
    extract(&payload, envelope.metadata)
}

/// AES-256-GCM open. The envelope stores the tag separately; the cipher
/// expects it appended to the ciphertext.
fn decrypt(envelope: &Envelope, key: &[u8; 32]) -> Result<Vec<u8>> {
    let nonce = envelope.nonce()?;
    let tag = envelope.auth_tag()?;
    let mut combined = envelope.ciphertext()?;
    combined.extend_from_slice(&tag);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce), combined.as_ref())
        .map_err(|_| BundleError::DecryptionFailed {
            reason: "authentication tag mismatch".to_string(),
        })?;
    Ok(plaintext)
}

fn decompress(compressed: &[u8], size_hint: u64) -> Result<Vec<u8>> {
    let capacity = usize::try_from(size_hint).unwrap_or(0);
    let mut decompressed = Vec::with_capacity(capacity);
    lzfse_rust::decode_bytes(compressed, &mut decompressed)
        .map_err(|_| BundleError::DecompressionFailed)?;
    Ok(decompressed)
}

/// Compares the SHA-256 digest of the decompressed payload against the
/// envelope metadata. Runs before extraction so nothing unverified reaches
/// the filesystem.
fn verify_checksum(payload: &[u8], expected: &str) -> Result<()> {
    let digest = hex::encode(Sha256::digest(payload));
    if digest.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(BundleError::IntegrityFailure.into())
    }
}

/// Materializes the database and Markdown assets into a fresh working
/// directory.
fn extract(payload: &Payload, metadata: BundleMetadata) -> Result<ExtractedBundle> {
    let parent = workdir_parent();
    fs::create_dir_all(&parent).map_err(|e| workdir_err(&parent, &e))?;

    let workdir = tempfile::Builder::new()
        .prefix("bundle-")
        .tempdir_in(&parent)
        .map_err(|e| workdir_err(&parent, &e))?;

    let database_path = workdir.path().join(DATABASE_FILE_NAME);
    let database_bytes = payload.database_bytes()?;
    fs::write(&database_path, &database_bytes).map_err(|e| workdir_err(&database_path, &e))?;
    tracing::debug!(
        path = %database_path.display(),
        bytes = database_bytes.len(),
        "database extracted"
    );

    let markdown_dir = match &payload.markdown {
        Some(markdown) if !markdown.files.is_empty() => {
            let dir = workdir.path().join(MARKDOWN_DIR_NAME);
            fs::create_dir_all(&dir).map_err(|e| workdir_err(&dir, &e))?;
            for (name, data) in &markdown.files {
                // Keep only the final path component so payload names cannot
                // escape the working directory.
                let Some(file_name) = Path::new(name).file_name() else {
                    continue;
                };
                let target = dir.join(file_name);
                let decoded = decode_markdown(data)?;
                fs::write(&target, decoded).map_err(|e| workdir_err(&target, &e))?;
            }
            Some(dir)
        }
        _ => None,
    };

    Ok(ExtractedBundle {
        database_path,
        markdown_dir,
        metadata,
        _workdir: workdir,
    })
}

fn decode_markdown(data: &str) -> Result<Vec<u8>> {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|_| {
            BundleError::DecryptionFailed {
                reason: "markdown asset is not valid base64".to_string(),
            }
            .into()
        })
}

fn workdir_err(path: &Path, err: &std::io::Error) -> BundleError {
    BundleError::WorkingDir {
        reason: format!("{}: {err}", path.display()),
    }
}

fn workdir_parent() -> PathBuf {
    std::env::temp_dir().join(WORKDIR_PARENT)
}

/// Best-effort removal of working directories older than [`STALE_AGE`].
///
/// A crashed process leaves its directory behind; the next process collects
/// it here. Failures are logged and ignored.
fn sweep_stale_workdirs(parent: &Path) {
    let Ok(entries) = fs::read_dir(parent) else {
        return;
    };
    for entry in entries.flatten() {
        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        let stale = modified
            .elapsed()
            .map(|age| age > STALE_AGE)
            .unwrap_or(false);
        if stale {
            let path = entry.path();
            match fs::remove_dir_all(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "swept stale working directory"),
                Err(e) => tracing::debug!(path = %path.display(), error = %e, "sweep failed"),
            }
        }
    }
}
