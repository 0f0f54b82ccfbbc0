//! Bundle location across a fixed search path.
//!
//! The resolver only decides *where* the corpus lives; it never opens or
//! reads the file. Both an encrypted envelope and a plain `SQLite` database
//! are accepted, modeled as the two variants of [`BundleSource`].

use crate::error::BundleError;
use std::path::{Path, PathBuf};

/// File name of the encrypted distribution artifact.
pub const BUNDLE_FILE_NAME: &str = "wwdc_bundle.encrypted";

/// Per-user directory holding an installed bundle.
const USER_DATA_DIR: &str = ".sosumi";

/// Location of an optional pre-extracted plain database.
const PLAIN_DB_SUBPATH: &str = ".claude/resources/databases/wwdc.db";

/// Resource directory colocated with the executable.
const RESOURCE_SUBPATH: &str = "Resources/DATA";

/// Where the corpus was found and which opening procedure applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleSource {
    /// An encrypted envelope; requires key acquisition and decryption.
    Encrypted(PathBuf),
    /// A plain `SQLite` database; opened directly.
    PlainDatabase(PathBuf),
}

impl BundleSource {
    /// Returns the resolved filesystem path.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Encrypted(p) | Self::PlainDatabase(p) => p,
        }
    }
}

/// Resolves the bundle across the fixed search path.
///
/// Search order: the caller-supplied path, the current working directory,
/// the user data directory, a plain database under `~/.claude`, and finally
/// a resource path colocated with the executable. The first existing,
/// readable path wins.
///
/// # Errors
///
/// Returns [`BundleError::Missing`] carrying every searched path when no
/// candidate exists.
pub fn resolve(explicit: Option<&Path>) -> Result<BundleSource, BundleError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf));
    resolve_in(explicit, &cwd, dirs::home_dir(), exe_dir)
}

/// Resolution with injected environment, for tests and embedding.
pub(crate) fn resolve_in(
    explicit: Option<&Path>,
    cwd: &Path,
    home: Option<PathBuf>,
    exe_dir: Option<PathBuf>,
) -> Result<BundleSource, BundleError> {
    let mut searched = Vec::new();

    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(classify(path));
        }
        searched.push(path.to_path_buf());
    }

    let candidates = candidate_paths(cwd, home.as_deref(), exe_dir.as_deref());
    for path in candidates {
        if path.is_file() {
            tracing::debug!(path = %path.display(), "bundle resolved");
            return Ok(classify(&path));
        }
        searched.push(path);
    }

    Err(BundleError::Missing { searched })
}

/// The fixed search path, in priority order.
fn candidate_paths(cwd: &Path, home: Option<&Path>, exe_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = vec![cwd.join(BUNDLE_FILE_NAME)];
    if let Some(home) = home {
        paths.push(home.join(USER_DATA_DIR).join(BUNDLE_FILE_NAME));
        paths.push(home.join(PLAIN_DB_SUBPATH));
    }
    if let Some(exe_dir) = exe_dir {
        paths.push(exe_dir.join(RESOURCE_SUBPATH).join(BUNDLE_FILE_NAME));
    }
    paths
}

/// A `.db` path is a plain database; everything else is an envelope.
fn classify(path: &Path) -> BundleSource {
    if path.extension().is_some_and(|ext| ext == "db") {
        BundleSource::PlainDatabase(path.to_path_buf())
    } else {
        BundleSource::Encrypted(path.to_path_buf())
    }
}
