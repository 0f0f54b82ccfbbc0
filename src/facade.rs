//! Request facade over the retrieval core.
//!
//! [`WwdcClient`] is the single entry point used by the CLI and the skill
//! runner. It resolves, authenticates, and opens the bundle at most once per
//! process (first caller performs, later callers reuse), validates every
//! request, executes it against the store, renders the output, and
//! re-verifies the attribution invariant before returning.

use crate::bundle::decrypt::ExtractedBundle;
use crate::bundle::resolver::BundleSource;
use crate::bundle::{decrypt, key, resolver};
use crate::cancel::CancelFlag;
use crate::error::{Error, RenderError, Result, StoreError};
use crate::render::{self, RenderFormat, RenderMode};
use crate::store::{SearchQuery, SessionLookup, WwdcStore, YearListing};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Bundle lifecycle. Transitions are monotonic; a failed transition leaves
/// the state where it was and the next call retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BundleState {
    /// No lookup attempted yet.
    #[default]
    Unresolved,
    /// A source path was found.
    Resolved,
    /// Key accepted and payload decrypted.
    Authenticated,
    /// Database open and serving queries.
    Opened,
}

struct OpenedCorpus {
    store: WwdcStore,
    /// Keeps the working directory alive for encrypted sources; dropped on
    /// process exit, which removes the directory.
    _extracted: Option<ExtractedBundle>,
}

struct Inner {
    state: BundleState,
    corpus: Option<Arc<OpenedCorpus>>,
}

/// Entry point for WWDC corpus queries.
///
/// # Examples
///
/// ```no_run
/// use sosumi_rs::facade::WwdcClient;
/// use sosumi_rs::render::{RenderFormat, RenderMode};
///
/// let client = WwdcClient::new();
/// let output = client
///     .search("SwiftUI", RenderMode::User, RenderFormat::Markdown, Some(5), None)
///     .unwrap();
/// println!("{output}");
/// ```
pub struct WwdcClient {
    bundle_override: Option<PathBuf>,
    key_override: Option<Vec<u8>>,
    cancel: CancelFlag,
    inner: Mutex<Inner>,
}

impl Default for WwdcClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WwdcClient {
    /// Creates a client using the default search path and key sources.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bundle_override: None,
            key_override: None,
            cancel: CancelFlag::new(),
            inner: Mutex::new(Inner {
                state: BundleState::default(),
                corpus: None,
            }),
        }
    }

    /// Overrides the bundle location; checked first during resolution.
    #[must_use]
    pub fn with_bundle_path(mut self, path: PathBuf) -> Self {
        self.bundle_override = Some(path);
        self
    }

    /// Supplies the decryption key directly, bypassing the environment.
    #[must_use]
    pub fn with_key(mut self, key: Vec<u8>) -> Self {
        self.key_override = Some(key);
        self
    }

    /// Attaches a shared cancellation flag.
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Current bundle lifecycle state, for diagnostics.
    #[must_use]
    pub fn state(&self) -> BundleState {
        self.inner.lock().map_or(BundleState::Unresolved, |g| g.state)
    }

    /// Full-text search, rendered into the requested (mode, format) cell.
    ///
    /// # Errors
    ///
    /// Validation failures, bundle failures on first call, store failures,
    /// and render failures, all typed.
    pub fn search(
        &self,
        query: &str,
        mode: RenderMode,
        format: RenderFormat,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<String> {
        self.cancel.check()?;
        let query = SearchQuery::new(query, limit, offset)?;
        let corpus = self.ensure_open()?;
        self.cancel.check()?;

        let results = corpus.store.search(&query)?;
        let output = render::render_results(query.term(), &results, mode, format)?;
        if !results.is_empty() {
            Self::verify_attribution(&output)?;
        }
        Ok(output)
    }

    /// Session lookup by id. `Ok(None)` when the id is absent.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::search`].
    pub fn get_session(
        &self,
        id: &str,
        mode: RenderMode,
        format: RenderFormat,
    ) -> Result<Option<String>> {
        self.cancel.check()?;
        let lookup = SessionLookup::new(id)?;
        let corpus = self.ensure_open()?;
        self.cancel.check()?;

        let Some(session) = corpus.store.session_by_id(&lookup)? else {
            return Ok(None);
        };
        let output = render::render_session(&session, mode, format)?;
        Self::verify_attribution(&output)?;
        Ok(Some(output))
    }

    /// Lists a conference year in numeric session order.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::search`].
    pub fn list_year(
        &self,
        year: i32,
        mode: RenderMode,
        format: RenderFormat,
        limit: Option<usize>,
    ) -> Result<String> {
        self.cancel.check()?;
        let listing = YearListing::new(year, limit)?;
        let corpus = self.ensure_open()?;
        self.cancel.check()?;

        let sessions = corpus.store.sessions_by_year(listing)?;
        let output = render::render_year(listing.year(), &sessions, mode, format)?;
        if !sessions.is_empty() {
            Self::verify_attribution(&output)?;
        }
        Ok(output)
    }

    /// Renders the corpus statistics snapshot.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::search`].
    pub fn statistics(&self, format: RenderFormat) -> Result<String> {
        self.cancel.check()?;
        let corpus = self.ensure_open()?;
        self.cancel.check()?;

        let stats = corpus.store.statistics()?;
        let output = render::render_stats(&stats, format)?;
        Self::verify_attribution(&output)?;
        Ok(output)
    }

    /// Opens the corpus on first use and caches it for the process lifetime.
    ///
    /// Holding the lock across the open means the first caller performs the
    /// work while concurrent callers await; an error leaves the cached slot
    /// empty so the next call retries from the last reached state.
    fn ensure_open(&self) -> Result<Arc<OpenedCorpus>> {
        let mut inner = self.lock_inner()?;
        if let Some(corpus) = &inner.corpus {
            return Ok(Arc::clone(corpus));
        }

        let source = resolver::resolve(self.bundle_override.as_deref())?;
        inner.state = BundleState::Resolved;

        let corpus = match source {
            BundleSource::PlainDatabase(path) => {
                tracing::debug!(path = %path.display(), "opening plain database");
                let store = WwdcStore::open(&path)?;
                OpenedCorpus {
                    store,
                    _extracted: None,
                }
            }
            BundleSource::Encrypted(path) => {
                let key = key::obtain(self.key_override.as_deref())?;
                let extracted = decrypt::open(&path, &key, &self.cancel)?;
                inner.state = BundleState::Authenticated;
                let store = WwdcStore::open(extracted.database_path())?;
                OpenedCorpus {
                    store,
                    _extracted: Some(extracted),
                }
            }
        };

        inner.state = BundleState::Opened;
        let corpus = Arc::new(corpus);
        inner.corpus = Some(Arc::clone(&corpus));
        Ok(corpus)
    }

    fn lock_inner(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| {
            Error::Store(StoreError::ExecutionFailed {
                detail: "facade mutex poisoned".to_string(),
            })
        })
    }

    /// Programmer-error guard: rendered output must attribute the source.
    fn verify_attribution(output: &str) -> Result<()> {
        if render::has_attribution(output) {
            Ok(())
        } else {
            Err(RenderError::MissingAttribution.into())
        }
    }
}

impl std::fmt::Debug for WwdcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WwdcClient")
            .field("bundle_override", &self.bundle_override)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
