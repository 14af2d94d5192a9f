//! The context cache: Echo Jr's brain
//!
//! Tracks the owner/repo context and the selected file, persists the selection,
//! and on every selection spawns a best-effort background fetch that caches the
//! decoded file contents. Fetches are neither deduplicated nor cancelled, so
//! the cache holds whichever response resolved last.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::context::{Context, FetchTarget};
use crate::github::{ContentsClient, FetchError, Transport, DEFAULT_API_BASE};
use crate::signal::{CachedBroadcaster, CachedSignal, Signal};
use crate::storage::{Storage, SELECTED_FILE_KEY};

/// Settings for a brain session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrainConfig {
    /// Base URL of the contents API
    pub api_base: String,
    /// Storage key holding the selected file path
    pub storage_key: String,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            storage_key: SELECTED_FILE_KEY.to_string(),
        }
    }
}

/// How a background fetch ended
#[derive(Debug)]
pub enum FetchOutcome {
    /// Content cached and the file-cached signal emitted
    Cached(CachedSignal),
    /// Skipped with a warning (`MissingContext` or `NoContentField`)
    Skipped(FetchError),
    /// Request, parse or decode failed; logged and swallowed
    Failed(FetchError),
}

impl FetchOutcome {
    pub fn is_cached(&self) -> bool {
        matches!(self, FetchOutcome::Cached(_))
    }
}

struct Inner {
    context: Mutex<Context>,
    client: ContentsClient,
    storage: Option<Storage>,
    storage_key: String,
    cached: CachedBroadcaster,
}

/// Session-scoped context holder
///
/// Cheap to clone; clones share the same context. Handlers that spawn a fetch
/// must be called from within a tokio runtime.
#[derive(Clone)]
pub struct ContextCache {
    inner: Arc<Inner>,
}

impl ContextCache {
    /// Creates a session, restoring the selected file from storage
    pub fn new(config: BrainConfig, transport: Arc<dyn Transport>, storage: Option<Storage>) -> Self {
        let selected_file = storage
            .as_ref()
            .and_then(|storage| storage.get(&config.storage_key))
            .filter(|file| !file.is_empty());
        let client = ContentsClient::new(transport, config.api_base);

        Self {
            inner: Arc::new(Inner {
                context: Mutex::new(Context::with_selected_file(selected_file)),
                client,
                storage,
                storage_key: config.storage_key,
                cached: CachedBroadcaster::new(),
            }),
        }
    }

    fn context(&self) -> MutexGuard<'_, Context> {
        self.inner
            .context
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn selected_file(&self) -> Option<String> {
        self.context().selected_file.clone()
    }

    pub fn repo(&self) -> Option<String> {
        self.context().repo.clone()
    }

    pub fn owner(&self) -> Option<String> {
        self.context().owner.clone()
    }

    /// Returns the cached file body without triggering a fetch
    pub fn read_cached_file(&self) -> Option<String> {
        self.context().last_file_content.clone()
    }

    /// Sets owner and repo; does not fetch, even if a file is selected
    pub fn set_context(&self, owner: impl Into<String>, repo: impl Into<String>) {
        let owner = owner.into();
        let repo = repo.into();
        info!(%owner, %repo, "context set");
        self.context().set_repo_context(owner, repo);
    }

    /// Subscribes to file-cached signals
    pub fn subscribe(&self) -> broadcast::Receiver<CachedSignal> {
        self.inner.cached.subscribe()
    }

    /// Records a selection, persists it and spawns a background fetch
    ///
    /// The fetch is fire-and-forget: dropping the returned handle does not
    /// cancel it.
    pub fn on_file_selected(&self, file: impl Into<String>) -> JoinHandle<FetchOutcome> {
        let file = file.into();
        self.context().selected_file = Some(file.clone());

        if let Some(storage) = &self.inner.storage {
            if let Err(err) = storage.set(&self.inner.storage_key, &file) {
                warn!(error = %err, "failed to persist selected file");
            }
        }
        info!(%file, "file selected");

        // Snapshot now so the request targets this selection even if another
        // one lands before the task first runs.
        let target = self.context().fetch_target();
        let brain = self.clone();
        tokio::spawn(async move { brain.fetch_and_cache(target).await })
    }

    /// Observes an action payload
    pub fn on_action(&self, action: &Value) {
        info!(%action, "received action");
    }

    /// Routes an inbound signal to its handler
    ///
    /// Returns the fetch handle for file selections.
    pub fn dispatch(&self, signal: Signal) -> Option<JoinHandle<FetchOutcome>> {
        debug!(signal = signal.name(), "dispatching signal");
        match signal {
            Signal::FileSelected(file) => Some(self.on_file_selected(file)),
            Signal::Action(action) => {
                self.on_action(&action);
                None
            }
        }
    }

    /// Handles inbound signals until every sender is dropped
    pub async fn run(&self, mut receiver: mpsc::Receiver<Signal>) {
        while let Some(signal) = receiver.recv().await {
            self.dispatch(signal);
        }
    }

    /// Fetches and caches the selected file
    ///
    /// Never fails: every error is logged here and reported only through the
    /// returned outcome.
    pub async fn background_fetch(&self) -> FetchOutcome {
        let target = self.context().fetch_target();
        self.fetch_and_cache(target).await
    }

    async fn fetch_and_cache(&self, target: Option<FetchTarget>) -> FetchOutcome {
        let Some(target) = target else {
            warn!("missing context, skipping fetch");
            return FetchOutcome::Skipped(FetchError::MissingContext);
        };

        match self.inner.client.fetch_file(&target).await {
            Ok(text) => {
                let size = text.chars().count();
                // Report whatever is selected now; a newer selection may have
                // landed while this response was in flight.
                let file = {
                    let mut context = self.context();
                    context.last_file_content = Some(text);
                    context.selected_file.clone().unwrap_or(target.path)
                };
                info!(%file, size, "cached file");

                let signal = CachedSignal { file, size };
                self.inner.cached.emit(signal.clone());
                FetchOutcome::Cached(signal)
            }
            Err(err) if err.is_silent() => {
                warn!(file = %target.path, "{}", err);
                FetchOutcome::Skipped(err)
            }
            Err(err) => {
                error!(file = %target.path, error = %err, "fetch error");
                FetchOutcome::Failed(err)
            }
        }
    }
}

impl std::fmt::Debug for ContextCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextCache")
            .field("context", &*self.context())
            .field("client", &self.inner.client)
            .field("storage", &self.inner.storage)
            .finish()
    }
}
