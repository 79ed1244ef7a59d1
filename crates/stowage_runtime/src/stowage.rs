//! Process-wide catalog initialization.
//!
//! [`Stowage`] owns the current [`CatalogManifest`]. Loading it is a
//! once-only operation: concurrent callers queue on a single gate, the first
//! one through performs the load, and the rest observe its outcome. Every
//! subscriber is told once per cycle whether the catalog is usable.
//!
//! The only way to load again is an explicit [`Stowage::reinitialize`].
//!
//! # Cancellation
//!
//! A token that fires before the gate is acquired leaves the state untouched
//! and notifies nobody. A token that fires after the gate is acquired
//! completes the cycle as initialized but invalid.

use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};
use stowage_catalog::{CapabilityResolver, CatalogCodec};
use stowage_query::{CatalogManifest, Query};
use tokio_util::sync::CancellationToken;

use crate::config::StowageConfig;
use crate::store::CatalogStore;

/// Result of one initialization cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The catalog was decoded into a manifest.
    Loaded {
        /// Number of manifest entries.
        entries: usize,
    },
    /// No persisted catalog exists at the configured location.
    NotFound,
    /// The persisted catalog could not be decoded.
    Malformed,
    /// The store failed to read the catalog.
    Unreadable,
    /// The cycle was cancelled. Only reported as the stored outcome when the
    /// cancellation arrived after the load started.
    Cancelled,
}

impl InitOutcome {
    /// Returns `true` if the catalog is usable.
    #[must_use]
    pub fn is_valid(self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// Handle returned by [`Stowage::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Arc<dyn Fn(bool) + Send + Sync>;

#[derive(Default)]
struct State {
    outcome: Option<InitOutcome>,
    manifest: Option<Arc<CatalogManifest>>,
}

#[derive(Debug, Clone, Copy)]
enum Fetch {
    Blocking,
    Deferred,
}

static GLOBAL: OnceLock<Arc<Stowage>> = OnceLock::new();

/// Owner of the process-wide catalog state.
pub struct Stowage {
    config: StowageConfig,
    store: Arc<dyn CatalogStore>,
    codec: CatalogCodec,
    state: RwLock<State>,
    gate: tokio::sync::Mutex<()>,
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: AtomicU64,
}

impl std::fmt::Debug for Stowage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Stowage")
            .field("config", &self.config)
            .field("outcome", &state.outcome)
            .field("subscribers", &self.subscribers.lock().len())
            .finish_non_exhaustive()
    }
}

impl Stowage {
    /// Creates an uninitialized instance reading from `store`.
    ///
    /// Capability names are resolved through `resolver`; the codec's local
    /// separator and unresolved-name policy come from `config`.
    #[must_use]
    pub fn new(
        config: StowageConfig,
        store: Arc<dyn CatalogStore>,
        resolver: Arc<CapabilityResolver>,
    ) -> Self {
        let codec = CatalogCodec::new(resolver)
            .with_local_separator(config.layout().separator())
            .with_policy(config.policy());
        Self {
            config,
            store,
            codec,
            state: RwLock::new(State::default()),
            gate: tokio::sync::Mutex::new(()),
            subscribers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        }
    }

    /// Installs `stowage` as the process-wide instance.
    ///
    /// # Errors
    ///
    /// Returns the argument back if an instance is already installed.
    pub fn install_global(stowage: Arc<Stowage>) -> Result<(), Arc<Stowage>> {
        GLOBAL.set(stowage)
    }

    /// The process-wide instance, if one was installed.
    #[must_use]
    pub fn global() -> Option<&'static Arc<Stowage>> {
        GLOBAL.get()
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &StowageConfig {
        &self.config
    }

    /// The codec used to decode the persisted catalog.
    #[must_use]
    pub fn codec(&self) -> &CatalogCodec {
        &self.codec
    }

    /// Returns `true` once an initialization cycle has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.read().outcome.is_some()
    }

    /// Returns `true` if the last cycle produced a usable manifest.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.state.read().outcome.is_some_and(InitOutcome::is_valid)
    }

    /// Outcome of the last completed cycle.
    #[must_use]
    pub fn outcome(&self) -> Option<InitOutcome> {
        self.state.read().outcome
    }

    /// The current manifest, if the catalog is valid.
    #[must_use]
    pub fn manifest(&self) -> Option<Arc<CatalogManifest>> {
        self.state.read().manifest.clone()
    }

    /// Starts a query over the current manifest.
    ///
    /// Before initialization, or when the catalog is invalid, this logs an
    /// error and returns a query that matches nothing.
    #[must_use]
    pub fn query(&self) -> Query {
        let state = self.state.read();
        match (&state.outcome, &state.manifest) {
            (Some(_), Some(manifest)) => manifest.query(),
            (None, _) => {
                tracing::error!("catalog queried before initialization");
                Query::detached()
            }
            (Some(outcome), None) => {
                tracing::error!(?outcome, "catalog queried while invalid");
                Query::detached()
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Subscribers
    // ─────────────────────────────────────────────────────────────────────

    /// Registers `callback` to receive the validity flag of every completed
    /// cycle.
    pub fn subscribe(&self, callback: impl Fn(bool) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock().push((id, Arc::new(callback)));
        id
    }

    /// Removes a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    fn notify(&self, valid: bool) {
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .lock()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        tracing::debug!(valid, subscribers = subscribers.len(), "notifying subscribers");
        for callback in subscribers {
            callback(valid);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Initialization
    // ─────────────────────────────────────────────────────────────────────

    /// Initializes on the calling thread using the store's blocking read.
    ///
    /// Returns the outcome of the cycle that loaded the catalog, which may
    /// have been started by another caller.
    pub fn initialize_blocking(&self) -> InitOutcome {
        futures::executor::block_on(self.run(None, Fetch::Blocking, false))
            .unwrap_or(InitOutcome::Cancelled)
    }

    /// Initializes using the store's non-blocking read.
    pub async fn initialize(&self) -> InitOutcome {
        self.run(None, Fetch::Deferred, false)
            .await
            .unwrap_or(InitOutcome::Cancelled)
    }

    /// Initializes unless `cancel` fires first.
    ///
    /// Returns `None` if the token fired before the load started; the state
    /// is then left exactly as it was.
    pub async fn initialize_cancelable(&self, cancel: &CancellationToken) -> Option<InitOutcome> {
        self.run(Some(cancel), Fetch::Deferred, false).await
    }

    /// Runs a fresh cycle and replaces the current state with its result.
    ///
    /// Readers keep seeing the previous manifest until the new one is ready.
    pub async fn reinitialize(&self) -> InitOutcome {
        self.run(None, Fetch::Deferred, true)
            .await
            .unwrap_or(InitOutcome::Cancelled)
    }

    /// Blocking [`reinitialize`](Self::reinitialize).
    pub fn reinitialize_blocking(&self) -> InitOutcome {
        futures::executor::block_on(self.run(None, Fetch::Blocking, true))
            .unwrap_or(InitOutcome::Cancelled)
    }

    async fn run(
        &self,
        cancel: Option<&CancellationToken>,
        fetch: Fetch,
        reset: bool,
    ) -> Option<InitOutcome> {
        if !reset && let Some(outcome) = self.outcome() {
            return Some(outcome);
        }
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            tracing::debug!("initialization cancelled before start");
            return None;
        }

        let _gate = match cancel {
            Some(token) => tokio::select! {
                guard = self.gate.lock() => guard,
                () = token.cancelled() => {
                    tracing::debug!("initialization cancelled while waiting");
                    return None;
                }
            },
            None => self.gate.lock().await,
        };

        // A reload keeps serving the previous manifest until the new outcome
        // replaces it below.
        if reset {
            tracing::info!("reinitializing catalog");
        } else if let Some(outcome) = self.outcome() {
            // Another caller completed the cycle while this one waited.
            return Some(outcome);
        }

        let (outcome, manifest) = self.load(cancel, fetch).await;
        {
            let mut state = self.state.write();
            state.outcome = Some(outcome);
            state.manifest = manifest;
        }
        self.notify(outcome.is_valid());
        Some(outcome)
    }

    async fn load(
        &self,
        cancel: Option<&CancellationToken>,
        fetch: Fetch,
    ) -> (InitOutcome, Option<Arc<CatalogManifest>>) {
        let location = self.config.catalog_location();
        let is_cancelled = || cancel.is_some_and(CancellationToken::is_cancelled);

        if is_cancelled() {
            tracing::warn!(%location, "initialization cancelled");
            return (InitOutcome::Cancelled, None);
        }

        let read = match fetch {
            Fetch::Blocking => self.store.read(&location),
            Fetch::Deferred => self.store.read_async(&location).await,
        };
        if is_cancelled() {
            tracing::warn!(%location, "initialization cancelled");
            return (InitOutcome::Cancelled, None);
        }

        let bytes = match read {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::error!(%location, "no catalog found; queries will return nothing");
                return (InitOutcome::NotFound, None);
            }
            Err(err) => {
                tracing::error!(%location, error = %err, "catalog could not be read");
                return (InitOutcome::Unreadable, None);
            }
        };

        match self.codec.decode(&bytes) {
            Ok(catalog) => {
                let manifest = Arc::new(CatalogManifest::new(catalog));
                tracing::info!(
                    %location,
                    entries = manifest.len(),
                    created_at = %manifest.created_at(),
                    "catalog initialized"
                );
                (
                    InitOutcome::Loaded {
                        entries: manifest.len(),
                    },
                    Some(manifest),
                )
            }
            Err(err) => {
                tracing::error!(%location, error = %err, "catalog is malformed");
                (InitOutcome::Malformed, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Utc;
    use std::sync::atomic::AtomicUsize;
    use stowage_catalog::{Capability, CapabilityRegistry, CapabilitySet, Catalog, CatalogEntry, Identity};

    fn resolver() -> Arc<CapabilityResolver> {
        let mut registry = CapabilityRegistry::new();
        registry.register("engine::TextAsset");
        Arc::new(CapabilityResolver::new(Arc::new(registry)))
    }

    fn config() -> StowageConfig {
        StowageConfig::new().with_layout(stowage_catalog::ResourceLayout::new().with_separator('/'))
    }

    fn stored_catalog(store: &MemoryStore, stowage: &Stowage) {
        let entry = CatalogEntry::new(
            Identity::new("1"),
            "someAsset.txt",
            None,
            CapabilitySet::single(Capability::new("engine::TextAsset")),
            '/',
        );
        let catalog = Catalog::new(Utc::now(), vec![entry], '/');
        let bytes = stowage.codec().encode(&catalog).unwrap();
        store.insert(stowage.config().catalog_location(), bytes);
    }

    fn counting(stowage: &Stowage) -> (Arc<AtomicUsize>, Arc<Mutex<Vec<bool>>>) {
        let count = Arc::new(AtomicUsize::new(0));
        let flags = Arc::new(Mutex::new(Vec::new()));
        let (c, f) = (count.clone(), flags.clone());
        stowage.subscribe(move |valid| {
            c.fetch_add(1, Ordering::SeqCst);
            f.lock().push(valid);
        });
        (count, flags)
    }

    #[test]
    fn blocking_initialization_loads_once() {
        let store = Arc::new(MemoryStore::new());
        let stowage = Stowage::new(config(), store.clone(), resolver());
        stored_catalog(&store, &stowage);
        let (count, flags) = counting(&stowage);

        assert_eq!(stowage.initialize_blocking(), InitOutcome::Loaded { entries: 1 });
        assert_eq!(stowage.initialize_blocking(), InitOutcome::Loaded { entries: 1 });
        assert!(stowage.is_initialized());
        assert!(stowage.is_valid());
        assert_eq!(store.reads(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(*flags.lock(), vec![true]);

        let mut query = stowage.query().by_name("someAsset");
        assert!(query.get_result().is_some());
    }

    #[test]
    fn missing_catalog_is_initialized_but_invalid() {
        let stowage = Stowage::new(config(), Arc::new(MemoryStore::new()), resolver());
        let (_, flags) = counting(&stowage);

        assert_eq!(stowage.initialize_blocking(), InitOutcome::NotFound);
        assert!(stowage.is_initialized());
        assert!(!stowage.is_valid());
        assert_eq!(*flags.lock(), vec![false]);
        assert!(stowage.query().get_results().is_empty());
    }

    #[test]
    fn malformed_catalog_never_escapes_as_error() {
        let store = Arc::new(MemoryStore::new());
        store.insert("ResourcesCache", b"{ definitely not a catalog".to_vec());
        let stowage = Stowage::new(config(), store, resolver());

        assert_eq!(stowage.initialize_blocking(), InitOutcome::Malformed);
        assert!(stowage.is_initialized());
        assert!(stowage.manifest().is_none());
    }

    #[test]
    fn query_before_initialization_is_empty() {
        let stowage = Stowage::new(config(), Arc::new(MemoryStore::new()), resolver());
        assert!(stowage.query().get_results().is_empty());
        assert!(!stowage.is_initialized());
    }

    #[tokio::test]
    async fn cancelled_before_start_leaves_state_untouched() {
        let store = Arc::new(MemoryStore::new());
        let stowage = Stowage::new(config(), store.clone(), resolver());
        stored_catalog(&store, &stowage);
        let (count, _) = counting(&stowage);

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(stowage.initialize_cancelable(&cancel).await, None);
        assert!(!stowage.is_initialized());
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(store.reads(), 0);

        // A later uncancelled call still loads.
        assert!(stowage.initialize().await.is_valid());
    }

    #[tokio::test]
    async fn reinitialize_runs_a_new_cycle() {
        let store = Arc::new(MemoryStore::new());
        let stowage = Stowage::new(config(), store.clone(), resolver());
        let (_, flags) = counting(&stowage);

        assert_eq!(stowage.initialize().await, InitOutcome::NotFound);
        stored_catalog(&store, &stowage);
        // Initialization is once-only until explicitly reset.
        assert_eq!(stowage.initialize().await, InitOutcome::NotFound);
        assert_eq!(stowage.reinitialize().await, InitOutcome::Loaded { entries: 1 });
        assert_eq!(*flags.lock(), vec![false, true]);
    }

    #[test]
    fn global_instance_is_installed_once() {
        let first = Arc::new(Stowage::new(config(), Arc::new(MemoryStore::new()), resolver()));
        let second = Arc::new(Stowage::new(config(), Arc::new(MemoryStore::new()), resolver()));
        assert!(Stowage::install_global(Arc::clone(&first)).is_ok());
        assert!(Stowage::install_global(second).is_err());
        assert!(Arc::ptr_eq(Stowage::global().unwrap(), &first));
    }

    #[test]
    fn unsubscribed_callbacks_are_not_called() {
        let stowage = Stowage::new(config(), Arc::new(MemoryStore::new()), resolver());
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let id = stowage.subscribe(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert!(stowage.unsubscribe(id));
        assert!(!stowage.unsubscribe(id));

        stowage.initialize_blocking();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
