//! Seams to the host's asset pipeline.
//!
//! The catalog never performs asset I/O itself. Generation asks an
//! [`AssetLoader`] once per source path what kind of asset lives there and an
//! [`IdentityResolver`] for its stable key. Consumers load live assets
//! through the same loader using the paths carried by query results.

use async_trait::async_trait;

use crate::capability::{Capability, CapabilitySet};
use crate::entry::{CatalogEntry, Identity};
use crate::error::LoadError;

/// What a loaded asset is, as far as the catalog is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetShape {
    /// A container object; lists the concrete type of every attached
    /// behavior, implicit defaults included.
    Composite(Vec<Capability>),
    /// A plain asset of a single concrete type.
    Single(Capability),
}

impl AssetShape {
    /// The capability set recorded for the asset.
    ///
    /// Composite members keep their attachment order; duplicates collapse.
    #[must_use]
    pub fn capabilities(&self) -> CapabilitySet {
        match self {
            Self::Composite(members) => members.iter().cloned().collect(),
            Self::Single(capability) => CapabilitySet::single(capability.clone()),
        }
    }

    /// Returns `true` if the asset is a container object.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }
}

/// An object produced by an [`AssetLoader`].
pub trait Asset: Send + Sync {
    /// Describes the asset's capabilities.
    fn shape(&self) -> AssetShape;
}

impl Asset for AssetShape {
    fn shape(&self) -> AssetShape {
        self.clone()
    }
}

/// Loads assets by logical path (relative path without extension).
///
/// `filter` restricts the lookup to assets carrying the capability or one of
/// its subtypes; loaders return `Ok(None)` when nothing matches.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// The live object type.
    type Asset: Asset;

    /// Loads the asset at `logical_path`, blocking the caller.
    fn load(
        &self,
        logical_path: &str,
        filter: Option<&Capability>,
    ) -> Result<Option<Self::Asset>, LoadError>;

    /// Loads the asset at `logical_path` without blocking.
    ///
    /// Defaults to [`load`](Self::load).
    async fn load_async(
        &self,
        logical_path: &str,
        filter: Option<&Capability>,
    ) -> Result<Option<Self::Asset>, LoadError> {
        self.load(logical_path, filter)
    }
}

/// Convenience methods for loading query results.
#[async_trait]
pub trait AssetLoaderExt: AssetLoader {
    /// Loads the asset behind `entry`.
    fn load_entry(
        &self,
        entry: &CatalogEntry,
        filter: Option<&Capability>,
    ) -> Result<Option<Self::Asset>, LoadError> {
        self.load(entry.logical_path(), filter)
    }

    /// Loads the asset behind `entry` without blocking.
    async fn load_entry_async(
        &self,
        entry: &CatalogEntry,
        filter: Option<&Capability>,
    ) -> Result<Option<Self::Asset>, LoadError> {
        self.load_async(entry.logical_path(), filter).await
    }
}

impl<L: AssetLoader + ?Sized> AssetLoaderExt for L {}

/// Maps a raw source path to the asset's stable identity.
pub trait IdentityResolver: Send + Sync {
    /// Resolves the identity of the asset at `raw_path`.
    fn identity(&self, raw_path: &str) -> Result<Identity, LoadError>;
}

impl<F> IdentityResolver for F
where
    F: Fn(&str) -> Result<Identity, LoadError> + Send + Sync,
{
    fn identity(&self, raw_path: &str) -> Result<Identity, LoadError> {
        self(raw_path)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test doubles
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(any(test, feature = "test-utils"))]
pub use static_loader::StaticLoader;

#[cfg(any(test, feature = "test-utils"))]
mod static_loader {
    use core::sync::atomic::{AtomicUsize, Ordering};

    use hashbrown::HashMap;
    use parking_lot::RwLock;

    use super::{AssetLoader, AssetShape, Capability, LoadError};

    /// Scripted in-memory loader for tests.
    ///
    /// Serves the shapes registered with [`insert`](Self::insert) and counts
    /// every call so tests can assert how often the catalog touched it.
    #[derive(Debug, Default)]
    pub struct StaticLoader {
        assets: RwLock<HashMap<String, AssetShape>>,
        failures: RwLock<HashMap<String, String>>,
        calls: AtomicUsize,
    }

    impl StaticLoader {
        /// Creates an empty loader.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Registers `shape` under `logical_path`.
        #[must_use]
        pub fn with_asset(self, logical_path: impl Into<String>, shape: AssetShape) -> Self {
            self.insert(logical_path, shape);
            self
        }

        /// Registers `shape` under `logical_path`.
        pub fn insert(&self, logical_path: impl Into<String>, shape: AssetShape) {
            self.assets.write().insert(logical_path.into(), shape);
        }

        /// Makes every load of `logical_path` fail with `message`.
        pub fn fail(&self, logical_path: impl Into<String>, message: impl Into<String>) {
            self.failures
                .write()
                .insert(logical_path.into(), message.into());
        }

        /// Number of load calls served so far.
        #[must_use]
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl AssetLoader for StaticLoader {
        type Asset = AssetShape;

        fn load(
            &self,
            logical_path: &str,
            filter: Option<&Capability>,
        ) -> Result<Option<AssetShape>, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = self.failures.read().get(logical_path) {
                return Err(LoadError::new(message.clone()));
            }
            let shape = self.assets.read().get(logical_path).cloned();
            Ok(shape.filter(|shape| {
                filter.is_none_or(|wanted| shape.capabilities().contains_kind(wanted))
            }))
        }
    }
}
