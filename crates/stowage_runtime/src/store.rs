//! Where persisted catalogs live.
//!
//! A [`CatalogStore`] reads and writes opaque blobs by `/`-separated
//! location. A missing blob is `Ok(None)`, not an error.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a [`CatalogStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the blob failed.
    #[error("i/o error at '{location}': {source}")]
    Io {
        /// Store location of the blob.
        location: String,
        /// Underlying failure.
        source: io::Error,
    },
}

/// Blob storage for catalogs.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Reads the blob at `location`, or `None` if there is none.
    fn read(&self, location: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Writes `bytes` to `location`, replacing any previous blob.
    fn write(&self, location: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Non-blocking [`read`](Self::read). Defaults to the blocking one.
    async fn read_async(&self, location: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.read(location)
    }

    /// Non-blocking [`write`](Self::write). Defaults to the blocking one.
    async fn write_async(&self, location: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.write(location, bytes)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FileStore
// ─────────────────────────────────────────────────────────────────────────────

/// Default file extension of catalogs written by [`FileStore`].
pub const DEFAULT_EXTENSION: &str = "json";

/// Stores catalogs as files below a root directory.
///
/// Location `Generated/ResourcesCache` maps to
/// `<root>/Generated/ResourcesCache.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    extension: Option<String>,
}

impl FileStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: Some(DEFAULT_EXTENSION.to_string()),
        }
    }

    /// Sets the file extension appended to locations. Blank means none.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = (!extension.trim().is_empty()).then_some(extension);
        self
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file path backing `location`.
    #[must_use]
    pub fn path_of(&self, location: &str) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(location.split('/').filter(|segment| !segment.is_empty()));
        if let Some(extension) = &self.extension {
            path.set_extension(extension);
        }
        path
    }
}

impl CatalogStore for FileStore {
    fn read(&self, location: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_of(location);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                location: location.to_string(),
                source,
            }),
        }
    }

    fn write(&self, location: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_of(location);
        let io_error = |source| StoreError::Io {
            location: location.to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        std::fs::write(&path, bytes).map_err(io_error)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "catalog written");
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MemoryStore
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStore;

#[cfg(any(test, feature = "test-utils"))]
mod memory {
    use core::sync::atomic::{AtomicUsize, Ordering};

    use hashbrown::HashMap;
    use parking_lot::RwLock;

    use super::{CatalogStore, StoreError};

    /// In-memory store for tests. Counts reads so tests can assert that
    /// concurrent initializations load once.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        blobs: RwLock<HashMap<String, Vec<u8>>>,
        reads: AtomicUsize,
    }

    impl MemoryStore {
        /// Creates an empty store.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Puts `bytes` at `location`.
        pub fn insert(&self, location: impl Into<String>, bytes: impl Into<Vec<u8>>) {
            self.blobs.write().insert(location.into(), bytes.into());
        }

        /// The blob at `location`, if any.
        #[must_use]
        pub fn get(&self, location: &str) -> Option<Vec<u8>> {
            self.blobs.read().get(location).cloned()
        }

        /// Number of reads served.
        #[must_use]
        pub fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl CatalogStore for MemoryStore {
        fn read(&self, location: &str) -> Result<Option<Vec<u8>>, StoreError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.get(location))
        }

        fn write(&self, location: &str, bytes: &[u8]) -> Result<(), StoreError> {
            self.insert(location, bytes);
            Ok(())
        }
    }
}
