//! The queryable, in-memory form of a loaded catalog.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use stowage_catalog::{Catalog, CatalogEntry};

use crate::query::Query;

/// Read-only view over a decoded [`Catalog`].
///
/// Built once per load and shared behind an [`Arc`]; queries hold a clone of
/// that `Arc` until they are disposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogManifest {
    created_at: DateTime<Utc>,
    entries: Vec<CatalogEntry>,
}

impl CatalogManifest {
    /// Builds a manifest from a catalog.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        let (created_at, entries, _) = catalog.into_parts();
        Self {
            created_at,
            entries,
        }
    }

    /// When the underlying catalog was generated.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Entries in catalog order.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Starts a new query over this manifest.
    #[must_use]
    pub fn query(self: &Arc<Self>) -> Query {
        Query::new(Arc::clone(self))
    }
}

impl From<Catalog> for CatalogManifest {
    fn from(catalog: Catalog) -> Self {
        Self::new(catalog)
    }
}
