//! The immutable catalog snapshot.

use chrono::{DateTime, Utc};

use crate::entry::CatalogEntry;

/// Snapshot of every discovered asset at a point in time.
///
/// A catalog is produced once by the [`CatalogGenerator`](crate::generator::CatalogGenerator)
/// or the [`CatalogCodec`](crate::codec::CatalogCodec) and never mutated; a
/// refresh builds a new catalog that replaces the old one wholesale.
///
/// Entry order is discovery order and is significant: "first match" queries
/// depend on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    created_at: DateTime<Utc>,
    entries: Vec<CatalogEntry>,
    path_separator: char,
}

impl Catalog {
    /// Creates a catalog from its parts.
    #[must_use]
    pub fn new(created_at: DateTime<Utc>, entries: Vec<CatalogEntry>, path_separator: char) -> Self {
        Self {
            created_at,
            entries,
            path_separator,
        }
    }

    /// When the catalog was generated.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Entries in discovery order.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// The separator joining relative-path segments in this catalog.
    #[must_use]
    pub fn path_separator(&self) -> char {
        self.path_separator
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decomposes the catalog into its parts.
    #[must_use]
    pub fn into_parts(self) -> (DateTime<Utc>, Vec<CatalogEntry>, char) {
        (self.created_at, self.entries, self.path_separator)
    }
}
