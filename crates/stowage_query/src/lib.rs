//! Catalog manifest and the fluent query engine for Stowage.
//!
//! A [`CatalogManifest`] is the read-only form of a loaded catalog. Queries
//! are obtained from it per lookup session, narrowed with a fixed vocabulary
//! of filters and read once:
//!
//! ```ignore
//! let mut query = manifest
//!     .query()
//!     .by_path("ui")
//!     .with_all_components([transform, renderer]);
//! for entry in query.get_results() {
//!     loader.load_entry(entry, None)?;
//! }
//! ```
//!
//! # Filter categories
//!
//! | Category | Setters |
//! |----------|---------|
//! | name | `by_name`, `by_name_substring` |
//! | path | `by_path`, `by_path_substring`, `at_root` |
//! | package | `by_package`, `by_package_substring` |
//! | in-package | `in_package` |
//! | identity | `by_identity` (overrides everything else) |
//! | inclusion | `with_all_components`, `with_some_components` |
//! | exclusion | `without_any_components`, `without_all_components` |
//!
//! Within a category the last setter wins.

pub mod filter;
pub mod manifest;
pub mod query;

pub use filter::{
    Comparison, ComponentExclusion, ComponentInclusion, FilterSet, NameFilter, PackageFilter,
    PathFilter, TextPattern,
};
pub use manifest::CatalogManifest;
pub use query::{Query, QueryState};

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::{CatalogManifest, Comparison, Query, QueryState, TextPattern};
}
