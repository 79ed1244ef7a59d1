//! The fluent query engine.
//!
//! A [`Query`] accumulates filters while [`Building`](QueryState::Building),
//! evaluates once on the first `get_*` call and caches the result for the
//! rest of its life. Filters set after that point are ignored. Disposing a
//! query releases its manifest and makes every later read empty.
//!
//! ```
//! use std::sync::Arc;
//!
//! use chrono::Utc;
//! use stowage_catalog::{Capability, CapabilitySet, Catalog, CatalogEntry, Identity};
//! use stowage_query::CatalogManifest;
//!
//! let text = Capability::new("engine::TextAsset");
//! let entry = CatalogEntry::new(
//!     Identity::new("1"),
//!     "myTestFolder/someAsset.txt",
//!     None,
//!     CapabilitySet::single(text),
//!     '/',
//! );
//! let manifest = Arc::new(CatalogManifest::new(Catalog::new(Utc::now(), vec![entry], '/')));
//!
//! let mut query = manifest.query().by_name_substring("some").by_path("myTestFolder");
//! assert_eq!(query.get_result().map(|e| e.name()), Some("someAsset"));
//! ```

use std::sync::Arc;

use stowage_catalog::{Capability, CapabilitySet, CatalogEntry, Identity};

use crate::filter::{
    ComponentExclusion, ComponentInclusion, FilterSet, NameFilter, PackageFilter, PathFilter,
    TextPattern,
};
use crate::manifest::CatalogManifest;

/// Lifecycle of a [`Query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    /// Accepting filters.
    Building,
    /// Results are materialized; filters are frozen.
    Executed,
    /// The manifest is released; every read is empty.
    Disposed,
}

/// A single-use, single-owner query over a [`CatalogManifest`].
#[derive(Debug)]
pub struct Query {
    manifest: Option<Arc<CatalogManifest>>,
    filters: FilterSet,
    results: Vec<CatalogEntry>,
    state: QueryState,
}

impl Query {
    /// Creates a query over `manifest`.
    #[must_use]
    pub fn new(manifest: Arc<CatalogManifest>) -> Self {
        Self {
            manifest: Some(manifest),
            filters: FilterSet::new(),
            results: Vec::new(),
            state: QueryState::Building,
        }
    }

    /// Creates a query with no manifest behind it. Every read is empty.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            manifest: None,
            filters: FilterSet::new(),
            results: Vec::new(),
            state: QueryState::Building,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> QueryState {
        self.state
    }

    /// The filters accumulated so far.
    #[must_use]
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    fn mutate(mut self, filter: &'static str, apply: impl FnOnce(&mut FilterSet)) -> Self {
        if self.state == QueryState::Building {
            apply(&mut self.filters);
        } else {
            tracing::debug!(filter, state = ?self.state, "ignoring filter on consumed query");
        }
        self
    }

    // ─────────────────────────────────────────────────────────────────────
    // Name
    // ─────────────────────────────────────────────────────────────────────

    /// Keeps entries whose name equals `name`. Replaces any name filter; a
    /// blank name clears the category.
    #[must_use]
    pub fn by_name(self, name: impl Into<TextPattern>) -> Self {
        let filter = non_blank(name.into()).map(NameFilter::Exact);
        self.mutate("by_name", |filters| filters.set_name(filter))
    }

    /// Keeps entries whose name contains `name`. Replaces any name filter; a
    /// blank name clears the category.
    #[must_use]
    pub fn by_name_substring(self, name: impl Into<TextPattern>) -> Self {
        let filter = non_blank(name.into()).map(NameFilter::Contains);
        self.mutate("by_name_substring", |filters| filters.set_name(filter))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Identity
    // ─────────────────────────────────────────────────────────────────────

    /// Keeps only the entries with exactly this identity.
    ///
    /// While set, every other filter is ignored. A blank identity clears it.
    #[must_use]
    pub fn by_identity(self, identity: impl AsRef<str>) -> Self {
        let identity = identity.as_ref();
        let filter = (!identity.trim().is_empty()).then(|| Identity::new(identity));
        self.mutate("by_identity", |filters| filters.set_identity(filter))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Path
    // ─────────────────────────────────────────────────────────────────────

    /// Keeps entries sitting directly in a resources root. Replaces any path
    /// filter.
    #[must_use]
    pub fn at_root(self) -> Self {
        self.mutate("at_root", |filters| filters.set_path(Some(PathFilter::AtRoot)))
    }

    /// Keeps entries whose logical path starts with `path`. Replaces any path
    /// filter; a blank path clears the category.
    #[must_use]
    pub fn by_path(self, path: impl Into<TextPattern>) -> Self {
        let filter = non_blank(path.into()).map(PathFilter::Prefix);
        self.mutate("by_path", |filters| filters.set_path(filter))
    }

    /// Keeps entries whose logical path contains `path`. Replaces any path
    /// filter; a blank path clears the category.
    #[must_use]
    pub fn by_path_substring(self, path: impl Into<TextPattern>) -> Self {
        let filter = non_blank(path.into()).map(PathFilter::Contains);
        self.mutate("by_path_substring", |filters| filters.set_path(filter))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Package
    // ─────────────────────────────────────────────────────────────────────

    /// Keeps packaged entries whose package equals `package`. Clears the
    /// in-package flag; a blank package clears the category.
    #[must_use]
    pub fn by_package(self, package: impl Into<TextPattern>) -> Self {
        let filter = non_blank(package.into()).map(PackageFilter::Exact);
        self.mutate("by_package", |filters| filters.set_package(filter))
    }

    /// Keeps packaged entries whose package contains `package`. Clears the
    /// in-package flag; a blank package clears the category.
    #[must_use]
    pub fn by_package_substring(self, package: impl Into<TextPattern>) -> Self {
        let filter = non_blank(package.into()).map(PackageFilter::Contains);
        self.mutate("by_package_substring", |filters| filters.set_package(filter))
    }

    /// Keeps entries that are (or are not) shipped in a package.
    #[must_use]
    pub fn in_package(self, in_package: bool) -> Self {
        self.mutate("in_package", |filters| filters.set_in_package(Some(in_package)))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Components
    // ─────────────────────────────────────────────────────────────────────

    /// Keeps entries carrying every listed capability.
    ///
    /// Shares a category with [`with_some_components`](Self::with_some_components).
    /// `None` items are skipped; an empty list clears the category.
    #[must_use]
    pub fn with_all_components<I>(self, components: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Capability>>,
    {
        let filter = capability_set(components).map(ComponentInclusion::All);
        self.mutate("with_all_components", |filters| filters.set_inclusion(filter))
    }

    /// Keeps entries carrying at least one listed capability.
    ///
    /// Shares a category with [`with_all_components`](Self::with_all_components).
    /// `None` items are skipped; an empty list clears the category.
    #[must_use]
    pub fn with_some_components<I>(self, components: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Capability>>,
    {
        let filter = capability_set(components).map(ComponentInclusion::Some);
        self.mutate("with_some_components", |filters| filters.set_inclusion(filter))
    }

    /// Keeps entries carrying none of the listed capabilities.
    ///
    /// Shares a category with [`without_all_components`](Self::without_all_components).
    /// `None` items are skipped; an empty list clears the category.
    #[must_use]
    pub fn without_any_components<I>(self, components: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Capability>>,
    {
        let filter = capability_set(components).map(ComponentExclusion::Any);
        self.mutate("without_any_components", |filters| filters.set_exclusion(filter))
    }

    /// Keeps entries missing at least one of the listed capabilities.
    ///
    /// Shares a category with [`without_any_components`](Self::without_any_components).
    /// `None` items are skipped; an empty list clears the category.
    #[must_use]
    pub fn without_all_components<I>(self, components: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Capability>>,
    {
        let filter = capability_set(components).map(ComponentExclusion::All);
        self.mutate("without_all_components", |filters| filters.set_exclusion(filter))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Evaluation
    // ─────────────────────────────────────────────────────────────────────

    /// The first match, or `None`.
    ///
    /// A query with no filters at all matches nothing here; use
    /// [`get_results`](Self::get_results) to list the whole manifest.
    pub fn get_result(&mut self) -> Option<&CatalogEntry> {
        if self.state == QueryState::Building && self.filters.is_empty() {
            self.results.clear();
            self.state = QueryState::Executed;
            return None;
        }
        self.execute(None).first()
    }

    /// Every match, in manifest order.
    pub fn get_results(&mut self) -> &[CatalogEntry] {
        self.execute(None)
    }

    /// The first match carrying `capability` or one of its subtypes.
    ///
    /// With an identity filter set, the capability is not checked.
    pub fn get_result_of(&mut self, capability: &Capability) -> Option<&CatalogEntry> {
        self.execute(Some(capability)).first()
    }

    /// Every match carrying `capability` or one of its subtypes.
    pub fn get_results_of(&mut self, capability: &Capability) -> &[CatalogEntry] {
        self.execute(Some(capability))
    }

    /// Releases the manifest. Later reads are empty.
    pub fn dispose(&mut self) {
        if self.state == QueryState::Disposed {
            return;
        }
        self.manifest = None;
        self.filters = FilterSet::new();
        self.results = Vec::new();
        self.state = QueryState::Disposed;
    }

    fn execute(&mut self, kind: Option<&Capability>) -> &[CatalogEntry] {
        match self.state {
            QueryState::Disposed => return &[],
            QueryState::Executed => return &self.results,
            QueryState::Building => {}
        }

        // An identity lookup ignores the typed filter as well.
        let kind = kind.filter(|_| self.filters.identity().is_none());
        let results: Vec<CatalogEntry> = match &self.manifest {
            Some(manifest) => manifest
                .entries()
                .iter()
                .filter(|entry| {
                    self.filters.matches(entry)
                        && kind.is_none_or(|capability| entry.has_capability(capability))
                })
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        tracing::trace!(
            matches = results.len(),
            kind = kind.map(Capability::name),
            "query executed"
        );

        self.results = results;
        self.state = QueryState::Executed;
        &self.results
    }
}

fn non_blank(pattern: TextPattern) -> Option<TextPattern> {
    (!pattern.is_blank()).then_some(pattern)
}

fn capability_set<I>(components: I) -> Option<CapabilitySet>
where
    I: IntoIterator,
    I::Item: Into<Option<Capability>>,
{
    let set: CapabilitySet = components.into_iter().filter_map(Into::into).collect();
    (!set.is_empty()).then_some(set)
}
