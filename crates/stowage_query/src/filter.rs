//! The fixed filter vocabulary of a [`Query`](crate::query::Query).
//!
//! Filters are grouped in categories. A [`FilterSet`] holds at most one
//! filter per category; installing a filter replaces whatever the category
//! held before.

use std::borrow::Cow;

use stowage_catalog::{CapabilitySet, CatalogEntry, Identity};

// ─────────────────────────────────────────────────────────────────────────────
// Text matching
// ─────────────────────────────────────────────────────────────────────────────

/// How text filters compare strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// Exact, case-sensitive comparison.
    #[default]
    Ordinal,
    /// Case-insensitive comparison using Unicode lowercase folding.
    IgnoreCase,
}

impl Comparison {
    fn fold<'a>(self, text: &'a str) -> Cow<'a, str> {
        match self {
            Self::Ordinal => Cow::Borrowed(text),
            Self::IgnoreCase => Cow::Owned(text.to_lowercase()),
        }
    }
}

/// Text a filter compares against, with its [`Comparison`].
///
/// Plain strings convert into ordinal patterns:
///
/// ```
/// use stowage_query::filter::{Comparison, TextPattern};
///
/// let ordinal: TextPattern = "someAsset".into();
/// assert_eq!(ordinal.comparison(), Comparison::Ordinal);
///
/// let folded = TextPattern::ignore_case("SOMEASSET");
/// assert!(folded.matches_exact("someAsset"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPattern {
    text: String,
    comparison: Comparison,
}

impl TextPattern {
    /// Creates an ordinal pattern.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            comparison: Comparison::Ordinal,
        }
    }

    /// Creates a case-insensitive pattern.
    #[must_use]
    pub fn ignore_case(text: impl Into<String>) -> Self {
        Self::new(text).with_comparison(Comparison::IgnoreCase)
    }

    /// Sets the comparison mode.
    #[must_use]
    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self
    }

    /// The pattern text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The comparison mode.
    #[must_use]
    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    /// Returns `true` if the pattern is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Returns `true` if `candidate` equals the pattern.
    #[must_use]
    pub fn matches_exact(&self, candidate: &str) -> bool {
        self.comparison.fold(candidate) == self.comparison.fold(&self.text)
    }

    /// Returns `true` if `candidate` contains the pattern.
    #[must_use]
    pub fn matches_within(&self, candidate: &str) -> bool {
        self.comparison
            .fold(candidate)
            .contains(&*self.comparison.fold(&self.text))
    }

    /// Returns `true` if `candidate` starts with the pattern.
    #[must_use]
    pub fn matches_prefix(&self, candidate: &str) -> bool {
        self.comparison
            .fold(candidate)
            .starts_with(&*self.comparison.fold(&self.text))
    }
}

impl From<&str> for TextPattern {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for TextPattern {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&String> for TextPattern {
    fn from(text: &String) -> Self {
        Self::new(text.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Categories
// ─────────────────────────────────────────────────────────────────────────────

/// Name category: exact name or name substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameFilter {
    /// The entry name equals the pattern.
    Exact(TextPattern),
    /// The entry name contains the pattern.
    Contains(TextPattern),
}

impl NameFilter {
    /// Returns `true` if `entry` passes the filter.
    #[must_use]
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        match self {
            Self::Exact(pattern) => pattern.matches_exact(entry.name()),
            Self::Contains(pattern) => pattern.matches_within(entry.name()),
        }
    }
}

/// Path category, evaluated against the logical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFilter {
    /// The logical path starts with the pattern.
    Prefix(TextPattern),
    /// The logical path contains the pattern.
    Contains(TextPattern),
    /// The entry sits directly in a resources root.
    AtRoot,
}

impl PathFilter {
    /// Returns `true` if `entry` passes the filter.
    #[must_use]
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        match self {
            Self::Prefix(pattern) => pattern.matches_prefix(entry.logical_path()),
            Self::Contains(pattern) => pattern.matches_within(entry.logical_path()),
            Self::AtRoot => entry.is_at_root(),
        }
    }
}

/// Package category. Both variants only match packaged entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageFilter {
    /// The package name equals the pattern.
    Exact(TextPattern),
    /// The package name contains the pattern.
    Contains(TextPattern),
}

impl PackageFilter {
    /// Returns `true` if `entry` passes the filter.
    #[must_use]
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        let Some(package) = entry.package() else {
            return false;
        };
        match self {
            Self::Exact(pattern) => pattern.matches_exact(package),
            Self::Contains(pattern) => pattern.matches_within(package),
        }
    }
}

/// Inclusive capability category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentInclusion {
    /// The entry carries every listed capability.
    All(CapabilitySet),
    /// The entry carries at least one listed capability.
    Some(CapabilitySet),
}

impl ComponentInclusion {
    /// Returns `true` if `entry` passes the filter.
    #[must_use]
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        match self {
            Self::All(set) => entry.capabilities().is_superset(set),
            Self::Some(set) => entry.capabilities().overlaps(set),
        }
    }
}

/// Exclusive capability category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentExclusion {
    /// The entry carries none of the listed capabilities.
    Any(CapabilitySet),
    /// The entry lacks at least one listed capability.
    All(CapabilitySet),
}

impl ComponentExclusion {
    /// Returns `true` if `entry` passes the filter.
    #[must_use]
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        match self {
            Self::Any(set) => !entry.capabilities().overlaps(set),
            Self::All(set) => !entry.capabilities().is_superset(set),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FilterSet
// ─────────────────────────────────────────────────────────────────────────────

/// One optional filter per category.
///
/// Setters take an `Option`: `Some` installs the filter and evicts the
/// previous one, `None` clears the category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    name: Option<NameFilter>,
    path: Option<PathFilter>,
    package: Option<PackageFilter>,
    in_package: Option<bool>,
    identity: Option<Identity>,
    inclusion: Option<ComponentInclusion>,
    exclusion: Option<ComponentExclusion>,
}

impl FilterSet {
    /// Creates an empty filter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or clears the name category.
    pub fn set_name(&mut self, filter: Option<NameFilter>) {
        self.name = filter;
    }

    /// Sets or clears the path category.
    pub fn set_path(&mut self, filter: Option<PathFilter>) {
        self.path = filter;
    }

    /// Sets or clears the package category. Installing a package filter
    /// also clears the in-package flag.
    pub fn set_package(&mut self, filter: Option<PackageFilter>) {
        if filter.is_some() {
            self.in_package = None;
        }
        self.package = filter;
    }

    /// Sets or clears the in-package flag.
    pub fn set_in_package(&mut self, in_package: Option<bool>) {
        self.in_package = in_package;
    }

    /// Sets or clears the identity filter.
    pub fn set_identity(&mut self, identity: Option<Identity>) {
        self.identity = identity;
    }

    /// Sets or clears the inclusive capability category.
    pub fn set_inclusion(&mut self, filter: Option<ComponentInclusion>) {
        self.inclusion = filter;
    }

    /// Sets or clears the exclusive capability category.
    pub fn set_exclusion(&mut self, filter: Option<ComponentExclusion>) {
        self.exclusion = filter;
    }

    /// The active name filter.
    #[must_use]
    pub fn name(&self) -> Option<&NameFilter> {
        self.name.as_ref()
    }

    /// The active path filter.
    #[must_use]
    pub fn path(&self) -> Option<&PathFilter> {
        self.path.as_ref()
    }

    /// The active package filter.
    #[must_use]
    pub fn package(&self) -> Option<&PackageFilter> {
        self.package.as_ref()
    }

    /// The active in-package flag.
    #[must_use]
    pub fn in_package(&self) -> Option<bool> {
        self.in_package
    }

    /// The active identity filter.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// The active inclusive capability filter.
    #[must_use]
    pub fn inclusion(&self) -> Option<&ComponentInclusion> {
        self.inclusion.as_ref()
    }

    /// The active exclusive capability filter.
    #[must_use]
    pub fn exclusion(&self) -> Option<&ComponentExclusion> {
        self.exclusion.as_ref()
    }

    /// Returns `true` if no category holds a filter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.path.is_none()
            && self.package.is_none()
            && self.in_package.is_none()
            && self.identity.is_none()
            && self.inclusion.is_none()
            && self.exclusion.is_none()
    }

    /// Returns `true` if `entry` passes every active filter.
    ///
    /// An active identity filter replaces all other categories.
    #[must_use]
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        if let Some(identity) = &self.identity {
            return entry.identity() == identity;
        }
        self.name.as_ref().is_none_or(|f| f.matches(entry))
            && self.path.as_ref().is_none_or(|f| f.matches(entry))
            && self.package.as_ref().is_none_or(|f| f.matches(entry))
            && self.in_package.is_none_or(|flag| entry.is_packaged() == flag)
            && self.inclusion.as_ref().is_none_or(|f| f.matches(entry))
            && self.exclusion.as_ref().is_none_or(|f| f.matches(entry))
    }
}
