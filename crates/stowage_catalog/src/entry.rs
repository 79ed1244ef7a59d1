//! Catalog entries and asset identities.

use core::fmt;
use std::sync::Arc;

use crate::capability::{Capability, CapabilitySet};
use crate::layout;

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Stable, path-independent key of an asset (content hash, import GUID, ...).
///
/// Identities are opaque: they are compared as exact strings and never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(Arc<str>);

impl Identity {
    /// Wraps an identity string.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Identity {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CatalogEntry
// ─────────────────────────────────────────────────────────────────────────────

#[derive(PartialEq, Eq)]
struct EntryData {
    identity: Identity,
    relative_path: String,
    package: Option<String>,
    capabilities: CapabilitySet,
    separator: char,
}

/// One discovered asset, addressed relative to its nearest resources root.
///
/// Entries are immutable and cheap to clone. Everything other than the
/// identity, relative path, package and capabilities is derived on demand.
#[derive(Clone, PartialEq, Eq)]
pub struct CatalogEntry(Arc<EntryData>);

impl CatalogEntry {
    /// Creates an entry.
    ///
    /// `separator` is the character joining the segments of `relative_path`.
    /// Callers guarantee `capabilities` is non-empty; the entry builder and
    /// the codec both enforce it.
    #[must_use]
    pub fn new(
        identity: Identity,
        relative_path: impl Into<String>,
        package: Option<String>,
        capabilities: CapabilitySet,
        separator: char,
    ) -> Self {
        Self(Arc::new(EntryData {
            identity,
            relative_path: relative_path.into(),
            package: package.filter(|name| !name.trim().is_empty()),
            capabilities,
            separator,
        }))
    }

    /// The stable identity shared by every entry produced from one source path.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.0.identity
    }

    /// Path relative to the resources root, including the extension.
    #[must_use]
    pub fn relative_path(&self) -> &str {
        &self.0.relative_path
    }

    /// Owning package, if the asset ships in one.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.0.package.as_deref()
    }

    /// Returns `true` if the asset ships in a package.
    #[must_use]
    pub fn is_packaged(&self) -> bool {
        self.0.package.is_some()
    }

    /// Every capability attached to the asset.
    #[must_use]
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.0.capabilities
    }

    /// The asset's primary capability.
    #[must_use]
    pub fn primary_capability(&self) -> Option<&Capability> {
        self.0.capabilities.primary()
    }

    /// Returns `true` if any capability is `capability` or a subtype of it.
    #[must_use]
    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.0.capabilities.contains_kind(capability)
    }

    /// Separator joining the segments of the relative path.
    #[must_use]
    pub fn separator(&self) -> char {
        self.0.separator
    }

    /// File name without extension.
    #[must_use]
    pub fn name(&self) -> &str {
        layout::strip_extension(self.file_name(), self.0.separator)
    }

    /// File name including extension.
    #[must_use]
    pub fn file_name(&self) -> &str {
        layout::file_name(&self.0.relative_path, self.0.separator)
    }

    /// Extension without the dot.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        layout::extension(&self.0.relative_path, self.0.separator)
    }

    /// Relative path without extension; the key handed to asset loaders.
    #[must_use]
    pub fn logical_path(&self) -> &str {
        layout::strip_extension(&self.0.relative_path, self.0.separator)
    }

    /// Directory of the logical path, `""` when the asset sits at a root.
    #[must_use]
    pub fn directory(&self) -> &str {
        layout::directory(self.logical_path(), self.0.separator)
    }

    /// Returns `true` if the asset sits directly in a resources root.
    #[must_use]
    pub fn is_at_root(&self) -> bool {
        self.directory().is_empty()
    }

    /// Rebuilds the entry with `to` in place of every `from` separator.
    #[must_use]
    pub fn with_separator(&self, from: char, to: char) -> Self {
        if from == to {
            return self.clone();
        }
        Self(Arc::new(EntryData {
            identity: self.0.identity.clone(),
            relative_path: self.0.relative_path.replace(from, to.encode_utf8(&mut [0; 4])),
            package: self.0.package.clone(),
            capabilities: self.0.capabilities.clone(),
            separator: to,
        }))
    }
}

impl fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("identity", &self.0.identity.as_str())
            .field("relative_path", &self.0.relative_path)
            .field("package", &self.0.package)
            .field("capabilities", &self.0.capabilities)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, package: Option<&str>) -> CatalogEntry {
        CatalogEntry::new(
            Identity::new("b3f1"),
            path,
            package.map(str::to_string),
            CapabilitySet::single(Capability::new("engine::TextAsset")),
            '/',
        )
    }

    #[test]
    fn derived_views() {
        let entry = entry("myTestFolder/someAsset.asset", None);
        assert_eq!(entry.name(), "someAsset");
        assert_eq!(entry.file_name(), "someAsset.asset");
        assert_eq!(entry.extension(), Some("asset"));
        assert_eq!(entry.logical_path(), "myTestFolder/someAsset");
        assert_eq!(entry.directory(), "myTestFolder");
        assert!(!entry.is_at_root());
        assert!(!entry.is_packaged());
    }

    #[test]
    fn logical_path_strips_only_the_trailing_extension() {
        // The extension text also appears earlier in the path.
        let entry = entry("asset.asset/inner.asset", None);
        assert_eq!(entry.logical_path(), "asset.asset/inner");
        assert_eq!(entry.name(), "inner");
    }

    #[test]
    fn top_level_entries_are_at_root() {
        let entry = entry("topLevelAsset.asset", Some("com.acme.tools"));
        assert!(entry.is_at_root());
        assert!(entry.is_packaged());
        assert_eq!(entry.package(), Some("com.acme.tools"));
    }

    #[test]
    fn blank_package_means_unpackaged() {
        assert!(!entry("a.txt", Some("  ")).is_packaged());
    }

    #[test]
    fn separator_rewrite() {
        let entry = CatalogEntry::new(
            Identity::new("1"),
            "foo|bar.asset",
            None,
            CapabilitySet::single(Capability::new("engine::TextAsset")),
            '|',
        );
        let local = entry.with_separator('|', '/');
        assert_eq!(local.relative_path(), "foo/bar.asset");
        assert_eq!(local.directory(), "foo");
        assert_eq!(local.separator(), '/');
        assert_eq!(local.identity(), entry.identity());
    }
}
