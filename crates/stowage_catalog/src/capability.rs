//! Capability markers, the registry that names them and the memoized resolver
//! used by the codec.
//!
//! A [`Capability`] is a type marker attached to an asset: either the asset's
//! own type or one of the behaviors attached to a composite asset. Capabilities
//! form a single-inheritance hierarchy so queries can ask for "this type or any
//! subtype of it".
//!
//! # Example
//!
//! ```
//! use stowage_catalog::capability::CapabilityRegistry;
//!
//! let mut registry = CapabilityRegistry::new();
//! let object = registry.register("engine::Object");
//! let texture = registry.register_subtype("engine::Texture", &object);
//!
//! assert!(texture.is_a(&object));
//! assert!(!object.is_a(&texture));
//! assert_eq!(texture.short_name(), "Texture");
//! ```

use core::fmt;
use core::hash::{Hash, Hasher};
use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hashbrown::HashMap;
use indexmap::IndexSet;
use parking_lot::RwLock;

// ─────────────────────────────────────────────────────────────────────────────
// Capability
// ─────────────────────────────────────────────────────────────────────────────

struct CapabilityInfo {
    name: Box<str>,
    parent: Option<Capability>,
}

/// A named type marker, optionally derived from a parent capability.
///
/// Cloning is cheap. Equality and hashing use the fully-qualified name only,
/// so a capability decoded from a catalog compares equal to the one the
/// registry handed out when the catalog was generated.
#[derive(Clone)]
pub struct Capability(Arc<CapabilityInfo>);

impl Capability {
    /// Creates a root capability with no parent.
    #[must_use]
    pub fn new(name: impl Into<Box<str>>) -> Self {
        Self(Arc::new(CapabilityInfo {
            name: name.into(),
            parent: None,
        }))
    }

    /// Creates a capability deriving from `parent`.
    #[must_use]
    pub fn with_parent(name: impl Into<Box<str>>, parent: &Capability) -> Self {
        Self(Arc::new(CapabilityInfo {
            name: name.into(),
            parent: Some(parent.clone()),
        }))
    }

    /// The fully-qualified name, as written to persisted catalogs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The last path segment of the name (`engine::Texture` -> `Texture`).
    #[must_use]
    pub fn short_name(&self) -> &str {
        let name = self.name();
        let after_colons = name.rsplit("::").next().unwrap_or(name);
        after_colons.rsplit('.').next().unwrap_or(after_colons)
    }

    /// The direct parent, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Capability> {
        self.0.parent.as_ref()
    }

    /// Iterates this capability followed by every ancestor, nearest first.
    pub fn lineage(&self) -> impl Iterator<Item = &Capability> {
        core::iter::successors(Some(self), |cap| cap.parent())
    }

    /// Returns `true` if this capability is `other` or derives from it.
    #[must_use]
    pub fn is_a(&self, other: &Capability) -> bool {
        self.lineage().any(|cap| cap == other)
    }
}

impl PartialEq for Capability {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.name == other.0.name
    }
}

impl Eq for Capability {}

impl Hash for Capability {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("name", &self.name())
            .field("parent", &self.parent().map(Capability::name))
            .finish()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CapabilitySet
// ─────────────────────────────────────────────────────────────────────────────

/// Insertion-ordered set of capabilities.
///
/// The first member is the entry's primary capability: the asset's own type
/// for plain assets, or the first attached behavior of a composite.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet(IndexSet<Capability>);

impl CapabilitySet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a single-member set.
    #[must_use]
    pub fn single(capability: Capability) -> Self {
        let mut set = IndexSet::with_capacity(1);
        set.insert(capability);
        Self(set)
    }

    /// Adds a capability, returning `false` if it was already present.
    pub fn insert(&mut self, capability: Capability) -> bool {
        self.0.insert(capability)
    }

    /// Number of distinct capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The primary (first inserted) capability.
    #[must_use]
    pub fn primary(&self) -> Option<&Capability> {
        self.0.first()
    }

    /// Returns `true` if `capability` is an exact member.
    #[must_use]
    pub fn contains(&self, capability: &Capability) -> bool {
        self.0.contains(capability)
    }

    /// Returns `true` if any member is `capability` or one of its subtypes.
    #[must_use]
    pub fn contains_kind(&self, capability: &Capability) -> bool {
        self.0.iter().any(|member| member.is_a(capability))
    }

    /// Returns `true` if every member of `other` is also in `self`.
    #[must_use]
    pub fn is_superset(&self, other: &CapabilitySet) -> bool {
        self.0.is_superset(&other.0)
    }

    /// Returns `true` if the two sets share at least one member.
    #[must_use]
    pub fn overlaps(&self, other: &CapabilitySet) -> bool {
        !self.0.is_disjoint(&other.0)
    }

    /// Iterates members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.0.iter()
    }

    /// Fully-qualified names of every member, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(Capability::name).collect()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CapabilitySet {
    type Item = &'a Capability;
    type IntoIter = indexmap::set::Iter<'a, Capability>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.iter().map(Capability::name)).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CapabilityRegistry
// ─────────────────────────────────────────────────────────────────────────────

/// Registry mapping fully-qualified names to capability descriptors.
///
/// Populate it once at startup with every capability the host knows about.
/// The codec resolves persisted names through it; a name missing from the
/// registry is handled by the codec's
/// [`UnresolvedCapabilityPolicy`](crate::codec::UnresolvedCapabilityPolicy).
#[derive(Default)]
pub struct CapabilityRegistry {
    // Maps fully-qualified names to descriptors.
    capabilities: HashMap<Box<str>, Capability>,
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("capabilities", &self.names())
            .finish()
    }
}

impl CapabilityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            capabilities: HashMap::new(),
        }
    }

    /// Registers a root capability and returns its descriptor.
    ///
    /// # Panics
    ///
    /// Panics if a capability with the same name is already registered.
    pub fn register(&mut self, name: impl Into<Box<str>>) -> Capability {
        self.insert(Capability::new(name))
    }

    /// Registers a capability deriving from `parent` and returns its descriptor.
    ///
    /// # Panics
    ///
    /// Panics if a capability with the same name is already registered.
    pub fn register_subtype(&mut self, name: impl Into<Box<str>>, parent: &Capability) -> Capability {
        self.insert(Capability::with_parent(name, parent))
    }

    fn insert(&mut self, capability: Capability) -> Capability {
        let name: Box<str> = capability.name().into();
        assert!(
            !self.capabilities.contains_key(&name),
            "capability '{name}' is already registered"
        );
        self.capabilities.insert(name, capability.clone());
        capability
    }

    /// Returns the descriptor registered under `name`.
    #[must_use]
    pub fn get(&self, name: impl AsRef<str>) -> Option<Capability> {
        self.capabilities.get(name.as_ref()).cloned()
    }

    /// Checks if a capability is registered.
    #[must_use]
    pub fn contains(&self, name: impl AsRef<str>) -> bool {
        self.capabilities.contains_key(name.as_ref())
    }

    /// Number of registered capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Lists registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.capabilities.keys().map(ToString::to_string).collect();
        names.sort_unstable();
        names
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CapabilityResolver
// ─────────────────────────────────────────────────────────────────────────────

/// Hit/miss counters of a [`CapabilityResolver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    /// Lookups answered from the memo.
    pub hits: usize,
    /// Lookups that went to the registry.
    pub misses: usize,
}

/// Memoized, thread-safe name-to-capability lookup over a shared registry.
///
/// Catalog entries share capability sets heavily, so each distinct name is
/// looked up in the registry once and answered from the memo afterwards.
/// Negative results are memoized too.
pub struct CapabilityResolver {
    registry: Arc<CapabilityRegistry>,
    memo: RwLock<HashMap<Box<str>, Option<Capability>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl fmt::Debug for CapabilityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityResolver")
            .field("registry", &self.registry)
            .field("memoized", &self.memo.read().len())
            .finish()
    }
}

impl CapabilityResolver {
    /// Creates a resolver with an empty memo.
    #[must_use]
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            registry,
            memo: RwLock::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// The registry lookups fall through to.
    #[must_use]
    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Resolves `name`, consulting the memo first.
    pub fn resolve(&self, name: &str) -> Option<Capability> {
        if let Some(cached) = self.memo.read().get(name) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return cached.clone();
        }

        let mut memo = self.memo.write();
        // Another thread may have filled the slot between the two locks.
        if let Some(cached) = memo.get(name) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return cached.clone();
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let resolved = self.registry.get(name);
        memo.insert(name.into(), resolved.clone());
        resolved
    }

    /// Current hit/miss counters.
    #[must_use]
    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Drops every memoized lookup and resets the counters.
    pub fn clear(&self) {
        self.memo.write().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}
