//! Capability vocabulary of on-disk projects.

use std::collections::HashMap;
use std::sync::Arc;

use stowage_catalog::{Capability, CapabilityRegistry};

/// Namespace prefix of every capability the CLI registers.
pub const NAMESPACE: &str = "stowage";

/// Extension of composite files. Each non-blank line names one component.
pub const COMPOSITE_EXTENSION: &str = "prefab";

/// Maps file extensions and component names to capabilities.
///
/// Plain files get a subtype of `stowage::Asset` chosen by extension.
/// Composite files list subtypes of `stowage::Component`, one per line,
/// either fully qualified or by short name.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    registry: Arc<CapabilityRegistry>,
    by_extension: HashMap<&'static str, Capability>,
    asset: Capability,
    component: Capability,
}

impl Vocabulary {
    /// Builds the standard vocabulary.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = CapabilityRegistry::new();
        let asset = registry.register(format!("{NAMESPACE}::Asset"));
        let text = registry.register_subtype(format!("{NAMESPACE}::Text"), &asset);
        let texture = registry.register_subtype(format!("{NAMESPACE}::Texture"), &asset);
        let audio = registry.register_subtype(format!("{NAMESPACE}::Audio"), &asset);
        let mesh = registry.register_subtype(format!("{NAMESPACE}::Mesh"), &asset);

        let component = registry.register(format!("{NAMESPACE}::Component"));
        for name in ["Transform", "Renderer", "Collider", "Camera", "Light", "AudioSource"] {
            registry.register_subtype(format!("{NAMESPACE}::{name}"), &component);
        }

        let by_extension = [
            ("txt", &text),
            ("md", &text),
            ("json", &text),
            ("png", &texture),
            ("jpg", &texture),
            ("wav", &audio),
            ("ogg", &audio),
            ("obj", &mesh),
            ("fbx", &mesh),
        ]
        .into_iter()
        .map(|(extension, capability)| (extension, capability.clone()))
        .collect();

        Self {
            registry: Arc::new(registry),
            by_extension,
            asset,
            component,
        }
    }

    /// The registry backing this vocabulary.
    #[must_use]
    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// The capability of a plain file with `extension`. Unknown extensions
    /// map to `stowage::Asset`.
    #[must_use]
    pub fn for_extension(&self, extension: Option<&str>) -> &Capability {
        extension
            .and_then(|extension| self.by_extension.get(extension.to_ascii_lowercase().as_str()))
            .unwrap_or(&self.asset)
    }

    /// Looks up a capability by full or short name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Capability> {
        let name = name.trim();
        self.registry
            .get(name)
            .or_else(|| self.registry.get(format!("{NAMESPACE}::{name}")))
    }

    /// Looks up a component by full or short name. Plain asset types are
    /// not components.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<Capability> {
        self.resolve(name)
            .filter(|capability| capability.is_a(&self.component) && *capability != self.component)
    }

    /// Returns `true` if files with `extension` are composites.
    #[must_use]
    pub fn is_composite(&self, extension: Option<&str>) -> bool {
        extension.is_some_and(|extension| extension.eq_ignore_ascii_case(COMPOSITE_EXTENSION))
    }
}
