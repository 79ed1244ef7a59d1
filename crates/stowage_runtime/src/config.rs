//! Runtime configuration.

use stowage_catalog::{ResourceLayout, UnresolvedCapabilityPolicy};

/// Default name of the persisted catalog blob.
pub const DEFAULT_CATALOG_NAME: &str = "ResourcesCache";

/// Environment variable naming the catalog sub-directory.
pub const ENV_CATALOG_DIR: &str = "STOWAGE_CATALOG_DIR";
/// Environment variable naming the catalog blob.
pub const ENV_CATALOG_NAME: &str = "STOWAGE_CATALOG_NAME";
/// Environment variable naming the resources-root segment.
pub const ENV_RESOURCES_ROOT: &str = "STOWAGE_RESOURCES_ROOT";
/// Environment variable naming the packages-root segment.
pub const ENV_PACKAGES_ROOT: &str = "STOWAGE_PACKAGES_ROOT";

/// Where the catalog lives and how it is interpreted.
///
/// The catalog is stored as a single blob at [`catalog_location`](Self::catalog_location):
/// the blob name, optionally under a sub-directory. Locations always use `/`
/// regardless of platform; stores translate them.
///
/// # Example
///
/// ```
/// use stowage_runtime::StowageConfig;
///
/// let config = StowageConfig::new().with_catalog_dir("Generated");
/// assert_eq!(config.catalog_location(), "Generated/ResourcesCache");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StowageConfig {
    catalog_dir: Option<String>,
    catalog_name: String,
    layout: ResourceLayout,
    policy: UnresolvedCapabilityPolicy,
}

impl Default for StowageConfig {
    fn default() -> Self {
        Self {
            catalog_dir: None,
            catalog_name: DEFAULT_CATALOG_NAME.to_string(),
            layout: ResourceLayout::default(),
            policy: UnresolvedCapabilityPolicy::default(),
        }
    }
}

impl StowageConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads overrides from the process environment.
    ///
    /// Unset or blank variables keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`, which maps a variable name to its
    /// value.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = Self::default();
        if let Some(dir) = value(ENV_CATALOG_DIR) {
            config = config.with_catalog_dir(dir);
        }
        if let Some(name) = value(ENV_CATALOG_NAME) {
            config = config.with_catalog_name(name);
        }
        let mut layout = config.layout.clone();
        if let Some(root) = value(ENV_RESOURCES_ROOT) {
            layout = layout.with_resources_root(root);
        }
        if let Some(root) = value(ENV_PACKAGES_ROOT) {
            layout = layout.with_packages_root(root);
        }
        config.with_layout(layout)
    }

    /// Stores the catalog under `dir` instead of at the top level. A blank
    /// directory resets to the top level.
    #[must_use]
    pub fn with_catalog_dir(mut self, dir: impl Into<String>) -> Self {
        let dir = dir.into();
        let trimmed = dir.trim_matches('/');
        self.catalog_dir = (!trimmed.trim().is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Sets the catalog blob name.
    #[must_use]
    pub fn with_catalog_name(mut self, name: impl Into<String>) -> Self {
        self.catalog_name = name.into();
        self
    }

    /// Sets the resource layout.
    #[must_use]
    pub fn with_layout(mut self, layout: ResourceLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the policy for capability names the registry does not know.
    #[must_use]
    pub fn with_policy(mut self, policy: UnresolvedCapabilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The catalog sub-directory, if any.
    #[must_use]
    pub fn catalog_dir(&self) -> Option<&str> {
        self.catalog_dir.as_deref()
    }

    /// The catalog blob name.
    #[must_use]
    pub fn catalog_name(&self) -> &str {
        &self.catalog_name
    }

    /// The resource layout.
    #[must_use]
    pub fn layout(&self) -> &ResourceLayout {
        &self.layout
    }

    /// The unresolved capability policy.
    #[must_use]
    pub fn policy(&self) -> UnresolvedCapabilityPolicy {
        self.policy
    }

    /// The store location of the catalog blob.
    #[must_use]
    pub fn catalog_location(&self) -> String {
        match &self.catalog_dir {
            Some(dir) => format!("{dir}/{}", self.catalog_name),
            None => self.catalog_name.clone(),
        }
    }
}
