//! Turns one classified source path into catalog entries.

use crate::entry::{CatalogEntry, Identity};
use crate::error::CatalogError;
use crate::layout::ResourceLayout;
use crate::loader::AssetShape;

/// Builds the entries of a single source path.
///
/// Package ownership is decided from the raw path against the known package
/// names, in the order given; capabilities come from the loaded asset's
/// [`AssetShape`].
#[derive(Debug, Clone, Copy)]
pub struct EntryBuilder<'a, S> {
    layout: &'a ResourceLayout,
    package_names: &'a [S],
}

impl<'a, S: AsRef<str>> EntryBuilder<'a, S> {
    /// Creates a builder over `layout` and the known package names.
    #[must_use]
    pub fn new(layout: &'a ResourceLayout, package_names: &'a [S]) -> Self {
        Self {
            layout,
            package_names,
        }
    }

    /// The package owning `raw_path`, if any.
    #[must_use]
    pub fn package_of(&self, raw_path: &str) -> Option<String> {
        self.layout
            .package_of(raw_path, self.package_names)
            .map(str::to_string)
    }

    /// Emits one entry per sub-path, all sharing `identity` and the shape's
    /// capabilities.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EmptyCapabilities`] if the shape carries no
    /// capabilities.
    pub fn build(
        &self,
        identity: &Identity,
        raw_path: &str,
        sub_paths: &[String],
        shape: &AssetShape,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let capabilities = shape.capabilities();
        if capabilities.is_empty() {
            return Err(CatalogError::EmptyCapabilities {
                path: raw_path.to_string(),
            });
        }
        let package = self.package_of(raw_path);

        Ok(sub_paths
            .iter()
            .map(|sub_path| {
                CatalogEntry::new(
                    identity.clone(),
                    sub_path.as_str(),
                    package.clone(),
                    capabilities.clone(),
                    self.layout.separator(),
                )
            })
            .collect())
    }
}
