//! Resource tree layout and path classification.
//!
//! A [`ResourceLayout`] names the segments that carry meaning inside raw asset
//! paths: the resources-root segment that marks a scannable directory, and the
//! packages-root segment that marks assets shipped by a package. It also fixes
//! the separator used to split and join path segments.
//!
//! Every occurrence of the resources-root segment (bounded by separators) is a
//! fresh top level, so a path nested under the segment twice classifies into
//! two sub-paths:
//!
//! ```
//! use stowage_catalog::layout::{Classification, ResourceLayout};
//!
//! let layout = ResourceLayout::new().with_separator('/');
//! let classified = layout.classify("Assets/Resources/ui/Resources/icon.png");
//!
//! assert_eq!(
//!     classified,
//!     Classification::Asset(vec!["ui/Resources/icon.png".into(), "icon.png".into()])
//! );
//! ```

/// Default name of the resources-root segment.
pub const DEFAULT_RESOURCES_ROOT: &str = "Resources";

/// Default name of the packages-root segment.
pub const DEFAULT_PACKAGES_ROOT: &str = "Packages";

/// Outcome of classifying one raw path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The path does not lie under any resources root.
    Outside,
    /// The shallowest sub-path has no extension, so the path names a
    /// directory. The whole source path is discarded.
    Directory,
    /// The path is a leaf asset. Holds one sub-path per resources-root
    /// occurrence, shallowest first.
    Asset(Vec<String>),
}

/// Names and separator that define how raw asset paths are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLayout {
    resources_root: String,
    packages_root: String,
    separator: char,
}

impl Default for ResourceLayout {
    fn default() -> Self {
        Self {
            resources_root: DEFAULT_RESOURCES_ROOT.to_string(),
            packages_root: DEFAULT_PACKAGES_ROOT.to_string(),
            separator: std::path::MAIN_SEPARATOR,
        }
    }
}

impl ResourceLayout {
    /// Creates a layout with the default segment names and the platform separator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the resources-root segment name.
    #[must_use]
    pub fn with_resources_root(mut self, segment: impl Into<String>) -> Self {
        self.resources_root = segment.into();
        self
    }

    /// Sets the packages-root segment name.
    #[must_use]
    pub fn with_packages_root(mut self, segment: impl Into<String>) -> Self {
        self.packages_root = segment.into();
        self
    }

    /// Sets the path separator.
    #[must_use]
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// The resources-root segment name.
    #[must_use]
    pub fn resources_root(&self) -> &str {
        &self.resources_root
    }

    /// The packages-root segment name.
    #[must_use]
    pub fn packages_root(&self) -> &str {
        &self.packages_root
    }

    /// The separator used to split and join segments.
    #[must_use]
    pub fn separator(&self) -> char {
        self.separator
    }

    fn root_marker(&self) -> String {
        format!("{sep}{}{sep}", self.resources_root, sep = self.separator)
    }

    /// Returns `true` if `path` contains the resources-root segment bounded
    /// by separators.
    #[must_use]
    pub fn is_candidate(&self, path: &str) -> bool {
        !self.resources_root.is_empty() && path.contains(&self.root_marker())
    }

    /// Every relative sub-path of `path`, one per resources-root occurrence,
    /// shallowest first. Empty when the segment does not occur.
    ///
    /// Adjacent occurrences may share a separator
    /// (`a/Resources/Resources/b`), and each still counts.
    #[must_use]
    pub fn sub_paths(&self, path: &str) -> Vec<String> {
        if self.resources_root.is_empty() {
            return Vec::new();
        }
        let marker = self.root_marker();
        let step = marker.len() - self.separator.len_utf8();

        let mut sub_paths = Vec::new();
        let mut from = 0;
        while let Some(offset) = path.get(from..).and_then(|rest| rest.find(&marker)) {
            let start = from + offset;
            sub_paths.push(path[start + marker.len()..].to_string());
            from = start + step;
        }
        sub_paths
    }

    /// Classifies `path`, applying the directory guard to the shallowest
    /// sub-path only.
    #[must_use]
    pub fn classify(&self, path: &str) -> Classification {
        let sub_paths = self.sub_paths(path);
        match sub_paths.first() {
            None => Classification::Outside,
            Some(first) if self.extension(first).is_none() => Classification::Directory,
            Some(_) => Classification::Asset(sub_paths),
        }
    }

    /// The package owning `path`, if it lies under the packages root and the
    /// remainder starts with one of `package_names`. First match wins.
    #[must_use]
    pub fn package_of<'a, S: AsRef<str>>(&self, path: &str, package_names: &'a [S]) -> Option<&'a str> {
        let prefix = format!("{}{}", self.packages_root, self.separator);
        let remainder = path.strip_prefix(&prefix)?;
        package_names
            .iter()
            .map(AsRef::as_ref)
            .find(|name| !name.is_empty() && remainder.starts_with(name))
    }

    /// The final segment of `path`.
    #[must_use]
    pub fn file_name<'p>(&self, path: &'p str) -> &'p str {
        file_name(path, self.separator)
    }

    /// Everything before the final segment, or `""` at the top level.
    #[must_use]
    pub fn directory<'p>(&self, path: &'p str) -> &'p str {
        directory(path, self.separator)
    }

    /// The extension of the final segment, without the dot.
    ///
    /// Dotfiles (`.keep`) and trailing dots (`name.`) have no extension.
    #[must_use]
    pub fn extension<'p>(&self, path: &'p str) -> Option<&'p str> {
        extension(path, self.separator)
    }

    /// `path` with the final segment's extension removed.
    #[must_use]
    pub fn strip_extension<'p>(&self, path: &'p str) -> &'p str {
        strip_extension(path, self.separator)
    }
}

pub(crate) fn file_name(path: &str, separator: char) -> &str {
    path.rsplit(separator).next().unwrap_or(path)
}

pub(crate) fn directory(path: &str, separator: char) -> &str {
    path.rsplit_once(separator).map_or("", |(dir, _)| dir)
}

pub(crate) fn extension(path: &str, separator: char) -> Option<&str> {
    let file_name = file_name(path, separator);
    match file_name.rfind('.') {
        Some(0) | None => None,
        Some(dot) if dot + 1 == file_name.len() => None,
        Some(dot) => Some(&file_name[dot + 1..]),
    }
}

pub(crate) fn strip_extension(path: &str, separator: char) -> &str {
    match extension(path, separator) {
        Some(ext) => &path[..path.len() - ext.len() - 1],
        None => path,
    }
}
