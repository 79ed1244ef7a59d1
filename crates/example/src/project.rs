//! On-disk project layout.
//!
//! A project is a directory with an `Assets/` tree and an optional
//! `Packages/` tree. Scanning yields `/`-separated paths relative to the
//! project root, directories included, in a stable order.

use std::path::{Path, PathBuf};

use stowage_catalog::ResourceLayout;
use stowage_runtime::FileStore;

use crate::error::CliError;

/// Top-level directory holding the project's own assets.
pub const ASSETS_DIR: &str = "Assets";

/// A project directory.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    layout: ResourceLayout,
}

impl Project {
    /// Opens the project at `root` with `layout`. Scanned paths always use
    /// `/`, so the layout's separator is forced to it.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::NotADirectory`] if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>, layout: ResourceLayout) -> Result<Self, CliError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(CliError::NotADirectory(root));
        }
        Ok(Self {
            root,
            layout: layout.with_separator('/'),
        })
    }

    /// The project directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The layout used to classify scanned paths.
    #[must_use]
    pub fn layout(&self) -> &ResourceLayout {
        &self.layout
    }

    /// Filesystem path of a scanned path.
    #[must_use]
    pub fn file(&self, scanned: &str) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(scanned.split('/'));
        path
    }

    /// The store catalogs of this project are written to.
    #[must_use]
    pub fn store(&self) -> FileStore {
        FileStore::new(self.root.join(ASSETS_DIR).join(self.layout.resources_root()))
    }

    /// Walks `Assets/` and the packages root.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Io`] if a directory cannot be listed.
    pub fn scan(&self) -> Result<Vec<String>, CliError> {
        let mut paths = Vec::new();
        for top in [ASSETS_DIR, self.layout.packages_root()] {
            if self.root.join(top).is_dir() {
                paths.push(top.to_string());
                self.walk(top, &mut paths)?;
            }
        }
        tracing::debug!(root = %self.root.display(), paths = paths.len(), "project scanned");
        Ok(paths)
    }

    /// Names of the directories directly below the packages root, longest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Io`] if the packages root exists but cannot be
    /// listed.
    pub fn package_names(&self) -> Result<Vec<String>, CliError> {
        let packages = self.root.join(self.layout.packages_root());
        if !packages.is_dir() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = read_dir(&packages)?
            .into_iter()
            .filter(|(_, is_dir)| *is_dir)
            .map(|(name, _)| name)
            .collect();
        // Longest first, so a package never claims a sibling whose name it prefixes.
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Ok(names)
    }

    fn walk(&self, relative: &str, paths: &mut Vec<String>) -> Result<(), CliError> {
        let mut children = read_dir(&self.file(relative))?;
        children.sort();
        for (name, is_dir) in children {
            let child = format!("{relative}/{name}");
            paths.push(child.clone());
            if is_dir {
                self.walk(&child, paths)?;
            }
        }
        Ok(())
    }
}

/// Lists `dir` as `(name, is_dir)` pairs, skipping hidden entries and
/// names that are not valid UTF-8.
fn read_dir(dir: &Path) -> Result<Vec<(String, bool)>, CliError> {
    let io_error = |source| CliError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut children = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 name");
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let is_dir = entry.file_type().map_err(io_error)?.is_dir();
        children.push((name, is_dir));
    }
    Ok(children)
}
