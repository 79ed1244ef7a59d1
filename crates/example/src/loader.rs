//! Filesystem-backed asset loading and content identities.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use stowage_catalog::{
    Asset, AssetLoader, AssetShape, Capability, Classification, Identity, IdentityResolver,
    LoadError,
};

use crate::project::Project;
use crate::vocabulary::Vocabulary;

/// An asset file found on disk.
#[derive(Debug, Clone)]
pub struct FileAsset {
    /// Where the file lives.
    pub path: PathBuf,
    /// Its capabilities.
    pub shape: AssetShape,
}

impl Asset for FileAsset {
    fn shape(&self) -> AssetShape {
        self.shape.clone()
    }
}

/// Loads assets of a [`Project`] by logical path.
///
/// Built from a scan: every asset path is indexed under the logical path of
/// each resources root containing it. When two files share a logical path,
/// the first in scan order wins.
#[derive(Debug)]
pub struct FsLoader {
    vocabulary: Arc<Vocabulary>,
    index: HashMap<String, PathBuf>,
}

impl FsLoader {
    /// Indexes the asset paths among `scanned`.
    #[must_use]
    pub fn new(project: &Project, vocabulary: Arc<Vocabulary>, scanned: &[String]) -> Self {
        let layout = project.layout();
        let mut index = HashMap::new();
        for path in scanned {
            let Classification::Asset(sub_paths) = layout.classify(path) else {
                continue;
            };
            for sub_path in &sub_paths {
                index
                    .entry(layout.strip_extension(sub_path).to_string())
                    .or_insert_with(|| project.file(path));
            }
        }
        tracing::debug!(assets = index.len(), "asset index built");
        Self { vocabulary, index }
    }

    /// Number of indexed logical paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn shape_of(&self, path: &std::path::Path) -> Result<AssetShape, LoadError> {
        let extension = path.extension().and_then(|extension| extension.to_str());
        if !self.vocabulary.is_composite(extension) {
            return Ok(AssetShape::Single(
                self.vocabulary.for_extension(extension).clone(),
            ));
        }

        let listing = std::fs::read_to_string(path).map_err(|err| {
            LoadError::with_source(format!("cannot read {}", path.display()), err)
        })?;
        let members = listing
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|name| {
                self.vocabulary
                    .component(name)
                    .ok_or_else(|| LoadError::new(format!("unknown component '{name}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AssetShape::Composite(members))
    }
}

impl AssetLoader for FsLoader {
    type Asset = FileAsset;

    fn load(
        &self,
        logical_path: &str,
        filter: Option<&Capability>,
    ) -> Result<Option<FileAsset>, LoadError> {
        let Some(path) = self.index.get(logical_path) else {
            return Ok(None);
        };
        let shape = self.shape_of(path)?;
        if filter.is_some_and(|wanted| !shape.capabilities().contains_kind(wanted)) {
            return Ok(None);
        }
        Ok(Some(FileAsset {
            path: path.clone(),
            shape,
        }))
    }
}

/// Derives identities from a SHA-256 digest of the scanned path followed by
/// the file content.
///
/// Moving or editing a file changes its identity; identical files at
/// different paths stay distinct.
#[derive(Debug, Clone)]
pub struct ContentIdentity {
    project: Project,
}

impl ContentIdentity {
    /// Creates a resolver reading files of `project`.
    #[must_use]
    pub fn new(project: Project) -> Self {
        Self { project }
    }
}

impl IdentityResolver for ContentIdentity {
    fn identity(&self, raw_path: &str) -> Result<Identity, LoadError> {
        let file = self.project.file(raw_path);
        let content = std::fs::read(&file).map_err(|err| {
            LoadError::with_source(format!("cannot hash {}", file.display()), err)
        })?;
        let mut hasher = Sha256::new();
        hasher.update(raw_path.as_bytes());
        hasher.update([0]);
        hasher.update(&content);
        Ok(Identity::new(hex::encode(hasher.finalize())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_catalog::ResourceLayout;

    fn project(files: &[(&str, &str)]) -> (tempfile::TempDir, Project) {
        let dir = tempfile::tempdir().unwrap();
        for (relative, content) in files {
            let path = dir.path().join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        let project = Project::open(dir.path(), ResourceLayout::new()).unwrap();
        (dir, project)
    }

    #[test]
    fn composites_list_their_components() {
        let (_dir, project) = project(&[
            ("Assets/Resources/player.prefab", "Transform\n# comment\n\nstowage::Camera\n"),
            ("Assets/Resources/readme.txt", "hello"),
        ]);
        let vocabulary = Arc::new(Vocabulary::standard());
        let loader = FsLoader::new(&project, vocabulary.clone(), &project.scan().unwrap());
        assert_eq!(loader.len(), 2);

        let player = loader.load("player", None).unwrap().unwrap();
        assert_eq!(player.shape.capabilities().names(), vec!["stowage::Transform", "stowage::Camera"]);

        let text = vocabulary.resolve("Text").unwrap();
        assert!(loader.load("readme", Some(&text)).unwrap().is_some());
        assert!(loader.load("player", Some(&text)).unwrap().is_none());
        assert!(loader.load("missing", None).unwrap().is_none());
    }

    #[test]
    fn unknown_components_fail_the_load() {
        let (_dir, project) = project(&[("Assets/Resources/broken.prefab", "Wormhole\n")]);
        let loader = FsLoader::new(&project, Arc::new(Vocabulary::standard()), &project.scan().unwrap());
        let err = loader.load("broken", None).unwrap_err();
        assert!(err.message().contains("Wormhole"));
    }

    #[test]
    fn nested_roots_share_the_file() {
        let (_dir, project) = project(&[("Assets/Resources/a/Resources/b.txt", "x")]);
        let loader = FsLoader::new(&project, Arc::new(Vocabulary::standard()), &project.scan().unwrap());
        let outer = loader.load("a/Resources/b", None).unwrap().unwrap();
        let inner = loader.load("b", None).unwrap().unwrap();
        assert_eq!(outer.path, inner.path);
    }

    #[test]
    fn identities_depend_on_path_and_content() {
        let (dir, project) = project(&[
            ("Assets/Resources/a.txt", "same"),
            ("Assets/Resources/b.txt", "same"),
        ]);
        let identities = ContentIdentity::new(project);
        let a = identities.identity("Assets/Resources/a.txt").unwrap();
        let b = identities.identity("Assets/Resources/b.txt").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert_eq!(a, identities.identity("Assets/Resources/a.txt").unwrap());

        std::fs::write(dir.path().join("Assets/Resources/a.txt"), "changed").unwrap();
        assert_ne!(a, identities.identity("Assets/Resources/a.txt").unwrap());
        assert!(identities.identity("Assets/Resources/none.txt").is_err());
    }

    #[tokio::test]
    async fn entries_load_through_the_extension_trait() {
        let (_dir, project) = project(&[("Assets/Resources/ui/icon.png", "png")]);
        let loader = FsLoader::new(&project, Arc::new(Vocabulary::standard()), &project.scan().unwrap());
        let asset = loader.load_async("ui/icon", None).await.unwrap().unwrap();
        assert!(asset.path.ends_with("icon.png"));
    }
}
