//! Shared fixtures for catalog integration tests.

#![expect(dead_code, reason = "shared fixtures; not every test binary uses every item")]

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use stowage_catalog::{
    AssetLoader, AssetShape, Capability, CapabilityRegistry, Classification, Identity, LoadError,
    ResourceLayout,
};

pub const PACKAGE: &str = "com.acme.toolkit";

/// Capability vocabulary of the test project.
pub struct Vocabulary {
    pub registry: Arc<CapabilityRegistry>,
    pub asset: Capability,
    pub text: Capability,
    pub texture: Capability,
    pub transform: Capability,
    pub renderer: Capability,
    pub collider: Capability,
}

pub fn vocabulary() -> Vocabulary {
    let mut registry = CapabilityRegistry::new();
    let asset = registry.register("engine::Asset");
    let text = registry.register_subtype("engine::TextAsset", &asset);
    let texture = registry.register_subtype("engine::Texture", &asset);
    let transform = registry.register("engine::Transform");
    let renderer = registry.register("engine::Renderer");
    let collider = registry.register("engine::Collider");
    Vocabulary {
        registry: Arc::new(registry),
        asset,
        text,
        texture,
        transform,
        renderer,
        collider,
    }
}

/// A project tree loaded from a fixed path list.
///
/// Capabilities follow the file extension: `.txt` is text, `.png` a texture
/// and `.prefab` a composite of transform and renderer.
pub struct ProjectLoader {
    assets: HashMap<String, AssetShape>,
}

impl ProjectLoader {
    pub fn new(vocabulary: &Vocabulary, layout: &ResourceLayout, paths: &[&str]) -> Self {
        let mut assets = HashMap::new();
        for path in paths {
            let Classification::Asset(sub_paths) = layout.classify(path) else {
                continue;
            };
            let shape = match layout.extension(&sub_paths[0]) {
                Some("txt") => AssetShape::Single(vocabulary.text.clone()),
                Some("png") => AssetShape::Single(vocabulary.texture.clone()),
                Some("prefab") => AssetShape::Composite(vec![
                    vocabulary.transform.clone(),
                    vocabulary.renderer.clone(),
                ]),
                _ => AssetShape::Single(vocabulary.asset.clone()),
            };
            assets.insert(layout.strip_extension(&sub_paths[0]).to_string(), shape);
        }
        Self { assets }
    }
}

impl AssetLoader for ProjectLoader {
    type Asset = AssetShape;

    fn load(
        &self,
        logical_path: &str,
        filter: Option<&Capability>,
    ) -> Result<Option<AssetShape>, LoadError> {
        Ok(self
            .assets
            .get(logical_path)
            .filter(|shape| filter.is_none_or(|wanted| shape.capabilities().contains_kind(wanted)))
            .cloned())
    }
}

/// Hashes the raw path into a stable identity.
pub fn path_identity(raw_path: &str) -> Result<Identity, LoadError> {
    let mut hasher = DefaultHasher::new();
    raw_path.hash(&mut hasher);
    Ok(Identity::new(format!("{:016x}", hasher.finish())))
}

/// The sample project used across tests.
pub fn project_paths() -> Vec<&'static str> {
    vec![
        "Assets/Resources",
        "Assets/Resources/topLevelAsset.txt",
        "Assets/Resources/myTestFolder",
        "Assets/Resources/myTestFolder/someAsset.txt",
        "Assets/Resources/myTestFolder/Resources/nestedAsset.txt",
        "Assets/Resources/ui/icon.png",
        "Assets/Resources/prefabs/player.prefab",
        "Assets/Textures/unlisted.png",
        "Packages/com.acme.toolkit/Runtime/Resources/packagedAsset.txt",
    ]
}
