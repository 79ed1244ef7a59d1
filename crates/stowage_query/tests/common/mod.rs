//! Shared fixtures for query integration tests.

use std::sync::Arc;

use chrono::Utc;
use stowage_catalog::{
    AssetShape, Capability, CapabilityRegistry, CapabilityResolver, CatalogCodec,
    CatalogGenerator, Identity, LoadError, ResourceLayout, StaticLoader,
};
use stowage_query::CatalogManifest;

/// Engine vocabulary with a transform that every prefab carries implicitly.
pub struct Engine {
    pub registry: Arc<CapabilityRegistry>,
    pub transform: Capability,
    pub camera: Capability,
    pub audio: Capability,
    pub light: Capability,
    pub text: Capability,
}

pub fn engine() -> Engine {
    let mut registry = CapabilityRegistry::new();
    let component = registry.register("engine::Component");
    let transform = registry.register_subtype("engine::Transform", &component);
    let behaviour = registry.register_subtype("engine::Behaviour", &component);
    let camera = registry.register_subtype("engine::Camera", &behaviour);
    let audio = registry.register_subtype("engine::AudioSource", &behaviour);
    let light = registry.register_subtype("engine::Light", &behaviour);
    let text = registry.register("engine::TextAsset");
    Engine {
        registry: Arc::new(registry),
        transform,
        camera,
        audio,
        light,
        text,
    }
}

fn prefab(engine: &Engine, members: &[&Capability]) -> AssetShape {
    let mut all = vec![engine.transform.clone()];
    all.extend(members.iter().map(|c| (*c).clone()));
    AssetShape::Composite(all)
}

fn identity(path: &str) -> Result<Identity, LoadError> {
    Ok(Identity::new(format!("guid:{path}")))
}

/// Generates the prefab project, sends it through the codec and loads the
/// decoded catalog into a manifest.
pub fn prefab_manifest(engine: &Engine) -> Arc<CatalogManifest> {
    let loader = StaticLoader::new()
        .with_asset(
            "CameraAudioLight",
            prefab(engine, &[&engine.camera, &engine.audio, &engine.light]),
        )
        .with_asset("CameraAudio", prefab(engine, &[&engine.camera, &engine.audio]))
        .with_asset("Camera", prefab(engine, &[&engine.camera]))
        .with_asset("Light", prefab(engine, &[&engine.light]))
        .with_asset("notes/readme", AssetShape::Single(engine.text.clone()));

    let layout = ResourceLayout::new().with_separator('/');
    let generator = CatalogGenerator::new(layout, loader, identity);
    let catalog = generator
        .generate_blocking(
            &[
                "Assets/Resources/CameraAudioLight.prefab",
                "Assets/Resources/CameraAudio.prefab",
                "Assets/Resources/Camera.prefab",
                "Assets/Resources/Light.prefab",
                "Packages/com.acme.docs/Resources/notes/readme.txt",
            ],
            &["com.acme.docs"],
            Utc::now(),
        )
        .expect("fixture generates");

    let codec = CatalogCodec::new(Arc::new(CapabilityResolver::new(engine.registry.clone())))
        .with_local_separator('/');
    let bytes = codec.encode(&catalog).expect("fixture encodes");
    Arc::new(CatalogManifest::new(codec.decode(&bytes).expect("fixture decodes")))
}
