//! Shared fixtures for runtime integration tests.

#![expect(dead_code, reason = "shared fixtures; not every test binary uses every item")]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use stowage_catalog::{
    AssetShape, Capability, CapabilityRegistry, CapabilityResolver, CatalogCodec,
    CatalogGenerator, Identity, LoadError, ResourceLayout, StaticLoader,
};
use stowage_runtime::{CatalogStore, StoreError, Stowage, StowageConfig};

pub type Resolver = fn(&str) -> Result<Identity, LoadError>;

pub fn identity(raw_path: &str) -> Result<Identity, LoadError> {
    Ok(Identity::new(raw_path))
}

pub fn registry() -> (Arc<CapabilityRegistry>, Capability, Capability) {
    let mut registry = CapabilityRegistry::new();
    let text = registry.register("engine::TextAsset");
    let texture = registry.register("engine::Texture");
    (Arc::new(registry), text, texture)
}

pub fn resolver() -> Arc<CapabilityResolver> {
    Arc::new(CapabilityResolver::new(registry().0))
}

pub fn layout() -> ResourceLayout {
    ResourceLayout::new().with_separator('/')
}

pub fn config() -> StowageConfig {
    StowageConfig::new()
        .with_catalog_dir("Generated")
        .with_layout(layout())
}

pub fn generator() -> CatalogGenerator<StaticLoader, Resolver> {
    let (_, text, texture) = registry();
    let loader = StaticLoader::new()
        .with_asset("readme", AssetShape::Single(text))
        .with_asset("ui/icon", AssetShape::Single(texture));
    CatalogGenerator::new(layout(), loader, identity as Resolver)
}

pub const PATHS: [&str; 2] = [
    "Assets/Resources/readme.txt",
    "Assets/Resources/ui/icon.png",
];

/// Encodes the fixture catalog with the codec `stowage` decodes with.
pub fn encoded_catalog(stowage: &Stowage) -> Vec<u8> {
    let catalog = generator()
        .generate_blocking(&PATHS, &[] as &[&str], Utc::now())
        .unwrap();
    encode_with(stowage.codec(), &catalog)
}

pub fn encode_with(codec: &CatalogCodec, catalog: &stowage_catalog::Catalog) -> Vec<u8> {
    codec.encode(catalog).unwrap()
}

/// A store whose non-blocking read takes a while, so concurrent callers
/// overlap.
#[derive(Default)]
pub struct SlowStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    reads: AtomicUsize,
    delay: Duration,
}

impl SlowStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogStore for SlowStore {
    fn read(&self, location: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.blobs.lock().get(location).cloned())
    }

    fn write(&self, location: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.blobs.lock().insert(location.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn read_async(&self, location: &str) -> Result<Option<Vec<u8>>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.read(location)
    }
}

/// Counts subscriber callbacks and records the flags they received.
#[derive(Default)]
pub struct Notifications {
    pub flags: Mutex<Vec<bool>>,
}

impl Notifications {
    pub fn attach(stowage: &Stowage) -> Arc<Self> {
        let notifications = Arc::new(Self::default());
        let sink = Arc::clone(&notifications);
        stowage.subscribe(move |valid| sink.flags.lock().push(valid));
        notifications
    }

    pub fn received(&self) -> Vec<bool> {
        self.flags.lock().clone()
    }
}
