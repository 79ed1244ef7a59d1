//! Catalog model, generation and the portable codec for Stowage.
//!
//! This crate turns a flat list of raw asset paths into an immutable
//! [`Catalog`] and moves that catalog across machine boundaries.
//!
//! # Pipeline
//!
//! ```text
//! raw paths ─▶ ResourceLayout::classify ─▶ EntryBuilder ─▶ CatalogGenerator ─▶ Catalog
//!                                                                              │
//!                                          Catalog ◀─ CatalogCodec::decode ◀─ bytes
//! ```
//!
//! The host supplies two seams: an [`AssetLoader`] that reports what kind of
//! asset lives at a logical path, and an [`IdentityResolver`] that maps a raw
//! path to a stable identity.
//!
//! # Architecture
//!
//! - [`Capability`] / [`CapabilitySet`]: type markers attached to assets
//! - [`CapabilityRegistry`] / [`CapabilityResolver`]: name lookup with memo
//! - [`ResourceLayout`]: path classification and package resolution
//! - [`CatalogEntry`] / [`Catalog`]: the immutable snapshot
//! - [`CatalogGenerator`]: blocking, async and cancellable generation
//! - [`CatalogCodec`]: JSON encode/decode with separator rewriting

pub mod builder;
pub mod capability;
pub mod catalog;
pub mod codec;
pub mod entry;
pub mod error;
pub mod generator;
pub mod layout;
pub mod loader;

pub use builder::EntryBuilder;
pub use capability::{
    Capability, CapabilityRegistry, CapabilityResolver, CapabilitySet, ResolverStats,
};
pub use catalog::Catalog;
pub use codec::{CatalogCodec, UnresolvedCapabilityPolicy};
pub use entry::{CatalogEntry, Identity};
pub use error::{BoxError, CatalogError, CodecError, LoadError};
pub use generator::{CatalogGenerator, DEFAULT_CONCURRENCY, GeneratorOptions};
pub use layout::{Classification, ResourceLayout};
pub use loader::{Asset, AssetLoader, AssetLoaderExt, AssetShape, IdentityResolver};

#[cfg(any(test, feature = "test-utils"))]
pub use loader::StaticLoader;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::{
        Asset, AssetLoader, AssetLoaderExt, AssetShape, Capability, CapabilityRegistry,
        CapabilityResolver, CapabilitySet, Catalog, CatalogCodec, CatalogEntry, CatalogError,
        CatalogGenerator, CodecError, GeneratorOptions, Identity, IdentityResolver, LoadError,
        ResourceLayout, UnresolvedCapabilityPolicy,
    };
}
