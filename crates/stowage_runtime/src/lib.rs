//! Runtime side of Stowage: loading the persisted catalog once per process,
//! the stores it lives in, publishing freshly generated catalogs and
//! installing a tracing subscriber.
//!
//! # Overview
//!
//! - [`Stowage`]: once-only initialization, validity and subscribers
//! - [`StowageConfig`]: catalog location, layout and decode policy
//! - [`CatalogStore`] / [`FileStore`]: blob storage by location
//! - [`CatalogPublisher`]: generate, encode and write in one step
//! - [`TracingSetup`]: subscriber installation
//!
//! # Example
//!
//! ```ignore
//! let stowage = Arc::new(Stowage::new(config, Arc::new(FileStore::new(root)), resolver));
//! Stowage::install_global(Arc::clone(&stowage)).ok();
//!
//! if stowage.initialize().await.is_valid() {
//!     let mut query = stowage.query().by_name("Player");
//!     let entry = query.get_result();
//! }
//! ```

pub mod config;
pub mod publish;
pub mod store;
pub mod stowage;
pub mod tracing_setup;

pub use config::{
    DEFAULT_CATALOG_NAME, ENV_CATALOG_DIR, ENV_CATALOG_NAME, ENV_PACKAGES_ROOT,
    ENV_RESOURCES_ROOT, StowageConfig,
};
pub use publish::{CatalogPublisher, PublishError};
pub use store::{CatalogStore, DEFAULT_EXTENSION, FileStore, StoreError};
pub use stowage::{InitOutcome, Stowage, SubscriptionId};
pub use tracing_setup::{ENV_LOG, ENV_LOG_FORMAT, TracingFormat, TracingSetup};

#[cfg(any(test, feature = "test-utils"))]
pub use store::MemoryStore;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::{
        CatalogPublisher, CatalogStore, FileStore, InitOutcome, PublishError, StoreError,
        Stowage, StowageConfig, SubscriptionId, TracingFormat, TracingSetup,
    };
}
