//! # Stowage Internal Library
//!
//! Re-exports the core Stowage crates for convenience.

/// Layer 1: catalog model, generation and codec.
pub use stowage_catalog;

/// Layer 2: manifest and query engine.
pub use stowage_query;

/// Layer 3: process-wide initialization and stores.
pub use stowage_runtime;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use stowage_catalog::prelude::*;
    pub use stowage_query::prelude::*;
    pub use stowage_runtime::prelude::*;
}
