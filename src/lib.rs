//! Offline asset catalogs for hierarchical resource trees.
//!

pub use stowage_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use stowage_internal::prelude::*;
}
