//! Error types for catalog generation and the codec.

use thiserror::Error;

/// Boxed error carried by [`LoadError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by an external [`AssetLoader`](crate::loader::AssetLoader)
/// or [`IdentityResolver`](crate::loader::IdentityResolver).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct LoadError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl LoadError {
    /// Creates a load error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a load error wrapping an underlying cause.
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors that stop catalog generation.
///
/// Generation treats every path under a resources root as a leaf asset the
/// host can load; any of these aborts the whole run.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The loader found no asset at a path classified as a leaf asset.
    #[error("asset not resolvable: {path}")]
    UnresolvableAsset {
        /// Logical path handed to the loader.
        path: String,
    },

    /// The loader failed while resolving an asset.
    #[error("failed to load '{path}': {source}")]
    Load {
        /// Logical path handed to the loader.
        path: String,
        /// Loader failure.
        source: LoadError,
    },

    /// The identity resolver failed for a source path.
    #[error("failed to resolve identity of '{path}': {source}")]
    Identity {
        /// Raw source path.
        path: String,
        /// Resolver failure.
        source: LoadError,
    },

    /// A loaded asset reported no capabilities.
    #[error("asset '{path}' has no capabilities")]
    EmptyCapabilities {
        /// Raw source path.
        path: String,
    },
}

/// Errors raised while encoding or decoding a persisted catalog.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The persisted creation timestamp is not RFC 3339.
    #[error("invalid timestamp '{value}': {source}")]
    Timestamp {
        /// The persisted text.
        value: String,
        /// Parser failure.
        source: chrono::ParseError,
    },

    /// A capability name is missing from the registry and the codec is
    /// configured to fail on unknown names.
    #[error("unresolved capability '{name}'")]
    UnresolvedCapability {
        /// The persisted capability name.
        name: String,
    },

    /// A persisted entry carries no capability names.
    #[error("entry '{path}' has no capabilities")]
    EmptyCapabilities {
        /// Relative path of the entry.
        path: String,
    },
}
