//! Command-line errors.

use std::io;
use std::path::PathBuf;

use stowage_catalog::CatalogError;
use stowage_runtime::{InitOutcome, PublishError};
use thiserror::Error;

/// Errors reported by the `stowage` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// The command line could not be parsed.
    #[error("{0}")]
    Usage(String),

    /// The project path is not a directory.
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// A project file or directory could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// The path being read.
        path: PathBuf,
        /// Underlying failure.
        source: io::Error,
    },

    /// Catalog generation failed.
    #[error(transparent)]
    Generate(#[from] CatalogError),

    /// Writing the catalog failed.
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// The persisted catalog could not be loaded.
    #[error("catalog unavailable ({0:?}); run `stowage generate` first")]
    Unavailable(InitOutcome),

    /// Writing command output failed.
    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),
}
