//! The `stowage` command-line tool.
//!
//! Generates catalogs for on-disk projects and queries them:
//!
//! ```text
//! project/
//! ├── Assets/
//! │   └── Resources/          catalog written here
//! │       ├── readme.txt      stowage::Text
//! │       └── player.prefab   one component name per line
//! └── Packages/
//!     └── com.acme.kit/
//!         └── Resources/
//! ```
//!
//! Identities are SHA-256 digests of path and content, so regenerating an
//! unchanged project reproduces the same catalog entries.

pub mod commands;
pub mod error;
pub mod loader;
pub mod project;
pub mod vocabulary;

pub use commands::{Command, QueryArgs, USAGE, run};
pub use error::CliError;
pub use loader::{ContentIdentity, FileAsset, FsLoader};
pub use project::{ASSETS_DIR, Project};
pub use vocabulary::{COMPOSITE_EXTENSION, NAMESPACE, Vocabulary};
