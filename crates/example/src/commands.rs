//! Command parsing and execution.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use stowage_catalog::{Capability, CapabilityResolver, CatalogCodec, CatalogEntry, CatalogGenerator};
use stowage_query::TextPattern;
use stowage_runtime::{CatalogPublisher, InitOutcome, Stowage, StowageConfig};
use tokio_util::sync::CancellationToken;

use crate::error::CliError;
use crate::loader::{ContentIdentity, FsLoader};
use crate::project::Project;
use crate::vocabulary::Vocabulary;

/// Usage text.
pub const USAGE: &str = "\
usage:
  stowage generate <project> [package ...]
  stowage query <project> [name] [--path <prefix>] [--package <name>]
                [--with <capability>]... [--without <capability>]... [--ignore-case]
  stowage inspect <project>

The catalog is written to <project>/Assets/Resources. Packages default to
every directory under <project>/Packages.";

/// Filters of the `query` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryArgs {
    /// Name substring.
    pub name: Option<String>,
    /// Logical path prefix.
    pub path: Option<String>,
    /// Exact package name.
    pub package: Option<String>,
    /// Capabilities every result must carry.
    pub with: Vec<String>,
    /// Capabilities no result may carry.
    pub without: Vec<String>,
    /// Compare text case-insensitively.
    pub ignore_case: bool,
}

impl QueryArgs {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.path.is_none()
            && self.package.is_none()
            && self.with.is_empty()
            && self.without.is_empty()
    }

    fn pattern(&self, text: &str) -> TextPattern {
        if self.ignore_case {
            TextPattern::ignore_case(text)
        } else {
            TextPattern::new(text)
        }
    }
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scan a project and write its catalog.
    Generate {
        /// Project directory.
        project: PathBuf,
        /// Package names; empty means every package directory.
        packages: Vec<String>,
    },
    /// Look entries up in a project's catalog.
    Query {
        /// Project directory.
        project: PathBuf,
        /// Filters.
        args: QueryArgs,
    },
    /// Summarize a project's catalog.
    Inspect {
        /// Project directory.
        project: PathBuf,
    },
    /// Print usage.
    Help,
}

impl Command {
    /// Parses arguments, program name excluded.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Usage`] for unknown commands, missing values or
    /// unknown flags.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, CliError> {
        let mut args = args.into_iter();
        let Some(command) = args.next() else {
            return Ok(Self::Help);
        };
        if matches!(command.as_str(), "help" | "-h" | "--help") {
            return Ok(Self::Help);
        }
        let project = args
            .next()
            .map(PathBuf::from)
            .ok_or_else(|| CliError::Usage(format!("`{command}` needs a project directory")))?;

        match command.as_str() {
            "generate" => Ok(Self::Generate {
                project,
                packages: args.collect(),
            }),
            "inspect" => match args.next() {
                None => Ok(Self::Inspect { project }),
                Some(extra) => Err(CliError::Usage(format!("unexpected argument '{extra}'"))),
            },
            "query" => Ok(Self::Query {
                project,
                args: parse_query(args)?,
            }),
            other => Err(CliError::Usage(format!("unknown command '{other}'"))),
        }
    }
}

fn parse_query(mut args: impl Iterator<Item = String>) -> Result<QueryArgs, CliError> {
    let mut query = QueryArgs::default();
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .ok_or_else(|| CliError::Usage(format!("{flag} needs a value")))
        };
        match arg.as_str() {
            "--path" => query.path = Some(value("--path")?),
            "--package" => query.package = Some(value("--package")?),
            "--with" => query.with.push(value("--with")?),
            "--without" => query.without.push(value("--without")?),
            "--ignore-case" => query.ignore_case = true,
            flag if flag.starts_with("--") => {
                return Err(CliError::Usage(format!("unknown flag '{flag}'")));
            }
            _ if query.name.is_none() => query.name = Some(arg),
            _ => return Err(CliError::Usage(format!("unexpected argument '{arg}'"))),
        }
    }
    Ok(query)
}

/// Runs `command`, writing its report to `out`.
///
/// # Errors
///
/// Returns [`CliError`] if the project cannot be read, generation or
/// publishing fails, or the catalog is unavailable.
pub async fn run<W: Write>(
    command: Command,
    cancel: &CancellationToken,
    out: &mut W,
) -> Result<(), CliError> {
    match command {
        Command::Generate { project, packages } => generate(&project, packages, cancel, out).await,
        Command::Query { project, args } => query(&project, &args, out).await,
        Command::Inspect { project } => inspect(&project, out).await,
        Command::Help => {
            writeln!(out, "{USAGE}")?;
            Ok(())
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

fn open(dir: &Path) -> Result<(StowageConfig, Project), CliError> {
    let config = StowageConfig::from_env();
    let project = Project::open(dir, config.layout().clone())?;
    let config = config.with_layout(project.layout().clone());
    Ok((config, project))
}

fn codec(config: &StowageConfig, vocabulary: &Vocabulary) -> CatalogCodec {
    CatalogCodec::new(Arc::new(CapabilityResolver::new(Arc::clone(vocabulary.registry()))))
        .with_local_separator(config.layout().separator())
        .with_policy(config.policy())
}

async fn generate<W: Write>(
    dir: &Path,
    packages: Vec<String>,
    cancel: &CancellationToken,
    out: &mut W,
) -> Result<(), CliError> {
    let (config, project) = open(dir)?;
    let store = project.store();
    let catalog_file = store.path_of(&config.catalog_location());

    // The previous catalog lives inside a resources root; never index it.
    let scanned: Vec<String> = project
        .scan()?
        .into_iter()
        .filter(|path| project.file(path) != catalog_file)
        .collect();
    let packages = if packages.is_empty() {
        project.package_names()?
    } else {
        packages
    };

    let vocabulary = Arc::new(Vocabulary::standard());
    let loader = FsLoader::new(&project, Arc::clone(&vocabulary), &scanned);
    let generator = CatalogGenerator::new(
        project.layout().clone(),
        loader,
        ContentIdentity::new(project.clone()),
    );
    let Some(catalog) = generator
        .generate_cancelable(&scanned, &packages, Utc::now(), cancel)
        .await?
    else {
        writeln!(out, "generation cancelled; nothing written")?;
        return Ok(());
    };

    let publisher = CatalogPublisher::new(&config, codec(&config, &vocabulary), Arc::new(store));
    publisher.publish(&catalog).await?;
    writeln!(
        out,
        "wrote {} entries to {}",
        catalog.len(),
        catalog_file.display()
    )?;
    Ok(())
}

async fn load(dir: &Path) -> Result<(Arc<Vocabulary>, Stowage), CliError> {
    let (config, project) = open(dir)?;
    let vocabulary = Arc::new(Vocabulary::standard());
    let resolver = Arc::clone(codec(&config, &vocabulary).resolver());
    let stowage = Stowage::new(config, Arc::new(project.store()), resolver);
    let outcome = stowage.initialize().await;
    if outcome.is_valid() {
        Ok((vocabulary, stowage))
    } else {
        Err(CliError::Unavailable(outcome))
    }
}

fn capabilities(vocabulary: &Vocabulary, names: &[String]) -> Result<Vec<Capability>, CliError> {
    names
        .iter()
        .map(|name| {
            vocabulary
                .resolve(name)
                .ok_or_else(|| CliError::Usage(format!("unknown capability '{name}'")))
        })
        .collect()
}

async fn query<W: Write>(dir: &Path, args: &QueryArgs, out: &mut W) -> Result<(), CliError> {
    if args.is_empty() {
        return Err(CliError::Usage("query needs at least one filter".to_string()));
    }
    let (vocabulary, stowage) = load(dir).await?;
    let with = capabilities(&vocabulary, &args.with)?;
    let without = capabilities(&vocabulary, &args.without)?;

    let mut query = stowage.query();
    if let Some(name) = &args.name {
        query = query.by_name_substring(args.pattern(name));
    }
    if let Some(path) = &args.path {
        query = query.by_path(args.pattern(path));
    }
    if let Some(package) = &args.package {
        query = query.by_package(args.pattern(package));
    }
    if !with.is_empty() {
        query = query.with_all_components(with);
    }
    if !without.is_empty() {
        query = query.without_any_components(without);
    }

    let results = query.get_results();
    for entry in results {
        writeln!(out, "{}", describe(entry))?;
    }
    tracing::info!(matches = results.len(), "query finished");
    Ok(())
}

fn describe(entry: &CatalogEntry) -> String {
    let capabilities = entry.capabilities().names().join(",");
    match entry.package() {
        Some(package) => format!(
            "{}  {}  [{capabilities}]  ({package})",
            entry.identity(),
            entry.relative_path()
        ),
        None => format!("{}  {}  [{capabilities}]", entry.identity(), entry.relative_path()),
    }
}

async fn inspect<W: Write>(dir: &Path, out: &mut W) -> Result<(), CliError> {
    let (_, stowage) = load(dir).await?;
    let manifest = stowage
        .manifest()
        .ok_or(CliError::Unavailable(InitOutcome::NotFound))?;

    let mut primaries: BTreeMap<&str, usize> = BTreeMap::new();
    let mut packages: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in manifest.entries() {
        if let Some(primary) = entry.primary_capability() {
            *primaries.entry(primary.name()).or_default() += 1;
        }
        if let Some(package) = entry.package() {
            *packages.entry(package).or_default() += 1;
        }
    }

    writeln!(out, "catalog   {}", stowage.config().catalog_location())?;
    writeln!(out, "created   {}", manifest.created_at().to_rfc3339())?;
    writeln!(out, "entries   {}", manifest.len())?;
    writeln!(out, "capabilities")?;
    for (name, count) in &primaries {
        writeln!(out, "  {name:<24} {count}")?;
    }
    if !packages.is_empty() {
        writeln!(out, "packages")?;
        for (name, count) in &packages {
            writeln!(out, "  {name:<24} {count}")?;
        }
    }
    Ok(())
}
