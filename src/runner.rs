//! # Command Runner Module
//!
//! Logica dei sottocomandi della CLI, separata da `main.rs` per poterla testare.
//!
//! ## Responsabilità:
//! - Merge dei flag della command line sopra la configurazione da file
//! - Validazione del layout sorgente/output (nessuno dei due dentro l'altro)
//! - Preparazione del target: in dry run una directory di output mancante
//!   non viene creata, il batch scrive su un albero in memoria
//! - `list` e `resolve` sopra una directory locale

use anyhow::Result;
use futures::TryStreamExt;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::info;

use crate::backends::{LocalDirectory, MemoryDirectory};
use crate::batch::{BatchJob, CopyTransform};
use crate::config::Config;
use crate::file_manager::FileManager;
use crate::fsa::{
    entries, get_directory_handle, get_file_handle, parse_path, DirectoryHandle, DirectoryOptions,
    FileOptions, HandleKind,
};
use crate::progress::BatchStats;

/// Command line flags of `run` that override the configuration file
#[derive(Debug, Clone, Default)]
pub struct RunFlags {
    pub dry_run: bool,
    pub skip_existing: bool,
    pub no_create: bool,
    pub all: bool,
    pub suffix: Option<String>,
    pub json: bool,
}

impl RunFlags {
    /// Apply the flags on top of `config`. Flags only ever switch options on;
    /// `--suffix` replaces the configured suffix.
    pub fn merge_into(&self, mut config: Config) -> Config {
        config.dry_run |= self.dry_run;
        config.skip_existing |= self.skip_existing;
        config.include_all_files |= self.all;
        config.json_output |= self.json;
        if self.no_create {
            config.create_directories = false;
        }
        if let Some(ref suffix) = self.suffix {
            config.output_suffix = Some(suffix.clone());
        }
        config
    }
}

/// Load the configuration file (explicit path or default location)
pub async fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path.or_else(Config::default_path) {
        Some(path) => Config::from_file(&path).await,
        None => Ok(Config::default()),
    }
}

/// Absolute form of a path that may not exist yet: the deepest existing
/// ancestor is canonicalized and the missing components are appended.
fn absolute_path(path: &Path) -> Result<PathBuf> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut missing = Vec::new();
    let mut existing = path.as_path();
    while !existing.exists() {
        match (existing.file_name(), existing.parent()) {
            (Some(name), Some(parent)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = existing.canonicalize()?;
    for name in missing.iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

/// Check that source and output are disjoint trees.
///
/// Returns the canonical source and the absolute output path.
pub fn check_layout(source: &Path, output: &Path) -> Result<(PathBuf, PathBuf)> {
    if !source.is_dir() {
        return Err(anyhow::anyhow!("Source directory does not exist: {}", source.display()));
    }

    let canonical_source = source.canonicalize()?;
    let absolute_output = absolute_path(output)?;

    if absolute_output.components().any(|c| c == Component::ParentDir) {
        return Err(anyhow::anyhow!("Output path must not contain '..': {}", output.display()));
    }
    if absolute_output.starts_with(&canonical_source) {
        return Err(anyhow::anyhow!(
            "Output directory must not be inside the source directory: {}",
            output.display()
        ));
    }
    if canonical_source.starts_with(&absolute_output) {
        return Err(anyhow::anyhow!(
            "Source directory must not be inside the output directory: {}",
            source.display()
        ));
    }

    Ok((canonical_source, absolute_output))
}

/// Where a batch writes its outputs
#[derive(Debug)]
pub enum OutputTarget {
    Local(LocalDirectory),
    /// Dry run into a missing output directory
    Simulated(MemoryDirectory),
}

/// Open (or create) the output directory. A dry run never touches the disk.
pub async fn prepare_output(output: &Path, config: &Config) -> Result<OutputTarget> {
    if !output.exists() {
        if config.dry_run {
            info!("🧪 Output directory {} does not exist, simulating it", output.display());
            return Ok(OutputTarget::Simulated(MemoryDirectory::new_root()));
        }
        tokio::fs::create_dir_all(output).await?;
        info!("Created output directory: {}", output.display());
    }
    if !output.is_dir() {
        return Err(anyhow::anyhow!("Output path is not a directory: {}", output.display()));
    }
    Ok(OutputTarget::Local(LocalDirectory::open(output).await?))
}

async fn run_into<T: DirectoryHandle>(source: LocalDirectory, target: T, config: Config) -> Result<BatchStats> {
    let suffix = config.output_suffix.clone();
    let job = BatchJob::new(source, target, config, CopyTransform::new(suffix))?;
    job.run().await
}

/// Run a batch from `source` into `output`
pub async fn run_batch(source: &Path, output: &Path, config: Config) -> Result<BatchStats> {
    config.validate()?;
    let (canonical_source, absolute_output) = check_layout(source, output)?;

    let source = LocalDirectory::open(&canonical_source).await?;
    match prepare_output(&absolute_output, &config).await? {
        OutputTarget::Local(target) => run_into(source, target, config).await,
        OutputTarget::Simulated(target) => run_into(source, target, config).await,
    }
}

/// One line of `list` output
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ListedEntry {
    pub path: String,
    pub kind: HandleKind,
}

/// Enumerate `directory`, keeping only images unless `all` is set
pub async fn list_entries(directory: &Path, all: bool) -> Result<Vec<ListedEntry>> {
    let root = LocalDirectory::open(directory).await?;
    let listed: Vec<ListedEntry> = entries(root)
        .try_filter(|entry| futures::future::ready(all || FileManager::is_image(entry.name())))
        .map_ok(|entry| ListedEntry {
            path: entry.path_string(),
            kind: entry.handle.kind(),
        })
        .try_collect()
        .await?;
    Ok(listed)
}

/// Resolve a slash separated path below `directory` to a local path
pub async fn resolve_path(directory: &Path, path: &str, file: bool, create: bool) -> Result<PathBuf> {
    let root = LocalDirectory::open(directory).await?;
    let segments = parse_path(path);

    let resolved = if file {
        get_file_handle(&root, &segments, DirectoryOptions { create }, FileOptions { create })
            .await?
            .path()
            .to_path_buf()
    } else {
        get_directory_handle(&root, &segments, DirectoryOptions { create })
            .await?
            .path()
            .to_path_buf()
    };
    Ok(resolved)
}
