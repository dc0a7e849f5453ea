//! # Batch Orchestrator Module
//!
//! Questo modulo orchestra un batch di ridimensionamento sopra due alberi di
//! handle: una sorgente da cui leggere e un target in cui scrivere.
//!
//! ## Flusso di esecuzione:
//! 1. **Discovery**: enumerazione lazy di tutti i file della sorgente
//! 2. **Filtro**: solo immagini (o le estensioni configurate)
//! 3. **Path di output**: stesso path relativo, nome rinominato dal `Transform`
//! 4. **Skip**: se `skip_existing` e l'output esiste già, il file viene saltato
//! 5. **Scrittura**: lettura, trasformazione e scrittura tramite `get_file_handle`
//!
//! ## Error handling:
//! - Errori sul singolo file non bloccano il batch, vengono contati e loggati
//! - Un errore dell'enumerazione interrompe il batch
//!
//! ## Dry run mode:
//! - Legge e trasforma, ma non crea directory né scrive file
//!
//! L'algoritmo di ridimensionamento vero e proprio è esterno: arriva come
//! implementazione di `Transform`. `CopyTransform` copia i byte così come sono.
//!
//! ## Esempio:
//! ```rust,ignore
//! let job = BatchJob::new(source, target, config, CopyTransform::new(None))?;
//! let stats = job.run().await?;
//! ```

use anyhow::Result;
use async_trait::async_trait;
use futures::TryStreamExt;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::file_manager::FileManager;
use crate::fsa::{
    entries, get_file_handle, DirectoryHandle, DirectoryOptions, FileHandle, FileOptions, Handle,
};
use crate::progress::{BatchStats, ProgressManager};

/// Produces the output for one input file
#[async_trait]
pub trait Transform: Send + Sync {
    /// Name of the output file for an input named `name`
    fn output_name(&self, name: &str) -> String;

    /// Transform the contents of the input named `name`
    async fn apply(&self, name: &str, input: Vec<u8>) -> Result<Vec<u8>>;
}

/// Copies bytes unchanged, optionally adding a suffix to the file stem
#[derive(Debug, Clone, Default)]
pub struct CopyTransform {
    suffix: Option<String>,
}

impl CopyTransform {
    pub fn new(suffix: Option<String>) -> Self {
        Self { suffix }
    }
}

#[async_trait]
impl Transform for CopyTransform {
    fn output_name(&self, name: &str) -> String {
        let Some(ref suffix) = self.suffix else {
            return name.to_string();
        };
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => format!("{}{}.{}", stem, suffix, ext),
            _ => format!("{}{}", name, suffix),
        }
    }

    async fn apply(&self, _name: &str, input: Vec<u8>) -> Result<Vec<u8>> {
        Ok(input)
    }
}

enum Outcome {
    Written { read: u64, written: u64 },
    Skipped,
}

/// A batch run from a source tree into a target tree
pub struct BatchJob<S: DirectoryHandle, T: DirectoryHandle> {
    source: S,
    target: T,
    config: Config,
    transform: Box<dyn Transform>,
    progress: ProgressManager,
}

impl<S: DirectoryHandle, T: DirectoryHandle> BatchJob<S, T> {
    /// Create a new batch job
    pub fn new(source: S, target: T, config: Config, transform: impl Transform + 'static) -> Result<Self> {
        config.validate()?;

        let progress = if config.json_output {
            ProgressManager::hidden()
        } else {
            ProgressManager::new()
        };

        Ok(Self {
            source,
            target,
            config,
            transform: Box::new(transform),
            progress,
        })
    }

    /// Replace the progress reporter
    pub fn with_progress(mut self, progress: ProgressManager) -> Self {
        self.progress = progress;
        self
    }

    /// Run the batch over every file of the source tree
    pub async fn run(&self) -> Result<BatchStats> {
        info!("Starting batch from {:?} into {:?}", self.source.name(), self.target.name());
        if self.config.dry_run {
            info!("🧪 Dry run mode: No files will be written");
        }

        let mut stats = BatchStats::new();
        let mut stream = std::pin::pin!(entries(self.source.clone()));

        while let Some(entry) = stream.try_next().await? {
            let label = entry.path_string();

            if !self.accepts(entry.name()) {
                debug!("Ignoring {}", label);
                stats.add_ignored();
                continue;
            }
            let Handle::File(ref file) = entry.handle else {
                continue;
            };

            match self.process(&entry.path, file).await {
                Ok(Outcome::Written { read, written }) => {
                    stats.add_written(read, written);
                    self.progress.update(&format!("✅ {}", label));
                }
                Ok(Outcome::Skipped) => {
                    stats.add_skipped();
                    self.progress.update(&format!("⏩ {}: skipped", label));
                }
                Err(e) => {
                    stats.add_error();
                    error!("Failed to process {}: {:#}", label, e);
                    self.progress.update(&format!("❌ {}: error", label));
                }
            }
        }

        self.progress.finish(&stats.format_summary());
        info!("Batch finished: {}", stats.format_summary());
        Ok(stats)
    }

    fn accepts(&self, name: &str) -> bool {
        if self.config.include_all_files {
            true
        } else if self.config.extensions.is_empty() {
            FileManager::is_image(name)
        } else {
            FileManager::has_extension(name, &self.config.extensions)
        }
    }

    /// Relative output path for an input path
    fn output_path(&self, path: &[String]) -> Vec<String> {
        let mut output = path.to_vec();
        if let Some(last) = output.last_mut() {
            *last = self.transform.output_name(last);
        }
        output
    }

    async fn process(&self, path: &[String], file: &S::File) -> Result<Outcome> {
        let output_path = self.output_path(path);

        if self.config.skip_existing {
            match get_file_handle(
                &self.target,
                &output_path,
                DirectoryOptions::default(),
                FileOptions::default(),
            )
            .await
            {
                Ok(_) => {
                    debug!("Output already exists: {}", output_path.join("/"));
                    return Ok(Outcome::Skipped);
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }
        }

        let input = file.read().await?;
        let read = input.len() as u64;
        let output = self.transform.apply(file.name(), input).await?;
        let written = output.len() as u64;

        if self.config.dry_run {
            info!("[dry run] Would write {}", output_path.join("/"));
            return Ok(Outcome::Written { read, written });
        }

        let target = get_file_handle(
            &self.target,
            &output_path,
            DirectoryOptions {
                create: self.config.create_directories,
            },
            FileOptions::create(),
        )
        .await?;
        target.write(&output).await?;
        debug!("Wrote {} ({} bytes)", output_path.join("/"), written);

        Ok(Outcome::Written { read, written })
    }
}
