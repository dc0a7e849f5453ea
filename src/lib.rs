//! # Batch Image Resizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Architettura dei moduli:
//! - `fsa`: Enumerazione ricorsiva e risoluzione di path sopra handle gerarchici
//! - `backends`: Handle concreti (filesystem locale, albero in memoria)
//! - `batch`: Orchestratore del batch (discovery → trasformazione → scrittura)
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore delle operazioni sugli handle
//! - `file_manager`: Utilità su nomi di file e dimensioni
//! - `progress`: Progress tracking e statistiche
//! - `runner`: Logica dei sottocomandi della CLI
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use batch_image_resizer::{BatchJob, Config, CopyTransform, LocalDirectory};
//!
//! let source = LocalDirectory::open("photos").await?;
//! let target = LocalDirectory::open("resized").await?;
//! let job = BatchJob::new(source, target, Config::default(), CopyTransform::new(None))?;
//! job.run().await?;
//! ```

pub mod backends;
pub mod batch;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod fsa;
pub mod progress;
pub mod runner;

pub use backends::{LocalDirectory, LocalFile, MemoryDirectory, MemoryFile};
pub use batch::{BatchJob, CopyTransform, Transform};
pub use config::Config;
pub use error::{FsError, FsResult};
pub use fsa::{entries, get_directory_handle, get_file_handle, DirectoryHandle, Entry, FileHandle, Handle};
pub use progress::BatchStats;
