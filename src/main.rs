//! # Batch Image Resizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Validazione degli input dell'utente
//! - Avvio dei sottocomandi `list`, `resolve` e `run`
//!
//! ## Esempio di utilizzo:
//! ```bash
//! batch-resizer list ~/Pictures --json
//! batch-resizer resolve ~/Pictures trip/day1/beach.png --file
//! batch-resizer run ~/Pictures /tmp/resized --suffix -small --skip-existing
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use batch_image_resizer::runner::{self, RunFlags};

#[derive(Parser)]
#[command(name = "batch-resizer")]
#[command(about = "Enumerate image trees and write resized outputs to a mirrored tree")]
struct Args {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every file below a directory
    List {
        /// Directory to enumerate
        directory: PathBuf,

        /// Include files that are not images
        #[arg(long)]
        all: bool,

        /// Print entries as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Resolve a slash separated path below a directory
    Resolve {
        /// Directory to resolve from
        directory: PathBuf,

        /// Path such as `a/b/c.jpg`
        path: String,

        /// Resolve the last segment as a file
        #[arg(long)]
        file: bool,

        /// Create missing directories (and the file with --file)
        #[arg(long)]
        create: bool,
    },

    /// Process every image of SOURCE into OUTPUT, keeping the tree layout
    Run {
        /// Directory containing images to process
        source: PathBuf,

        /// Output directory (created if missing)
        output: PathBuf,

        /// Configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Dry run - don't write anything
        #[arg(long)]
        dry_run: bool,

        /// Skip files whose output already exists
        #[arg(long)]
        skip_existing: bool,

        /// Don't create missing output directories
        #[arg(long)]
        no_create: bool,

        /// Include files that are not images
        #[arg(long)]
        all: bool,

        /// Suffix inserted before the output extension
        #[arg(long)]
        suffix: Option<String>,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::List {
            directory,
            all,
            json,
        } => {
            let listed = runner::list_entries(&directory, all).await?;
            for entry in &listed {
                if json {
                    println!("{}", serde_json::to_string(entry)?);
                } else {
                    println!("{}", entry.path);
                }
            }
            info!("Listed {} files in {}", listed.len(), directory.display());
        }
        Command::Resolve {
            directory,
            path,
            file,
            create,
        } => {
            let resolved = runner::resolve_path(&directory, &path, file, create).await?;
            println!("{}", resolved.display());
        }
        Command::Run {
            source,
            output,
            config,
            dry_run,
            skip_existing,
            no_create,
            all,
            suffix,
            json,
        } => {
            let flags = RunFlags {
                dry_run,
                skip_existing,
                no_create,
                all,
                suffix,
                json,
            };
            let config = flags.merge_into(runner::load_config(config).await?);
            let json_output = config.json_output;

            let stats = runner::run_batch(&source, &output, config).await?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
        }
    }

    Ok(())
}
