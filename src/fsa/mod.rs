//! # File System Access Module
//!
//! Helper ricorsivi sopra handle gerarchici di directory e file:
//! - `handle`: interfaccia astratta verso lo storage
//! - `entries`: enumerazione lazy di tutti i file discendenti
//! - `resolve`: risoluzione di path in handle di directory o file

pub mod entries;
pub mod handle;
pub mod resolve;

pub use entries::entries;
pub use handle::{
    validate_name, DirectoryHandle, DirectoryOptions, Entry, FileHandle, FileOptions, Handle,
    HandleKind,
};
pub use resolve::{get_directory_handle, get_file_handle, parse_path};
