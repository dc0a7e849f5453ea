//! # Handle Capability Module
//!
//! Definisce l'interfaccia astratta verso lo storage gerarchico.
//!
//! ## Responsabilità:
//! - `DirectoryHandle`: elenca i figli diretti e recupera figli per nome
//! - `FileHandle`: lettura e scrittura del contenuto di un file
//! - `Handle`: capability verso una directory o un file
//! - `Entry`: coppia (path, handle) prodotta dall'enumerazione
//!
//! Gli handle appartengono al sistema di storage; questo crate non li mette
//! mai in cache oltre la durata di una singola chiamata.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::error::{FsError, FsResult};

/// Options for fetching a child directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryOptions {
    /// Create the directory if it does not exist
    pub create: bool,
}

impl DirectoryOptions {
    pub fn create() -> Self {
        Self { create: true }
    }
}

/// Options for fetching a child file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileOptions {
    /// Create an empty file if it does not exist
    pub create: bool,
}

impl FileOptions {
    pub fn create() -> Self {
        Self { create: true }
    }
}

/// Capability referencing a file in the storage hierarchy
#[async_trait]
pub trait FileHandle: fmt::Debug + Clone + Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Read the whole file
    async fn read(&self) -> FsResult<Vec<u8>>;

    /// Replace the file contents
    async fn write(&self, data: &[u8]) -> FsResult<()>;

    /// True when both handles reference the same file
    fn is_same_entry(&self, other: &Self) -> bool;
}

/// Capability referencing a directory in the storage hierarchy
#[async_trait]
pub trait DirectoryHandle: fmt::Debug + Clone + Send + Sync + 'static {
    type File: FileHandle;

    fn name(&self) -> &str;

    /// List direct children in the storage's native order
    async fn entries(&self) -> FsResult<Vec<(String, Handle<Self>)>>;

    /// Fetch a child directory.
    ///
    /// Fails with `NotFound` when absent and `options.create` is false,
    /// and with `TypeMismatch` when `name` is a file.
    async fn get_directory_handle(&self, name: &str, options: DirectoryOptions) -> FsResult<Self>;

    /// Fetch a child file.
    ///
    /// Fails with `NotFound` when absent and `options.create` is false,
    /// and with `TypeMismatch` when `name` is a directory.
    async fn get_file_handle(&self, name: &str, options: FileOptions) -> FsResult<Self::File>;

    /// True when both handles reference the same directory
    fn is_same_entry(&self, other: &Self) -> bool;
}

/// Kind tag of a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleKind {
    Directory,
    File,
}

/// Either a directory or a file handle
#[derive(Debug, Clone)]
pub enum Handle<D: DirectoryHandle> {
    Directory(D),
    File(D::File),
}

impl<D: DirectoryHandle> Handle<D> {
    pub fn kind(&self) -> HandleKind {
        match self {
            Handle::Directory(_) => HandleKind::Directory,
            Handle::File(_) => HandleKind::File,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Handle::Directory(dir) => dir.name(),
            Handle::File(file) => file.name(),
        }
    }

    pub fn as_file(&self) -> Option<&D::File> {
        match self {
            Handle::File(file) => Some(file),
            Handle::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&D> {
        match self {
            Handle::Directory(dir) => Some(dir),
            Handle::File(_) => None,
        }
    }
}

/// A (path, handle) pair produced by enumeration
#[derive(Debug, Clone)]
pub struct Entry<D: DirectoryHandle> {
    /// Segments from the enumeration root to the handle, inclusive
    pub path: Vec<String>,
    pub handle: Handle<D>,
}

impl<D: DirectoryHandle> Entry<D> {
    pub fn path_string(&self) -> String {
        self.path.join("/")
    }

    /// Name of the handle, i.e. the last path segment
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }
}

/// Validate a single child name before handing it to a backend.
///
/// Rejects names that could not denote a direct child: empty, `.`, `..`
/// and anything containing a path separator.
pub fn validate_name(name: &str) -> FsResult<()> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(FsError::invalid_argument(format!("Invalid entry name: {:?}", name)));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(FsError::invalid_argument(format!(
            "Entry name must not contain a path separator: {:?}",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("photo.jpg").is_ok());
        assert!(validate_name(".hidden").is_ok());
        for bad in ["", ".", "..", "a/b", "a\\b"] {
            assert!(
                matches!(validate_name(bad), Err(FsError::InvalidArgument(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_options_default_do_not_create() {
        assert!(!DirectoryOptions::default().create);
        assert!(!FileOptions::default().create);
        assert!(DirectoryOptions::create().create);
        assert!(FileOptions::create().create);
    }

    #[test]
    fn test_handle_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&HandleKind::File).unwrap(), "\"file\"");
        assert_eq!(
            serde_json::to_string(&HandleKind::Directory).unwrap(),
            "\"directory\""
        );
    }
}
