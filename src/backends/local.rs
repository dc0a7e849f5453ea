//! # Local Filesystem Backend
//!
//! Implementa gli handle sopra il filesystem locale tramite `tokio::fs`.
//!
//! ## Mappatura errori:
//! - `ErrorKind::NotFound` → `FsError::NotFound`
//! - directory al posto di file (o viceversa) → `FsError::TypeMismatch`
//! - tutto il resto → `FsError::Storage`
//!
//! ## Albero stretto:
//! Vengono elencati solo file regolari e directory. Symlink, socket e
//! device non compaiono nell'enumerazione, così la visita non può ciclare.
//! I resolver usano `symlink_metadata` e rifiutano gli stessi nodi con
//! `TypeMismatch`: un nome che `entries()` non mostra non è raggiungibile.
//! Solo la radice passata a `open` segue i symlink.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::{FsError, FsResult};
use crate::fsa::{validate_name, DirectoryHandle, DirectoryOptions, FileHandle, FileOptions, Handle};

/// Directory handle backed by a local path
#[derive(Debug, Clone)]
pub struct LocalDirectory {
    name: String,
    path: PathBuf,
}

/// File handle backed by a local path
#[derive(Debug, Clone)]
pub struct LocalFile {
    name: String,
    path: PathBuf,
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Metadata of `path` following symlinks, or `None` when it does not exist
async fn metadata_if_exists(path: &Path) -> FsResult<Option<std::fs::Metadata>> {
    match fs::metadata(path).await {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Metadata of the child entry itself (symlinks not followed)
async fn child_metadata(path: &Path) -> FsResult<Option<std::fs::Metadata>> {
    match fs::symlink_metadata(path).await {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn not_regular(path: &Path) -> FsError {
    FsError::type_mismatch(format!(
        "{} is not a regular file or directory",
        path.display()
    ))
}

impl LocalDirectory {
    /// Open an existing directory as an enumeration or resolution root
    pub async fn open(path: impl AsRef<Path>) -> FsResult<Self> {
        let path = path.as_ref();
        match metadata_if_exists(path).await? {
            Some(metadata) if metadata.is_dir() => Ok(Self {
                name: file_name_of(path),
                path: path.to_path_buf(),
            }),
            Some(_) => Err(FsError::type_mismatch(format!(
                "{} is not a directory",
                path.display()
            ))),
            None => Err(FsError::not_found(path.display().to_string())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocalFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DirectoryHandle for LocalDirectory {
    type File = LocalFile;

    fn name(&self) -> &str {
        &self.name
    }

    async fn entries(&self) -> FsResult<Vec<(String, Handle<Self>)>> {
        let mut read_dir = fs::read_dir(&self.path).await?;
        let mut entries = Vec::new();

        while let Some(entry) = read_dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            let file_type = entry.file_type().await?;

            let handle = if file_type.is_dir() {
                Handle::Directory(LocalDirectory {
                    name: name.clone(),
                    path,
                })
            } else if file_type.is_file() {
                Handle::File(LocalFile {
                    name: name.clone(),
                    path,
                })
            } else {
                debug!("Skipping non-regular entry: {}", path.display());
                continue;
            };
            entries.push((name, handle));
        }

        Ok(entries)
    }

    async fn get_directory_handle(&self, name: &str, options: DirectoryOptions) -> FsResult<Self> {
        validate_name(name)?;
        let path = self.path.join(name);

        match child_metadata(&path).await? {
            Some(metadata) if metadata.is_dir() => {}
            Some(metadata) if metadata.is_file() => {
                return Err(FsError::type_mismatch(format!(
                    "{} is a file, not a directory",
                    path.display()
                )))
            }
            Some(_) => return Err(not_regular(&path)),
            None if options.create => {
                debug!("Creating directory: {}", path.display());
                match fs::create_dir(&path).await {
                    Ok(()) => {}
                    // Lost a race with another writer; the directory is there now
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                        match child_metadata(&path).await? {
                            Some(metadata) if metadata.is_dir() => {}
                            _ => return Err(e.into()),
                        }
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            None => return Err(FsError::not_found(path.display().to_string())),
        }

        Ok(Self {
            name: name.to_string(),
            path,
        })
    }

    async fn get_file_handle(&self, name: &str, options: FileOptions) -> FsResult<LocalFile> {
        validate_name(name)?;
        let path = self.path.join(name);

        match child_metadata(&path).await? {
            Some(metadata) if metadata.is_file() => {}
            Some(metadata) if metadata.is_dir() => {
                return Err(FsError::type_mismatch(format!(
                    "{} is a directory, not a file",
                    path.display()
                )))
            }
            Some(_) => return Err(not_regular(&path)),
            None if options.create => {
                debug!("Creating file: {}", path.display());
                fs::OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(&path)
                    .await?;
            }
            None => return Err(FsError::not_found(path.display().to_string())),
        }

        Ok(LocalFile {
            name: name.to_string(),
            path,
        })
    }

    fn is_same_entry(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

#[async_trait]
impl FileHandle for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> FsResult<Vec<u8>> {
        Ok(fs::read(&self.path).await?)
    }

    async fn write(&self, data: &[u8]) -> FsResult<()> {
        fs::write(&self.path, data).await?;
        Ok(())
    }

    fn is_same_entry(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsa::{entries, get_directory_handle, get_file_handle};
    use futures::TryStreamExt;
    use std::collections::BTreeSet;
    use tempfile::TempDir;
    use walkdir::WalkDir;

    fn fixture() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("a/b")).unwrap();
        std::fs::create_dir_all(root.join("empty")).unwrap();
        std::fs::write(root.join("top.jpg"), b"top").unwrap();
        std::fs::write(root.join("a/one.png"), b"one").unwrap();
        std::fs::write(root.join("a/b/c.txt"), b"c").unwrap();
        temp_dir
    }

    #[tokio::test]
    async fn test_open_rejects_files_and_missing_paths() {
        let temp_dir = fixture();
        let err = LocalDirectory::open(temp_dir.path().join("top.jpg")).await.unwrap_err();
        assert!(matches!(err, FsError::TypeMismatch(_)));

        let err = LocalDirectory::open(temp_dir.path().join("nope")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_entries_match_walkdir() {
        let temp_dir = fixture();
        let root = LocalDirectory::open(temp_dir.path()).await.unwrap();

        let found: BTreeSet<String> = entries(root)
            .map_ok(|entry| entry.path_string())
            .try_collect()
            .await
            .unwrap();

        let expected: BTreeSet<String> = WalkDir::new(temp_dir.path())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(temp_dir.path())
                    .unwrap()
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .collect();

        assert_eq!(found, expected);
        assert_eq!(found.len(), 3);
    }

    #[tokio::test]
    async fn test_resolves_existing_file() {
        let temp_dir = fixture();
        let root = LocalDirectory::open(temp_dir.path()).await.unwrap();
        let file = get_file_handle(&root, &["a", "b", "c.txt"], DirectoryOptions::default(), FileOptions::default())
            .await
            .unwrap();
        assert_eq!(file.path(), temp_dir.path().join("a/b/c.txt"));
        assert_eq!(file.read().await.unwrap(), b"c");
    }

    #[tokio::test]
    async fn test_type_mismatch_and_not_found() {
        let temp_dir = fixture();
        let root = LocalDirectory::open(temp_dir.path()).await.unwrap();

        let err = get_directory_handle(&root, &["top.jpg", "y"], DirectoryOptions::create())
            .await
            .unwrap_err();
        assert!(matches!(err, FsError::TypeMismatch(_)));

        let err = get_file_handle(&root, &["a"], DirectoryOptions::default(), FileOptions::create())
            .await
            .unwrap_err();
        assert!(matches!(err, FsError::TypeMismatch(_)));

        let err = get_file_handle(&root, &["zz", "missing.txt"], DirectoryOptions::default(), FileOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_creates_directories_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = LocalDirectory::open(temp_dir.path()).await.unwrap();

        let file = get_file_handle(&root, &["out", "small", "p.jpg"], DirectoryOptions::create(), FileOptions::create())
            .await
            .unwrap();
        assert!(temp_dir.path().join("out/small").is_dir());
        assert_eq!(std::fs::read(file.path()).unwrap(), b"");

        file.write(b"resized").await.unwrap();
        assert_eq!(std::fs::read(temp_dir.path().join("out/small/p.jpg")).unwrap(), b"resized");
    }

    #[tokio::test]
    async fn test_existing_file_is_not_truncated_on_open() {
        let temp_dir = fixture();
        let root = LocalDirectory::open(temp_dir.path()).await.unwrap();
        let file = root.get_file_handle("top.jpg", FileOptions::create()).await.unwrap();
        assert_eq!(file.read().await.unwrap(), b"top");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinks_are_neither_listed_nor_resolved() {
        use std::os::unix::fs::symlink;

        let temp_dir = fixture();
        symlink(temp_dir.path().join("a"), temp_dir.path().join("link_dir")).unwrap();
        symlink(temp_dir.path().join("top.jpg"), temp_dir.path().join("link.jpg")).unwrap();
        let root = LocalDirectory::open(temp_dir.path()).await.unwrap();

        let found: BTreeSet<String> = entries(root.clone())
            .map_ok(|entry| entry.path_string())
            .try_collect()
            .await
            .unwrap();
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|path| !path.starts_with("link")));

        let err = root
            .get_directory_handle("link_dir", DirectoryOptions::create())
            .await
            .unwrap_err();
        assert!(matches!(err, FsError::TypeMismatch(_)));

        let err = root.get_file_handle("link.jpg", FileOptions::create()).await.unwrap_err();
        assert!(matches!(err, FsError::TypeMismatch(_)));

        let err = get_file_handle(&root, &["link_dir", "one.png"], DirectoryOptions::default(), FileOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FsError::TypeMismatch(_)));
        assert_eq!(std::fs::read(temp_dir.path().join("top.jpg")).unwrap(), b"top");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_symlink_is_not_written_through() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        symlink(temp_dir.path().join("target.jpg"), temp_dir.path().join("out.jpg")).unwrap();
        let root = LocalDirectory::open(temp_dir.path()).await.unwrap();

        let err = root.get_file_handle("out.jpg", FileOptions::create()).await.unwrap_err();
        assert!(matches!(err, FsError::TypeMismatch(_)));
        assert!(!temp_dir.path().join("target.jpg").exists());
    }
}
