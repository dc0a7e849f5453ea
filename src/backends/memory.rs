//! In-memory handle backend.
//!
//! Used for tests and dry runs. Children are kept in insertion order, which
//! is the native iteration order seen by the enumerator.

use async_trait::async_trait;
use std::io;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{FsError, FsResult};
use crate::fsa::{validate_name, DirectoryHandle, DirectoryOptions, FileHandle, FileOptions, Handle};

type DirRef = Arc<RwLock<DirNode>>;
type FileRef = Arc<RwLock<Vec<u8>>>;

#[derive(Debug, Clone)]
enum Node {
    Directory(DirRef),
    File(FileRef),
}

#[derive(Debug, Default)]
struct DirNode {
    children: Vec<(String, Node)>,
    fail_listing: bool,
}

impl DirNode {
    fn child(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|(child, _)| child == name)
            .map(|(_, node)| node)
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> FsResult<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| FsError::storage("lock poisoned"))
}

fn write_lock<T>(lock: &RwLock<T>) -> FsResult<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| FsError::storage("lock poisoned"))
}

/// Directory handle into an in-memory tree
#[derive(Debug, Clone)]
pub struct MemoryDirectory {
    name: String,
    node: DirRef,
}

/// File handle into an in-memory tree
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    data: FileRef,
}

impl MemoryDirectory {
    /// Create an empty tree and return its root
    pub fn new_root() -> Self {
        Self {
            name: String::new(),
            node: Arc::new(RwLock::new(DirNode::default())),
        }
    }

    fn child_directory(&self, name: &str, create: bool) -> FsResult<Self> {
        validate_name(name)?;
        let mut node = write_lock(&self.node)?;
        let dir = match node.child(name).cloned() {
            Some(Node::Directory(dir)) => dir,
            Some(Node::File(_)) => {
                return Err(FsError::type_mismatch(format!("{} is a file, not a directory", name)))
            }
            None if create => {
                let dir = DirRef::default();
                node.children.push((name.to_string(), Node::Directory(dir.clone())));
                dir
            }
            None => return Err(FsError::not_found(name)),
        };
        Ok(Self {
            name: name.to_string(),
            node: dir,
        })
    }

    fn child_file(&self, name: &str, create: bool) -> FsResult<MemoryFile> {
        validate_name(name)?;
        let mut node = write_lock(&self.node)?;
        let data = match node.child(name).cloned() {
            Some(Node::File(data)) => data,
            Some(Node::Directory(_)) => {
                return Err(FsError::type_mismatch(format!("{} is a directory, not a file", name)))
            }
            None if create => {
                let data = FileRef::default();
                node.children.push((name.to_string(), Node::File(data.clone())));
                data
            }
            None => return Err(FsError::not_found(name)),
        };
        Ok(MemoryFile {
            name: name.to_string(),
            data,
        })
    }

    /// Create every directory along `path` and return the last one
    pub fn add_directory(&self, path: &[&str]) -> FsResult<Self> {
        path.iter()
            .try_fold(self.clone(), |dir, name| dir.child_directory(name, true))
    }

    /// Create (or overwrite) the file at `path`, creating parent directories
    pub fn add_file(&self, path: &[&str], contents: &[u8]) -> FsResult<MemoryFile> {
        let Some((name, parents)) = path.split_last() else {
            return Err(FsError::invalid_argument("Path must not be empty"));
        };
        let file = self.add_directory(parents)?.child_file(name, true)?;
        *write_lock(&file.data)? = contents.to_vec();
        Ok(file)
    }

    /// Make `entries()` on this directory fail with a permission error
    pub fn set_fail_listing(&self, fail: bool) {
        if let Ok(mut node) = self.node.write() {
            node.fail_listing = fail;
        }
    }
}

#[async_trait]
impl DirectoryHandle for MemoryDirectory {
    type File = MemoryFile;

    fn name(&self) -> &str {
        &self.name
    }

    async fn entries(&self) -> FsResult<Vec<(String, Handle<Self>)>> {
        let node = read_lock(&self.node)?;
        if node.fail_listing {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("cannot list {:?}", self.name),
            )
            .into());
        }

        let entries = node
            .children
            .iter()
            .map(|(name, child)| {
                let handle = match child {
                    Node::Directory(dir) => Handle::Directory(MemoryDirectory {
                        name: name.clone(),
                        node: dir.clone(),
                    }),
                    Node::File(data) => Handle::File(MemoryFile {
                        name: name.clone(),
                        data: data.clone(),
                    }),
                };
                (name.clone(), handle)
            })
            .collect();
        Ok(entries)
    }

    async fn get_directory_handle(&self, name: &str, options: DirectoryOptions) -> FsResult<Self> {
        self.child_directory(name, options.create)
    }

    async fn get_file_handle(&self, name: &str, options: FileOptions) -> FsResult<MemoryFile> {
        self.child_file(name, options.create)
    }

    fn is_same_entry(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

#[async_trait]
impl FileHandle for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> FsResult<Vec<u8>> {
        Ok(read_lock(&self.data)?.clone())
    }

    async fn write(&self, data: &[u8]) -> FsResult<()> {
        *write_lock(&self.data)? = data.to_vec();
        Ok(())
    }

    fn is_same_entry(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}
