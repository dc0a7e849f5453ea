//! # Hierarchical Enumerator
//!
//! Visita depth-first di un albero di handle, producendo coppie (path, handle)
//! per ogni file discendente.
//!
//! ## Caratteristiche:
//! - **Lazy**: ogni directory viene letta solo quando lo stream arriva a lei
//! - **Ordine nativo**: nessun ordinamento, si segue l'ordine dello storage
//! - **Non riavviabile**: una nuova chiamata esegue una nuova visita
//! - **Errori**: il primo errore di lettura viene emesso e lo stream termina
//!
//! ## Esempio:
//! ```rust,ignore
//! let mut stream = std::pin::pin!(entries(root));
//! while let Some(entry) = stream.try_next().await? {
//!     println!("{}", entry.path_string());
//! }
//! ```

use futures::stream::{self, Stream};
use tracing::debug;

use super::handle::{DirectoryHandle, Entry, Handle};
use crate::error::FsResult;

/// Children of one directory still to be visited
struct Frame<D: DirectoryHandle> {
    prefix: Vec<String>,
    children: std::vec::IntoIter<(String, Handle<D>)>,
}

/// Explicit-stack walk state threaded through the stream
struct Walk<D: DirectoryHandle> {
    root: Option<D>,
    stack: Vec<Frame<D>>,
}

impl<D: DirectoryHandle> Walk<D> {
    fn new(root: D) -> Self {
        Self {
            root: Some(root),
            stack: Vec::new(),
        }
    }

    async fn descend(&mut self, dir: &D, prefix: Vec<String>) -> FsResult<()> {
        let children = dir.entries().await?;
        debug!("Listed {} children under /{}", children.len(), prefix.join("/"));
        self.stack.push(Frame {
            prefix,
            children: children.into_iter(),
        });
        Ok(())
    }

    async fn next_entry(mut self) -> FsResult<Option<(Entry<D>, Self)>> {
        if let Some(root) = self.root.take() {
            self.descend(&root, Vec::new()).await?;
        }

        loop {
            let Some(frame) = self.stack.last_mut() else {
                return Ok(None);
            };
            let Some((name, handle)) = frame.children.next() else {
                self.stack.pop();
                continue;
            };

            let mut path = frame.prefix.clone();
            path.push(name);

            match handle {
                Handle::Directory(dir) => self.descend(&dir, path).await?,
                Handle::File(file) => {
                    let entry = Entry {
                        path,
                        handle: Handle::File(file),
                    };
                    return Ok(Some((entry, self)));
                }
            }
        }
    }
}

/// Enumerate every file below `root` as a lazy stream of entries.
///
/// Each entry path lists the directory names from `root` down to the file,
/// followed by the file name.
pub fn entries<D: DirectoryHandle>(root: D) -> impl Stream<Item = FsResult<Entry<D>>> + Send {
    stream::try_unfold(Walk::new(root), Walk::next_entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryDirectory;
    use crate::error::FsError;
    use crate::fsa::FileHandle;
    use futures::TryStreamExt;

    async fn collect_paths(root: MemoryDirectory) -> Vec<String> {
        entries(root)
            .map_ok(|entry| entry.path_string())
            .try_collect()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_directory_yields_nothing() {
        let root = MemoryDirectory::new_root();
        assert!(collect_paths(root).await.is_empty());
    }

    #[tokio::test]
    async fn test_nested_tree_in_native_order() {
        let root = MemoryDirectory::new_root();
        root.add_file(&["top.jpg"], b"1").unwrap();
        root.add_file(&["a", "b", "c.txt"], b"2").unwrap();
        root.add_file(&["a", "one.png"], b"3").unwrap();
        root.add_directory(&["empty"]).unwrap();
        root.add_file(&["z.webp"], b"4").unwrap();

        let paths = collect_paths(root).await;
        assert_eq!(paths, vec!["top.jpg", "a/b/c.txt", "a/one.png", "z.webp"]);
    }

    #[tokio::test]
    async fn test_entries_carry_file_handles() {
        let root = MemoryDirectory::new_root();
        let file = root.add_file(&["a", "b", "c.txt"], b"hello").unwrap();

        let found: Vec<_> = entries(root).try_collect().await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, vec!["a", "b", "c.txt"]);
        assert_eq!(found[0].name(), "c.txt");
        let handle = found[0].handle.as_file().unwrap();
        assert!(handle.is_same_entry(&file));
    }

    #[tokio::test]
    async fn test_enumeration_is_lazy() {
        let root = MemoryDirectory::new_root();
        root.add_file(&["first.jpg"], b"").unwrap();
        let locked = root.add_directory(&["locked"]).unwrap();
        locked.set_fail_listing(true);

        let mut stream = std::pin::pin!(entries(root));
        let first = stream.try_next().await.unwrap().unwrap();
        assert_eq!(first.path_string(), "first.jpg");

        let err = stream.try_next().await.unwrap_err();
        assert!(matches!(err, FsError::Storage(_)));
        assert!(stream.try_next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fresh_traversal_observes_changes() {
        let root = MemoryDirectory::new_root();
        root.add_file(&["a.jpg"], b"").unwrap();
        assert_eq!(collect_paths(root.clone()).await, vec!["a.jpg"]);

        root.add_file(&["sub", "b.jpg"], b"").unwrap();
        assert_eq!(collect_paths(root).await, vec!["a.jpg", "sub/b.jpg"]);
    }
}
