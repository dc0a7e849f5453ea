//! # Path Resolution Module
//!
//! Risolve un path scomposto in segmenti in un handle di directory o di file,
//! creando opzionalmente le directory intermedie.
//! Usato dal batch per ottenere i target di scrittura degli output.

use tracing::debug;

use super::handle::{DirectoryHandle, DirectoryOptions, FileOptions};
use crate::error::{FsError, FsResult};

/// Split a slash separated path into segments, dropping empty ones
pub fn parse_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Descend through `path` from `root`, returning the final directory.
///
/// An empty path returns `root` itself.
pub async fn get_directory_handle<D, S>(
    root: &D,
    path: &[S],
    options: DirectoryOptions,
) -> FsResult<D>
where
    D: DirectoryHandle,
    S: AsRef<str> + Sync,
{
    let mut current = root.clone();
    for segment in path {
        debug!("Descending into {:?} (create: {})", segment.as_ref(), options.create);
        current = current.get_directory_handle(segment.as_ref(), options).await?;
    }
    Ok(current)
}

/// Resolve the file named by the last segment of `path`.
///
/// Intermediate segments are resolved as directories with `directory_options`,
/// the final one as a file with `file_options`.
pub async fn get_file_handle<D, S>(
    root: &D,
    path: &[S],
    directory_options: DirectoryOptions,
    file_options: FileOptions,
) -> FsResult<D::File>
where
    D: DirectoryHandle,
    S: AsRef<str> + Sync,
{
    let Some((file_name, parents)) = path.split_last() else {
        return Err(FsError::invalid_argument("Path must not be empty"));
    };

    let folder = get_directory_handle(root, parents, directory_options).await?;
    debug!("Opening file {:?} (create: {})", file_name.as_ref(), file_options.create);
    folder.get_file_handle(file_name.as_ref(), file_options).await
}
