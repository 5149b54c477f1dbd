//! Logical path resolution over the [`DriveIndex`].
//!
//! Paths are name sequences relative to the content root, e.g.
//! `["home", "bio"]`. Every segment must match exactly one child of the
//! current cursor by exact name; zero or several matches fail with the full
//! attempted path so the content editor knows what to fix in Drive.

use crate::index::{DriveIndex, RemoteItem};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Failed to find in {path}: found {matches} directories in Drive matching name \"{segment}\"")]
    Directory {
        path: String,
        segment: String,
        matches: usize,
    },
    #[error("Failed to find in {path}: found {matches} files in Drive matching name \"{segment}\"")]
    File {
        path: String,
        segment: String,
        matches: usize,
    },
    #[error("Cannot resolve a file from an empty path")]
    EmptyPath,
}

enum Target {
    Directory,
    File,
}

/// Resolve `names` as a chain of directories below `root_id`.
///
/// An empty `names` resolves to `root_id` itself.
pub fn resolve_directory(
    index: &DriveIndex,
    root_id: &str,
    names: &[&str],
) -> Result<String, ResolveError> {
    let mut cursor = root_id.to_string();
    for segment in names {
        cursor = unique_child(index, &cursor, names, segment, Target::Directory)?
            .id
            .clone();
    }
    Ok(cursor)
}

/// Resolve all but the last segment as directories, then the last segment as
/// a uniquely named child of any kind.
pub fn resolve_file(
    index: &DriveIndex,
    root_id: &str,
    names: &[&str],
) -> Result<String, ResolveError> {
    let (file_name, directories) = names.split_last().ok_or(ResolveError::EmptyPath)?;
    // Errors name the full path, not just the directory part.
    let mut cursor = root_id.to_string();
    for segment in directories {
        cursor = unique_child(index, &cursor, names, segment, Target::Directory)?
            .id
            .clone();
    }
    let file = unique_child(index, &cursor, names, file_name, Target::File)?;
    Ok(file.id.clone())
}

/// Every direct child of the directory at `names`, in index order.
pub fn list_children<'a>(
    index: &'a DriveIndex,
    root_id: &str,
    names: &[&str],
) -> Result<Vec<&'a RemoteItem>, ResolveError> {
    let directory = resolve_directory(index, root_id, names)?;
    Ok(index.children_of(&directory).collect())
}

fn unique_child<'a>(
    index: &'a DriveIndex,
    parent_id: &str,
    names: &[&str],
    segment: &str,
    target: Target,
) -> Result<&'a RemoteItem, ResolveError> {
    let mut matching = index.children_of(parent_id).filter(|item| item.name == segment);
    match (matching.next(), matching.count()) {
        (Some(item), 0) => Ok(item),
        (first, rest) => {
            let matches = usize::from(first.is_some()) + rest;
            let path = names.join("/");
            let segment = segment.to_string();
            Err(match target {
                Target::Directory => ResolveError::Directory {
                    path,
                    segment,
                    matches,
                },
                Target::File => ResolveError::File {
                    path,
                    segment,
                    matches,
                },
            })
        }
    }
}
