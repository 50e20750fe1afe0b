//! Storage operations
//!
//! Path resolution with root containment and the four filesystem operations
//! backing the HTTP surface: list, read, write, and delete.

use crate::error::StorageError;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Outcome of a write, used to pick between 201 Created and 200 OK
#[derive(Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Updated,
}

/// Resolve a request path against the root directory
///
/// Resolution is purely lexical: `.` is skipped, `..` pops one resolved
/// component and fails when it would leave the root, absolute components are
/// rejected. The containment check runs before any filesystem call, so
/// nothing outside the root is ever touched.
pub fn resolve_request_path(root: &Path, raw: &str) -> Result<PathBuf, StorageError> {
    let mut resolved = root.to_path_buf();

    for component in Path::new(raw).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !resolved.pop() || !resolved.starts_with(root) {
                    return Err(StorageError::InvalidPath(raw.to_string()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::InvalidPath(raw.to_string()));
            }
        }
    }

    if resolved.starts_with(root) {
        Ok(resolved)
    } else {
        Err(StorageError::InvalidPath(raw.to_string()))
    }
}

/// List the entry names of a directory under the root, sorted by name
pub async fn list_directory(root: &Path, rel: &str) -> Result<Vec<String>, StorageError> {
    let full = resolve_request_path(root, rel)?;

    let metadata = fs::metadata(&full)
        .await
        .map_err(|e| not_found_or_io(e, rel))?;
    if !metadata.is_dir() {
        // A trailing slash on a regular file names a directory that does not exist
        return Err(StorageError::NotFound(display_path(rel).to_string()));
    }

    let mut entries = Vec::new();
    let mut dir = fs::read_dir(&full)
        .await
        .map_err(|e| not_found_or_io(e, rel))?;
    while let Some(entry) = dir.next_entry().await.map_err(StorageError::from)? {
        entries.push(entry.file_name().to_string_lossy().into_owned());
    }
    entries.sort();

    Ok(entries)
}

/// Read the raw contents of a regular file under the root
pub async fn read_file(root: &Path, rel: &str) -> Result<Vec<u8>, StorageError> {
    let full = resolve_request_path(root, rel)?;

    let metadata = fs::metadata(&full)
        .await
        .map_err(|e| not_found_or_io(e, rel))?;
    if metadata.is_dir() {
        return Err(StorageError::IsADirectory(display_path(rel).to_string()));
    }

    fs::read(&full).await.map_err(|e| not_found_or_io(e, rel))
}

/// Write the body as file contents, creating missing parent directories
pub async fn write_file(
    root: &Path,
    rel: &str,
    contents: &[u8],
) -> Result<WriteOutcome, StorageError> {
    let full = resolve_request_path(root, rel)?;
    if full.as_path() == root {
        return Err(StorageError::IsADirectory(display_path(rel).to_string()));
    }

    match fs::metadata(&full).await {
        Ok(metadata) if metadata.is_dir() => {
            Err(StorageError::IsADirectory(display_path(rel).to_string()))
        }
        Ok(_) => {
            fs::write(&full, contents).await?;
            Ok(WriteOutcome::Updated)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&full, contents).await?;
            Ok(WriteOutcome::Created)
        }
        Err(e) => Err(StorageError::from(e)),
    }
}

/// Delete a regular file under the root
///
/// Deleting a missing file reports `NotFound`; directories are rejected.
pub async fn delete_file(root: &Path, rel: &str) -> Result<(), StorageError> {
    let full = resolve_request_path(root, rel)?;
    if full.as_path() == root {
        return Err(StorageError::IsADirectory(display_path(rel).to_string()));
    }

    let metadata = fs::metadata(&full)
        .await
        .map_err(|e| not_found_or_io(e, rel))?;
    if metadata.is_dir() {
        return Err(StorageError::IsADirectory(display_path(rel).to_string()));
    }

    fs::remove_file(&full)
        .await
        .map_err(|e| not_found_or_io(e, rel))
}

/// Map a NotFound I/O error onto the NotFound variant, keep the rest as Io
fn not_found_or_io(error: io::Error, rel: &str) -> StorageError {
    if error.kind() == io::ErrorKind::NotFound {
        StorageError::NotFound(display_path(rel).to_string())
    } else {
        StorageError::Io(error)
    }
}

/// Request paths naming the root itself display as "/"
fn display_path(rel: &str) -> &str {
    if rel.is_empty() {
        "/"
    } else {
        rel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn root_fixture() -> TempDir {
        TempDir::new().expect("failed to create temp root")
    }

    #[test]
    fn test_resolve_simple_path() {
        let root = Path::new("/srv/files");
        let resolved = resolve_request_path(root, "foo/bar.txt").unwrap();
        assert_eq!(resolved, Path::new("/srv/files/foo/bar.txt"));
    }

    #[test]
    fn test_resolve_empty_path_is_root() {
        let root = Path::new("/srv/files");
        assert_eq!(resolve_request_path(root, "").unwrap(), root);
    }

    #[test]
    fn test_resolve_skips_cur_dir_components() {
        let root = Path::new("/srv/files");
        let resolved = resolve_request_path(root, "a/./b").unwrap();
        assert_eq!(resolved, Path::new("/srv/files/a/b"));
    }

    #[test]
    fn test_resolve_parent_dir_within_root() {
        let root = Path::new("/srv/files");
        let resolved = resolve_request_path(root, "a/../b.txt").unwrap();
        assert_eq!(resolved, Path::new("/srv/files/b.txt"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let root = Path::new("/srv/files");
        for raw in [
            "..",
            "../etc/passwd",
            "a/../../etc/passwd",
            "a/b/../../../x",
        ] {
            assert!(
                matches!(
                    resolve_request_path(root, raw),
                    Err(StorageError::InvalidPath(_))
                ),
                "expected InvalidPath for {raw:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_list_empty_directory() {
        let root = root_fixture();
        let entries = list_directory(root.path(), "").await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_list_returns_sorted_names() {
        let root = root_fixture();
        std::fs::write(root.path().join("b.txt"), b"b").unwrap();
        std::fs::write(root.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(root.path().join("sub")).unwrap();

        let entries = list_directory(root.path(), "").await.unwrap();
        assert_eq!(entries, vec!["a.txt", "b.txt", "sub"]);
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_not_found() {
        let root = root_fixture();
        let result = list_directory(root.path(), "missing/").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_file_is_not_found() {
        let root = root_fixture();
        std::fs::write(root.path().join("foo.txt"), b"hi").unwrap();
        let result = list_directory(root.path(), "foo.txt/").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_read_write_round_trip() {
        let root = root_fixture();

        let outcome = write_file(root.path(), "foo.txt", b"hi").await.unwrap();
        assert_eq!(outcome, WriteOutcome::Created);
        assert_eq!(read_file(root.path(), "foo.txt").await.unwrap(), b"hi");

        let outcome = write_file(root.path(), "foo.txt", b"bye").await.unwrap();
        assert_eq!(outcome, WriteOutcome::Updated);
        assert_eq!(read_file(root.path(), "foo.txt").await.unwrap(), b"bye");
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let root = root_fixture();
        write_file(root.path(), "nested/a/b.txt", b"deep")
            .await
            .unwrap();
        assert_eq!(
            read_file(root.path(), "nested/a/b.txt").await.unwrap(),
            b"deep"
        );
    }

    #[tokio::test]
    async fn test_write_to_directory_is_rejected() {
        let root = root_fixture();
        std::fs::create_dir(root.path().join("sub")).unwrap();

        let result = write_file(root.path(), "sub", b"x").await;
        assert!(matches!(result, Err(StorageError::IsADirectory(_))));

        let result = write_file(root.path(), "", b"x").await;
        assert!(matches!(result, Err(StorageError::IsADirectory(_))));
    }

    #[tokio::test]
    async fn test_read_directory_is_rejected() {
        let root = root_fixture();
        std::fs::create_dir(root.path().join("sub")).unwrap();
        let result = read_file(root.path(), "sub").await;
        assert!(matches!(result, Err(StorageError::IsADirectory(_))));
    }

    #[tokio::test]
    async fn test_read_missing_file_is_not_found() {
        let root = root_fixture();
        let result = read_file(root.path(), "missing.txt").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let root = root_fixture();
        write_file(root.path(), "foo.txt", b"hi").await.unwrap();

        delete_file(root.path(), "foo.txt").await.unwrap();

        let result = read_file(root.path(), "foo.txt").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_not_found() {
        let root = root_fixture();
        let result = delete_file(root.path(), "missing.txt").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_directory_is_rejected() {
        let root = root_fixture();
        std::fs::create_dir(root.path().join("sub")).unwrap();
        let result = delete_file(root.path(), "sub").await;
        assert!(matches!(result, Err(StorageError::IsADirectory(_))));
    }

    #[tokio::test]
    async fn test_traversal_write_touches_nothing_outside_root() {
        let outer = root_fixture();
        let root = outer.path().join("root");
        std::fs::create_dir(&root).unwrap();

        let result = write_file(&root, "../escape.txt", b"x").await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));
        assert!(!outer.path().join("escape.txt").exists());
    }

    #[tokio::test]
    async fn test_traversal_delete_touches_nothing_outside_root() {
        let outer = root_fixture();
        let root = outer.path().join("root");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(outer.path().join("secret.txt"), b"secret").unwrap();

        let result = delete_file(&root, "../secret.txt").await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));
        assert!(outer.path().join("secret.txt").exists());
    }
}
