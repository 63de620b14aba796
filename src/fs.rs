//! File system access used by [`crate::Crypter`] and [`crate::WriteEffect`]

use crate::error::{FileSystemError, FsOperation, FsResult};
use crate::path;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// The file system primitives the crate needs.
///
/// Implement this to redirect or record I/O; [`StdFileSystem`] is the real thing.
pub trait FileSystem: Send + Sync {
    /// Read the full contents of `path` as UTF-8 text.
    fn read_all_text(&self, path: &Path) -> FsResult<String>;

    /// Whether `path` names a directory target. Decided by spelling only,
    /// see [`crate::path`].
    fn is_directory_path(&self, path: &str) -> bool {
        path::is_directory_target(path)
    }

    /// Create `path` and any missing parents. Succeeds if it already exists.
    fn ensure_directory(&self, path: &Path) -> FsResult<()>;

    /// Create or overwrite `path` with `data`.
    fn write_all_text(&self, path: &Path, data: &str) -> FsResult<()>;
}

/// [`FileSystem`] backed by `std::fs`.
///
/// Files are written atomically (tempfile + fsync + rename) with mode 0o600
/// on Unix systems, so either the old file or the complete new file exists,
/// never a partial one.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn read_all_text(&self, path: &Path) -> FsResult<String> {
        fs::read_to_string(path).map_err(|e| FileSystemError::new(FsOperation::Read, path, e))
    }

    fn ensure_directory(&self, path: &Path) -> FsResult<()> {
        // The empty path is the current directory.
        if path.as_os_str().is_empty() {
            return Ok(());
        }
        tracing::debug!(path = %path.display(), "ensuring directory");
        fs::create_dir_all(path)
            .map_err(|e| FileSystemError::new(FsOperation::CreateDirectory, path, e))
    }

    fn write_all_text(&self, path: &Path, data: &str) -> FsResult<()> {
        tracing::debug!(path = %path.display(), bytes = data.len(), "writing file");
        write_file_secure(path, data.as_bytes())
            .map_err(|e| FileSystemError::new(FsOperation::Write, path, e))
    }
}

fn write_file_secure(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp_file = tempfile::NamedTempFile::new_in(dir)?;
    temp_file.write_all(contents)?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file.flush()?;
    temp_file.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = temp_file.as_file().metadata()?.permissions();
        perms.set_mode(0o600);
        temp_file.as_file().set_permissions(perms)?;
    }

    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
