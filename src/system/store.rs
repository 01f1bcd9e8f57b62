//! Line-oriented file storage for the persisted module list.

use crate::error::StoreError;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Reads and rewrites small line-oriented configuration files.
pub trait FileStore: Send + Sync {
    /// Read every line of `path`. A missing file reads as no lines.
    fn read_lines(&self, path: &Path) -> Result<Vec<String>, StoreError>;

    /// Replace the contents of `path` with `lines`, one per line.
    fn write_lines(&self, path: &Path, lines: &[String]) -> Result<(), StoreError>;

    /// Every regular file below `dir`, recursively. A missing directory lists
    /// as no files.
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>, StoreError>;
}

/// Default production implementation of FileStore backed by the local disk.
///
/// Writes go to a temporary file in the target directory which is then
/// renamed over the original, so readers never observe a half-written file.
/// A symlinked path is resolved first and the link target is rewritten; the
/// link itself stays in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskStore;

impl DiskStore {
    pub fn new() -> Self {
        DiskStore
    }
}

impl FileStore for DiskStore {
    fn read_lines(&self, path: &Path) -> Result<Vec<String>, StoreError> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(content.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("[Store] {} not found, treating as empty", path.display());
                Ok(Vec::new())
            }
            Err(e) => Err(StoreError::Read {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    fn write_lines(&self, link: &Path, lines: &[String]) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: link.display().to_string(),
            source,
        };

        let target = resolve_write_target(link);
        let path = target.as_path();
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(write_err)?;

        let mut content = lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }

        let mut tmp = NamedTempFile::new_in(parent).map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;

        // Keep the original mode; new files get the usual 0644
        let permissions = match fs::metadata(path) {
            Ok(meta) => Some(meta.permissions()),
            Err(_) => default_permissions(),
        };
        if let Some(permissions) = permissions {
            fs::set_permissions(tmp.path(), permissions).map_err(write_err)?;
        }

        tmp.persist(path).map_err(|e| write_err(e.error))?;
        log::debug!("[Store] wrote {} lines to {}", lines.len(), path.display());
        Ok(())
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("[Store] Directory not found: {}", dir.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(StoreError::Read {
                    path: dir.display().to_string(),
                    source: e,
                })
            }
        };

        let mut files = Vec::new();
        collect_files(entries, &mut files);
        files.sort();
        Ok(files)
    }
}

/// Recursively collect regular files
/// Gracefully skips directories where permission is denied
fn collect_files(entries: fs::ReadDir, files: &mut Vec<PathBuf>) {
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            match fs::read_dir(entry.path()) {
                Ok(sub) => collect_files(sub, files),
                Err(e) => log::debug!("[Store] Skipping {}: {}", entry.path().display(), e),
            }
        } else if file_type.is_file() {
            files.push(entry.path());
        }
    }
}

/// The file a write to `path` should replace.
///
/// Follows symlinks so the rename lands on the real file. A dangling link
/// resolves to its (relative or absolute) destination; a plain missing file
/// is written where it was named.
fn resolve_write_target(path: &Path) -> PathBuf {
    if let Ok(real) = fs::canonicalize(path) {
        return real;
    }
    match fs::read_link(path) {
        Ok(dest) if dest.is_relative() => path
            .parent()
            .map(|parent| parent.join(&dest))
            .unwrap_or(dest),
        Ok(dest) => dest,
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}
