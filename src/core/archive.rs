//! core::archive
//!
//! Packaging of deployable code artifacts.
//!
//! # Operations
//!
//! - [`upload_bytes`] - What `uploadZip` sends: a plain file's raw bytes, or
//!   a zip archive of a directory
//! - [`archive`] - Always a zip archive; a plain file becomes a single
//!   top-level entry named after the file
//!
//! # Layout
//!
//! Directories are walked depth-first. Every directory becomes a zero-length
//! entry whose name ends with `/`, every file an entry at its path relative
//! to the root, joined with `/`. Entries come out in the order the
//! filesystem lists each directory, which differs between filesystems, so
//! nothing downstream may rely on entry order.
//!
//! Symbolic links are followed: a linked directory is archived like a real
//! one, under the link's name.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Errors from packaging.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Could not find file or directory at {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to walk '{path}': {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("failed to write archive: {0}")]
    Io(#[from] std::io::Error),
}

/// Packaging options.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageOptions {
    /// Leave out files that are already `.zip` archives.
    pub skip_archives: bool,
}

/// Bytes to upload for the artifact at `path`.
///
/// A plain file is uploaded as-is; a directory is archived.
pub fn upload_bytes(path: &Path, options: PackageOptions) -> Result<Vec<u8>, PackageError> {
    if !path.exists() {
        return Err(PackageError::NotFound(path.to_path_buf()));
    }
    if path.is_file() {
        return read(path);
    }
    archive_directory(path, options)
}

/// Zip archive of the file or directory at `path`.
pub fn archive(path: &Path, options: PackageOptions) -> Result<Vec<u8>, PackageError> {
    if !path.exists() {
        return Err(PackageError::NotFound(path.to_path_buf()));
    }
    if path.is_file() {
        return archive_file(path);
    }
    archive_directory(path, options)
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
}

fn read(path: &Path) -> Result<Vec<u8>, PackageError> {
    fs::read(path).map_err(|source| PackageError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn archive_file(path: &Path) -> Result<Vec<u8>, PackageError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let contents = read(path)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file(name, entry_options())?;
    zip.write_all(&contents)?;
    Ok(zip.finish()?.into_inner())
}

fn archive_directory(root: &Path, options: PackageOptions) -> Result<Vec<u8>, PackageError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut entries = 0usize;

    for entry in WalkDir::new(root).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|source| PackageError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        let name = entry_name(root, entry.path());

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", name), entry_options())?;
        } else {
            if options.skip_archives && is_archive(entry.path()) {
                debug!(path = %entry.path().display(), "skipping nested archive");
                continue;
            }
            zip.start_file(name, entry_options())?;
            zip.write_all(&read(entry.path())?)?;
        }
        entries += 1;
    }

    let bytes = zip.finish()?.into_inner();
    debug!(root = %root.display(), entries, size = bytes.len(), "archived directory");
    Ok(bytes)
}

/// Relative path of `path` below `root`, joined with `/`.
fn entry_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_archive(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "zip")
}
