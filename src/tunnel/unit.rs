//! Remote filesystem entry model.
//!
//! A scan of the remote filesystem is folded into [`FilesystemUnit`] values:
//! a closed sum of [`File`] and [`Directory`]. Units are immutable after
//! construction; a directory seals its contained entries at construction
//! time and exposes them as read-only slices.

use serde::Serialize;
use thiserror::Error;

/// Invariant violation on a unit's `path` or `name` value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("entry {0} can not be empty")]
    Empty(&'static str),

    #[error("entry {0} can not contain a leading or trailing space")]
    Padded(&'static str),
}

/// Validate a `path` or `name` value: non-empty and no surrounding whitespace.
fn checked(field: &'static str, value: &str) -> Result<String, UnitError> {
    let trimmed = value.trim();
    if trimmed != value {
        return Err(UnitError::Padded(field));
    }
    if trimmed.is_empty() {
        return Err(UnitError::Empty(field));
    }
    Ok(value.to_string())
}

/// A remote file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct File {
    path: String,
    name: String,
}

impl File {
    /// Create a file unit located at `path` (parent directory) with `name`.
    pub fn new(path: &str, name: &str) -> Result<Self, UnitError> {
        Ok(Self {
            path: checked("path", path)?,
            name: checked("name", name)?,
        })
    }

    /// Parent directory path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Entry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_directory(&self) -> bool {
        false
    }
}

/// A remote directory together with its (possibly empty) contained entries.
///
/// Contained directories and files are kept in separate collections, each
/// sorted by name ascending (byte-wise). The collections are sealed at
/// construction; accessors hand out read-only views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directory {
    path: String,
    name: String,
    directories: Vec<Directory>,
    files: Vec<File>,
}

impl Directory {
    /// Create a directory unit wrapping `contained` entries.
    pub fn new(
        path: &str,
        name: &str,
        contained: Vec<FilesystemUnit>,
    ) -> Result<Self, UnitError> {
        let (directories, files) = sorted_partition(contained);
        Ok(Self {
            path: checked("path", path)?,
            name: checked("name", name)?,
            directories,
            files,
        })
    }

    /// Parent directory path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Entry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_directory(&self) -> bool {
        true
    }

    /// Contained subdirectories, sorted by name ascending.
    pub fn contained_directories(&self) -> &[Directory] {
        &self.directories
    }

    /// Contained files, sorted by name ascending.
    pub fn contained_files(&self) -> &[File] {
        &self.files
    }
}

/// A modeled remote filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilesystemUnit {
    Directory(Directory),
    File(File),
}

impl FilesystemUnit {
    /// Parent directory path.
    pub fn path(&self) -> &str {
        match self {
            FilesystemUnit::Directory(directory) => directory.path(),
            FilesystemUnit::File(file) => file.path(),
        }
    }

    /// Entry name.
    pub fn name(&self) -> &str {
        match self {
            FilesystemUnit::Directory(directory) => directory.name(),
            FilesystemUnit::File(file) => file.name(),
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, FilesystemUnit::Directory(_))
    }
}

impl From<Directory> for FilesystemUnit {
    fn from(directory: Directory) -> Self {
        FilesystemUnit::Directory(directory)
    }
}

impl From<File> for FilesystemUnit {
    fn from(file: File) -> Self {
        FilesystemUnit::File(file)
    }
}

/// Split units by variant and sort each group by name ascending.
fn sorted_partition(units: Vec<FilesystemUnit>) -> (Vec<Directory>, Vec<File>) {
    let mut directories = Vec::new();
    let mut files = Vec::new();
    for unit in units {
        match unit {
            FilesystemUnit::Directory(directory) => directories.push(directory),
            FilesystemUnit::File(file) => files.push(file),
        }
    }
    directories.sort_by(|a, b| a.name.cmp(&b.name));
    files.sort_by(|a, b| a.name.cmp(&b.name));
    (directories, files)
}

/// Order a scan result: directories first, then files, each sorted by name.
pub(crate) fn order_units(units: Vec<FilesystemUnit>) -> Vec<FilesystemUnit> {
    let (directories, files) = sorted_partition(units);
    directories
        .into_iter()
        .map(FilesystemUnit::Directory)
        .chain(files.into_iter().map(FilesystemUnit::File))
        .collect()
}
