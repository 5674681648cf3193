//! Mapping from `(collection, resource)` names to on-disk locations.
//!
//! The layout is flat: `root/<collection>/<resource>.json`. A write stages its
//! bytes in `<resource>.json.tmp` next to the final file.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::Error;

/// Extension of serialized documents, without the leading dot.
pub const DOCUMENT_EXTENSION: &str = "json";

/// Suffix appended to a document path while a write is in flight.
pub const TEMP_SUFFIX: &str = ".tmp";

/// What an existence probe found for a `(collection, resource)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A directory: the collection itself, or a directory-shaped resource.
    Directory(PathBuf),
    /// A regular file (or anything else that is not a directory).
    File(PathBuf),
}

impl Resolved {
    pub fn path(&self) -> &Path {
        match self {
            Resolved::Directory(path) | Resolved::File(path) => path,
        }
    }
}

/// Lexically clean a path: collapse redundant separators and drop `.`
/// components. `..` is kept as written since resolving it needs the
/// filesystem.
pub fn clean(path: &Path) -> PathBuf {
    let cleaned: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

/// Check that `name` can be used as a single directory or file name.
pub fn validate_name(field: &'static str, name: &str) -> Result<(), Error> {
    let message = if name.is_empty() {
        "name cannot be empty"
    } else if name == "." || name == ".." {
        "name cannot be a relative directory reference"
    } else if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
        "name cannot contain a path separator"
    } else if name.contains('\0') {
        "name cannot contain a NUL byte"
    } else {
        return Ok(());
    };

    Err(Error::Validation {
        field,
        name: name.to_string(),
        message,
    })
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// Resolves names under a fixed root directory.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    /// `root/<collection>/<resource>`, with no extension added. An empty
    /// `resource` yields the collection directory.
    pub fn bare_path(&self, collection: &str, resource: &str) -> PathBuf {
        let dir = self.collection_dir(collection);
        if resource.is_empty() {
            dir
        } else {
            dir.join(resource)
        }
    }

    /// `root/<collection>/<resource>.json`
    pub fn document_path(&self, collection: &str, resource: &str) -> PathBuf {
        with_suffix(
            &self.collection_dir(collection).join(resource),
            &format!(".{}", DOCUMENT_EXTENSION),
        )
    }

    /// `root/<collection>/<resource>.json.tmp`
    pub fn temp_path(&self, collection: &str, resource: &str) -> PathBuf {
        with_suffix(&self.document_path(collection, resource), TEMP_SUFFIX)
    }

    /// Probe the bare path first and fall back to the extension-qualified one.
    ///
    /// An empty `resource` only probes the collection directory. Returns
    /// `Ok(None)` when nothing exists. Any error other than "not found" while
    /// probing is reported as [`Error::Io`].
    pub fn resolve(&self, collection: &str, resource: &str) -> Result<Option<Resolved>, Error> {
        if resource.is_empty() {
            return probe(self.collection_dir(collection));
        }

        if let Some(found) = probe(self.bare_path(collection, resource))? {
            return Ok(Some(found));
        }

        probe(self.document_path(collection, resource))
    }
}

/// Whether `resource` already carries the document extension.
pub fn is_qualified(resource: &str) -> bool {
    resource
        .strip_suffix(DOCUMENT_EXTENSION)
        .is_some_and(|stem| stem.len() > 1 && stem.ends_with('.'))
}

fn probe(path: PathBuf) -> Result<Option<Resolved>, Error> {
    match fs::metadata(&path) {
        Ok(attr) if attr.is_dir() => Ok(Some(Resolved::Directory(path))),
        Ok(_) => Ok(Some(Resolved::File(path))),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(Error::io(path, error)),
    }
}

/// Whether a directory entry is a staged write rather than a document.
pub(crate) fn is_temp_file(name: &std::ffi::OsStr) -> bool {
    let staged = format!(".{}{}", DOCUMENT_EXTENSION, TEMP_SUFFIX);
    name.to_str().is_some_and(|s| s.ends_with(&staged))
}
