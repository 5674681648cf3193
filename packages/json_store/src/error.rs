//! Error types for the document store.

use std::io;
use std::path::PathBuf;

/// Fieldless discriminant of [`Error`], convenient for matching in callers
/// that only care about the category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Serialization,
    Deserialization,
    Io,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A collection or resource name was empty or otherwise unusable.
    #[error("invalid {field} name '{name}': {message}")]
    Validation {
        field: &'static str,
        name: String,
        message: &'static str,
    },

    /// The collection (or the resource within it) does not exist.
    #[error("{}", not_found_message(.collection, .resource))]
    NotFound {
        collection: String,
        resource: Option<String>,
    },

    #[error("An error occurred while serializing a record: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("An error occurred while deserializing a record from {path}: {error}")]
    Deserialization {
        path: PathBuf,
        #[source]
        error: serde_json::Error,
    },

    #[error("An I/O error occurred at {path}: {error}")]
    Io {
        path: PathBuf,
        #[source]
        error: io::Error,
    },
}

fn not_found_message(collection: &str, resource: &Option<String>) -> String {
    match resource {
        Some(resource) => format!(
            "resource '{}' does not exist in collection '{}'",
            resource, collection
        ),
        None => format!("collection '{}' does not exist", collection),
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } => ErrorKind::Validation,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Deserialization { .. } => ErrorKind::Deserialization,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            error,
        }
    }

    pub(crate) fn not_found(collection: &str, resource: &str) -> Self {
        Error::NotFound {
            collection: collection.to_string(),
            resource: if resource.is_empty() {
                None
            } else {
                Some(resource.to_string())
            },
        }
    }
}
