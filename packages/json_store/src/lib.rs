//! A file-backed JSON document store.
//!
//! Records are grouped into collections. Each collection is a directory under
//! the store root and each record is one pretty-printed JSON file in it:
//!
//! ```text
//! root/
//!   users/
//!     John.json
//!     Jane.json
//! ```
//!
//! # Example
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use shelf_json_store::JSONLocalStore;
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = JSONLocalStore::new(dir.path().join("db")).unwrap();
//!
//! let john = User { name: "John".into(), age: 30 };
//! store.write("users", "John", &john).unwrap();
//!
//! let read: User = store.read("users", "John").unwrap();
//! assert_eq!(read, john);
//!
//! store.delete("users", "John").unwrap();
//! assert!(store.read_all("users").unwrap().is_empty());
//! ```

pub mod error;
pub mod local_disk;
pub mod locks;
pub mod options;
pub mod path;

pub use error::{Error, ErrorKind};
pub use local_disk::JSONLocalStore;
pub use options::{LogSink, MemoryLogger, Options, ReadConsistency};
pub use path::{DOCUMENT_EXTENSION, TEMP_SUFFIX};

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn version_is_release_number() {
        assert_eq!(super::VERSION, "1.0.1");
    }
}
