use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLockReadGuard;

use log::Level;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Error;
use crate::locks::{CollectionLock, LockRegistry};
use crate::options::{LogSink, Options, ReadConsistency};
use crate::path::{self, Layout, Resolved};

/// A directory of JSON documents grouped into collections.
///
/// Every collection is a directory under the root and every resource is one
/// `<resource>.json` file inside it. Writes and deletes on a collection are
/// serialized by that collection's lock; different collections never contend.
///
/// The store is `Send + Sync`: share it by reference or wrap it in an `Arc`.
#[derive(Debug)]
pub struct JSONLocalStore {
    layout: Layout,
    locks: LockRegistry,
    sink: LogSink,
    read_consistency: ReadConsistency,
}

impl JSONLocalStore {
    /// Open the store rooted at `root`, creating the root directory if needed.
    ///
    /// Only the last path component is created; a missing parent is an error.
    pub fn open(root: impl AsRef<Path>, options: Options) -> Result<JSONLocalStore, Error> {
        let root = path::clean(root.as_ref());
        let Options {
            sink,
            read_consistency,
        } = options;

        match fs::metadata(&root) {
            Ok(attr) if attr.is_dir() => {
                sink.log(
                    Level::Debug,
                    format_args!("Using '{}' (database already exists)", root.display()),
                );
            }
            Ok(_) => {
                return Err(Error::io(
                    root,
                    io::Error::other("Root path must be a directory."),
                ));
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                sink.log(
                    Level::Info,
                    format_args!("Creating new database at '{}'...", root.display()),
                );
                fs::create_dir(&root).map_err(|error| Error::io(&root, error))?;
            }
            Err(error) => return Err(Error::io(root, error)),
        }

        Ok(JSONLocalStore {
            layout: Layout::new(root),
            locks: LockRegistry::new(),
            sink,
            read_consistency,
        })
    }

    /// Open the store with default [`Options`].
    pub fn new(root: impl AsRef<Path>) -> Result<JSONLocalStore, Error> {
        Self::open(root, Options::default())
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    /// Serialize `value` and store it as `collection/resource`, replacing any
    /// previous version.
    ///
    /// The document is staged in a sibling `.tmp` file and renamed into place,
    /// so readers see either the old or the new document in full. If the
    /// write fails the staged file may be left behind.
    pub fn write<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        resource: &str,
        value: &T,
    ) -> Result<(), Error> {
        path::validate_name("collection", collection)?;
        path::validate_name("resource", resource)?;

        let lock = self.locks.get(collection);
        let _guard = lock.write().unwrap_or_else(|poisoned| poisoned.into_inner());

        let dir = self.layout.collection_dir(collection);
        let final_path = self.layout.document_path(collection, resource);
        let temp_path = self.layout.temp_path(collection, resource);

        fs::create_dir_all(&dir).map_err(|error| Error::io(&dir, error))?;

        let bytes = encode(value)?;

        self.sink.log(
            Level::Trace,
            format_args!("Writing {}...", final_path.display()),
        );
        write_file(&temp_path, &bytes)?;
        fs::rename(&temp_path, &final_path).map_err(|error| Error::io(&final_path, error))?;

        Ok(())
    }

    /// Read `collection/resource` and deserialize it into `T`.
    pub fn read<T: DeserializeOwned>(&self, collection: &str, resource: &str) -> Result<T, Error> {
        path::validate_name("collection", collection)?;
        path::validate_name("resource", resource)?;

        let lock = self.locks.get(collection);
        let _guard = self.shared(&lock);

        let file_path = match self.layout.resolve(collection, resource)? {
            None => return Err(Error::not_found(collection, resource)),
            // A directory is not a document; reading it reports the I/O error.
            Some(Resolved::File(path)) | Some(Resolved::Directory(path)) => path,
        };

        self.sink.log(
            Level::Trace,
            format_args!("Reading {}...", file_path.display()),
        );
        let bytes = fs::read(&file_path).map_err(|error| Error::io(&file_path, error))?;

        serde_json::from_slice(&bytes).map_err(|error| Error::Deserialization {
            path: file_path,
            error,
        })
    }

    /// Raw contents of every document in `collection`, in directory order.
    ///
    /// Fails on the first entry that cannot be read rather than skipping it.
    /// Staged `.json.tmp` files are not documents and are left out.
    pub fn read_all(&self, collection: &str) -> Result<Vec<String>, Error> {
        Ok(self
            .read_all_with_paths(collection)?
            .into_iter()
            .map(|(_, contents)| contents)
            .collect())
    }

    /// Like [`read_all`](Self::read_all), decoding each document into `T`.
    pub fn read_all_as<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, Error> {
        self.read_all_with_paths(collection)?
            .into_iter()
            .map(|(path, contents)| {
                serde_json::from_str(&contents)
                    .map_err(|error| Error::Deserialization { path, error })
            })
            .collect()
    }

    fn read_all_with_paths(&self, collection: &str) -> Result<Vec<(PathBuf, String)>, Error> {
        path::validate_name("collection", collection)?;

        let lock = self.locks.get(collection);
        let _guard = self.shared(&lock);

        let dir = self.layout.collection_dir(collection);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(Error::not_found(collection, ""));
            }
            Err(error) => return Err(Error::io(&dir, error)),
        };

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|error| Error::io(&dir, error))?;
            if path::is_temp_file(&entry.file_name()) {
                continue;
            }

            let file_path = entry.path();
            let contents =
                fs::read_to_string(&file_path).map_err(|error| Error::io(&file_path, error))?;
            records.push((file_path, contents));
        }

        Ok(records)
    }

    /// Delete `collection/resource`, or the whole collection when `resource`
    /// is empty.
    ///
    /// The empty-resource form removes every document in the collection.
    /// Prefer [`delete_resource`](Self::delete_resource) or
    /// [`delete_collection`](Self::delete_collection) when the intent is known.
    pub fn delete(&self, collection: &str, resource: &str) -> Result<(), Error> {
        path::validate_name("collection", collection)?;
        if !resource.is_empty() {
            path::validate_name("resource", resource)?;
        }

        let lock = self.locks.get(collection);
        let _guard = lock.write().unwrap_or_else(|poisoned| poisoned.into_inner());

        match self.layout.resolve(collection, resource)? {
            None => Err(Error::not_found(collection, resource)),
            Some(Resolved::Directory(dir)) => {
                self.sink
                    .log(Level::Trace, format_args!("Removing {}...", dir.display()));
                fs::remove_dir_all(&dir).map_err(|error| Error::io(&dir, error))
            }
            // Only the document is removed, even when a bare file shadows it.
            Some(Resolved::File(file)) => {
                let file = if path::is_qualified(resource) {
                    file
                } else {
                    self.layout.document_path(collection, resource)
                };
                self.sink
                    .log(Level::Trace, format_args!("Removing {}...", file.display()));
                fs::remove_file(&file).map_err(|error| Error::io(&file, error))
            }
        }
    }

    /// Delete a single resource. Unlike [`delete`](Self::delete), an empty
    /// `resource` is rejected.
    pub fn delete_resource(&self, collection: &str, resource: &str) -> Result<(), Error> {
        path::validate_name("resource", resource)?;
        self.delete(collection, resource)
    }

    /// Delete a collection directory with all its documents.
    pub fn delete_collection(&self, collection: &str) -> Result<(), Error> {
        self.delete(collection, "")
    }

    fn shared<'a>(&self, lock: &'a CollectionLock) -> Option<RwLockReadGuard<'a, ()>> {
        match self.read_consistency {
            ReadConsistency::Locked => {
                Some(lock.read().unwrap_or_else(|poisoned| poisoned.into_inner()))
            }
            ReadConsistency::Unlocked => None,
        }
    }
}

/// Tab-indented JSON with a trailing newline.
fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    value
        .serialize(&mut serializer)
        .map_err(Error::Serialization)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_file(file_path: &Path, bytes: &[u8]) -> Result<(), Error> {
    let mut f = fs::File::create(file_path).map_err(|error| Error::io(file_path, error))?;
    f.write_all(bytes)
        .and_then(|_| f.sync_all())
        .map_err(|error| Error::io(file_path, error))
}
