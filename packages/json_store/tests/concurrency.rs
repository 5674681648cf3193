use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use serde::{Deserialize, Serialize};

use shelf_json_store::{ErrorKind, JSONLocalStore, Options, ReadConsistency};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
struct User {
    name: String,
    age: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
struct Blob {
    generation: u32,
    payload: Vec<u32>,
}

impl Blob {
    fn new(generation: u32) -> Self {
        // Large enough that a torn write would be observable.
        Blob {
            generation,
            payload: vec![generation; 4096],
        }
    }

    fn is_consistent(&self) -> bool {
        self.payload.len() == 4096 && self.payload.iter().all(|v| *v == self.generation)
    }
}

fn open(dir: &tempfile::TempDir, read_consistency: ReadConsistency) -> JSONLocalStore {
    JSONLocalStore::open(
        dir.path().join("db"),
        Options::new().with_read_consistency(read_consistency),
    )
    .unwrap()
}

#[test]
fn users_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir, ReadConsistency::Locked);

    store
        .write(
            "users",
            "John",
            &User {
                name: "John".to_string(),
                age: "30".to_string(),
            },
        )
        .unwrap();

    let records = store.read_all("users").unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].contains("John"));
    assert!(records[0].contains("30"));

    store.delete("users", "John").unwrap();
    assert!(store.read_all("users").unwrap().is_empty());

    store.delete("users", "").unwrap();
    assert_eq!(
        store.read_all("users").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn concurrent_writes_to_one_collection_all_land() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir, ReadConsistency::Locked);

    thread::scope(|s| {
        for i in 0..16 {
            let store = &store;
            s.spawn(move || {
                let user = User {
                    name: format!("user-{}", i),
                    age: format!("{}", 20 + i),
                };
                store.write("users", &user.name, &user).unwrap();
            });
        }
    });

    for i in 0..16 {
        let user: User = store.read("users", &format!("user-{}", i)).unwrap();
        assert_eq!(user.age, format!("{}", 20 + i));
    }
    assert_eq!(store.read_all("users").unwrap().len(), 16);
}

#[test]
fn concurrent_writes_across_collections_all_land() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(open(&dir, ReadConsistency::Locked));

    let workers: Vec<_> = ["users", "orders", "invoices", "audit"]
        .into_iter()
        .map(|collection| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..25 {
                    store
                        .write(collection, &format!("r{}", i), &Blob::new(i))
                        .unwrap();
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    for collection in ["users", "orders", "invoices", "audit"] {
        let blobs: Vec<Blob> = store.read_all_as(collection).unwrap();
        assert_eq!(blobs.len(), 25);
        assert!(blobs.iter().all(Blob::is_consistent));
    }
}

fn readers_never_see_torn_documents(read_consistency: ReadConsistency) {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir, read_consistency);
    store.write("blobs", "hot", &Blob::new(0)).unwrap();

    let done = AtomicBool::new(false);
    thread::scope(|s| {
        s.spawn(|| {
            for generation in 1..200 {
                store.write("blobs", "hot", &Blob::new(generation)).unwrap();
            }
            done.store(true, Ordering::SeqCst);
        });

        for _ in 0..2 {
            s.spawn(|| {
                while !done.load(Ordering::SeqCst) {
                    let blob: Blob = store.read("blobs", "hot").unwrap();
                    assert!(blob.is_consistent(), "torn read: {}", blob.generation);
                }
            });
        }
    });

    let last: Blob = store.read("blobs", "hot").unwrap();
    assert_eq!(last.generation, 199);
}

#[test]
fn locked_readers_never_see_torn_documents() {
    readers_never_see_torn_documents(ReadConsistency::Locked);
}

#[test]
fn unlocked_readers_never_see_torn_documents() {
    readers_never_see_torn_documents(ReadConsistency::Unlocked);
}

#[test]
fn locked_read_all_never_interleaves_with_delete() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir, ReadConsistency::Locked);

    let done = AtomicBool::new(false);
    thread::scope(|s| {
        s.spawn(|| {
            for round in 0..50 {
                for i in 0..5 {
                    store
                        .write("batch", &format!("r{}", i), &Blob::new(round))
                        .unwrap();
                }
                store.delete_collection("batch").unwrap();
            }
            done.store(true, Ordering::SeqCst);
        });

        s.spawn(|| {
            while !done.load(Ordering::SeqCst) {
                match store.read_all_as::<Blob>("batch") {
                    Ok(blobs) => {
                        assert!(blobs.len() <= 5);
                        assert!(blobs.iter().all(Blob::is_consistent));
                    }
                    Err(err) => assert_eq!(err.kind(), ErrorKind::NotFound, "{}", err),
                }
            }
        });
    });

    assert_eq!(
        store.read_all("batch").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}
