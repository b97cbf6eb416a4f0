use std::sync::Arc;
use std::thread;

use optic_store::{FsStore, MemStore, ObjectStore, StoreError};
use tempfile::TempDir;

#[test]
fn fs_put_get_roundtrip() {
    let dir = TempDir::new().expect("tempdir");
    let store = FsStore::new(dir.path()).expect("store");

    store
        .put("frames/1714000000123.jpg", b"jpeg bytes", "image/jpeg")
        .expect("put");
    let got = store.get("frames/1714000000123.jpg").expect("get");
    assert_eq!(got.as_deref(), Some(b"jpeg bytes".as_ref()));
    assert_eq!(store.len().expect("len"), 1);
}

#[test]
fn fs_get_missing_is_none() {
    let dir = TempDir::new().expect("tempdir");
    let store = FsStore::new(dir.path()).expect("store");
    assert_eq!(store.get("frames/none.jpg").expect("get"), None);
    assert!(store.is_empty().expect("is_empty"));
}

#[test]
fn same_key_overwrites_last_write_wins() {
    // Two writers inside the same millisecond derive the same key; the
    // accepted policy is a silent overwrite leaving exactly one object.
    let dir = TempDir::new().expect("tempdir");
    let store = FsStore::new(dir.path()).expect("store");

    let key = "frames/1714000000123.jpg";
    store.put(key, b"first", "image/jpeg").expect("put first");
    store.put(key, b"second", "image/jpeg").expect("put second");

    assert_eq!(store.len().expect("len"), 1);
    assert_eq!(store.get(key).expect("get").as_deref(), Some(b"second".as_ref()));
}

#[test]
fn rejects_traversal_and_malformed_keys() {
    let dir = TempDir::new().expect("tempdir");
    let store = FsStore::new(dir.path()).expect("store");

    for key in ["", "/abs.jpg", "frames/", "frames//x.jpg", "../escape.jpg", "a/./b"] {
        let err = store.put(key, b"x", "image/jpeg").unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)), "key {key:?}");
    }
}

#[test]
fn nested_keys_create_directories() {
    let dir = TempDir::new().expect("tempdir");
    let store = FsStore::new(dir.path()).expect("store");

    store
        .put("frames/session-9/1714000000123.jpg", b"x", "image/jpeg")
        .expect("put");
    assert!(dir.path().join("frames/session-9/1714000000123.jpg").exists());
}

#[test]
fn mem_store_matches_fs_semantics() {
    let store = MemStore::new();

    store.put("frames/1.jpg", b"one", "image/jpeg").expect("put");
    store.put("frames/1.jpg", b"two", "image/jpeg").expect("overwrite");
    store.put("frames/2.jpg", b"three", "image/jpeg").expect("put");

    assert_eq!(store.len().expect("len"), 2);
    assert_eq!(store.get("frames/1.jpg").expect("get").as_deref(), Some(b"two".as_ref()));
    assert!(store.put("../x", b"", "image/jpeg").is_err());
}

#[test]
fn concurrent_writers_do_not_interfere() {
    let store = Arc::new(MemStore::new());

    let mut handles = Vec::new();
    for writer in 0..8 {
        let store = store.clone();
        handles.push(thread::spawn(move || {
            for i in 0..50 {
                let key = format!("frames/{}-{}.jpg", writer, i);
                store.put(&key, &[writer as u8], "image/jpeg").expect("put");
            }
        }));
    }
    for handle in handles {
        handle.join().expect("join");
    }

    assert_eq!(store.len().expect("len"), 8 * 50);
}
