//! UploadStore against a real directory.

use breedscope::{BreedscopeError, Upload, UploadStore};
use tempfile::TempDir;

fn store() -> (TempDir, UploadStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = UploadStore::new(dir.path().join("img"));
    (dir, store)
}

#[tokio::test]
async fn save_writes_bytes_under_root() {
    let (_dir, store) = store();
    let name = store
        .save(&Upload::new("rex.jpg", b"jpeg bytes".to_vec()))
        .await
        .unwrap();

    assert_eq!(name, "rex.jpg");
    assert_eq!(std::fs::read(store.root().join(&name)).unwrap(), b"jpeg bytes");
    assert_eq!(store.read(&name).await.unwrap(), b"jpeg bytes");
}

#[tokio::test]
async fn conflicting_names_get_numbered() {
    let (_dir, store) = store();
    let upload = Upload::new("rex.jpg", b"one".to_vec());

    let first = store.save(&upload).await.unwrap();
    let second = store.save(&Upload::new("rex.jpg", b"two".to_vec())).await.unwrap();
    let third = store.save(&upload).await.unwrap();

    assert_eq!(first, "rex.jpg");
    assert_eq!(second, "rex_1.jpg");
    assert_eq!(third, "rex_2.jpg");
    // The original is untouched.
    assert_eq!(store.read("rex.jpg").await.unwrap(), b"one");
    assert_eq!(store.read("rex_1.jpg").await.unwrap(), b"two");
}

#[tokio::test]
async fn names_are_sanitised_and_extension_lowered() {
    let (_dir, store) = store();
    let name = store
        .save(&Upload::new("../My Dog.JPG", b"x".to_vec()))
        .await
        .unwrap();
    assert_eq!(name, "My_Dog.jpg");
    assert!(store.root().join("My_Dog.jpg").exists());
}

#[tokio::test]
async fn non_image_extension_is_rejected() {
    let (_dir, store) = store();
    let err = store
        .save(&Upload::new("payload.exe", b"MZ".to_vec()))
        .await
        .unwrap_err();
    assert!(matches!(err, BreedscopeError::UnsupportedImage(_)));
    assert!(!store.root().exists(), "nothing should be written");
}

#[tokio::test]
async fn empty_upload_is_rejected() {
    let (_dir, store) = store();
    let err = store.save(&Upload::new("rex.png", Vec::new())).await.unwrap_err();
    assert!(matches!(err, BreedscopeError::InvalidInput(_)));
}

#[tokio::test]
async fn empty_file_name_is_rejected() {
    let (_dir, store) = store();
    let err = store.save(&Upload::new("", b"x".to_vec())).await.unwrap_err();
    assert!(matches!(err, BreedscopeError::UnsupportedImage(_)));
}

#[tokio::test]
async fn read_refuses_traversal() {
    let (_dir, store) = store();
    let err = store.read("../../etc/passwd").await.unwrap_err();
    assert!(matches!(err, BreedscopeError::InvalidInput(_)));
}

#[tokio::test]
async fn read_missing_file_is_io_error() {
    let (_dir, store) = store();
    let err = store.read("ghost.jpg").await.unwrap_err();
    assert!(matches!(err, BreedscopeError::Io(_)));
}
