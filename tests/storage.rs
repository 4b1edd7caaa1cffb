use pixkit::services::{
    cleanup::sweep,
    storage::{LocalStorage, Storage, StorageError, validate_name},
};
use tempfile::TempDir;
use tokio::io::AsyncReadExt;

async fn storage() -> (LocalStorage, TempDir) {
    let dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(dir.path()).await.unwrap();
    (storage, dir)
}

#[test_log::test(tokio::test)]
async fn put_then_get_and_open_return_same_bytes() {
    let (storage, _dir) = storage().await;

    storage.put("a.png", b"hello").await.unwrap();

    assert_eq!(storage.get("a.png").await.unwrap(), b"hello");
    let mut reader = storage.open("a.png").await.unwrap();
    let mut streamed = Vec::new();
    reader.read_to_end(&mut streamed).await.unwrap();
    assert_eq!(streamed, b"hello");
}

#[test_log::test(tokio::test)]
async fn put_replaces_and_leaves_no_staging_files() {
    let (storage, _dir) = storage().await;

    storage.put("a.png", b"first").await.unwrap();
    storage.put("a.png", b"second").await.unwrap();

    assert_eq!(storage.get("a.png").await.unwrap(), b"second");
    assert_eq!(storage.list().await.unwrap(), vec!["a.png".to_string()]);
}

#[test_log::test(tokio::test)]
async fn new_creates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("static").join("uploads");

    let storage = LocalStorage::new(&root).await.unwrap();

    assert!(root.is_dir());
    assert_eq!(storage.root(), root.as_path());
}

#[test_log::test(tokio::test)]
async fn missing_files_are_not_found() {
    let (storage, _dir) = storage().await;

    assert!(matches!(
        storage.get("nope.png").await,
        Err(StorageError::NotFound(_))
    ));
    assert!(matches!(
        storage.open("nope.png").await,
        Err(StorageError::NotFound(_))
    ));
    assert!(matches!(
        storage.delete("nope.png").await,
        Err(StorageError::NotFound(_))
    ));
}

#[test]
fn names_must_be_a_single_plain_component() {
    for bad in [
        "",
        ".",
        "..",
        "../a.png",
        "a/b.png",
        "/etc/passwd",
        "a\\b.png",
        "a\0.png",
    ] {
        assert!(
            matches!(validate_name(bad), Err(StorageError::InvalidName(_))),
            "{bad:?} should be rejected"
        );
    }

    for good in ["a.png", "crop_1234_cropped.jpg", ".hidden", "a..b.png"] {
        assert!(validate_name(good).is_ok(), "{good:?} should be accepted");
    }
}

#[test_log::test(tokio::test)]
async fn invalid_names_never_touch_disk() {
    let (storage, dir) = storage().await;

    let result = storage.put("../escape.png", b"x").await;

    assert!(matches!(result, Err(StorageError::InvalidName(_))));
    assert!(!dir.path().parent().unwrap().join("escape.png").exists());
}

#[test_log::test(tokio::test)]
async fn sweep_removes_files_and_directories() {
    let (storage, dir) = storage().await;
    storage.put("a.png", b"a").await.unwrap();
    storage.put("b_cropped.png", b"b").await.unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    std::fs::write(dir.path().join("nested").join("inner.png"), b"c").unwrap();

    let (deleted, errors) = sweep(&storage).await;

    assert_eq!((deleted, errors), (3, 0));
    assert!(storage.list().await.unwrap().is_empty());
    assert!(dir.path().is_dir(), "The Storage Area itself survives");
}

#[test_log::test(tokio::test)]
async fn sweep_of_empty_area_is_a_no_op() {
    let (storage, _dir) = storage().await;

    assert_eq!(sweep(&storage).await, (0, 0));
}

#[test_log::test(tokio::test)]
async fn sweep_tolerates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(dir.path().join("gone")).await.unwrap();
    std::fs::remove_dir(dir.path().join("gone")).unwrap();

    let (deleted, errors) = sweep(&storage).await;

    assert_eq!(deleted, 0);
    assert_eq!(errors, 1);
}
