use ft_core::mime::IMAGE_MIME_ALLOW_LIST;
use ft_core::remote::{open_remote_store, RemoteTargetUri};
use ft_core::remote_fs::FsRemoteStore;
use ft_core::services::RemoteStore;
use ft_core::types::RemoteId;
use std::fs;

fn seeded_store() -> (tempfile::TempDir, FsRemoteStore) {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().to_path_buf();
    fs::create_dir_all(root.join("2024/Invoices")).expect("mkdir invoices");
    fs::create_dir_all(root.join("2024/Receipts")).expect("mkdir receipts");
    fs::create_dir_all(root.join("archive/Receipts")).expect("mkdir archived receipts");
    fs::write(root.join("2024/Invoices/b.JPG"), b"b").expect("write b");
    fs::write(root.join("2024/Invoices/a.png"), b"a").expect("write a");
    fs::write(root.join("2024/Invoices/notes.txt"), b"n").expect("write notes");
    fs::create_dir_all(root.join("2024/Invoices/nested.png")).expect("dir named like an image");
    (temp, FsRemoteStore::new(root))
}

#[test]
fn resolve_folder_enforces_unique_names() {
    let (_temp, store) = seeded_store();

    let found = store.resolve_folder("Invoices").expect("resolve");
    assert_eq!(found.id.0, "2024/Invoices");
    assert_eq!(found.name, "Invoices");

    let err = store.resolve_folder("Receipts").expect_err("ambiguous");
    assert_eq!(err.code, "FT_FOLDER_AMBIGUOUS");
    assert_eq!(err.details["ids"], serde_json::json!(["2024/Receipts", "archive/Receipts"]));

    let err = store.resolve_folder("Missing").expect_err("not found");
    assert_eq!(err.code, "FT_FOLDER_NOT_FOUND");
}

#[test]
fn list_children_filters_by_media_type() {
    let (_temp, store) = seeded_store();
    let mut names = store
        .list_children(&RemoteId("2024/Invoices".to_string()), &IMAGE_MIME_ALLOW_LIST)
        .expect("list")
        .into_iter()
        .map(|e| e.name)
        .collect::<Vec<_>>();
    names.sort();
    assert_eq!(names, vec!["a.png", "b.JPG"]);
}

#[test]
fn download_and_upload_round_trip() {
    let (temp, store) = seeded_store();
    let bytes = store
        .download_bytes(&RemoteId("2024/Invoices/a.png".to_string()))
        .expect("download");
    assert_eq!(bytes, b"a");

    let local = temp.path().join("local.json");
    fs::write(&local, b"{\"v\":1}").expect("write local");
    let id = store
        .upload_file(
            &RemoteId("2024/Invoices".to_string()),
            &local,
            "Invoices.image_text_data.json",
            "application/json",
        )
        .expect("upload");
    assert_eq!(id.0, "2024/Invoices/Invoices.image_text_data.json");

    fs::write(&local, b"{\"v\":2}").expect("rewrite local");
    store
        .upload_file(
            &RemoteId("2024/Invoices".to_string()),
            &local,
            "Invoices.image_text_data.json",
            "application/json",
        )
        .expect("overwrite upload");
    assert_eq!(store.download_bytes(&id).expect("download record"), b"{\"v\":2}");

    let found = store
        .list_by_name_pattern("image_text_data.json")
        .expect("pattern listing");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, id);
}

#[test]
fn ids_cannot_escape_the_root() {
    let (_temp, store) = seeded_store();
    let err = store
        .download_bytes(&RemoteId("../outside.png".to_string()))
        .expect_err("escape rejected");
    assert_eq!(err.code, "FT_REMOTE_ID_INVALID");
    assert_eq!(err.category, "download");

    let err = store
        .download_bytes(&RemoteId("2024/Invoices/missing.png".to_string()))
        .expect_err("missing file");
    assert_eq!(err.code, "FT_DOWNLOAD_FAILED");

    let err = store
        .upload_file(
            &RemoteId("2024/Nope".to_string()),
            &std::path::PathBuf::from("/dev/null"),
            "x.json",
            "application/json",
        )
        .expect_err("missing parent");
    assert_eq!(err.category, "upload");
}

#[test]
fn open_remote_store_requires_existing_root() {
    let (temp, _store) = seeded_store();
    let store = open_remote_store(&RemoteTargetUri::FilePath {
        path: temp.path().display().to_string(),
    })
    .expect("open");
    assert!(store.describe().starts_with("file://"));

    let missing = temp.path().join("does-not-exist");
    let err = open_remote_store(&RemoteTargetUri::FilePath {
        path: missing.display().to_string(),
    })
    .err()
    .expect("missing root");
    assert_eq!(err.category, "config");
}

#[cfg(unix)]
#[test]
fn unreadable_subtree_fails_discovery() {
    use std::os::unix::fs::PermissionsExt;

    let (temp, store) = seeded_store();
    let locked = temp.path().join("locked");
    fs::create_dir_all(locked.join("Invoices")).expect("mkdir locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).expect("chmod 000");
    if fs::read_dir(&locked).is_ok() {
        // Permission bits are not enforced for this user.
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("chmod back");
        return;
    }

    let folders = store.find_folders("Invoices");
    let records = store.list_by_name_pattern("image_text_data.json");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("chmod back");

    let err = folders.expect_err("walk error surfaces");
    assert_eq!(err.code, "FT_REMOTE_LIST_FAILED");
    assert_eq!(err.exit_code(), 5);
    let err = records.expect_err("walk error surfaces");
    assert_eq!(err.category, "download");
}
