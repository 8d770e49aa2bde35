use crate::app_error::{category, AppError, AppResult};
use crate::record::FolderTextRecord;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Name of the shared directory search downloads records into.
pub const SEARCH_STAGING_DIR: &str = ".ft_search";

/// What to do when the local folder directory survives from an earlier run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExistingDirPolicy {
    #[default]
    Recreate,
    Fail,
}

/// Local working area. Assumes a single writer per directory.
#[derive(Debug, Clone)]
pub struct StagingArea {
    pub root: PathBuf,
}

fn plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains('/')
        && !name.contains('\\')
}

impl StagingArea {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn folder_dir(&self, folder: &str) -> PathBuf {
        self.root.join(folder)
    }

    pub fn search_dir(&self) -> PathBuf {
        self.root.join(SEARCH_STAGING_DIR)
    }

    /// Creates the local directory for `folder`, applying `policy` when it already exists.
    pub fn prepare_folder_dir(&self, folder: &str, policy: ExistingDirPolicy) -> AppResult<PathBuf> {
        if !plain_file_name(folder) || folder == SEARCH_STAGING_DIR {
            return Err(AppError::new(
                "FT_STAGING_NAME_INVALID",
                category::DOWNLOAD,
                "folder name cannot be used as a local directory name",
                false,
                serde_json::json!({ "folder": folder }),
            ));
        }
        let dir = self.folder_dir(folder);
        if dir.exists() {
            match policy {
                ExistingDirPolicy::Fail => {
                    return Err(AppError::new(
                        "FT_STAGING_DIR_EXISTS",
                        category::DOWNLOAD,
                        "local folder directory already exists",
                        false,
                        serde_json::json!({ "path": dir }),
                    ));
                }
                ExistingDirPolicy::Recreate => {
                    tracing::info!(path = %dir.display(), "removing leftover local folder directory");
                    remove_dir(&dir)?;
                }
            }
        }
        create_dir(&dir)?;
        Ok(dir)
    }

    /// Rejects a staging root at or below `remote_root`, and a `local_dir`
    /// about to be recreated that holds `remote_root`.
    pub fn check_disjoint(&self, remote_root: &Path, local_dir: &Path) -> AppResult<()> {
        let staging = resolve_path(&self.root)?;
        let local = resolve_path(local_dir)?;
        let remote = canonical_dir(remote_root)?;
        if staging.starts_with(&remote) || remote.starts_with(&local) {
            return Err(AppError::new(
                "FT_STAGING_OVERLAPS_REMOTE",
                category::CONFIG,
                "local staging directory overlaps the remote root",
                false,
                serde_json::json!({
                    "staging_root": staging,
                    "local_dir": local,
                    "remote_root": remote
                }),
            ));
        }
        Ok(())
    }

    /// Recreates the shared search staging directory, empty.
    pub fn prepare_search_dir(&self) -> AppResult<PathBuf> {
        let dir = self.search_dir();
        if dir.exists() {
            remove_dir(&dir)?;
        }
        create_dir(&dir)?;
        Ok(dir)
    }
}

fn canonical_dir(dir: &Path) -> AppResult<PathBuf> {
    dir.canonicalize().map_err(|e| {
        AppError::new(
            "FT_STAGING_PATH_INVALID",
            category::CONFIG,
            "failed resolving directory path",
            false,
            serde_json::json!({ "error": e.to_string(), "path": dir }),
        )
    })
}

/// Canonical form of `path`; missing trailing components are appended to the
/// canonical form of the closest existing ancestor.
fn resolve_path(path: &Path) -> AppResult<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| {
        AppError::new(
            "FT_STAGING_PATH_INVALID",
            category::CONFIG,
            "failed resolving directory path",
            false,
            serde_json::json!({ "error": e.to_string(), "path": path }),
        )
    })?;
    let mut missing = Vec::new();
    let mut current = absolute.as_path();
    loop {
        if let Ok(mut resolved) = current.canonicalize() {
            resolved.extend(missing.iter().rev());
            return Ok(resolved);
        }
        match (current.file_name(), current.parent()) {
            (Some(name), Some(parent)) => {
                missing.push(name);
                current = parent;
            }
            _ => return canonical_dir(path),
        }
    }
}

fn create_dir(dir: &Path) -> AppResult<()> {
    fs::create_dir_all(dir).map_err(|e| {
        AppError::new(
            "FT_STAGING_CREATE_FAILED",
            category::DOWNLOAD,
            "failed creating local staging directory",
            false,
            serde_json::json!({ "error": e.to_string(), "path": dir }),
        )
    })
}

fn remove_dir(dir: &Path) -> AppResult<()> {
    fs::remove_dir_all(dir).map_err(|e| {
        AppError::new(
            "FT_STAGING_CLEAN_FAILED",
            category::DOWNLOAD,
            "failed removing local staging directory",
            false,
            serde_json::json!({ "error": e.to_string(), "path": dir }),
        )
    })
}

/// Writes downloaded bytes as `dir/name`. `name` must be a bare file name.
pub fn write_download(dir: &Path, name: &str, bytes: &[u8]) -> AppResult<PathBuf> {
    if !plain_file_name(name) {
        return Err(AppError::new(
            "FT_DOWNLOAD_NAME_INVALID",
            category::DOWNLOAD,
            "remote file name is not a plain file name",
            false,
            serde_json::json!({ "name": name }),
        ));
    }
    let path = dir.join(name);
    fs::write(&path, bytes).map_err(|e| {
        AppError::new(
            "FT_DOWNLOAD_WRITE_FAILED",
            category::DOWNLOAD,
            "failed writing downloaded file",
            false,
            serde_json::json!({ "error": e.to_string(), "path": path }),
        )
    })?;
    Ok(path)
}

pub fn read_local(path: &Path) -> AppResult<Vec<u8>> {
    fs::read(path).map_err(|e| {
        AppError::new(
            "FT_LOCAL_READ_FAILED",
            category::DOWNLOAD,
            "failed reading local file",
            false,
            serde_json::json!({ "error": e.to_string(), "path": path }),
        )
    })
}

/// Serializes `record` into `dir` under its record file name.
pub fn write_record(dir: &Path, record: &FolderTextRecord) -> AppResult<PathBuf> {
    let bytes = record.to_json_bytes()?;
    let path = dir.join(record.file_name());
    fs::write(&path, bytes).map_err(|e| {
        AppError::new(
            "FT_RECORD_WRITE_FAILED",
            category::UPLOAD,
            "failed writing local record file",
            false,
            serde_json::json!({ "error": e.to_string(), "path": path }),
        )
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_file_names_only() {
        assert!(plain_file_name("a.png"));
        assert!(plain_file_name("Invoices"));
        assert!(!plain_file_name(""));
        assert!(!plain_file_name("."));
        assert!(!plain_file_name(".."));
        assert!(!plain_file_name("../a.png"));
        assert!(!plain_file_name("x/a.png"));
        assert!(!plain_file_name("x\\a.png"));
        assert!(!plain_file_name("/abs"));
    }

    #[test]
    fn prepare_folder_dir_honors_policy() {
        let temp = tempfile::tempdir().expect("tempdir");
        let staging = StagingArea::new(temp.path().to_path_buf());

        let dir = staging
            .prepare_folder_dir("Invoices", ExistingDirPolicy::Fail)
            .expect("first create");
        fs::write(dir.join("stale.png"), b"old").expect("write stale");

        let err = staging
            .prepare_folder_dir("Invoices", ExistingDirPolicy::Fail)
            .expect_err("existing dir should fail");
        assert_eq!(err.code, "FT_STAGING_DIR_EXISTS");
        assert_eq!(err.category, category::DOWNLOAD);

        let dir = staging
            .prepare_folder_dir("Invoices", ExistingDirPolicy::Recreate)
            .expect("recreate");
        assert!(dir.exists());
        assert!(!dir.join("stale.png").exists());
    }

    #[test]
    fn search_staging_name_is_reserved() {
        let temp = tempfile::tempdir().expect("tempdir");
        let staging = StagingArea::new(temp.path().to_path_buf());
        let err = staging
            .prepare_folder_dir(SEARCH_STAGING_DIR, ExistingDirPolicy::Recreate)
            .expect_err("reserved name");
        assert_eq!(err.code, "FT_STAGING_NAME_INVALID");
    }

    #[test]
    fn staging_must_stay_clear_of_remote_root() {
        let temp = tempfile::tempdir().expect("tempdir");
        let remote = temp.path().join("remote");
        fs::create_dir_all(&remote).expect("mkdir remote");

        let sibling = StagingArea::new(temp.path().join("work"));
        sibling
            .check_disjoint(&remote, &sibling.folder_dir("Invoices"))
            .expect("sibling roots");

        let parent = StagingArea::new(temp.path().to_path_buf());
        parent
            .check_disjoint(&remote, &parent.folder_dir("Invoices"))
            .expect("remote below staging root, outside the folder dir");
        parent
            .check_disjoint(&remote, &parent.search_dir())
            .expect("search dir is not the remote");
        let err = parent
            .check_disjoint(&remote, &parent.folder_dir("remote"))
            .expect_err("folder dir would hold the remote root");
        assert_eq!(err.code, "FT_STAGING_OVERLAPS_REMOTE");

        for root in [remote.clone(), remote.join("work")] {
            let staging = StagingArea::new(root.clone());
            let err = staging
                .check_disjoint(&remote, &staging.folder_dir("Invoices"))
                .expect_err("staging inside remote");
            assert_eq!(err.code, "FT_STAGING_OVERLAPS_REMOTE", "root {}", root.display());
            assert_eq!(err.exit_code(), 9);
        }
        assert!(!remote.join("work").exists());

        let err = sibling
            .check_disjoint(&temp.path().join("missing"), &sibling.search_dir())
            .expect_err("missing remote root");
        assert_eq!(err.code, "FT_STAGING_PATH_INVALID");
    }

    #[test]
    fn write_download_rejects_traversal() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = write_download(temp.path(), "../escape.png", b"x").expect_err("traversal");
        assert_eq!(err.code, "FT_DOWNLOAD_NAME_INVALID");
        assert!(!temp.path().parent().expect("parent").join("escape.png").exists());
    }
}
