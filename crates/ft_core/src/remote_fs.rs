use crate::app_error::{category, AppError, AppResult};
use crate::mime::mime_for_name;
use crate::services::RemoteStore;
use crate::types::{RemoteEntry, RemoteId};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Remote store emulated on a local directory tree.
///
/// Folders are directories at any depth below `root`; identifiers are
/// `/`-separated paths relative to `root`.
#[derive(Debug, Clone)]
pub struct FsRemoteStore {
    pub root: PathBuf,
}

impl FsRemoteStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn id_for(&self, path: &Path) -> Option<RemoteId> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect::<Vec<_>>();
        if parts.is_empty() {
            return None;
        }
        Some(RemoteId(parts.join("/")))
    }

    fn path_for(&self, id: &RemoteId, err_category: &str) -> AppResult<PathBuf> {
        let rel = Path::new(&id.0);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if id.0.is_empty() || escapes {
            return Err(AppError::new(
                "FT_REMOTE_ID_INVALID",
                err_category,
                "remote id does not name an entry inside the store",
                false,
                serde_json::json!({ "id": id.0, "root": self.root }),
            ));
        }
        Ok(self.root.join(rel))
    }

    /// Every entry below `root`, sorted by file name. An unreadable subtree
    /// fails the whole walk.
    fn walk(&self) -> AppResult<Vec<walkdir::DirEntry>> {
        walkdir::WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .map(|entry| {
                entry.map_err(|e| {
                    AppError::new(
                        "FT_REMOTE_LIST_FAILED",
                        category::DOWNLOAD,
                        "failed walking remote store",
                        true,
                        serde_json::json!({
                            "error": e.to_string(),
                            "path": e.path(),
                            "root": self.root
                        }),
                    )
                })
            })
            .collect()
    }

    fn entry_for(&self, path: &Path) -> Option<RemoteEntry> {
        let id = self.id_for(path)?;
        let name = path.file_name()?.to_string_lossy().to_string();
        Some(RemoteEntry { id, name })
    }
}

impl RemoteStore for FsRemoteStore {
    fn describe(&self) -> String {
        format!("file://{}", self.root.display())
    }

    fn find_folders(&self, name: &str) -> AppResult<Vec<RemoteEntry>> {
        let mut out = self
            .walk()?
            .into_iter()
            .filter(|e| e.file_type().is_dir() && e.file_name().to_string_lossy() == name)
            .filter_map(|e| self.entry_for(e.path()))
            .collect::<Vec<_>>();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    fn list_children(&self, folder_id: &RemoteId, mime_filter: &[&str]) -> AppResult<Vec<RemoteEntry>> {
        let dir = self.path_for(folder_id, category::DOWNLOAD)?;
        let entries = fs::read_dir(&dir).map_err(|e| {
            AppError::new(
                "FT_REMOTE_LIST_FAILED",
                category::DOWNLOAD,
                "failed listing remote folder",
                true,
                serde_json::json!({ "error": e.to_string(), "folder_id": folder_id.0 }),
            )
        })?;

        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                AppError::new(
                    "FT_REMOTE_LIST_FAILED",
                    category::DOWNLOAD,
                    "failed reading remote folder entry",
                    true,
                    serde_json::json!({ "error": e.to_string(), "folder_id": folder_id.0 }),
                )
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if !mime_filter.contains(&mime_for_name(&name)) {
                continue;
            }
            if let Some(found) = self.entry_for(&path) {
                out.push(found);
            }
        }
        Ok(out)
    }

    fn download_bytes(&self, file_id: &RemoteId) -> AppResult<Vec<u8>> {
        let path = self.path_for(file_id, category::DOWNLOAD)?;
        fs::read(&path).map_err(|e| {
            AppError::new(
                "FT_DOWNLOAD_FAILED",
                category::DOWNLOAD,
                "failed downloading remote file",
                true,
                serde_json::json!({ "error": e.to_string(), "id": file_id.0 }),
            )
        })
    }

    fn upload_file(
        &self,
        parent_id: &RemoteId,
        local_path: &Path,
        name: &str,
        _mime: &str,
    ) -> AppResult<RemoteId> {
        let parent = self.path_for(parent_id, category::UPLOAD)?;
        if !parent.is_dir() {
            return Err(AppError::new(
                "FT_UPLOAD_FAILED",
                category::UPLOAD,
                "upload parent folder does not exist",
                false,
                serde_json::json!({ "parent_id": parent_id.0 }),
            ));
        }
        let id = RemoteId(format!("{}/{}", parent_id.0, name));
        let target = self.path_for(&id, category::UPLOAD)?;
        fs::copy(local_path, &target).map_err(|e| {
            AppError::new(
                "FT_UPLOAD_FAILED",
                category::UPLOAD,
                "failed uploading file to remote folder",
                true,
                serde_json::json!({
                    "error": e.to_string(),
                    "from": local_path,
                    "parent_id": parent_id.0,
                    "name": name
                }),
            )
        })?;
        Ok(id)
    }

    fn list_by_name_pattern(&self, pattern: &str) -> AppResult<Vec<RemoteEntry>> {
        let mut out = self
            .walk()?
            .into_iter()
            .filter(|e| e.file_type().is_file() && e.file_name().to_string_lossy().contains(pattern))
            .filter_map(|e| self.entry_for(e.path()))
            .collect::<Vec<_>>();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    fn local_root(&self) -> Option<&Path> {
        Some(&self.root)
    }
}
