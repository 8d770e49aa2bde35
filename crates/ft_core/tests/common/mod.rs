#![allow(dead_code)]

use ft_core::app_error::{AppError, AppResult};
use ft_core::mime::mime_for_name;
use ft_core::services::{RemoteStore, TextExtractor};
use ft_core::types::{RemoteEntry, RemoteId};
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct MemoryFile {
    pub parent: RemoteId,
    pub entry: RemoteEntry,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// In-memory remote store. Children are listed in insertion order; file ids
/// are `<folder id>/<name>`.
#[derive(Default)]
pub struct MemoryRemoteStore {
    pub folders: Vec<RemoteEntry>,
    pub files: Mutex<Vec<MemoryFile>>,
    pub failing_downloads: Vec<String>,
    pub fail_uploads: bool,
}

impl MemoryRemoteStore {
    pub fn add_folder(&mut self, id: &str, name: &str) {
        self.folders.push(RemoteEntry::new(id, name));
    }

    pub fn add_file(&mut self, folder_id: &str, name: &str, bytes: &[u8]) {
        let id = format!("{folder_id}/{name}");
        self.files.get_mut().expect("files lock").push(MemoryFile {
            parent: RemoteId(folder_id.to_string()),
            entry: RemoteEntry::new(id, name),
            mime: mime_for_name(name).to_string(),
            bytes: bytes.to_vec(),
        });
    }

    pub fn uploaded(&self, name: &str) -> Option<MemoryFile> {
        self.files
            .lock()
            .expect("files lock")
            .iter()
            .find(|f| f.entry.name == name)
            .cloned()
    }
}

impl RemoteStore for MemoryRemoteStore {
    fn describe(&self) -> String {
        "memory://".to_string()
    }

    fn find_folders(&self, name: &str) -> AppResult<Vec<RemoteEntry>> {
        Ok(self.folders.iter().filter(|f| f.name == name).cloned().collect())
    }

    fn list_children(&self, folder_id: &RemoteId, mime_filter: &[&str]) -> AppResult<Vec<RemoteEntry>> {
        Ok(self
            .files
            .lock()
            .expect("files lock")
            .iter()
            .filter(|f| &f.parent == folder_id && mime_filter.contains(&f.mime.as_str()))
            .map(|f| f.entry.clone())
            .collect())
    }

    fn download_bytes(&self, file_id: &RemoteId) -> AppResult<Vec<u8>> {
        let files = self.files.lock().expect("files lock");
        let file = files.iter().find(|f| &f.entry.id == file_id).ok_or_else(|| {
            AppError::new(
                "FT_DOWNLOAD_FAILED",
                "download",
                "no such file",
                false,
                serde_json::json!({ "id": file_id.0 }),
            )
        })?;
        if self.failing_downloads.contains(&file.entry.name) {
            return Err(AppError::new(
                "FT_DOWNLOAD_FAILED",
                "download",
                "simulated download failure",
                true,
                serde_json::json!({ "id": file_id.0 }),
            ));
        }
        Ok(file.bytes.clone())
    }

    fn upload_file(
        &self,
        parent_id: &RemoteId,
        local_path: &Path,
        name: &str,
        mime: &str,
    ) -> AppResult<RemoteId> {
        if self.fail_uploads {
            return Err(AppError::new(
                "FT_UPLOAD_FAILED",
                "upload",
                "simulated upload failure",
                true,
                serde_json::json!({ "name": name }),
            ));
        }
        let bytes = std::fs::read(local_path).expect("read local upload");
        let mut files = self.files.lock().expect("files lock");
        files.retain(|f| !(&f.parent == parent_id && f.entry.name == name));
        let id = RemoteId(format!("{}/{}", parent_id.0, name));
        files.push(MemoryFile {
            parent: parent_id.clone(),
            entry: RemoteEntry {
                id: id.clone(),
                name: name.to_string(),
            },
            mime: mime.to_string(),
            bytes,
        });
        Ok(id)
    }

    fn list_by_name_pattern(&self, pattern: &str) -> AppResult<Vec<RemoteEntry>> {
        Ok(self
            .files
            .lock()
            .expect("files lock")
            .iter()
            .filter(|f| f.entry.name.contains(pattern))
            .map(|f| f.entry.clone())
            .collect())
    }
}

/// Treats image bytes as their own recognized text. Payloads starting with
/// `ERR:` fail the way a provider error would.
#[derive(Default)]
pub struct EchoExtractor {
    pub calls: Mutex<Vec<String>>,
}

impl TextExtractor for EchoExtractor {
    fn extract_text(&self, image_bytes: &[u8]) -> AppResult<String> {
        let text = String::from_utf8_lossy(image_bytes).to_string();
        self.calls.lock().expect("calls lock").push(text.clone());
        if let Some(message) = text.strip_prefix("ERR:") {
            return Err(AppError::new(
                "FT_EXTRACTION_FAILED",
                "extraction",
                "text extraction failed",
                false,
                serde_json::json!({ "provider_message": message }),
            ));
        }
        Ok(text)
    }
}
