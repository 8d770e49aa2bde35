use crate::app_error::{category, AppError, AppResult};
use crate::types::{RemoteEntry, RemoteId};
use std::path::Path;

/// Capabilities the pipeline needs from the remote folder store.
///
/// Every call blocks until the remote side answers. Read failures are
/// reported in the `download` category and write failures in `upload`.
pub trait RemoteStore: Send + Sync {
    /// Human readable target, used in logs.
    fn describe(&self) -> String;

    /// All folders whose name equals `name`, in a stable order.
    fn find_folders(&self, name: &str) -> AppResult<Vec<RemoteEntry>>;

    /// Direct children of `folder_id` whose media type is in `mime_filter`.
    fn list_children(&self, folder_id: &RemoteId, mime_filter: &[&str]) -> AppResult<Vec<RemoteEntry>>;

    fn download_bytes(&self, file_id: &RemoteId) -> AppResult<Vec<u8>>;

    /// Stores `local_path` as child `name` of `parent_id`, replacing a previous
    /// child of the same name.
    fn upload_file(
        &self,
        parent_id: &RemoteId,
        local_path: &Path,
        name: &str,
        mime: &str,
    ) -> AppResult<RemoteId>;

    /// Every file in the store whose name contains `pattern`.
    fn list_by_name_pattern(&self, pattern: &str) -> AppResult<Vec<RemoteEntry>>;

    /// Local directory backing the store, if any. Staging must stay out of it.
    fn local_root(&self) -> Option<&Path> {
        None
    }

    /// Resolves `name` to exactly one folder.
    fn resolve_folder(&self, name: &str) -> AppResult<RemoteEntry> {
        let mut matches = self.find_folders(name)?;
        tracing::info!(folder = name, matches = matches.len(), "matching folders");
        match matches.len() {
            0 => Err(AppError::new(
                "FT_FOLDER_NOT_FOUND",
                category::NOT_FOUND,
                "no folder with the given name found",
                false,
                serde_json::json!({ "folder": name, "remote": self.describe() }),
            )),
            1 => Ok(matches.remove(0)),
            n => Err(AppError::new(
                "FT_FOLDER_AMBIGUOUS",
                category::AMBIGUOUS,
                "multiple folders share the given name; folder names must be unique",
                false,
                serde_json::json!({
                    "folder": name,
                    "matches": n,
                    "ids": matches.iter().map(|m| m.id.0.clone()).collect::<Vec<_>>()
                }),
            )),
        }
    }
}

/// OCR capability: image bytes in, recognized text out.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, image_bytes: &[u8]) -> AppResult<String>;
}

/// Post-OCR text correction. Infallible by contract.
pub trait TextNormalizer: Send + Sync {
    fn normalize(&self, text: &str) -> String;
}

/// Leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNormalizer;

impl TextNormalizer for IdentityNormalizer {
    fn normalize(&self, text: &str) -> String {
        text.to_string()
    }
}
