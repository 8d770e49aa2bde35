use crate::scan::{scan_records, SearchHit};
use ft_core::app_error::AppResult;
use ft_core::config::SearchSettings;
use ft_core::record::{FolderTextRecord, RECORD_FILE_MARKER};
use ft_core::services::RemoteStore;
use ft_core::staging::{read_local, write_download, StagingArea};
use ft_core::types::RemoteEntry;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct SkippedRecord {
    pub remote_id: String,
    pub name: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub query: String,
    pub records_scanned: usize,
    pub skipped: Vec<SkippedRecord>,
    pub hits: Vec<SearchHit>,
}

impl SearchReport {
    pub fn folders(&self) -> Vec<&str> {
        self.hits.iter().map(|h| h.folder.as_str()).collect()
    }
}

/// Every published record file in the store, in id order.
pub fn discover_records(remote: &dyn RemoteStore) -> AppResult<Vec<RemoteEntry>> {
    let mut found = remote.list_by_name_pattern(RECORD_FILE_MARKER)?;
    found.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(found)
}

/// Downloads each record into the freshly recreated search staging directory.
pub fn stage_records(
    remote: &dyn RemoteStore,
    staging: &StagingArea,
    entries: &[RemoteEntry],
) -> AppResult<Vec<PathBuf>> {
    let dir = staging.prepare_search_dir()?;
    let mut paths = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        let bytes = remote.download_bytes(&entry.id)?;
        let staged_name = format!("{:04}-{}", idx, entry.name);
        paths.push(write_download(&dir, &staged_name, &bytes)?);
    }
    Ok(paths)
}

/// Finds every published folder record whose text contains `query`.
pub fn search_records(
    remote: &dyn RemoteStore,
    staging: &StagingArea,
    query: &str,
    settings: &SearchSettings,
) -> AppResult<SearchReport> {
    if let Some(remote_root) = remote.local_root() {
        staging.check_disjoint(remote_root, &staging.search_dir())?;
    }
    let entries = discover_records(remote)?;
    tracing::info!(records = entries.len(), remote = %remote.describe(), "discovered records");
    let paths = stage_records(remote, staging, &entries)?;

    let mut records = Vec::with_capacity(paths.len());
    let mut skipped = Vec::new();
    for (entry, path) in entries.iter().zip(&paths) {
        let bytes = read_local(path)?;
        match FolderTextRecord::parse(&bytes) {
            Ok(record) => records.push(record),
            Err(err) if !settings.strict_parse => {
                tracing::warn!(
                    record = %entry.name,
                    id = %entry.id,
                    code = %err.code,
                    "skipping unreadable record"
                );
                skipped.push(SkippedRecord {
                    remote_id: entry.id.0.clone(),
                    name: entry.name.clone(),
                    code: err.code,
                    message: err.message,
                });
            }
            Err(mut err) => {
                if let Some(details) = err.details.as_object_mut() {
                    details.insert("record".to_string(), serde_json::json!(entry.name));
                    details.insert("remote_id".to_string(), serde_json::json!(entry.id.0));
                }
                return Err(err);
            }
        }
    }

    let hits = scan_records(&records, query);
    for hit in &hits {
        tracing::info!(folder = %hit.folder, position = hit.position, "query matched");
    }
    Ok(SearchReport {
        query: query.to_string(),
        records_scanned: records.len(),
        skipped,
        hits,
    })
}
