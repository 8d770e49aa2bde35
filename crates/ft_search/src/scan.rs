use ft_core::record::FolderTextRecord;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub folder: String,
    /// Byte offset of the first occurrence in `complete_text`.
    pub position: usize,
}

/// Literal, case-sensitive substring scan over every record, in record order.
pub fn scan_records(records: &[FolderTextRecord], query: &str) -> Vec<SearchHit> {
    records
        .iter()
        .filter_map(|record| {
            record.find(query).map(|position| SearchHit {
                folder: record.folder.clone(),
                position,
            })
        })
        .collect()
}
