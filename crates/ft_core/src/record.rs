use crate::app_error::{category, AppError, AppResult};
use crate::types::ImageTextMapping;
use serde::{Deserialize, Serialize};

pub const RECORD_TYPE: &str = "image_to_text_mappings";
pub const RECORD_SCHEMA_VERSION: u32 = 1;

/// Every published record file name contains this marker; search discovery keys on it.
pub const RECORD_FILE_MARKER: &str = "image_text_data.json";

pub fn record_file_name(folder: &str) -> String {
    format!("{}.{}", folder, RECORD_FILE_MARKER)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderTextRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub version: u32,
    pub folder: String,
    pub complete_text: String,
    pub image_to_text_mappings: Vec<ImageTextMapping>,
}

impl FolderTextRecord {
    /// Builds a record from mappings already in processing order.
    pub fn from_mappings(folder: &str, mappings: Vec<ImageTextMapping>) -> Self {
        let complete_text = mappings
            .iter()
            .map(|m| m.image_text.as_str())
            .collect::<String>();
        Self {
            record_type: RECORD_TYPE.to_string(),
            version: RECORD_SCHEMA_VERSION,
            folder: folder.to_string(),
            complete_text,
            image_to_text_mappings: mappings,
        }
    }

    pub fn file_name(&self) -> String {
        record_file_name(&self.folder)
    }

    pub fn to_json_bytes(&self) -> AppResult<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self).map_err(|e| {
            AppError::new(
                "FT_RECORD_SERIALIZE_FAILED",
                category::INTERNAL,
                "failed serializing folder text record",
                false,
                serde_json::json!({ "error": e.to_string(), "folder": self.folder }),
            )
        })?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn parse(bytes: &[u8]) -> AppResult<Self> {
        let record: FolderTextRecord = serde_json::from_slice(bytes).map_err(|e| {
            AppError::new(
                "FT_RECORD_PARSE_FAILED",
                category::PARSE,
                "failed parsing folder text record",
                false,
                serde_json::json!({ "error": e.to_string() }),
            )
        })?;
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.record_type != RECORD_TYPE {
            return Err(AppError::new(
                "FT_RECORD_TYPE_MISMATCH",
                category::PARSE,
                "record is not an image to text mapping record",
                false,
                serde_json::json!({ "type": self.record_type, "expected": RECORD_TYPE }),
            ));
        }
        if self.version != RECORD_SCHEMA_VERSION {
            return Err(AppError::new(
                "FT_RECORD_VERSION_UNSUPPORTED",
                category::PARSE,
                "unsupported record schema version",
                false,
                serde_json::json!({
                    "version": self.version,
                    "supported": [RECORD_SCHEMA_VERSION]
                }),
            ));
        }
        let expected = self
            .image_to_text_mappings
            .iter()
            .map(|m| m.image_text.as_str())
            .collect::<String>();
        if expected != self.complete_text {
            return Err(AppError::new(
                "FT_RECORD_TEXT_MISMATCH",
                category::PARSE,
                "complete_text does not match the concatenated image texts",
                false,
                serde_json::json!({ "folder": self.folder }),
            ));
        }
        Ok(())
    }

    /// Byte offset of the first literal occurrence of `query` in `complete_text`.
    /// An empty query only matches records that carry some text.
    pub fn find(&self, query: &str) -> Option<usize> {
        if query.is_empty() && self.complete_text.is_empty() {
            return None;
        }
        self.complete_text.find(query)
    }
}
