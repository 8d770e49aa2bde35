use crate::app_error::{category, AppError, AppResult};
use crate::staging::ExistingDirPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Whether a folder without qualifying images still yields a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmptyFolderPolicy {
    #[default]
    Proceed,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct IngestSettings {
    pub existing_dir: ExistingDirPolicy,
    pub empty_folder: EmptyFolderPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SearchSettings {
    pub strict_parse: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OcrSettings {
    pub tesseract_cmd: String,
    pub language: String,
    pub psm: Option<u32>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            tesseract_cmd: "tesseract".to_string(),
            language: "eng".to_string(),
            psm: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizeSettings {
    /// Whole-word spelling corrections applied after OCR.
    pub replacements: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub remote: String,
    pub staging_root: String,
    pub log_level: String,
    pub ingest: IngestSettings,
    pub search: SearchSettings,
    pub ocr: OcrSettings,
    pub normalize: NormalizeSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote: "./remote".to_string(),
            staging_root: ".".to_string(),
            log_level: "info".to_string(),
            ingest: IngestSettings::default(),
            search: SearchSettings::default(),
            ocr: OcrSettings::default(),
            normalize: NormalizeSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::new(
                "FT_CONFIG_READ_FAILED",
                category::CONFIG,
                "failed reading config file",
                false,
                serde_json::json!({ "error": e.to_string(), "path": path }),
            )
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            AppError::new(
                "FT_CONFIG_INVALID",
                category::CONFIG,
                "failed parsing config file",
                false,
                serde_json::json!({ "error": e.to_string(), "path": path }),
            )
        })
    }

    /// Loads `path` (or `FT_CONFIG`) when given, otherwise defaults, then applies
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let env_path = std::env::var("FT_CONFIG").ok();
        let mut cfg = match path.or(env_path.as_deref().map(Path::new)) {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("FT_REMOTE") {
            self.remote = v;
        }
        if let Some(v) = lookup("FT_STAGING_ROOT") {
            self.staging_root = v;
        }
        if let Some(v) = lookup("FT_TESSERACT_CMD") {
            self.ocr.tesseract_cmd = v;
        }
        if let Some(v) = lookup("FT_OCR_LANG") {
            self.ocr.language = v;
        }
    }
}
