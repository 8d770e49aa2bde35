use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error categories. Each one maps to a distinct process exit code.
pub mod category {
    pub const USAGE: &str = "usage";
    pub const NOT_FOUND: &str = "not_found";
    pub const AMBIGUOUS: &str = "ambiguous";
    pub const DOWNLOAD: &str = "download";
    pub const UPLOAD: &str = "upload";
    pub const EXTRACTION: &str = "extraction";
    pub const PARSE: &str = "parse";
    pub const CONFIG: &str = "config";
    pub const INTERNAL: &str = "internal";
}

/// Exit code reported when a search completes without a single match.
pub const EXIT_NO_MATCH: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub schema_version: u32,
    pub code: String,
    pub category: String,
    pub message: String,
    pub retryable: bool,
    pub details: Value,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn new(code: &str, category: &str, message: &str, retryable: bool, details: Value) -> Self {
        Self {
            schema_version: 1,
            code: code.to_string(),
            category: category.to_string(),
            message: message.to_string(),
            retryable,
            details,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category.as_str() {
            category::USAGE => 2,
            category::NOT_FOUND => 3,
            category::AMBIGUOUS => 4,
            category::DOWNLOAD => 5,
            category::UPLOAD => 6,
            category::EXTRACTION => 7,
            category::PARSE => 8,
            category::CONFIG => 9,
            _ => 10,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
