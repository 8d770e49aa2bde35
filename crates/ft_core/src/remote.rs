use crate::app_error::{category, AppError, AppResult};
use crate::remote_fs::FsRemoteStore;
use crate::remote_s3::S3RemoteStore;
use crate::services::RemoteStore;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemoteTargetUri {
    FilePath { path: String },
    S3 { bucket: String, prefix: String },
}

impl RemoteTargetUri {
    pub fn parse(raw: &str) -> AppResult<Self> {
        if raw.trim().is_empty() {
            return Err(AppError::new(
                "FT_REMOTE_TARGET_INVALID",
                category::CONFIG,
                "remote target is required",
                false,
                serde_json::json!({ "target": raw }),
            ));
        }

        if let Some(rest) = raw.strip_prefix("s3://") {
            let mut parts = rest.splitn(2, '/');
            let bucket = parts.next().unwrap_or_default().trim();
            let prefix = parts.next().unwrap_or_default().trim_matches('/');
            if bucket.is_empty() {
                return Err(AppError::new(
                    "FT_REMOTE_TARGET_INVALID",
                    category::CONFIG,
                    "s3 target missing bucket",
                    false,
                    serde_json::json!({ "target": raw }),
                ));
            }
            return Ok(RemoteTargetUri::S3 {
                bucket: bucket.to_string(),
                prefix: prefix.to_string(),
            });
        }

        if let Some(rest) = raw.strip_prefix("file://") {
            if rest.trim().is_empty() {
                return Err(AppError::new(
                    "FT_REMOTE_TARGET_INVALID",
                    category::CONFIG,
                    "file target missing path",
                    false,
                    serde_json::json!({ "target": raw }),
                ));
            }
            return Ok(RemoteTargetUri::FilePath {
                path: rest.to_string(),
            });
        }

        if raw.contains("://") {
            return Err(AppError::new(
                "FT_REMOTE_TARGET_UNSUPPORTED",
                category::CONFIG,
                "unsupported remote target scheme",
                false,
                serde_json::json!({ "target": raw }),
            ));
        }

        Ok(RemoteTargetUri::FilePath {
            path: raw.to_string(),
        })
    }

    pub fn display(&self) -> String {
        match self {
            RemoteTargetUri::FilePath { path } => path.clone(),
            RemoteTargetUri::S3 { bucket, prefix } => {
                if prefix.is_empty() {
                    format!("s3://{}", bucket)
                } else {
                    format!("s3://{}/{}", bucket, prefix)
                }
            }
        }
    }
}

pub fn open_remote_store(target: &RemoteTargetUri) -> AppResult<Box<dyn RemoteStore>> {
    match target {
        RemoteTargetUri::FilePath { path } => {
            let root = PathBuf::from(path);
            if !root.is_dir() {
                return Err(AppError::new(
                    "FT_REMOTE_TARGET_INVALID",
                    category::CONFIG,
                    "remote root directory does not exist",
                    false,
                    serde_json::json!({ "path": root }),
                ));
            }
            Ok(Box::new(FsRemoteStore::new(root)))
        }
        RemoteTargetUri::S3 { bucket, prefix } => {
            Ok(Box::new(S3RemoteStore::new(bucket.clone(), prefix.clone())))
        }
    }
}
