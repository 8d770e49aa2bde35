use crate::app_error::{category, AppError, AppResult};
use crate::mime::mime_for_name;
use crate::services::RemoteStore;
use crate::types::{RemoteEntry, RemoteId};
use std::collections::BTreeSet;
use std::path::Path;

/// Remote store backed by an S3 bucket. Folders are key prefixes.
///
/// Folder ids are full key prefixes without the trailing `/`; file ids are
/// full object keys.
#[derive(Debug, Clone)]
pub struct S3RemoteStore {
    pub bucket: String,
    pub prefix: String,
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
}

impl S3RemoteStore {
    pub fn new(bucket: String, prefix: String) -> Self {
        Self {
            bucket,
            prefix: prefix.trim_matches('/').to_string(),
            endpoint_url: std::env::var("FT_S3_ENDPOINT").ok(),
            region: std::env::var("FT_S3_REGION").ok(),
        }
    }

    fn base_prefix(&self) -> String {
        if self.prefix.is_empty() {
            String::new()
        } else {
            format!("{}/", self.prefix)
        }
    }

    fn classify_remote_error(message: &str) -> (&'static str, bool) {
        let lower = message.to_ascii_lowercase();
        if lower.contains("credential")
            || lower.contains("accessdenied")
            || lower.contains("signature")
            || lower.contains("unauthorized")
            || lower.contains("forbidden")
            || lower.contains("403")
        {
            ("AUTH_FAILED", false)
        } else {
            ("NETWORK_FAILED", true)
        }
    }

    fn map_remote_error(&self, message: String, err_category: &str, operation: &str, key: &str) -> AppError {
        let (suffix, retryable) = Self::classify_remote_error(&message);
        let code = if err_category == category::UPLOAD {
            format!("FT_UPLOAD_{suffix}")
        } else {
            format!("FT_DOWNLOAD_{suffix}")
        };
        AppError::new(
            &code,
            err_category,
            &format!("failed {operation} s3 object"),
            retryable,
            serde_json::json!({
                "error": message,
                "bucket": self.bucket,
                "key": key
            }),
        )
    }

    fn run_async<T>(
        &self,
        err_category: &str,
        fut: impl std::future::Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                AppError::new(
                    "FT_REMOTE_RUNTIME_FAILED",
                    err_category,
                    "failed creating async runtime for s3 access",
                    true,
                    serde_json::json!({ "error": e.to_string() }),
                )
            })?;
        rt.block_on(fut)
    }

    async fn build_client(endpoint_url: Option<String>, region: Option<String>) -> aws_sdk_s3::Client {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_sdk_s3::config::Region::new(region));
        }
        if let Some(endpoint) = endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let cfg = loader.load().await;
        aws_sdk_s3::Client::new(&cfg)
    }

    fn list_keys(&self, prefix: &str, delimiter: Option<&str>) -> AppResult<Vec<String>> {
        let bucket = self.bucket.clone();
        let prefix = prefix.to_string();
        let delimiter = delimiter.map(str::to_string);
        let endpoint = self.endpoint_url.clone();
        let region = self.region.clone();
        let this = self.clone();
        self.run_async(category::DOWNLOAD, async move {
            let client = Self::build_client(endpoint, region).await;
            let mut keys = Vec::new();
            let mut token: Option<String> = None;
            loop {
                let mut req = client.list_objects_v2().bucket(&bucket).prefix(&prefix);
                if let Some(d) = &delimiter {
                    req = req.delimiter(d);
                }
                if let Some(t) = &token {
                    req = req.continuation_token(t);
                }
                let out = req
                    .send()
                    .await
                    .map_err(|e| this.map_remote_error(e.to_string(), category::DOWNLOAD, "listing", &prefix))?;
                for object in out.contents() {
                    if let Some(key) = object.key() {
                        keys.push(key.to_string());
                    }
                }
                match out.next_continuation_token() {
                    Some(next) => token = Some(next.to_string()),
                    None => break,
                }
            }
            Ok(keys)
        })
    }

    fn file_name_of(key: &str) -> &str {
        key.rsplit('/').next().unwrap_or(key)
    }
}

impl RemoteStore for S3RemoteStore {
    fn describe(&self) -> String {
        if self.prefix.is_empty() {
            format!("s3://{}", self.bucket)
        } else {
            format!("s3://{}/{}", self.bucket, self.prefix)
        }
    }

    fn find_folders(&self, name: &str) -> AppResult<Vec<RemoteEntry>> {
        let base = self.base_prefix();
        let keys = self.list_keys(&base, None)?;
        let mut folders = BTreeSet::new();
        for key in &keys {
            let rel = key.strip_prefix(&base).unwrap_or(key);
            let segments = rel.split('/').collect::<Vec<_>>();
            // The last segment is the object name; a folder marker key ends in "/".
            let dir_segments = &segments[..segments.len().saturating_sub(1)];
            let mut path = base.trim_end_matches('/').to_string();
            for segment in dir_segments {
                if segment.is_empty() {
                    continue;
                }
                if !path.is_empty() {
                    path.push('/');
                }
                path.push_str(segment);
                if *segment == name {
                    folders.insert(path.clone());
                }
            }
        }
        Ok(folders
            .into_iter()
            .map(|id| RemoteEntry::new(id, name))
            .collect())
    }

    fn list_children(&self, folder_id: &RemoteId, mime_filter: &[&str]) -> AppResult<Vec<RemoteEntry>> {
        let prefix = format!("{}/", folder_id.0);
        let keys = self.list_keys(&prefix, Some("/"))?;
        Ok(keys
            .into_iter()
            .filter_map(|key| {
                let name = key.strip_prefix(&prefix)?.to_string();
                if name.is_empty() || !mime_filter.contains(&mime_for_name(&name)) {
                    return None;
                }
                Some(RemoteEntry::new(key, name))
            })
            .collect())
    }

    fn download_bytes(&self, file_id: &RemoteId) -> AppResult<Vec<u8>> {
        let bucket = self.bucket.clone();
        let key = file_id.0.clone();
        let endpoint = self.endpoint_url.clone();
        let region = self.region.clone();
        let this = self.clone();
        self.run_async(category::DOWNLOAD, async move {
            let client = Self::build_client(endpoint, region).await;
            let out = client
                .get_object()
                .bucket(&bucket)
                .key(&key)
                .send()
                .await
                .map_err(|e| this.map_remote_error(e.to_string(), category::DOWNLOAD, "reading", &key))?;
            let bytes = out.body.collect().await.map_err(|e| {
                this.map_remote_error(
                    e.to_string(),
                    category::DOWNLOAD,
                    "collecting response body for",
                    &key,
                )
            })?;
            Ok(bytes.into_bytes().to_vec())
        })
    }

    fn upload_file(
        &self,
        parent_id: &RemoteId,
        local_path: &Path,
        name: &str,
        mime: &str,
    ) -> AppResult<RemoteId> {
        let payload = std::fs::read(local_path).map_err(|e| {
            AppError::new(
                "FT_UPLOAD_READ_FAILED",
                category::UPLOAD,
                "failed reading local file for upload",
                false,
                serde_json::json!({ "error": e.to_string(), "path": local_path }),
            )
        })?;

        let bucket = self.bucket.clone();
        let key = format!("{}/{}", parent_id.0, name);
        let content_type = mime.to_string();
        let endpoint = self.endpoint_url.clone();
        let region = self.region.clone();
        let this = self.clone();
        self.run_async(category::UPLOAD, async move {
            let client = Self::build_client(endpoint, region).await;
            client
                .put_object()
                .bucket(&bucket)
                .key(&key)
                .content_type(content_type)
                .body(payload.into())
                .send()
                .await
                .map_err(|e| this.map_remote_error(e.to_string(), category::UPLOAD, "writing", &key))?;
            Ok(RemoteId(key))
        })
    }

    fn list_by_name_pattern(&self, pattern: &str) -> AppResult<Vec<RemoteEntry>> {
        let keys = self.list_keys(&self.base_prefix(), None)?;
        let mut out = keys
            .into_iter()
            .filter(|key| !key.ends_with('/') && Self::file_name_of(key).contains(pattern))
            .map(|key| {
                let name = Self::file_name_of(&key).to_string();
                RemoteEntry::new(key, name)
            })
            .collect::<Vec<_>>();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }
}
