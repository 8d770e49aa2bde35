use std::path::Path;

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";
pub const MIME_JSON: &str = "application/json";

/// Media types accepted as ingestion input. Everything else in a folder is ignored.
pub const IMAGE_MIME_ALLOW_LIST: [&str; 2] = [MIME_JPEG, MIME_PNG];

pub fn mime_for_name(name: &str) -> &'static str {
    match Path::new(name)
        .extension()
        .and_then(|x| x.to_str())
        .map(|x| x.to_ascii_lowercase())
    {
        Some(ext) if ext == "jpg" || ext == "jpeg" => MIME_JPEG,
        Some(ext) if ext == "png" => MIME_PNG,
        Some(ext) if ext == "json" => MIME_JSON,
        Some(ext) if ext == "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
