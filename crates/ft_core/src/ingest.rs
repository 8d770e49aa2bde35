use crate::app_error::{category, AppError, AppResult};
use crate::config::{EmptyFolderPolicy, IngestSettings};
use crate::mime::{IMAGE_MIME_ALLOW_LIST, MIME_JSON};
use crate::record::FolderTextRecord;
use crate::services::{RemoteStore, TextExtractor, TextNormalizer};
use crate::staging::{read_local, write_download, write_record, StagingArea};
use crate::types::{ImageRef, ImageTextMapping, RemoteId};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Capabilities one ingestion run depends on.
pub struct IngestServices<'a> {
    pub remote: &'a dyn RemoteStore,
    pub extractor: &'a dyn TextExtractor,
    pub normalizer: &'a dyn TextNormalizer,
}

#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub record: FolderTextRecord,
    pub folder_id: RemoteId,
    pub local_dir: PathBuf,
    pub record_path: PathBuf,
    pub uploaded_id: RemoteId,
}

/// Sorts by name, byte-wise; id breaks ties so the order never depends on listing order.
pub fn order_images(mut images: Vec<ImageRef>) -> Vec<ImageRef> {
    images.sort_by(|a, b| {
        a.name
            .as_bytes()
            .cmp(b.name.as_bytes())
            .then_with(|| a.id.cmp(&b.id))
    });
    images
}

pub fn list_folder_images(
    remote: &dyn RemoteStore,
    folder_id: &RemoteId,
    folder_name: &str,
    empty_folder: EmptyFolderPolicy,
) -> AppResult<Vec<ImageRef>> {
    let images = order_images(remote.list_children(folder_id, &IMAGE_MIME_ALLOW_LIST)?);
    if images.is_empty() {
        if empty_folder == EmptyFolderPolicy::Reject {
            return Err(AppError::new(
                "FT_FOLDER_EMPTY",
                category::NOT_FOUND,
                "no jpeg or png images found in folder",
                false,
                serde_json::json!({ "folder": folder_name, "folder_id": folder_id.0 }),
            ));
        }
        tracing::warn!(
            folder = folder_name,
            "no images found in folder; only jpeg and png files are processed"
        );
    } else {
        for image in &images {
            tracing::info!(folder = folder_name, image = %image.name, id = %image.id, "image in folder");
        }
    }
    Ok(images)
}

/// Downloads every image into `dir`, in order. The first failure aborts.
/// A name repeated within the folder is stored as `<index>-<name>`.
pub fn download_images(remote: &dyn RemoteStore, dir: &Path, images: &[ImageRef]) -> AppResult<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(images.len());
    let mut seen = HashSet::new();
    for (idx, image) in images.iter().enumerate() {
        let bytes = remote.download_bytes(&image.id)?;
        let local_name = if seen.insert(image.name.as_str()) {
            image.name.clone()
        } else {
            format!("{:04}-{}", idx, image.name)
        };
        let path = write_download(dir, &local_name, &bytes)?;
        tracing::info!(image = %image.name, bytes = bytes.len(), "finished downloading image");
        paths.push(path);
    }
    Ok(paths)
}

/// Runs OCR and normalization over the downloaded images, in order.
pub fn extract_mappings(
    extractor: &dyn TextExtractor,
    normalizer: &dyn TextNormalizer,
    images: &[ImageRef],
    local_paths: &[PathBuf],
) -> AppResult<Vec<ImageTextMapping>> {
    let mut mappings = Vec::with_capacity(images.len());
    for (image, path) in images.iter().zip(local_paths) {
        let bytes = read_local(path)?;
        let raw = extractor.extract_text(&bytes).map_err(|mut err| {
            if let Some(details) = err.details.as_object_mut() {
                details.insert("image".to_string(), serde_json::json!(image.name));
            }
            err
        })?;
        let image_text = normalizer.normalize(&raw);
        tracing::debug!(
            image = %image.name,
            raw_len = raw.len(),
            text_len = image_text.len(),
            "recognized image text"
        );
        mappings.push(ImageTextMapping {
            image_name: image.name.clone(),
            image_id: image.id.0.clone(),
            image_text,
        });
    }
    Ok(mappings)
}

/// Turns one remote folder into a published text record.
pub fn ingest_folder(
    services: &IngestServices<'_>,
    staging: &StagingArea,
    folder_name: &str,
    settings: &IngestSettings,
) -> AppResult<IngestOutcome> {
    if let Some(remote_root) = services.remote.local_root() {
        staging.check_disjoint(remote_root, &staging.folder_dir(folder_name))?;
    }
    let folder = services.remote.resolve_folder(folder_name)?;
    tracing::info!(folder = folder_name, id = %folder.id, "resolved folder");

    let images = list_folder_images(services.remote, &folder.id, folder_name, settings.empty_folder)?;

    let local_dir = staging.prepare_folder_dir(folder_name, settings.existing_dir)?;
    let local_paths = download_images(services.remote, &local_dir, &images)?;

    let mappings = extract_mappings(services.extractor, services.normalizer, &images, &local_paths)?;
    let record = FolderTextRecord::from_mappings(folder_name, mappings);
    tracing::info!(
        folder = folder_name,
        images = record.image_to_text_mappings.len(),
        text_len = record.complete_text.len(),
        "finished recognition"
    );

    let record_path = write_record(&local_dir, &record)?;
    let uploaded_id = services
        .remote
        .upload_file(&folder.id, &record_path, &record.file_name(), MIME_JSON)?;
    tracing::info!(folder = folder_name, id = %uploaded_id, "published record");

    Ok(IngestOutcome {
        record,
        folder_id: folder.id,
        local_dir,
        record_path,
        uploaded_id,
    })
}

#[cfg(test)]
mod tests {
    use super::order_images;
    use crate::types::ImageRef;

    #[test]
    fn ordering_is_bytewise_with_id_tiebreak() {
        let ordered = order_images(vec![
            ImageRef::new("3", "b.png"),
            ImageRef::new("2", "B.png"),
            ImageRef::new("9", "a.png"),
            ImageRef::new("1", "a.png"),
        ]);
        let keys = ordered
            .iter()
            .map(|i| format!("{}#{}", i.name, i.id))
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["B.png#2", "a.png#1", "a.png#9", "b.png#3"]);
    }
}
