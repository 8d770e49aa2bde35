use ft_core::app_error::AppResult;
use ft_core::config::AppConfig;
use ft_core::ingest::{ingest_folder, IngestServices};
use ft_core::services::RemoteStore;
use ft_core::staging::StagingArea;
use ft_extract::{DefaultNormalizer, TesseractExtractor};

pub fn run_ingest(
    remote: &dyn RemoteStore,
    staging: &StagingArea,
    cfg: &AppConfig,
    folder_name: &str,
) -> AppResult<()> {
    let extractor = TesseractExtractor::from_settings(&cfg.ocr);
    let normalizer = DefaultNormalizer::from_settings(&cfg.normalize);
    let services = IngestServices {
        remote,
        extractor: &extractor,
        normalizer: &normalizer,
    };

    let out = ingest_folder(&services, staging, folder_name, &cfg.ingest)?;
    println!(
        "ingested {} ({} images) -> {}",
        out.record.folder,
        out.record.image_to_text_mappings.len(),
        out.record_path.display()
    );
    println!("published {}", out.uploaded_id);
    Ok(())
}
