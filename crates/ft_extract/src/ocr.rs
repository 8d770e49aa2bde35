use ft_core::app_error::{category, AppError, AppResult};
use ft_core::config::OcrSettings;
use ft_core::services::TextExtractor;
use std::fs;
use std::io::ErrorKind;
use std::process::Command;

/// Runs the `tesseract` command line tool once per image.
#[derive(Debug, Clone)]
pub struct TesseractExtractor {
    pub command: String,
    pub language: String,
    pub psm: Option<u32>,
}

impl TesseractExtractor {
    pub fn from_settings(settings: &OcrSettings) -> Self {
        Self {
            command: settings.tesseract_cmd.clone(),
            language: settings.language.clone(),
            psm: settings.psm,
        }
    }

    fn args(&self, input: &std::path::Path) -> Vec<String> {
        let mut args = vec![
            input.display().to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.language.clone(),
        ];
        if let Some(psm) = self.psm {
            args.push("--psm".to_string());
            args.push(psm.to_string());
        }
        args
    }
}

fn provider_message(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>();
    if lines.is_empty() {
        "tesseract exited without a message".to_string()
    } else {
        lines.join("; ")
    }
}

impl TextExtractor for TesseractExtractor {
    fn extract_text(&self, image_bytes: &[u8]) -> AppResult<String> {
        let dir = tempfile::tempdir().map_err(|e| {
            AppError::new(
                "FT_EXTRACTION_FAILED",
                category::EXTRACTION,
                "failed creating temporary directory for ocr input",
                false,
                serde_json::json!({ "error": e.to_string() }),
            )
        })?;
        let input_path = dir.path().join("input.img");
        fs::write(&input_path, image_bytes).map_err(|e| {
            AppError::new(
                "FT_EXTRACTION_FAILED",
                category::EXTRACTION,
                "failed writing temporary ocr input",
                false,
                serde_json::json!({ "error": e.to_string() }),
            )
        })?;

        tracing::debug!(command = %self.command, bytes = image_bytes.len(), "running tesseract");
        let output = Command::new(&self.command)
            .args(self.args(&input_path))
            .output()
            .map_err(|e| {
                let code = if e.kind() == ErrorKind::NotFound {
                    "FT_TESSERACT_UNAVAILABLE"
                } else {
                    "FT_EXTRACTION_FAILED"
                };
                AppError::new(
                    code,
                    category::EXTRACTION,
                    "failed running tesseract",
                    false,
                    serde_json::json!({ "error": e.to_string(), "command": self.command }),
                )
            })?;

        if !output.status.success() {
            return Err(AppError::new(
                "FT_EXTRACTION_FAILED",
                category::EXTRACTION,
                "tesseract reported an error",
                false,
                serde_json::json!({
                    "provider_message": provider_message(&output.stderr),
                    "status": output.status.code(),
                    "bytes": image_bytes.len()
                }),
            ));
        }

        String::from_utf8(output.stdout).map_err(|e| {
            AppError::new(
                "FT_EXTRACTION_FAILED",
                category::EXTRACTION,
                "tesseract output is not utf8",
                false,
                serde_json::json!({ "error": e.to_string() }),
            )
        })
    }
}
