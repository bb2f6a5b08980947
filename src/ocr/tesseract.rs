//! Tesseract OCR backend implementation.
//!
//! Uses Tesseract OCR via command-line for text extraction. The executable is
//! injected (`ocr.tesseract_cmd`) rather than discovered from install paths.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::backend::{OcrEngine, OcrError};
use super::model_utils::{check_command, TESSERACT_NOT_FOUND};
use super::render::PageImage;

/// Tesseract OCR backend.
#[derive(Debug, Clone)]
pub struct TesseractBackend {
    command: PathBuf,
}

impl TesseractBackend {
    /// Use `tesseract` from PATH.
    pub fn new() -> Self {
        Self {
            command: PathBuf::from("tesseract"),
        }
    }

    /// Use a specific executable (bare name or path).
    pub fn with_command(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &Path {
        &self.command
    }

    fn run_tesseract(&self, image_path: &Path, language: &str) -> Result<String, OcrError> {
        let output = Command::new(&self.command)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", language])
            .output();

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::OcrFailed(format!("tesseract failed: {}", stderr.trim())))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                OcrError::BackendNotAvailable(format!(
                    "{} ({})",
                    TESSERACT_NOT_FOUND,
                    self.command.display()
                )),
            ),
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for TesseractBackend {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        check_command(&self.command)
    }

    fn availability_hint(&self) -> String {
        format!(
            "Tesseract not found at '{}'. Install with: apt install tesseract-ocr, or set ocr.tesseract_cmd",
            self.command.display()
        )
    }

    fn recognize(&self, image: &PageImage, language: &str) -> Result<String, OcrError> {
        debug!(
            "Running {} on page {} ({})",
            self.command.display(),
            image.page(),
            language
        );
        self.run_tesseract(image.path(), language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_executable_is_backend_not_available() {
        let temp = TempDir::new().unwrap();
        let backend = TesseractBackend::with_command(temp.path().join("no-such-tesseract"));
        assert!(!backend.is_available());
        assert!(!backend.probe().is_available());

        let image = PageImage::new(1, temp.path().join("page.png"));
        let err = backend.recognize(&image, "vie+eng").unwrap_err();
        assert!(matches!(err, OcrError::BackendNotAvailable(_)));
    }

    #[test]
    fn test_availability_hint_names_command() {
        let backend = TesseractBackend::with_command("/opt/missing/tesseract");
        assert!(backend.availability_hint().contains("/opt/missing/tesseract"));
    }
}
