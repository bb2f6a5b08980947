//! OCR engine abstraction.

use thiserror::Error;

use super::render::PageImage;

/// Errors from OCR engines.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The engine executable (or model) cannot be located.
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of probing an engine before a job starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    Available,
    /// Carries the hint explaining what is missing.
    Unavailable(String),
}

impl EngineStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, EngineStatus::Available)
    }
}

/// Trait for OCR engines.
pub trait OcrEngine: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &'static str;

    /// Check if this engine can run (executable present).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this engine available.
    fn availability_hint(&self) -> String;

    /// Recognize the text on a rendered page.
    fn recognize(&self, image: &PageImage, language: &str) -> Result<String, OcrError>;

    /// Probe availability as a structured status.
    fn probe(&self) -> EngineStatus {
        if self.is_available() {
            EngineStatus::Available
        } else {
            EngineStatus::Unavailable(self.availability_hint())
        }
    }
}
