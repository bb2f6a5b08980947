use thiserror::Error;

use super::events::FailureKind;
use super::job::{InputError, JobKind};
use crate::llm::LlmError;
use crate::ocr::{OcrError, RasterError};

/// Reasons a job cannot start.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartError {
    #[error(transparent)]
    Invalid(#[from] InputError),

    #[error("Another {0} job is still running")]
    Busy(JobKind),
}

/// Errors that end a running job.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Tesseract OCR not found. Make sure it is installed and the path is correct ({0})")]
    EngineUnavailable(String),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error("OCR failed: {0}")]
    Ocr(OcrError),

    #[error("Correction failed: {0}")]
    Llm(#[from] LlmError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Start page {start} is past the end of the document ({page_count} pages)")]
    EmptyRange { start: u32, page_count: u32 },

    #[error("Worker stopped without reporting a result")]
    WorkerLost,
}

impl JobError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        JobError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            JobError::EngineUnavailable(_) => FailureKind::EngineUnavailable,
            _ => FailureKind::Generic,
        }
    }
}

impl From<OcrError> for JobError {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::BackendNotAvailable(hint) => JobError::EngineUnavailable(hint),
            other => JobError::Ocr(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_engine_maps_to_engine_unavailable() {
        let err: JobError = OcrError::BackendNotAvailable("install tesseract".into()).into();
        assert_eq!(err.kind(), FailureKind::EngineUnavailable);
        assert!(err.to_string().contains("Tesseract OCR not found"));

        let err: JobError = OcrError::OcrFailed("bad image".into()).into();
        assert_eq!(err.kind(), FailureKind::Generic);
    }

    #[test]
    fn test_io_error_message_has_context() {
        let err = JobError::io(
            "Cannot open output file out.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "Cannot open output file out.txt: denied");
        assert_eq!(err.kind(), FailureKind::Generic);
    }

    #[test]
    fn test_start_error_display() {
        assert_eq!(
            StartError::from(InputError::MissingApiKey).to_string(),
            "Please enter an API key"
        );
        assert_eq!(
            StartError::Busy(JobKind::Ocr).to_string(),
            "Another ocr job is still running"
        );
    }
}
