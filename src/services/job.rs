//! Job definitions, input forms and their validation.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use thiserror::Error;

use super::chunker::ChunkMode;

/// Which pipeline a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Ocr,
    Correction,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Ocr => "ocr",
            JobKind::Correction => "correction",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Controller lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Ready,
    Running(JobKind),
    Succeeded(JobKind),
    Failed(JobKind),
}

impl JobState {
    pub fn is_running(&self) -> bool {
        matches!(self, JobState::Running(_))
    }

    pub fn kind(&self) -> Option<JobKind> {
        match self {
            JobState::Ready => None,
            JobState::Running(kind) | JobState::Succeeded(kind) | JobState::Failed(kind) => {
                Some(*kind)
            }
        }
    }
}

/// Input rejected before any job is created.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Please choose a PDF file")]
    MissingDocument,

    #[error("Please choose an output file")]
    MissingOutput,

    #[error("Page numbers must be integers (got '{0}')")]
    NotANumber(String),

    #[error("Invalid page range {start}-{end}")]
    InvalidRange { start: i64, end: i64 },

    #[error("Please enter an API key")]
    MissingApiKey,

    #[error("OCR output file does not exist: {0}. Run OCR first")]
    InputNotFound(PathBuf),

    #[error("Chunk size must be a positive integer (got '{0}')")]
    InvalidChunkSize(String),
}

/// 1-based inclusive page range with `1 <= start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    start: u32,
    end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Result<Self, InputError> {
        if start < 1 || end < start {
            return Err(InputError::InvalidRange {
                start: start.into(),
                end: end.into(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse page bounds typed by a user.
    pub fn parse(start: &str, end: &str) -> Result<Self, InputError> {
        let start = parse_page(start)?;
        let end = parse_page(end)?;
        if start < 1 || end < start || end > i64::from(u32::MAX) {
            return Err(InputError::InvalidRange { start, end });
        }
        // Bounds were checked above.
        Ok(Self {
            start: start as u32,
            end: end as u32,
        })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of pages in the range.
    pub fn count(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Limit the range to a document's page count.
    ///
    /// Returns `None` when no page of the range exists in the document.
    pub fn clamp_to(&self, page_count: u32) -> Option<PageRange> {
        let end = self.end.min(page_count);
        (self.start <= end).then_some(PageRange {
            start: self.start,
            end,
        })
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

fn parse_page(value: &str) -> Result<i64, InputError> {
    value
        .trim()
        .parse()
        .map_err(|_| InputError::NotANumber(value.trim().to_string()))
}

/// How the OCR output file is opened at job start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Keep existing content; new pages go after it.
    #[default]
    Append,
    /// Start from an empty file.
    Truncate,
}

/// A validated OCR job.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrJob {
    pub document: PathBuf,
    pub pages: PageRange,
    pub output: PathBuf,
    pub mode: OutputMode,
}

/// A validated correction job.
#[derive(Clone, PartialEq)]
pub struct CorrectionJob {
    pub api_key: String,
    pub input: PathBuf,
    pub chunk_size: NonZeroUsize,
    pub mode: ChunkMode,
}

impl fmt::Debug for CorrectionJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrectionJob")
            .field("api_key", &"********")
            .field("input", &self.input)
            .field("chunk_size", &self.chunk_size)
            .field("mode", &self.mode)
            .finish()
    }
}

/// Raw OCR input as entered on the control surface.
#[derive(Debug, Clone, Default)]
pub struct OcrForm {
    pub document: PathBuf,
    pub start_page: String,
    pub end_page: String,
    pub output: PathBuf,
    pub truncate: bool,
}

impl OcrForm {
    pub fn validate(&self) -> Result<OcrJob, InputError> {
        if self.document.as_os_str().is_empty() {
            return Err(InputError::MissingDocument);
        }
        let pages = PageRange::parse(&self.start_page, &self.end_page)?;
        if self.output.as_os_str().is_empty() {
            return Err(InputError::MissingOutput);
        }

        Ok(OcrJob {
            document: self.document.clone(),
            pages,
            output: self.output.clone(),
            mode: if self.truncate {
                OutputMode::Truncate
            } else {
                OutputMode::Append
            },
        })
    }
}

/// Raw correction input as entered on the control surface.
#[derive(Clone, Default)]
pub struct CorrectionForm {
    pub api_key: String,
    pub input: PathBuf,
    pub chunk_size: String,
    pub preserve_layout: bool,
}

impl fmt::Debug for CorrectionForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrectionForm")
            .field("input", &self.input)
            .field("chunk_size", &self.chunk_size)
            .field("preserve_layout", &self.preserve_layout)
            .finish_non_exhaustive()
    }
}

impl CorrectionForm {
    pub fn validate(&self, require_api_key: bool) -> Result<CorrectionJob, InputError> {
        if require_api_key && self.api_key.trim().is_empty() {
            return Err(InputError::MissingApiKey);
        }
        if !self.input.is_file() {
            return Err(InputError::InputNotFound(self.input.clone()));
        }
        let chunk_size = self
            .chunk_size
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| InputError::InvalidChunkSize(self.chunk_size.trim().to_string()))?;

        Ok(CorrectionJob {
            api_key: self.api_key.trim().to_string(),
            input: self.input.clone(),
            chunk_size,
            mode: if self.preserve_layout {
                ChunkMode::PreserveLayout
            } else {
                ChunkMode::Words
            },
        })
    }
}
