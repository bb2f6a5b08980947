//! Service layer: OCR and correction jobs plus the controller that runs them.
//!
//! This module contains job logic separated from UI concerns. Workers report
//! through an event channel; only the controller touches the control surface.

pub mod chunker;
pub mod controller;
pub mod correction;
pub mod error;
pub mod events;
pub mod job;
pub mod ocr;
pub mod output;

pub use chunker::{Chunk, ChunkMode, ChunkedText, TextChunker};
pub use controller::{ControlSurface, Controls, JobController, DEFAULT_POLL_INTERVAL};
pub use correction::CorrectionJobRunner;
pub use error::{JobError, StartError};
pub use events::{event_channel, EventReceiver, EventSender, FailureKind, JobEvent};
pub use job::{
    CorrectionForm, CorrectionJob, InputError, JobKind, JobState, OcrForm, OcrJob, OutputMode,
    PageRange,
};
pub use ocr::OcrJobRunner;
pub use output::{corrected_path, page_block, PageWriter};
