//! Page rendering and OCR.
//!
//! Both collaborators are external programs reached through narrow traits:
//! - Poppler (`pdfinfo`, `pdftoppm`) opens a PDF and rasterizes single pages
//! - Tesseract recognizes text in a rendered page image
//!
//! The job runners only see [`PdfRasterizer`] and [`OcrEngine`], so tests and
//! alternative engines can be injected without touching the pipeline.

mod backend;
mod model_utils;
mod render;
mod tesseract;

pub use backend::{EngineStatus, OcrEngine, OcrError};
pub use model_utils::tool_status;
pub use render::{
    parse_page_count, zoom_to_dpi, PageImage, PdfDocument, PdfRasterizer, PopplerRasterizer,
    RasterError,
};
pub use tesseract::TesseractBackend;

/// Language hint passed to the OCR engine: Vietnamese plus English.
pub const DEFAULT_LANGUAGE: &str = "vie+eng";

/// Zoom factor applied on both axes when rasterizing a page.
pub const DEFAULT_ZOOM: f32 = 2.0;
