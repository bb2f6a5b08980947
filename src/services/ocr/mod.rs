//! OCR job: render each page of a range, recognize it, append it to the
//! output file.
//!
//! The runner is synchronous and meant for a blocking worker thread. It
//! reports through an [`EventSender`] and never touches the control surface.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::JobError;
use super::events::{EventSender, JobEvent};
use super::job::OcrJob;
use super::output::PageWriter;
use crate::ocr::{EngineStatus, OcrEngine, PdfRasterizer, DEFAULT_LANGUAGE, DEFAULT_ZOOM};

/// Runs OCR jobs against a rasterizer and an engine.
pub struct OcrJobRunner {
    rasterizer: Arc<dyn PdfRasterizer>,
    engine: Arc<dyn OcrEngine>,
    language: String,
    zoom: f32,
}

impl OcrJobRunner {
    pub fn new(rasterizer: Arc<dyn PdfRasterizer>, engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            rasterizer,
            engine,
            language: DEFAULT_LANGUAGE.to_string(),
            zoom: DEFAULT_ZOOM,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn engine(&self) -> &Arc<dyn OcrEngine> {
        &self.engine
    }

    /// Run a job and finish with exactly one terminal event.
    pub fn execute(&self, job: &OcrJob, events: &EventSender) {
        match self.run(job, events) {
            Ok(output) => {
                info!("OCR finished, results in {}", output.display());
                events.send(JobEvent::OcrDone { output });
            }
            Err(e) => {
                warn!("OCR job failed: {}", e);
                events.error(e.kind(), e.to_string());
            }
        }
    }

    /// Run a job, emitting progress and log events but no terminal event.
    ///
    /// Pages are written and flushed one at a time, so a failure on page N
    /// leaves pages before N in the output file.
    pub fn run(&self, job: &OcrJob, events: &EventSender) -> Result<PathBuf, JobError> {
        if let EngineStatus::Unavailable(hint) = self.engine.probe() {
            return Err(JobError::EngineUnavailable(hint));
        }

        let document = self.rasterizer.open(&job.document)?;
        let page_count = document.page_count();

        if job.pages.end() > page_count {
            events.warning(format!(
                "The PDF only has {} pages. The last page was adjusted to {}.",
                page_count, page_count
            ));
        }
        let pages = job
            .pages
            .clamp_to(page_count)
            .ok_or(JobError::EmptyRange {
                start: job.pages.start(),
                page_count,
            })?;

        let mut writer = PageWriter::open(&job.output, job.mode).map_err(|e| {
            JobError::io(
                format!("Cannot open output file {}", job.output.display()),
                e,
            )
        })?;

        let total = pages.count() as usize;
        debug!(
            "OCR {} pages {} with {} ({})",
            job.document.display(),
            pages,
            self.engine.name(),
            self.language
        );

        for (done, page) in pages.iter().enumerate() {
            events.progress(
                done,
                total,
                format!("Processing page {}/{}...", page, pages.end()),
            );

            let image = document.render(page, self.zoom)?;
            let text = self.engine.recognize(&image, &self.language)?;
            writer.write_page(page, &text).map_err(|e| {
                JobError::io(
                    format!("Cannot write page {} to {}", page, writer.path().display()),
                    e,
                )
            })?;

            debug!("Page {}: {} chars", page, text.len());
            events.log(format!("✓ OCR finished for page {}", page));
        }

        events.progress(total, total, "Done!");
        Ok(job.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{OcrError, PageImage, PdfDocument, RasterError};
    use crate::services::events::{event_channel, FailureKind};
    use crate::services::job::{OutputMode, PageRange};
    use crate::services::output::page_block;
    use std::path::Path;
    use tempfile::TempDir;

    struct FakeRasterizer {
        pages: u32,
    }

    struct FakeDocument {
        pages: u32,
    }

    impl PdfRasterizer for FakeRasterizer {
        fn open(&self, _path: &Path) -> Result<Box<dyn PdfDocument>, RasterError> {
            Ok(Box::new(FakeDocument { pages: self.pages }))
        }
    }

    impl PdfDocument for FakeDocument {
        fn page_count(&self) -> u32 {
            self.pages
        }

        fn render(&self, page: u32, _zoom: f32) -> Result<PageImage, RasterError> {
            Ok(PageImage::new(page, format!("page-{}.png", page)))
        }
    }

    struct EchoEngine {
        available: bool,
    }

    impl OcrEngine for EchoEngine {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn availability_hint(&self) -> String {
            "echo engine switched off".to_string()
        }

        fn recognize(&self, image: &PageImage, language: &str) -> Result<String, OcrError> {
            Ok(format!("page {} [{}]", image.page(), language))
        }
    }

    fn runner(pages: u32, available: bool) -> OcrJobRunner {
        OcrJobRunner::new(
            Arc::new(FakeRasterizer { pages }),
            Arc::new(EchoEngine { available }),
        )
    }

    fn job(output: PathBuf, start: u32, end: u32) -> OcrJob {
        OcrJob {
            document: PathBuf::from("book.pdf"),
            pages: PageRange::new(start, end).unwrap(),
            output,
            mode: OutputMode::Append,
        }
    }

    #[test]
    fn test_writes_pages_in_order() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.txt");
        let (tx, mut rx) = event_channel();

        runner(5, true).execute(&job(output.clone(), 2, 3), &tx);

        let expected = format!(
            "{}{}",
            page_block(2, "page 2 [vie+eng]"),
            page_block(3, "page 3 [vie+eng]")
        );
        assert_eq!(std::fs::read_to_string(&output).unwrap(), expected);

        let events = rx.drain();
        assert_eq!(
            events.last(),
            Some(&JobEvent::OcrDone {
                output: output.clone()
            })
        );
        assert!(events.contains(&JobEvent::Progress {
            current: 0,
            total: 2,
            message: "Processing page 2/3...".to_string()
        }));
        assert!(events.contains(&JobEvent::Progress {
            current: 2,
            total: 2,
            message: "Done!".to_string()
        }));
    }

    #[test]
    fn test_clamps_end_page_with_warning() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.txt");
        let (tx, mut rx) = event_channel();

        runner(2, true).execute(&job(output.clone(), 1, 9), &tx);

        let events = rx.drain();
        assert!(matches!(&events[0], JobEvent::Warning(msg) if msg.contains("2 pages")));
        let contents = std::fs::read_to_string(&output).unwrap();
        assert!(contents.contains("TRANG 2"));
        assert!(!contents.contains("TRANG 3"));
        assert!(matches!(events.last(), Some(JobEvent::OcrDone { .. })));
    }

    #[test]
    fn test_start_past_end_fails() {
        let temp = TempDir::new().unwrap();
        let (tx, mut rx) = event_channel();

        runner(2, true).execute(&job(temp.path().join("out.txt"), 4, 6), &tx);

        let events = rx.drain();
        assert!(matches!(
            events.last(),
            Some(JobEvent::Error { kind: FailureKind::Generic, message }) if message.contains("past the end")
        ));
    }

    #[test]
    fn test_unavailable_engine_fails_before_output() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.txt");
        let (tx, mut rx) = event_channel();

        runner(3, false).execute(&job(output.clone(), 1, 3), &tx);

        let events = rx.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            JobEvent::Error { kind: FailureKind::EngineUnavailable, .. }
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_language_and_zoom_overrides() {
        let r = runner(1, true).with_language("eng").with_zoom(3.0);
        assert_eq!(r.language(), "eng");
        assert_eq!(r.zoom, 3.0);
        assert_eq!(r.engine().name(), "echo");
    }
}
