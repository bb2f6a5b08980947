//! PDF opening and page rasterization via Poppler.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use thiserror::Error;
use tracing::debug;

use super::model_utils::{PDFINFO_NOT_FOUND, PDFTOPPM_NOT_FOUND};

/// Resolution Poppler renders at for a zoom factor of 1.0.
const BASE_DPI: f32 = 72.0;

/// Errors from opening or rendering a PDF.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Cannot open {path} as PDF: {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A rendered page on disk.
///
/// Images produced by [`PopplerRasterizer`] live in a private temp directory
/// that is removed when the image is dropped.
#[derive(Debug)]
pub struct PageImage {
    page: u32,
    path: PathBuf,
    _workdir: Option<TempDir>,
}

impl PageImage {
    /// Wrap an existing image file. The file is left in place on drop.
    pub fn new(page: u32, path: impl Into<PathBuf>) -> Self {
        Self {
            page,
            path: path.into(),
            _workdir: None,
        }
    }

    fn in_workdir(page: u32, path: PathBuf, workdir: TempDir) -> Self {
        Self {
            page,
            path,
            _workdir: Some(workdir),
        }
    }

    /// 1-based page number this image was rendered from.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Opens documents for rendering.
pub trait PdfRasterizer: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, RasterError>;
}

/// An opened document.
pub trait PdfDocument: Send {
    fn page_count(&self) -> u32;

    /// Render a 1-based page as an RGB image scaled by `zoom` on both axes.
    fn render(&self, page: u32, zoom: f32) -> Result<PageImage, RasterError>;
}

/// Rasterizer backed by the Poppler command-line tools.
#[derive(Debug, Default, Clone)]
pub struct PopplerRasterizer;

impl PopplerRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl PdfRasterizer for PopplerRasterizer {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, RasterError> {
        let output = match Command::new("pdfinfo").arg(path).output() {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RasterError::ToolNotFound(PDFINFO_NOT_FOUND.to_string()))
            }
            Err(e) => return Err(RasterError::Io(e)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RasterError::InvalidDocument {
                path: path.to_path_buf(),
                reason: stderr.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let page_count = parse_page_count(&stdout).ok_or_else(|| RasterError::InvalidDocument {
            path: path.to_path_buf(),
            reason: "pdfinfo reported no page count".to_string(),
        })?;

        debug!("Opened {} ({} pages)", path.display(), page_count);
        Ok(Box::new(PopplerDocument {
            path: path.to_path_buf(),
            page_count,
        }))
    }
}

struct PopplerDocument {
    path: PathBuf,
    page_count: u32,
}

impl PdfDocument for PopplerDocument {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn render(&self, page: u32, zoom: f32) -> Result<PageImage, RasterError> {
        let workdir = TempDir::new()?;
        let output_prefix = workdir.path().join("page");
        let page_str = page.to_string();
        let dpi = zoom_to_dpi(zoom).to_string();

        let output = Command::new("pdftoppm")
            .args(["-png", "-singlefile", "-r", &dpi, "-f", &page_str, "-l", &page_str])
            .arg(&self.path)
            .arg(&output_prefix)
            .output();

        match output {
            Ok(output) if output.status.success() => {}
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(RasterError::RenderFailed(format!(
                    "pdftoppm failed on page {}: {}",
                    page,
                    stderr.trim()
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RasterError::ToolNotFound(PDFTOPPM_NOT_FOUND.to_string()))
            }
            Err(e) => return Err(RasterError::Io(e)),
        }

        let image_path = output_prefix.with_extension("png");
        if !image_path.exists() {
            return Err(RasterError::RenderFailed(format!(
                "No image generated for page {}",
                page
            )));
        }

        Ok(PageImage::in_workdir(page, image_path, workdir))
    }
}

/// Extract the page count from `pdfinfo` output.
pub fn parse_page_count(pdfinfo_output: &str) -> Option<u32> {
    pdfinfo_output
        .lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|rest| rest.trim().parse().ok())
}

/// Convert a zoom factor to the DPI Poppler should render at.
pub fn zoom_to_dpi(zoom: f32) -> u32 {
    (BASE_DPI * zoom).round().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_count() {
        let info = "Title:          Scan\nProducer:       scanner\nPages:          12\nEncrypted:      no\n";
        assert_eq!(parse_page_count(info), Some(12));
    }

    #[test]
    fn test_parse_page_count_missing() {
        assert_eq!(parse_page_count("Title: nothing here\n"), None);
        assert_eq!(parse_page_count("Pages: many\n"), None);
    }

    #[test]
    fn test_zoom_to_dpi() {
        assert_eq!(zoom_to_dpi(1.0), 72);
        assert_eq!(zoom_to_dpi(2.0), 144);
        assert_eq!(zoom_to_dpi(0.0), 1);
    }

    #[test]
    fn test_page_image_keeps_external_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("scan.png");
        std::fs::write(&path, b"fake png").unwrap();

        let image = PageImage::new(3, &path);
        assert_eq!(image.page(), 3);
        drop(image);
        assert!(path.exists());
    }

    #[test]
    fn test_page_image_workdir_removed_on_drop() {
        let workdir = TempDir::new().unwrap();
        let dir_path = workdir.path().to_path_buf();
        let path = dir_path.join("page.png");
        std::fs::write(&path, b"fake png").unwrap();

        let image = PageImage::in_workdir(1, path, workdir);
        assert!(image.path().exists());
        drop(image);
        assert!(!dir_path.exists());
    }
}
