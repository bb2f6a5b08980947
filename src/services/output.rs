//! Output files: the paginated OCR transcript and the corrected copy.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::job::OutputMode;

/// Width of the `=` rule around each page header.
pub const RULE_WIDTH: usize = 50;

/// Word that precedes the page number in each header.
pub const PAGE_LABEL: &str = "TRANG";

/// Format one page as it appears in the output file.
pub fn page_block(page: u32, text: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!("\n{rule}\n{PAGE_LABEL} {page}\n{rule}\n{text}\n")
}

/// Writes page blocks to the OCR output file.
pub struct PageWriter {
    file: File,
    path: PathBuf,
}

impl PageWriter {
    /// Open `path` for writing, creating it if needed.
    pub fn open(path: &Path, mode: OutputMode) -> io::Result<Self> {
        let mut options = OpenOptions::new();
        options.create(true);
        match mode {
            OutputMode::Append => options.append(true),
            OutputMode::Truncate => options.write(true).truncate(true),
        };
        let file = options.open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Append one page and flush it to disk.
    pub fn write_page(&mut self, page: u32, text: &str) -> io::Result<()> {
        self.file.write_all(page_block(page, text).as_bytes())?;
        self.file.flush()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Sibling path for the corrected copy: `name.ext` becomes `name_corrected.ext`.
pub fn corrected_path(input: &Path) -> PathBuf {
    let mut name = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    name.push("_corrected");
    if let Some(ext) = input.extension() {
        name.push(".");
        name.push(ext);
    }
    input.with_file_name(name)
}

/// Replace `path` with `contents` in one step.
///
/// Data goes to a temp file in the same directory which is then renamed over
/// the target, so readers never see a partial file.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(contents.as_bytes())?;
    temp.flush()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
