//! Shared helpers for the external OCR and PDF tools.

use std::path::Path;

pub(super) const PDFTOPPM_NOT_FOUND: &str = "pdftoppm not found (install poppler-utils)";
pub(super) const PDFINFO_NOT_FOUND: &str = "pdfinfo not found (install poppler-utils)";
pub(super) const TESSERACT_NOT_FOUND: &str = "tesseract not found (install tesseract-ocr)";

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Check a configured command, which may be a bare program name or a path.
pub(super) fn check_command(command: &Path) -> bool {
    if command.components().count() > 1 {
        command.is_file()
    } else {
        which::which(command).is_ok()
    }
}

/// Availability of every external tool the pipeline shells out to.
pub fn tool_status() -> Vec<(&'static str, bool)> {
    ["pdfinfo", "pdftoppm", "tesseract"]
        .into_iter()
        .map(|tool| (tool, check_binary(tool)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_check_binary_missing() {
        assert!(!check_binary("pdfocr-definitely-not-a-real-binary"));
    }

    #[test]
    fn test_check_command_with_path() {
        let temp = TempDir::new().unwrap();
        let fake = temp.path().join("tesseract");
        assert!(!check_command(&fake));

        std::fs::write(&fake, b"#!/bin/sh\n").unwrap();
        assert!(check_command(&fake));
    }

    #[test]
    fn test_tool_status_lists_all_tools() {
        let names: Vec<_> = tool_status().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["pdfinfo", "pdftoppm", "tesseract"]);
    }
}
