//! Correction command.

use std::path::PathBuf;
use std::sync::Arc;

use super::helpers::{build_controller, correction_form, ensure_succeeded};
use super::CorrectionArgs;
use crate::config::Config;
use crate::ocr::PopplerRasterizer;

/// Correct an existing OCR transcript.
pub async fn cmd_correct(
    config: &Config,
    input: Option<PathBuf>,
    args: &CorrectionArgs,
) -> anyhow::Result<()> {
    let input = input.unwrap_or_else(|| config.default_output());

    let mut controller = build_controller(
        config,
        Arc::new(PopplerRasterizer::new()),
        Arc::new(config.tesseract()),
    );
    controller.start_correction(&correction_form(config, args, input))?;
    ensure_succeeded(controller.run_until_settled().await)
}
