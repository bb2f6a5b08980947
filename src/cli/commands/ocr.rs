//! OCR command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use console::style;

use super::helpers::{build_controller, correction_form, ensure_succeeded};
use super::CorrectionArgs;
use crate::cli::icons;
use crate::config::Config;
use crate::ocr::{OcrEngine, PdfRasterizer, PopplerRasterizer};
use crate::services::OcrForm;

pub struct OcrArgs {
    pub pdf: PathBuf,
    pub output: Option<PathBuf>,
    pub from: String,
    pub to: Option<String>,
    pub truncate: bool,
    pub correct: bool,
    pub correction: CorrectionArgs,
}

/// OCR a page range, optionally followed by spelling correction.
pub async fn cmd_ocr(config: &Config, args: OcrArgs) -> anyhow::Result<()> {
    let engine = Arc::new(config.tesseract());
    if !engine.is_available() {
        eprintln!(
            "{} {}",
            icons::warn(),
            style(engine.availability_hint()).yellow()
        );
    }
    let rasterizer = Arc::new(PopplerRasterizer::new());

    // Without --to, run to the last page like a fresh file selection does.
    let end_page = match args.to {
        Some(to) => to,
        None => {
            let document = rasterizer
                .open(&args.pdf)
                .with_context(|| format!("Failed to open {}", args.pdf.display()))?;
            let pages = document.page_count();
            println!(
                "{} Selected {} ({} pages)",
                icons::info(),
                style(args.pdf.display()).cyan(),
                pages
            );
            pages.to_string()
        }
    };
    let output = args.output.unwrap_or_else(|| config.default_output());

    let mut controller = build_controller(config, rasterizer, engine);
    controller.start_ocr(&OcrForm {
        document: args.pdf,
        start_page: args.from,
        end_page,
        output: output.clone(),
        truncate: args.truncate || config.ocr.truncate_output,
    })?;
    ensure_succeeded(controller.run_until_settled().await)?;

    if args.correct {
        if !controller.correction_enabled() {
            anyhow::bail!("Spelling correction is not available for {}", output.display());
        }
        let form = correction_form(config, &args.correction, output);
        controller.start_correction(&form)?;
        ensure_succeeded(controller.run_until_settled().await)?;
    }

    Ok(())
}
