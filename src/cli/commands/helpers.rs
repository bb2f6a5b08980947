//! Shared helpers for job commands.

use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::TerminalSurface;
use crate::config::Config;
use crate::ocr::{OcrEngine, PdfRasterizer};
use crate::services::{
    CorrectionForm, CorrectionJobRunner, JobController, JobState, OcrJobRunner,
};

use super::CorrectionArgs;

/// Build a controller wired to the terminal and the configured backends.
pub fn build_controller(
    config: &Config,
    rasterizer: Arc<dyn PdfRasterizer>,
    engine: Arc<dyn OcrEngine>,
) -> JobController<TerminalSurface> {
    let ocr_runner = OcrJobRunner::new(rasterizer, engine)
        .with_language(&config.ocr.language)
        .with_zoom(config.ocr.zoom);
    let correction_runner = CorrectionJobRunner::new(Arc::new(config.llm.clone()))
        .with_prompt_template(config.llm.get_correction_prompt());

    JobController::new(
        TerminalSurface::new(),
        Arc::new(ocr_runner),
        Arc::new(correction_runner),
    )
    .with_poll_interval(config.poll_interval())
}

/// Fill a correction form from flags, falling back to config values.
pub fn correction_form(config: &Config, args: &CorrectionArgs, input: PathBuf) -> CorrectionForm {
    CorrectionForm {
        api_key: args
            .api_key
            .clone()
            .or_else(|| config.llm.api_key.clone())
            .unwrap_or_default(),
        input,
        chunk_size: args
            .chunk_size
            .clone()
            .unwrap_or_else(|| config.correction.chunk_size.to_string()),
        preserve_layout: args.preserve_layout || config.correction.preserve_layout,
    }
}

/// Turn a settled job state into the command's exit status.
pub fn ensure_succeeded(state: JobState) -> anyhow::Result<()> {
    match state {
        JobState::Succeeded(_) => Ok(()),
        JobState::Failed(kind) => anyhow::bail!("The {} job failed", kind),
        other => anyhow::bail!("Job did not finish (state: {:?})", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::JobKind;

    #[test]
    fn test_correction_form_prefers_flags() {
        let mut config = Config::default();
        config.llm = config.llm.with_api_key("from-config");
        config.correction.chunk_size = 123;

        let form = correction_form(&config, &CorrectionArgs::default(), "in.txt".into());
        assert_eq!(form.api_key, "from-config");
        assert_eq!(form.chunk_size, "123");
        assert!(!form.preserve_layout);

        let args = CorrectionArgs {
            api_key: Some("from-flag".to_string()),
            chunk_size: Some("9".to_string()),
            preserve_layout: true,
        };
        let form = correction_form(&config, &args, "in.txt".into());
        assert_eq!(form.api_key, "from-flag");
        assert_eq!(form.chunk_size, "9");
        assert!(form.preserve_layout);
    }

    #[test]
    fn test_ensure_succeeded() {
        assert!(ensure_succeeded(JobState::Succeeded(JobKind::Ocr)).is_ok());
        assert!(ensure_succeeded(JobState::Failed(JobKind::Correction)).is_err());
        assert!(ensure_succeeded(JobState::Ready).is_err());
    }
}
