//! Correction job: chunk an OCR transcript, send each chunk to the language
//! model, write the concatenated answers next to the input.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::chunker::TextChunker;
use super::error::JobError;
use super::events::{EventSender, JobEvent};
use super::job::CorrectionJob;
use super::output::{corrected_path, write_atomic};
use crate::llm::{build_correction_prompt, GeneratorFactory, DEFAULT_CORRECTION_PROMPT};

/// Runs correction jobs against a generator factory.
pub struct CorrectionJobRunner {
    generators: Arc<dyn GeneratorFactory>,
    prompt_template: String,
}

impl CorrectionJobRunner {
    pub fn new(generators: Arc<dyn GeneratorFactory>) -> Self {
        Self {
            generators,
            prompt_template: DEFAULT_CORRECTION_PROMPT.to_string(),
        }
    }

    /// Use a custom prompt; `{content}` marks where the chunk goes.
    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }

    pub fn requires_api_key(&self) -> bool {
        self.generators.requires_api_key()
    }

    /// Run a job and finish with exactly one terminal event.
    pub async fn execute(&self, job: &CorrectionJob, events: &EventSender) {
        match self.run(job, events).await {
            Ok(output) => {
                info!("Correction finished, results in {}", output.display());
                events.send(JobEvent::CorrectionDone { output });
            }
            Err(e) => {
                warn!("Correction job failed: {}", e);
                events.error(e.kind(), e.to_string());
            }
        }
    }

    /// Run a job, emitting progress and log events but no terminal event.
    ///
    /// Nothing is written unless every chunk succeeds.
    pub async fn run(&self, job: &CorrectionJob, events: &EventSender) -> Result<PathBuf, JobError> {
        let generator = self.generators.connect(&job.api_key)?;

        let text = tokio::fs::read_to_string(&job.input)
            .await
            .map_err(|e| JobError::io(format!("Cannot read {}", job.input.display()), e))?;

        let chunks = TextChunker::new(job.chunk_size)
            .with_mode(job.mode)
            .split(&text);
        let total = chunks.len();
        events.log(format!("Split the text into {} chunks for correction.", total));
        debug!(
            "{} words, chunk size {}, model {}",
            chunks.word_count(),
            job.chunk_size,
            generator.model()
        );

        let mut corrected = Vec::with_capacity(total);
        for chunk in chunks.iter() {
            let number = chunk.index + 1;
            events.progress(
                chunk.index,
                total,
                format!("Correcting chunk {}/{}...", number, total),
            );

            let prompt = build_correction_prompt(&self.prompt_template, &chunk.text);
            corrected.push(generator.generate(&prompt).await?);

            events.log(format!("✓ Corrected chunk {}/{}", number, total));
        }

        let output = corrected_path(&job.input);
        write_atomic(&output, &corrected.concat())
            .map_err(|e| JobError::io(format!("Cannot write {}", output.display()), e))?;

        events.progress(total, total, "Done!");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, TextGenerator};
    use crate::services::chunker::ChunkMode;
    use crate::services::events::{event_channel, FailureKind};
    use async_trait::async_trait;
    use std::num::NonZeroUsize;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Upper-cases prompts and records them.
    #[derive(Default)]
    struct ShoutingModel {
        prompts: Mutex<Vec<String>>,
        fail_on_call: Option<usize>,
    }

    #[async_trait]
    impl TextGenerator for ShoutingModel {
        fn model(&self) -> &str {
            "shouting"
        }

        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            let mut prompts = self.prompts.lock().unwrap();
            if self.fail_on_call == Some(prompts.len()) {
                return Err(LlmError::Api("quota exceeded".to_string()));
            }
            prompts.push(prompt.to_string());
            Ok(format!("[{}]", prompt.to_uppercase()))
        }
    }

    struct Factory(Arc<ShoutingModel>);

    impl GeneratorFactory for Factory {
        fn connect(&self, api_key: &str) -> Result<Arc<dyn TextGenerator>, LlmError> {
            if api_key.is_empty() {
                return Err(LlmError::MissingApiKey("test"));
            }
            Ok(self.0.clone())
        }
    }

    fn runner(model: Arc<ShoutingModel>) -> CorrectionJobRunner {
        CorrectionJobRunner::new(Arc::new(Factory(model))).with_prompt_template("{content}")
    }

    fn job(input: PathBuf, chunk_size: usize) -> CorrectionJob {
        CorrectionJob {
            api_key: "key".to_string(),
            input,
            chunk_size: NonZeroUsize::new(chunk_size).unwrap(),
            mode: ChunkMode::Words,
        }
    }

    #[tokio::test]
    async fn test_chunks_are_corrected_in_order() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("output.txt");
        std::fs::write(&input, "a b c\nd e").unwrap();
        let model = Arc::new(ShoutingModel::default());
        let (tx, mut rx) = event_channel();

        runner(model.clone()).execute(&job(input, 2), &tx).await;

        let output = temp.path().join("output_corrected.txt");
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "[A B][C D][E]");
        assert_eq!(*model.prompts.lock().unwrap(), vec!["a b", "c d", "e"]);

        let events = rx.drain();
        assert_eq!(
            events[0],
            JobEvent::Log("Split the text into 3 chunks for correction.".to_string())
        );
        assert!(events.contains(&JobEvent::Log("✓ Corrected chunk 3/3".to_string())));
        assert_eq!(events.last(), Some(&JobEvent::CorrectionDone { output }));
    }

    #[tokio::test]
    async fn test_failure_leaves_no_output() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("output.txt");
        std::fs::write(&input, "a b c d e").unwrap();
        let model = Arc::new(ShoutingModel {
            fail_on_call: Some(1),
            ..Default::default()
        });
        let (tx, mut rx) = event_channel();

        runner(model).execute(&job(input, 2), &tx).await;

        assert!(!temp.path().join("output_corrected.txt").exists());
        let events = rx.drain();
        assert!(matches!(
            events.last(),
            Some(JobEvent::Error { kind: FailureKind::Generic, message }) if message.contains("quota exceeded")
        ));
    }

    #[tokio::test]
    async fn test_empty_input_writes_empty_file() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("blank.txt");
        std::fs::write(&input, "  \n ").unwrap();
        let model = Arc::new(ShoutingModel::default());
        let (tx, _rx) = event_channel();

        let output = runner(model.clone()).run(&job(input, 10), &tx).await.unwrap();

        assert_eq!(std::fs::read_to_string(output).unwrap(), "");
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_is_reported() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("output.txt");
        std::fs::write(&input, "text").unwrap();
        let (tx, _rx) = event_channel();
        let mut job = job(input, 10);
        job.api_key.clear();

        let err = runner(Arc::new(ShoutingModel::default()))
            .run(&job, &tx)
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::Llm(LlmError::MissingApiKey(_))));
    }
}
