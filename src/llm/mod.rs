//! Language-model integration for OCR spelling correction.

mod client;

pub use client::{
    build_correction_prompt, GeneratorFactory, LlmClient, LlmConfig, LlmError, LlmProvider,
    TextGenerator, DEFAULT_CORRECTION_PROMPT,
};
