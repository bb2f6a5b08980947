//! Configuration management for pdfocr using the prefer crate.
//!
//! `prefer` discovers the config file (`pdfocr.toml`, `pdfocr.yaml`, ...);
//! the file is then parsed with serde by extension. Environment variables
//! override file values, and CLI flags override both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm::LlmConfig;
use crate::ocr::{TesseractBackend, DEFAULT_LANGUAGE, DEFAULT_ZOOM};
use crate::services::{ChunkMode, OutputMode};

/// Default OCR output path, relative to the working directory.
pub const DEFAULT_OUTPUT_FILE: &str = "output.txt";

/// Default number of words per correction request.
pub const DEFAULT_CHUNK_SIZE: usize = 4000;

/// OCR settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrSettings {
    /// Tesseract language spec (e.g. "vie+eng")
    #[serde(default = "default_language")]
    pub language: String,
    /// Render scale; 1.0 is 72 dpi
    #[serde(default = "default_zoom")]
    pub zoom: f32,
    /// Path to the tesseract executable (PATH lookup when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tesseract_cmd: Option<String>,
    /// Truncate the output file at job start instead of appending
    #[serde(default)]
    pub truncate_output: bool,
    /// Output file used when none is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_output: Option<String>,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_zoom() -> f32 {
    DEFAULT_ZOOM
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: default_language(),
            zoom: default_zoom(),
            tesseract_cmd: None,
            truncate_output: false,
            default_output: None,
        }
    }
}

/// Correction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionSettings {
    /// Words per request
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Keep line breaks inside chunks
    #[serde(default)]
    pub preserve_layout: bool,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for CorrectionSettings {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            preserve_layout: false,
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ocr: OcrSettings,
    #[serde(default)]
    pub correction: CorrectionSettings,
    #[serde(default)]
    pub llm: LlmConfig,
    /// How often the controller drains job events
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Path to the loaded config file (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

fn default_poll_interval_ms() -> u64 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ocr: OcrSettings::default(),
            correction: CorrectionSettings::default(),
            llm: LlmConfig::default(),
            poll_interval_ms: default_poll_interval_ms(),
            source_path: None,
        }
    }
}

impl Config {
    /// Load configuration from `explicit`, or from the discovered file.
    ///
    /// Discovery failures fall back to defaults; an explicit path that cannot
    /// be read or parsed is an error.
    pub async fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config = match explicit {
            Some(path) => Self::load_from_path(path).await?,
            None => Self::discover().await,
        };
        Ok(config.with_env_overrides())
    }

    async fn discover() -> Self {
        // Use prefer for file discovery, then parse with serde
        match prefer::load("pdfocr").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            warn!("Ignoring config file: {:#}", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(e) => {
                debug!("No config file found: {}", e);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file path.
    pub async fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config = Self::parse(&contents, ext)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.source_path = Some(path.to_path_buf());
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse config text in the format named by `ext`.
    pub fn parse(contents: &str, ext: &str) -> anyhow::Result<Self> {
        let config = match ext {
            "toml" => toml::from_str(contents).context("invalid TOML")?,
            "yaml" | "yml" => serde_yaml::from_str(contents).context("invalid YAML")?,
            _ => serde_json::from_str(contents).context("invalid JSON")?,
        };
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Besides the `LLM_*` variables handled by [`LlmConfig`]:
    /// - `OCR_LANGUAGE`: Tesseract language spec
    /// - `TESSERACT_CMD`: path to the tesseract executable
    pub fn with_env_overrides(mut self) -> Self {
        self.llm = self.llm.with_env_overrides();
        if let Ok(val) = std::env::var("OCR_LANGUAGE") {
            if !val.trim().is_empty() {
                self.ocr.language = val;
            }
        }
        if let Ok(val) = std::env::var("TESSERACT_CMD") {
            if !val.trim().is_empty() {
                self.ocr.tesseract_cmd = Some(val);
            }
        }
        self
    }

    /// Directory relative paths in the config resolve against: the config
    /// file's directory, else the working directory.
    pub fn base_dir(&self) -> PathBuf {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent())
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are joined onto [`Config::base_dir`]
    pub fn resolve_path(&self, path_str: &str) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir().join(path)
        }
    }

    /// OCR output path used when the CLI gets none.
    pub fn default_output(&self) -> PathBuf {
        match &self.ocr.default_output {
            Some(path) => self.resolve_path(path),
            None => PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }

    /// Tesseract backend for the configured command.
    pub fn tesseract(&self) -> TesseractBackend {
        match &self.ocr.tesseract_cmd {
            Some(cmd) if cmd.contains(std::path::MAIN_SEPARATOR) || cmd.starts_with('~') => {
                TesseractBackend::with_command(self.resolve_path(cmd))
            }
            Some(cmd) => TesseractBackend::with_command(cmd),
            None => TesseractBackend::new(),
        }
    }

    pub fn output_mode(&self) -> OutputMode {
        if self.ocr.truncate_output {
            OutputMode::Truncate
        } else {
            OutputMode::Append
        }
    }

    pub fn chunk_mode(&self) -> ChunkMode {
        if self.correction.preserve_layout {
            ChunkMode::PreserveLayout
        } else {
            ChunkMode::Words
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Copy safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.llm = copy.llm.redacted();
        copy
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
