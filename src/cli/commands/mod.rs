//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod config_cmd;
mod correct;
mod helpers;
mod ocr;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "pdfocr")]
#[command(about = "OCR scanned PDFs and fix spelling with a language model")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// OCR a page range of a PDF into a paginated text file
    Ocr {
        /// PDF to read
        pdf: PathBuf,
        /// Output text file (default: ocr.default_output or ./output.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// First page to process (1-based)
        #[arg(long, default_value = "1")]
        from: String,
        /// Last page to process (default: last page of the PDF)
        #[arg(long)]
        to: Option<String>,
        /// Empty the output file first instead of appending
        #[arg(long)]
        truncate: bool,
        /// Run spelling correction on the output afterwards
        #[arg(long)]
        correct: bool,
        #[command(flatten)]
        correction: CorrectionArgs,
    },

    /// Correct OCR spelling errors in a text file with a language model
    Correct {
        /// Text file to correct (default: ocr.default_output or ./output.txt)
        input: Option<PathBuf>,
        #[command(flatten)]
        correction: CorrectionArgs,
    },

    /// Check that pdfinfo, pdftoppm and tesseract are installed
    Check,

    /// Print the effective configuration (API key redacted)
    Config,
}

/// Options shared by commands that run a correction job.
#[derive(Args, Debug, Clone, Default)]
pub struct CorrectionArgs {
    /// API key for the language model
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Words per correction request (default: correction.chunk_size)
    #[arg(long)]
    pub chunk_size: Option<String>,

    /// Keep line breaks inside chunks
    #[arg(long)]
    pub preserve_layout: bool,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Ocr {
            pdf,
            output,
            from,
            to,
            truncate,
            correct,
            correction,
        } => {
            ocr::cmd_ocr(
                &config,
                ocr::OcrArgs {
                    pdf,
                    output,
                    from,
                    to,
                    truncate,
                    correct,
                    correction,
                },
            )
            .await
        }
        Commands::Correct { input, correction } => {
            correct::cmd_correct(&config, input, &correction).await
        }
        Commands::Check => check::cmd_check(&config).await,
        Commands::Config => config_cmd::cmd_config_show(&config).await,
    }
}
