//! pdfocr - scanned-PDF OCR with language-model spelling correction.
//!
//! Renders a page range of a PDF, runs Tesseract over each page and appends
//! the text to a paginated output file. The output can then be sent through a
//! language model in word-bounded chunks to fix OCR spelling errors.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    let default_filter = if pdfocr::cli::is_verbose() {
        "pdfocr=info"
    } else {
        "pdfocr=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    pdfocr::cli::run().await
}
