//! Tool availability check command.

use console::style;

use crate::cli::icons;
use crate::config::Config;
use crate::ocr::{tool_status, OcrEngine};

/// Check external tools and the configured model.
pub async fn cmd_check(config: &Config) -> anyhow::Result<()> {
    println!("\n{}", style("OCR Tool Status").bold());
    println!("{}", "-".repeat(50));

    println!("\n{}", style("Poppler / Tesseract:").cyan());
    for (tool, available) in tool_status() {
        println!(
            "  {:<15} {}",
            tool,
            icons::availability(available, "found", "not found")
        );
    }

    let tesseract = config.tesseract();
    let status = icons::availability(tesseract.is_available(), "available", "not available");
    println!(
        "\n  {:<15} {} ({})",
        "Engine",
        status,
        tesseract.command().display()
    );
    if !tesseract.is_available() {
        println!(
            "                  {}",
            style(tesseract.availability_hint()).dim()
        );
    }
    println!("  {:<15} {}", "Language", config.ocr.language);

    println!("\n{}", style("Spelling Correction:").cyan());
    println!("  {:<15} {}", "Provider", config.llm.provider.as_str());
    println!("  {:<15} {}", "Model", config.llm.model);
    println!("  {:<15} {}", "Endpoint", config.llm.endpoint());
    let key_status = if config.llm.api_key.is_some() {
        style("✓ set").green()
    } else if config.llm.provider.requires_api_key() {
        style("○ pass --api-key or set GEMINI_API_KEY").yellow()
    } else {
        style("○ not needed").dim()
    };
    println!("  {:<15} {}", "API key", key_status);
    println!();

    Ok(())
}
