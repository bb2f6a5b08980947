//! Library half of pdfocr.
//!
//! The binary is a thin clap front end over these modules; the integration
//! tests drive the same API with stub collaborators.

pub mod cli;
pub mod config;
pub mod llm;
pub mod ocr;
pub mod services;
