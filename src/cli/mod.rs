//! Command-line interface for pdfocr.

mod commands;
pub mod icons;
pub mod surface;

pub use commands::{is_verbose, run};
pub use surface::TerminalSurface;
