//! Terminal control surface: an indicatif progress bar plus styled log lines.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use super::icons;
use crate::services::{ControlSurface, Controls, JobKind};

/// Shows job progress on the terminal.
///
/// A bar is drawn while a job runs; log lines print above it.
#[derive(Default)]
pub struct TerminalSurface {
    bar: Option<ProgressBar>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_bar() -> ProgressBar {
        let bar = ProgressBar::new(100);
        let bar_style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos:>3}% {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        bar.set_style(bar_style);
        bar
    }

    fn print(&self, line: &str) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{}", line),
        }
    }
}

impl ControlSurface for TerminalSurface {
    fn show_progress(&mut self, percent: f64, status: &str) {
        if let Some(bar) = &self.bar {
            bar.set_position(percent.clamp(0.0, 100.0).round() as u64);
            bar.set_message(status.to_string());
        }
    }

    fn set_status(&mut self, status: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(status.to_string());
        }
    }

    fn append_log(&mut self, line: &str) {
        if let Some(rest) = line.strip_prefix("Warning: ") {
            self.print(&format!("{} {}", icons::warn(), style(rest).yellow()));
        } else {
            self.print(&format!("  {} {}", icons::dim_arrow(), line));
        }
    }

    fn clear_log(&mut self) {}

    fn notify_error(&mut self, message: &str) {
        let line = format!("{} {}", icons::error(), style(message).red());
        match &self.bar {
            Some(bar) => bar.suspend(|| eprintln!("{}", line)),
            None => eprintln!("{}", line),
        }
    }

    fn notify_done(&mut self, kind: JobKind, message: &str) {
        let title = match kind {
            JobKind::Ocr => "OCR complete",
            JobKind::Correction => "Correction complete",
        };
        self.print(&format!(
            "{} {}: {}",
            icons::success(),
            style(title).bold(),
            message
        ));
    }

    fn set_controls(&mut self, controls: Controls) {
        if controls.start_enabled {
            if let Some(bar) = self.bar.take() {
                bar.finish_and_clear();
            }
        } else if self.bar.is_none() {
            self.bar = Some(Self::new_bar());
        }
    }
}
