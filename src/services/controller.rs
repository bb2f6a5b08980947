//! Job controller: validates input, starts workers, and applies their
//! events to a control surface on a fixed poll interval.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::correction::CorrectionJobRunner;
use super::error::{JobError, StartError};
use super::events::{
    event_channel, progress_percent, EventReceiver, EventSender, FailureKind, JobEvent,
};
use super::job::{CorrectionForm, JobKind, JobState, OcrForm};
use super::ocr::OcrJobRunner;

/// How often queued events are applied.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Which actions the surface should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub start_enabled: bool,
    pub correction_enabled: bool,
}

impl Controls {
    pub const BUSY: Controls = Controls {
        start_enabled: false,
        correction_enabled: false,
    };

    pub fn idle(correction_enabled: bool) -> Self {
        Controls {
            start_enabled: true,
            correction_enabled,
        }
    }
}

/// Whatever shows job progress to a user.
///
/// Only the controller calls these, always from the thread that owns it.
pub trait ControlSurface {
    /// Progress bar value in `0.0..=100.0` and its status line.
    fn show_progress(&mut self, percent: f64, status: &str);

    /// Status line only.
    fn set_status(&mut self, status: &str);

    fn append_log(&mut self, line: &str);

    fn clear_log(&mut self);

    /// Blocking error notice.
    fn notify_error(&mut self, message: &str);

    /// Completion notice.
    fn notify_done(&mut self, kind: JobKind, message: &str);

    fn set_controls(&mut self, controls: Controls);
}

/// Owns the event channel and at most one running job.
pub struct JobController<S> {
    surface: S,
    ocr_runner: Arc<OcrJobRunner>,
    correction_runner: Arc<CorrectionJobRunner>,
    sender: EventSender,
    events: EventReceiver,
    worker: Option<JoinHandle<()>>,
    state: JobState,
    controls: Controls,
    /// Transcript a correction job would read.
    transcript: Option<PathBuf>,
    poll_interval: Duration,
}

impl<S: ControlSurface> JobController<S> {
    pub fn new(
        mut surface: S,
        ocr_runner: Arc<OcrJobRunner>,
        correction_runner: Arc<CorrectionJobRunner>,
    ) -> Self {
        let (sender, events) = event_channel();
        let controls = Controls::idle(false);
        surface.set_controls(controls);
        Self {
            surface,
            ocr_runner,
            correction_runner,
            sender,
            events,
            worker: None,
            state: JobState::Ready,
            controls,
            transcript: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn correction_enabled(&self) -> bool {
        self.controls.correction_enabled
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Validate the form and start an OCR worker.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_ocr(&mut self, form: &OcrForm) -> Result<(), StartError> {
        self.ensure_idle()?;
        let job = form.validate()?;

        self.transcript = Some(job.output.clone());
        self.apply_controls(Controls::BUSY);
        self.surface.show_progress(0.0, "Starting...");
        self.surface.clear_log();
        self.surface.append_log(&format!(
            "Starting OCR from page {} to page {}.",
            job.pages.start(),
            job.pages.end()
        ));
        self.surface
            .append_log(&format!("Results will be saved to: {}", job.output.display()));
        info!(
            "Starting OCR of {} pages {}",
            job.document.display(),
            job.pages
        );

        let runner = Arc::clone(&self.ocr_runner);
        let events = self.sender.clone();
        self.worker = Some(tokio::task::spawn_blocking(move || {
            runner.execute(&job, &events)
        }));
        self.state = JobState::Running(JobKind::Ocr);
        Ok(())
    }

    /// Validate the form and start a correction worker.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_correction(&mut self, form: &CorrectionForm) -> Result<(), StartError> {
        self.ensure_idle()?;
        let job = form.validate(self.correction_runner.requires_api_key())?;

        self.transcript = Some(job.input.clone());
        self.apply_controls(Controls::BUSY);
        self.surface.show_progress(0.0, "Starting spelling correction...");
        self.surface.append_log(&format!(
            "Starting correction for file: {}",
            job.input.display()
        ));
        info!("Starting correction of {}", job.input.display());

        let runner = Arc::clone(&self.correction_runner);
        let events = self.sender.clone();
        self.worker = Some(tokio::spawn(async move {
            runner.execute(&job, &events).await
        }));
        self.state = JobState::Running(JobKind::Correction);
        Ok(())
    }

    /// Apply every queued event in order. Returns how many were applied.
    ///
    /// A terminal event that arrives while no job is running is dropped.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.events.try_next() {
            if event.is_terminal() && !self.state.is_running() {
                warn!("Ignoring {:?} with no job running", event);
                continue;
            }
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Poll on the configured interval until the running job settles.
    ///
    /// A worker that exits without a terminal event is treated as failed.
    pub async fn run_until_settled(&mut self) -> JobState {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.state.is_running() {
            ticker.tick().await;
            self.drain();

            let finished = self.worker.as_ref().map_or(true, |w| w.is_finished());
            if finished && self.state.is_running() {
                // Events sent just before the worker exited.
                self.drain();
                if self.state.is_running() {
                    warn!("Job worker exited without a result");
                    self.apply(JobEvent::Error {
                        kind: FailureKind::Generic,
                        message: JobError::WorkerLost.to_string(),
                    });
                }
            }
        }

        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                warn!("Job worker panicked: {}", e);
            }
        }
        self.state
    }

    fn ensure_idle(&self) -> Result<(), StartError> {
        match self.state {
            JobState::Running(kind) => Err(StartError::Busy(kind)),
            _ => Ok(()),
        }
    }

    fn apply_controls(&mut self, controls: Controls) {
        self.controls = controls;
        self.surface.set_controls(controls);
    }

    fn finish(&mut self, state: JobState, correction_enabled: bool) {
        self.state = state;
        self.apply_controls(Controls::idle(correction_enabled));
        self.surface.set_status("Ready for the next run.");
    }

    fn apply(&mut self, event: JobEvent) {
        match event {
            JobEvent::Progress {
                current,
                total,
                message,
            } => {
                self.surface
                    .show_progress(progress_percent(current, total), &message);
            }
            JobEvent::Log(line) => self.surface.append_log(&line),
            JobEvent::Warning(message) => {
                self.surface.append_log(&format!("Warning: {}", message));
            }
            JobEvent::Error { message, .. } => {
                self.surface.append_log(&format!("Error: {}", message));
                self.surface.notify_error(&message);
                let kind = self.state.kind().unwrap_or(JobKind::Ocr);
                let transcript_exists = self.transcript.as_ref().is_some_and(|p| p.exists());
                self.finish(JobState::Failed(kind), transcript_exists);
            }
            JobEvent::OcrDone { output } => {
                self.surface.append_log(&format!(
                    "🎉 OCR complete! Results saved to:\n{}",
                    output.display()
                ));
                self.surface
                    .notify_done(JobKind::Ocr, "All selected pages have been processed.");
                self.transcript = Some(output);
                self.finish(JobState::Succeeded(JobKind::Ocr), true);
            }
            JobEvent::CorrectionDone { output } => {
                self.surface.append_log(&format!(
                    "🎉 Spelling correction complete! Results saved to:\n{}",
                    output.display()
                ));
                self.surface.notify_done(
                    JobKind::Correction,
                    &format!("The corrected file was saved to {}", output.display()),
                );
                self.finish(JobState::Succeeded(JobKind::Correction), true);
            }
        }
    }
}
