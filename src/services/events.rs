//! Events sent from job workers to the controller.

use std::path::PathBuf;

use tokio::sync::mpsc;

/// Broad failure category carried by [`JobEvent::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The OCR engine binary could not be run.
    EngineUnavailable,
    Generic,
}

/// Events emitted while a job runs.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// `current` of `total` units are finished.
    Progress {
        current: usize,
        total: usize,
        message: String,
    },
    /// Informational log line
    Log(String),
    /// Recoverable condition; the job keeps going
    Warning(String),
    /// Job failed
    Error { kind: FailureKind, message: String },
    /// OCR job completed
    OcrDone { output: PathBuf },
    /// Correction job completed
    CorrectionDone { output: PathBuf },
}

impl JobEvent {
    /// Whether this event ends a job.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobEvent::Error { .. } | JobEvent::OcrDone { .. } | JobEvent::CorrectionDone { .. }
        )
    }
}

/// Completion percentage for a progress event.
pub fn progress_percent(current: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    current as f64 / total as f64 * 100.0
}

/// Create a connected sender/receiver pair.
pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventReceiver { rx })
}

/// Producer half, held by a worker.
///
/// Sends never block. Events sent after the receiver is gone are dropped.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<JobEvent>,
}

impl EventSender {
    pub fn send(&self, event: JobEvent) {
        let _ = self.tx.send(event);
    }

    pub fn progress(&self, current: usize, total: usize, message: impl Into<String>) {
        self.send(JobEvent::Progress {
            current,
            total,
            message: message.into(),
        });
    }

    pub fn log(&self, line: impl Into<String>) {
        self.send(JobEvent::Log(line.into()));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.send(JobEvent::Warning(message.into()));
    }

    pub fn error(&self, kind: FailureKind, message: impl Into<String>) {
        self.send(JobEvent::Error {
            kind,
            message: message.into(),
        });
    }
}

/// Consumer half, polled by the controller.
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<JobEvent>,
}

impl EventReceiver {
    /// Take the next queued event without waiting.
    pub fn try_next(&mut self) -> Option<JobEvent> {
        self.rx.try_recv().ok()
    }

    /// Take every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<JobEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0, 0), 0.0);
        assert_eq!(progress_percent(1, 4), 25.0);
        assert_eq!(progress_percent(4, 4), 100.0);
    }

    #[test]
    fn test_events_arrive_in_order() {
        let (tx, mut rx) = event_channel();
        let worker = tx.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..50 {
                worker.progress(i, 50, format!("step {}", i));
            }
            worker.send(JobEvent::OcrDone {
                output: PathBuf::from("out.txt"),
            });
        });
        handle.join().unwrap();
        tx.log("after");

        let events = rx.drain();
        assert_eq!(events.len(), 52);
        for (i, event) in events.iter().take(50).enumerate() {
            assert!(matches!(event, JobEvent::Progress { current, .. } if *current == i));
        }
        assert!(events[50].is_terminal());
        assert_eq!(events[51], JobEvent::Log("after".to_string()));
        assert!(rx.try_next().is_none());
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (tx, rx) = event_channel();
        drop(rx);
        tx.warning("nobody listening");
        tx.error(FailureKind::Generic, "still fine");
    }
}
