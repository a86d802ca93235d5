//! Progress milestones reported while a job runs.
//!
//! A job passes through four fixed stages. Hosts implement
//! [`ProgressReporter`] to surface them; the stages carry their own
//! percentage and message so every host shows the same text.

/// One milestone of a flatten job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Before the input file is read.
    Reading,
    /// Input decoded; flattening starts.
    Processing,
    /// Flattening done; serialization and write start.
    Saving,
    /// Output written.
    Complete,
}

impl Stage {
    pub fn percent(self) -> u8 {
        match self {
            Stage::Reading => 0,
            Stage::Processing => 30,
            Stage::Saving => 60,
            Stage::Complete => 100,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Stage::Reading => "Reading PDF file...",
            Stage::Processing => "Processing PDF...",
            Stage::Saving => "Saving flattened PDF...",
            Stage::Complete => "Complete!",
        }
    }
}

/// Receives stage transitions from [`crate::pipeline::job_runner::run_job`].
///
/// The default implementation ignores every event.
pub trait ProgressReporter {
    fn report(&self, stage: Stage) {
        let _ = stage;
    }
}

/// A reporter for callers that don't need progress events.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {}
