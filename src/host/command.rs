use std::path::PathBuf;

use crate::config;
use crate::host::{FollowUpAction, Host};
use crate::pipeline::job_runner::{JobConfig, JobResult, run_job};

/// Title of the progress indicator shown while a job runs.
pub const PROGRESS_TITLE: &str = "Flattening PDF";

#[derive(Debug)]
pub enum CommandOutcome {
    /// The user dismissed the file selection.
    Cancelled,
    Flattened(JobResult),
    /// The job failed; the message was shown to the user.
    Failed(String),
}

/// Run the flatten command for `path`, or for a file chosen through the host.
///
/// Errors never escape: they are logged and shown through [`Host::show_error`].
pub fn flatten_pdf_command(host: &dyn Host, path: Option<PathBuf>) -> CommandOutcome {
    let input = match path {
        Some(path) => path,
        None => match host.select_pdf() {
            Ok(Some(path)) => path,
            Ok(None) => return CommandOutcome::Cancelled,
            Err(e) => return fail(host, e),
        },
    };

    let result = match run(host, input) {
        Ok(result) => result,
        Err(e) => return fail(host, e),
    };

    let file_name = result
        .output_path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    let message = format!("PDF flattened successfully! Saved as: {file_name}");

    let follow_up = match host.show_info(&message, &FollowUpAction::ALL) {
        Some(FollowUpAction::OpenFile) => host.open_file(&result.output_path),
        Some(FollowUpAction::ShowInExplorer) => host.reveal_file(&result.output_path),
        None => Ok(()),
    };
    if let Err(e) = follow_up {
        tracing::error!(error = %e, output = %result.output_path.display(), "follow-up action failed");
        host.show_error(&format!("Error opening flattened PDF: {e}"));
    }

    CommandOutcome::Flattened(result)
}

fn run(host: &dyn Host, input: PathBuf) -> crate::error::Result<JobResult> {
    let settings = config::load_settings_for_input(&input)?;
    let job = JobConfig::for_input(input, settings);
    let progress = host.begin_progress(PROGRESS_TITLE);
    run_job(&job, &*progress)
}

fn fail(host: &dyn Host, e: crate::error::PdfFlattenError) -> CommandOutcome {
    tracing::error!(error = %e, "PDF flattening failed");
    host.show_error(&format!("Error flattening PDF: {e}"));
    CommandOutcome::Failed(e.to_string())
}
