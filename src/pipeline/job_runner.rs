// ジョブ単位: PDF読込 -> 平坦化 -> 出力PDF書き込み

use std::path::{Path, PathBuf};

use crate::config::settings::Settings;
use crate::output::{flattened_output_path, write_atomic};
use crate::pdf::reader::PdfReader;
use crate::pipeline::flatten::{FlattenOptions, FlattenReport, flatten};
use crate::pipeline::progress::{ProgressReporter, Stage};

/// Configuration for a single job.
pub struct JobConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub settings: Settings,
}

impl JobConfig {
    /// Job writing to the sibling `<stem>_flattened.pdf` of `input_path`.
    pub fn for_input(input_path: impl Into<PathBuf>, settings: Settings) -> Self {
        let input_path = input_path.into();
        let output_path = flattened_output_path(&input_path);
        JobConfig {
            input_path,
            output_path,
            settings,
        }
    }
}

/// Result of processing a single job.
#[derive(Debug)]
pub struct JobResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub pages_processed: usize,
    pub report: FlattenReport,
}

/// Run a single flatten job.
///
/// Steps run strictly in order: read, decode, flatten, encode, write. Any
/// failure before the write leaves the output path untouched.
pub fn run_job(
    config: &JobConfig,
    progress: &dyn ProgressReporter,
) -> crate::error::Result<JobResult> {
    progress.report(Stage::Reading);
    let bytes = read_input(&config.input_path)?;
    let reader = PdfReader::from_bytes(&bytes)?;
    tracing::debug!(
        input = %config.input_path.display(),
        pages = reader.page_count(),
        "decoded input PDF"
    );

    progress.report(Stage::Processing);
    let options = FlattenOptions::from(&config.settings);
    let mut flattened = flatten(reader, &options)?;

    progress.report(Stage::Saving);
    let pdf_bytes = flattened.writer.save_to_bytes(config.settings.compress)?;
    write_atomic(&config.output_path, &pdf_bytes)?;

    progress.report(Stage::Complete);
    tracing::info!(
        input = %config.input_path.display(),
        output = %config.output_path.display(),
        pages = flattened.report.pages,
        read_only = flattened.report.read_only_count(),
        failed = flattened.report.failed_count(),
        "flattened PDF"
    );

    Ok(JobResult {
        input_path: config.input_path.clone(),
        output_path: config.output_path.clone(),
        pages_processed: flattened.report.pages,
        report: flattened.report,
    })
}

fn read_input(path: &Path) -> crate::error::Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        std::io::Error::new(e.kind(), format!("cannot read {}: {e}", path.display())).into()
    })
}
