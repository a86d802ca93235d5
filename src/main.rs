use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use pdf_flattener::error::PdfFlattenError;
use pdf_flattener::host::command::CommandOutcome;
use pdf_flattener::host::registration::{self, FLATTEN_COMMAND_ID};
use pdf_flattener::host::{FollowUpAction, Host};
use pdf_flattener::output::has_pdf_extension;
use pdf_flattener::pipeline::progress::{ProgressReporter, Stage};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let interactive = io::stdin().is_terminal();

    // Everything after `--` is a path, even when it starts with '-'.
    let (options, trailing) = match args.iter().position(|a| a == "--") {
        Some(i) => (&args[..i], &args[i + 1..]),
        None => (&args[..], &[][..]),
    };

    if options.iter().any(|a| a == "--help" || a == "-h") || (args.is_empty() && !interactive) {
        eprintln!("Usage: pdf_flattener [--] [<file.pdf>]");
        eprintln!("  Write a copy of the PDF with form fields flattened to <file>_flattened.pdf.");
        eprintln!("  Without a file argument, prompts for one when run interactively.");
        return if args.is_empty() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    if options.iter().any(|a| a == "--version" || a == "-V") {
        eprintln!("pdf_flattener {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    if let Some(flag) = options.iter().find(|a| a.starts_with('-')) {
        eprintln!("ERROR: Unknown option: {flag} (use `--` before a path starting with '-')");
        return ExitCode::FAILURE;
    }

    let paths: Vec<&String> = options.iter().chain(trailing).collect();
    if paths.len() > 1 {
        eprintln!("ERROR: Only one PDF file can be flattened at a time");
        return ExitCode::FAILURE;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let registration = match registration::activate() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return ExitCode::FAILURE;
        }
    };

    let host = TerminalHost { interactive };
    let path = paths.first().map(|p| PathBuf::from(p.as_str()));
    let outcome = registration.execute(FLATTEN_COMMAND_ID, &host, path);
    registration.deactivate();

    match outcome {
        Ok(CommandOutcome::Flattened(result)) => {
            let failed = result.report.failed_count();
            if failed > 0 {
                eprintln!("WARNING: {failed} form field(s) could not be made read-only");
            }
            ExitCode::SUCCESS
        }
        Ok(CommandOutcome::Cancelled) => ExitCode::SUCCESS,
        Ok(CommandOutcome::Failed(_)) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Terminal front end: prompts on stdin, draws progress on stderr.
struct TerminalHost {
    interactive: bool,
}

impl TerminalHost {
    fn prompt(&self, text: &str) -> io::Result<String> {
        eprint!("{text}");
        io::stderr().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

impl Host for TerminalHost {
    fn select_pdf(&self) -> pdf_flattener::error::Result<Option<PathBuf>> {
        if !self.interactive {
            return Ok(None);
        }
        let answer = self.prompt("Select PDF to flatten: ")?;
        // Paths dropped onto a terminal arrive quoted.
        let answer = answer.trim_matches(['\'', '"']);
        if answer.is_empty() {
            return Ok(None);
        }
        let path = PathBuf::from(answer);
        if !has_pdf_extension(&path) {
            return Err(PdfFlattenError::host(format!(
                "not a PDF file: {}",
                path.display()
            )));
        }
        Ok(Some(path))
    }

    fn begin_progress(&self, title: &str) -> Box<dyn ProgressReporter + '_> {
        Box::new(TerminalProgress::new(title))
    }

    fn show_info(&self, message: &str, actions: &[FollowUpAction]) -> Option<FollowUpAction> {
        eprintln!("{message}");
        if !self.interactive || actions.is_empty() {
            return None;
        }

        let menu: Vec<String> = actions
            .iter()
            .map(|a| format!("[{}] {}", shortcut(*a), a.label()))
            .collect();
        let answer = self
            .prompt(&format!("{}  [Enter] Done: ", menu.join("  ")))
            .ok()?;
        actions
            .iter()
            .copied()
            .find(|a| answer.eq_ignore_ascii_case(shortcut(*a)))
    }

    fn show_error(&self, message: &str) {
        eprintln!("ERROR: {message}");
    }
}

fn shortcut(action: FollowUpAction) -> &'static str {
    match action {
        FollowUpAction::OpenFile => "o",
        FollowUpAction::ShowInExplorer => "r",
    }
}

/// Progress bar driven by job stages. Hidden automatically when stderr is not a terminal.
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new(title: &str) -> Self {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:30.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        let bar = ProgressBar::new(100);
        bar.set_style(style);
        bar.set_prefix(title.to_string());
        Self { bar }
    }
}

impl ProgressReporter for TerminalProgress {
    fn report(&self, stage: Stage) {
        self.bar.set_position(u64::from(stage.percent()));
        self.bar.set_message(stage.message());
        if stage == Stage::Complete {
            self.bar.finish();
        }
    }
}

impl Drop for TerminalProgress {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}
