//! Host integration: the surface through which a user triggers the flatten
//! command and sees its outcome.
//!
//! The command logic in [`command`] only talks to the [`Host`] trait, so a
//! terminal front end, an editor plugin bridge or a test double can drive it.

pub mod command;
pub mod registration;
pub mod system;

use std::path::{Path, PathBuf};

use crate::pipeline::progress::ProgressReporter;

/// Follow-up offered after a successful flatten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUpAction {
    OpenFile,
    ShowInExplorer,
}

impl FollowUpAction {
    pub const ALL: [FollowUpAction; 2] = [FollowUpAction::OpenFile, FollowUpAction::ShowInExplorer];

    pub fn label(self) -> &'static str {
        match self {
            FollowUpAction::OpenFile => "Open File",
            FollowUpAction::ShowInExplorer => "Show in Explorer",
        }
    }
}

pub trait Host {
    /// Ask the user for a single `.pdf` file. `None` means the selection was dismissed.
    fn select_pdf(&self) -> crate::error::Result<Option<PathBuf>>;

    /// Start a non-cancellable progress indicator with the given title.
    fn begin_progress(&self, title: &str) -> Box<dyn ProgressReporter + '_>;

    /// Show an information message and return the follow-up the user picked, if any.
    fn show_info(&self, message: &str, actions: &[FollowUpAction]) -> Option<FollowUpAction>;

    fn show_error(&self, message: &str);

    fn open_file(&self, path: &Path) -> crate::error::Result<()> {
        system::open_file(path)
    }

    fn reveal_file(&self, path: &Path) -> crate::error::Result<()> {
        system::reveal_file(path)
    }
}
