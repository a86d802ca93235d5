// Opening and revealing files through the platform's file handlers.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::PdfFlattenError;

/// Build the command that opens `path` with its default application.
pub fn open_command(path: &Path) -> Command {
    let program = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };
    let mut cmd = Command::new(program);
    cmd.arg(path);
    cmd
}

/// Build the command that shows `path` in the system file browser.
///
/// Where the file browser cannot select a file, its directory is opened instead.
pub fn reveal_command(path: &Path) -> Command {
    let mut cmd;
    if cfg!(target_os = "macos") {
        cmd = Command::new("open");
        cmd.arg("-R").arg(path);
    } else if cfg!(target_os = "windows") {
        let mut select = std::ffi::OsString::from("/select,");
        select.push(path);
        cmd = Command::new("explorer");
        cmd.arg(select);
    } else {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        cmd = Command::new("xdg-open");
        cmd.arg(dir);
    }
    cmd
}

pub fn open_file(path: &Path) -> crate::error::Result<()> {
    spawn_detached(open_command(path))
}

pub fn reveal_file(path: &Path) -> crate::error::Result<()> {
    spawn_detached(reveal_command(path))
}

fn spawn_detached(mut cmd: Command) -> crate::error::Result<()> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    match cmd.spawn() {
        Ok(_) => Ok(()),
        Err(e) => Err(PdfFlattenError::host(format!(
            "failed to execute {program}: {e}"
        ))),
    }
}
