mod common;

use std::process::Command;

use common::{PdfBuilder, load, text_field, widget_field_flags};
use pdf_flattener::pdf::forms::READ_ONLY;

fn cargo_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pdf_flattener"))
}

// ============================================================
// 1. No arguments without a terminal shows usage and exits with failure
// ============================================================

#[test]
fn test_main_no_args_shows_usage() {
    let output = cargo_bin().output().expect("failed to execute binary");

    assert!(
        !output.status.success(),
        "should exit with failure when no args given"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Usage"),
        "stderr should contain 'Usage', got: {stderr}"
    );
}

// ============================================================
// 2. --help / --version
// ============================================================

#[test]
fn test_main_help_flag() {
    let output = cargo_bin()
        .arg("--help")
        .output()
        .expect("failed to execute binary");

    assert!(
        output.status.success(),
        "should exit with success for --help"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Usage"),
        "stderr should contain 'Usage', got: {stderr}"
    );
}

#[test]
fn test_main_version_flag() {
    let output = cargo_bin()
        .arg("--version")
        .output()
        .expect("failed to execute binary");

    assert!(
        output.status.success(),
        "should exit with success for --version"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    let version = env!("CARGO_PKG_VERSION");
    assert!(
        stderr.contains(version),
        "stderr should contain version '{version}', got: {stderr}"
    );
}

// ============================================================
// 3. Argument errors
// ============================================================

#[test]
fn test_main_rejects_multiple_files() {
    let output = cargo_bin()
        .args(["a.pdf", "b.pdf"])
        .output()
        .expect("failed to execute binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR"), "got: {stderr}");
}

#[test]
fn test_main_nonexistent_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let missing = dir.path().join("missing.pdf");

    let output = cargo_bin()
        .arg(missing.as_os_str())
        .output()
        .expect("failed to execute binary");

    assert!(
        !output.status.success(),
        "should exit with failure for nonexistent file"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Error flattening PDF"),
        "stderr should contain error message, got: {stderr}"
    );
    assert!(!dir.path().join("missing_flattened.pdf").exists());
}

// ============================================================
// 4. End to end
// ============================================================

#[test]
fn test_main_flattens_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let input = dir.path().join("form.pdf");
    let mut builder = PdfBuilder::new(2);
    builder.widget_field(1, text_field("name"));
    builder.save(&input);

    let output = cargo_bin()
        .arg(input.as_os_str())
        .output()
        .expect("failed to execute binary");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "should succeed, stderr: {stderr}");
    assert!(
        stderr.contains("Saved as: form_flattened.pdf"),
        "got: {stderr}"
    );

    let bytes = std::fs::read(dir.path().join("form_flattened.pdf")).expect("output written");
    let doc = load(&bytes);
    assert_eq!(doc.get_pages().len(), 2);
    assert_eq!(widget_field_flags(&doc, "name"), Some(READ_ONLY));
}

#[test]
fn test_main_dash_prefixed_path_after_separator() {
    let dir = tempfile::tempdir().expect("create temp dir");
    PdfBuilder::new(1).save(&dir.path().join("-draft.pdf"));

    let rejected = cargo_bin()
        .arg("-draft.pdf")
        .current_dir(dir.path())
        .output()
        .expect("failed to execute binary");
    assert!(!rejected.status.success());
    assert!(String::from_utf8_lossy(&rejected.stderr).contains("Unknown option"));

    let output = cargo_bin()
        .args(["--", "-draft.pdf"])
        .current_dir(dir.path())
        .output()
        .expect("failed to execute binary");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "should succeed, stderr: {stderr}");
    assert!(dir.path().join("-draft_flattened.pdf").exists());
}
