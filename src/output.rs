// Output naming and the atomic write of the flattened PDF.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appended to the input stem to form the output file name.
pub const OUTPUT_SUFFIX: &str = "_flattened";

/// Whether `path` has a `.pdf` extension (case-insensitive).
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Derive the output path `<dir>/<stem>_flattened.pdf` for an input PDF.
///
/// Only a `.pdf` extension is stripped; any other extension stays part of the stem.
pub fn flattened_output_path(input: &Path) -> PathBuf {
    let mut name: OsString = if has_pdf_extension(input) {
        input.file_stem().unwrap_or_default().to_os_string()
    } else {
        input.file_name().unwrap_or_default().to_os_string()
    };
    name.push(OUTPUT_SUFFIX);
    name.push(".pdf");

    match input.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Write `bytes` to `path` atomically.
///
/// The data goes to a temporary file in the destination directory which is
/// then renamed over `path`. An existing file at `path` is replaced and keeps
/// its permissions; a new file gets the same mode as any file created under
/// the current umask.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> crate::error::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let existing = std::fs::metadata(path).ok().map(|m| m.permissions());

    let mut builder = tempfile::Builder::new();
    builder.prefix(".pdf_flattener").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // tempfile defaults to 0600; 0666 lets the umask decide
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir)?;
    if let Some(perms) = existing {
        tmp.as_file().set_permissions(perms)?;
    }
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
