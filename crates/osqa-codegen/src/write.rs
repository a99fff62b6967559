//! Atomic artifact replacement.
//!
//! Artifacts are written to a temporary file in the destination directory and
//! renamed over the old file, so a reader never sees a half-written artifact.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Replace `path` with `contents` unless it already holds exactly those bytes.
///
/// Returns `true` if the file was (re)written. Missing parent directories are
/// created. An existing file keeps its permissions.
pub fn write_if_changed(path: &Path, contents: &str) -> io::Result<bool> {
    if is_up_to_date(path, contents)? {
        return Ok(false);
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;

    let permissions = match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => default_permissions(),
        Err(e) => return Err(e),
    };
    if let Some(permissions) = permissions {
        fs::set_permissions(tmp.path(), permissions)?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(true)
}

/// Whether `path` exists and holds exactly `contents`.
pub fn is_up_to_date(path: &Path, contents: &str) -> io::Result<bool> {
    match fs::read(path) {
        Ok(existing) => Ok(existing == contents.as_bytes()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Temporary files are created owner-only; new artifacts get ordinary
/// source-file permissions instead.
#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}
