//! All-or-nothing output writing

use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};
use tracing::debug;

/// Write `text` to `path`, replacing any existing file
///
/// The text goes to a temporary file in the destination directory, which is
/// renamed over `path` only once everything has been written and flushed. On
/// failure the temporary file is removed and `path` is left untouched.
///
/// A replaced file keeps its permissions; a new file gets the same mode
/// `fs::write` would give it.
pub fn write_output<P: AsRef<Path>>(path: P, text: &str) -> Result<()> {
    let path = path.as_ref();
    let to_error = |source: std::io::Error| Error::DestinationWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = create_temp(dir).map_err(to_error)?;
    if let Ok(existing) = fs::metadata(path) {
        file.as_file()
            .set_permissions(existing.permissions())
            .map_err(to_error)?;
    }
    file.write_all(text.as_bytes()).map_err(to_error)?;
    file.flush().map_err(to_error)?;
    file.persist(path).map_err(|e| to_error(e.error))?;

    debug!(path = %path.display(), bytes = text.len(), "wrote output");
    Ok(())
}

/// Temporary file created with the default mode for new files (0666 minus umask)
#[cfg(unix)]
fn create_temp(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    Builder::new()
        .prefix(".csv2tex")
        .permissions(fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn create_temp(dir: &Path) -> std::io::Result<NamedTempFile> {
    Builder::new().prefix(".csv2tex").tempfile_in(dir)
}
