//! Storage infrastructure: everything speedup keeps on disk.
//!
//! - **`config`** – The TOML application config (site URL, file locations,
//!   probe timeout, presence policy).
//! - **`block_file`** – The [`SectionStore`](crate::application::toggle_feature::SectionStore)
//!   over the managed `.htaccess`.
//! - **`state_file`** – A TOML-backed [`StateStore`](crate::application::state::StateStore)
//!   for running outside a host that provides its own settings table.
//! - **`memory`** – An in-memory `StateStore`.
//!
//! Files are replaced through a temporary sibling and an atomic rename, so a
//! crash mid-write never leaves a truncated file behind.

pub mod block_file;
pub mod config;
pub mod memory;
pub mod state_file;

use std::fs::Permissions;
use std::io::Write;
use std::path::Path;

/// Writes `content` to `path` by persisting a temporary file from the same
/// directory over it.
///
/// The replaced file keeps its permissions.  A new file gets the usual
/// world-readable mode so the web server can still read it.
pub(crate) fn write_atomically(path: &Path, content: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let permissions = match std::fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => new_file_permissions(),
        Err(e) => return Err(e),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}
