//! Filesystem helpers for vendor entries.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const STALE_SUFFIX: &str = ".vendr-stale";

/// Whether `path` holds no entries. A missing path counts as empty.
pub fn is_directory_empty(path: &Path) -> io::Result<bool> {
    match fs::read_dir(path) {
        Ok(mut entries) => match entries.next() {
            None => Ok(true),
            Some(Ok(_)) => Ok(false),
            Some(Err(e)) => Err(e),
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(e),
    }
}

/// What [`clear_directory`] left behind.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClearOutcome {
    /// Moved-aside copy that could not be deleted.
    pub leftover: Option<PathBuf>,
}

/// Sibling path a vendor entry is moved to before deletion.
pub fn stale_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = path.parent()?;
    let mut stale = OsString::from(".");
    stale.push(name);
    stale.push(STALE_SUFFIX);
    Some(parent.join(stale))
}

/// Remove `path` so that it no longer exists, without ever leaving it half
/// deleted.
///
/// The entry is renamed to a sibling stale path first, then the stale copy is
/// deleted. If the rename fails nothing was touched and the error is returned.
/// If only the delete fails, `path` is already gone and the stale copy is
/// reported in [`ClearOutcome::leftover`].
pub fn clear_directory(path: &Path) -> io::Result<ClearOutcome> {
    clear_directory_with(path, |p: &Path| fs::remove_dir_all(p))
}

fn clear_directory_with<F>(path: &Path, remove: F) -> io::Result<ClearOutcome>
where
    F: Fn(&Path) -> io::Result<()>,
{
    let Some(stale) = stale_path(path) else {
        remove(path)?;
        return Ok(ClearOutcome::default());
    };

    if stale.exists() {
        tracing::debug!(path = %stale.display(), "removing stale copy from an earlier run");
        remove(&stale)?;
    }

    fs::rename(path, &stale)?;

    match remove(&stale) {
        Ok(()) => Ok(ClearOutcome::default()),
        Err(e) => {
            tracing::warn!(path = %stale.display(), error = %e, "could not delete moved-aside copy");
            Ok(ClearOutcome {
                leftover: Some(stale),
            })
        }
    }
}
