use std::fs;
use std::path::Path;

use super::shadow_path;
use crate::error::StoreError;

/// Makes a shadow file written by `StorePrimitive::mutate` the new store file.
pub trait Commit {
    fn commit(&self, path: &Path) -> Result<(), StoreError>;
}

/// Commits with a single rename of the shadow file onto the store file.
///
/// On failure the shadow file is left where it is for manual recovery.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenameCommit;

impl Commit for RenameCommit {
    fn commit(&self, path: &Path) -> Result<(), StoreError> {
        let shadow = shadow_path(path);
        if let Err(source) = fs::rename(&shadow, path) {
            log::warn!(
                "could not rename {} over {}: {}",
                shadow.display(),
                path.display(),
                source
            );
            return Err(StoreError::CommitFailed { shadow, source });
        }
        sync_parent_dir(path);
        log::info!("committed update to {}", path.display());
        Ok(())
    }
}

/// Persist the rename itself. Best effort: the data is already in place.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    let Some(parent) = path.parent() else {
        return;
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    if let Err(e) = fs::File::open(parent).and_then(|dir| dir.sync_all()) {
        log::warn!("failed to sync directory {}: {}", parent.display(), e);
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}
