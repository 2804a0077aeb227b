//! Swap a freshly extracted tree into `destination_root/<name>`.
//!
//! Work happens in `destination_root/.amirror/`, a directory no catalog
//! entry can be named after. The new tree is first staged at
//! `.amirror/staging/<name>`, by rename when scratch and destination share a
//! filesystem and by recursive copy when they do not. The swap itself is two
//! renames inside the destination root: the old tree is moved aside to
//! `.amirror/previous/<name>`, the staged tree is moved into place, and only
//! then is the old tree deleted. The destination is therefore always either
//! the previous complete tree or the new one, except between those two
//! renames; if the second rename fails and the old tree cannot be put back,
//! the destination is left absent and reported as such.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reserved directory under the destination root; never a valid entry name.
pub const WORK_DIR: &str = ".amirror";
const STAGING_DIR: &str = "staging";
const PREVIOUS_DIR: &str = "previous";

type Rename<'a> = &'a dyn Fn(&Path, &Path) -> io::Result<()>;

#[derive(Debug, Error)]
pub enum ReplaceError {
    #[error("create destination root {}: {source}", .path.display())]
    DestinationRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// New tree could not be staged next to the destination; destination untouched.
    #[error("stage new tree at {}: {source}", .path.display())]
    Stage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Previous tree could not be moved aside; destination untouched.
    #[error("move previous tree aside at {}: {source}", .path.display())]
    MoveAside {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// New tree could not be moved in; previous tree was restored.
    #[error("move new tree into {}: {source} (previous tree restored)", .path.display())]
    Install {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// New tree could not be moved in and the previous tree could not be restored.
    #[error("destination removed but not repopulated: {}: {source}", .path.display())]
    NotRepopulated {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ReplaceError {
    /// True when the destination for this entry no longer exists.
    pub fn destination_lost(&self) -> bool {
        matches!(self, ReplaceError::NotRepopulated { .. })
    }
}

/// Replaces `destination_root/<name>` with the tree at `new_tree`.
/// Returns the destination path.
pub fn replace_tree(
    new_tree: &Path,
    destination_root: &Path,
    name: &str,
) -> Result<PathBuf, ReplaceError> {
    replace_tree_with(new_tree, destination_root, name, &|from, to| fs::rename(from, to))
}

fn replace_tree_with(
    new_tree: &Path,
    destination_root: &Path,
    name: &str,
    rename: Rename<'_>,
) -> Result<PathBuf, ReplaceError> {
    fs::create_dir_all(destination_root).map_err(|source| ReplaceError::DestinationRoot {
        path: destination_root.to_path_buf(),
        source,
    })?;

    let work = destination_root.join(WORK_DIR);
    let dest = destination_root.join(name);
    let staging = work.join(STAGING_DIR).join(name);
    let aside = work.join(PREVIOUS_DIR).join(name);

    for dir in [work.join(STAGING_DIR), work.join(PREVIOUS_DIR)] {
        fs::create_dir_all(&dir).map_err(|source| ReplaceError::Stage {
            path: dir.clone(),
            source,
        })?;
    }

    // Leftovers from an interrupted earlier run.
    remove_if_exists(&staging).map_err(|source| ReplaceError::Stage {
        path: staging.clone(),
        source,
    })?;
    recover_previous(&aside, &dest, rename).map_err(|source| ReplaceError::MoveAside {
        path: aside.clone(),
        source,
    })?;

    if let Err(source) = move_tree(new_tree, &staging) {
        let _ = remove_if_exists(&staging);
        return Err(ReplaceError::Stage {
            path: staging,
            source,
        });
    }

    let had_previous = dest.symlink_metadata().is_ok();
    if had_previous {
        if let Err(source) = rename(&dest, &aside) {
            let _ = remove_if_exists(&staging);
            return Err(ReplaceError::MoveAside { path: aside, source });
        }
    }

    if let Err(source) = rename(&staging, &dest) {
        let _ = remove_if_exists(&staging);
        if !had_previous {
            return Err(ReplaceError::Install { path: dest, source });
        }
        return match rename(&aside, &dest) {
            Ok(()) => Err(ReplaceError::Install { path: dest, source }),
            Err(restore_err) => {
                tracing::error!(
                    dest = %dest.display(),
                    aside = %aside.display(),
                    "destination removed but not repopulated: {}; restore failed: {}",
                    source,
                    restore_err
                );
                Err(ReplaceError::NotRepopulated { path: dest, source })
            }
        };
    }

    if had_previous {
        if let Err(e) = remove_if_exists(&aside) {
            tracing::warn!(path = %aside.display(), "could not remove previous tree: {}", e);
        }
    }

    Ok(dest)
}

/// Clears a tree left aside by an interrupted run. When the destination is
/// missing that tree is the only complete copy, so it is moved back instead.
fn recover_previous(aside: &Path, dest: &Path, rename: Rename<'_>) -> io::Result<()> {
    if aside.symlink_metadata().is_err() {
        return Ok(());
    }
    if dest.symlink_metadata().is_err() {
        tracing::warn!(
            dest = %dest.display(),
            "restoring previous tree left by an interrupted run"
        );
        return rename(aside, dest);
    }
    remove_if_exists(aside)
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match path.symlink_metadata() {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Rename `from` to `to`, falling back to a recursive copy across filesystems.
fn move_tree(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            tracing::debug!(
                from = %from.display(),
                to = %to.display(),
                "cross-device move, copying"
            );
            copy_tree(from, to)
        }
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn is_cross_device(e: &io::Error) -> bool {
    e.raw_os_error() == Some(libc::EXDEV)
}

#[cfg(not(unix))]
fn is_cross_device(_e: &io::Error) -> bool {
    false
}

fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let src = entry.path();
        let dst = to.join(entry.file_name());
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            copy_tree(&src, &dst)?;
        } else if file_type.is_symlink() {
            copy_symlink(&src, &dst)?;
        } else {
            fs::copy(&src, &dst)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(src)?, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst).map(|_| ())
}
