use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::context::{BulkContext, Collaborators, Ui};
use crate::error::BulkError;
use crate::util;

/// How many items succeeded and the first error encountered, if any —
/// mutations continue past a per-item failure rather than aborting.
pub struct BulkReport {
    pub succeeded: usize,
    pub first_error: Option<BulkError>,
}

pub struct Executor;

impl Executor {
    /// Renames `(old, new)` pairs in order, falling back to a foreground
    /// `mv` on `EXDEV`, continuing past any other per-item error.
    pub fn apply_rename(
        changes: &[(usize, PathBuf, PathBuf)],
        ctx: &BulkContext,
        ui: &dyn Ui,
        collab: &dyn Collaborators,
    ) -> BulkReport {
        let mut moved_to_tempfile: HashMap<PathBuf, PathBuf> = HashMap::new();
        let mut succeeded = 0usize;
        let mut first_error = None;
        let mut touched_cwd = false;

        for (_, old, new) in changes {
            let new = trim_trailing_slash(new);

            // If `new` already exists and is itself scheduled to move
            // elsewhere in this batch, park it in an auxiliary tempfile so
            // this rename doesn't destroy it before its own turn comes —
            // this is what makes swapping two names in one batch safe.
            if new.exists() {
                let new_is_pending_source = changes.iter().any(|(_, x, _)| x == &new);
                if new_is_pending_source {
                    match Self::park_aside(&new) {
                        Ok(aux) => {
                            moved_to_tempfile.insert(new.clone(), aux);
                        }
                        Err(err) => {
                            ui.xerror(&format!("{}: {err}", new.display()));
                            first_error.get_or_insert(BulkError::PerItem {
                                path: new.clone(),
                                source: err,
                            });
                            if changes.len() > 1 && ctx.auto_list {
                                ui.press_any_key_to_continue();
                            }
                            continue;
                        }
                    }
                }
            }

            let current_old: &Path = moved_to_tempfile.get(old).map(|p| p.as_path()).unwrap_or(old);

            if collab.is_file_in_cwd(current_old) || collab.is_file_in_cwd(&new) {
                touched_cwd = true;
            }

            match rename_with_fallback(current_old, &new) {
                Ok(()) => succeeded += 1,
                Err(err) => {
                    ui.xerror(&format!("{}: {err}", current_old.display()));
                    first_error.get_or_insert(BulkError::PerItem {
                        path: current_old.to_path_buf(),
                        source: err,
                    });
                    if changes.len() > 1 && ctx.auto_list {
                        ui.press_any_key_to_continue();
                    }
                }
            }
        }

        if touched_cwd && ctx.auto_list {
            collab.reload_dirlist();
            ui.print_reload_msg("directory listing reloaded");
        }

        BulkReport { succeeded, first_error }
    }

    /// Removes each path in order via the remove-files collaborator
    /// (optionally through trash), continuing past per-item failures.
    pub fn apply_remove(
        paths: &[PathBuf],
        ctx: &BulkContext,
        ui: &dyn Ui,
        collab: &dyn Collaborators,
    ) -> BulkReport {
        let mut succeeded = 0usize;
        let mut first_error = None;
        let mut touched_cwd = false;

        for path in paths {
            if collab.is_file_in_cwd(path) {
                touched_cwd = true;
            }
            match collab.remove_files(std::slice::from_ref(path)) {
                Ok(()) => succeeded += 1,
                Err(err) => {
                    ui.xerror(&format!("{err}"));
                    first_error.get_or_insert(err);
                    if paths.len() > 1 && ctx.auto_list {
                        ui.press_any_key_to_continue();
                    }
                }
            }
        }

        if touched_cwd && ctx.auto_list {
            collab.reload_dirlist();
            ui.print_reload_msg("directory listing reloaded");
        }

        BulkReport { succeeded, first_error }
    }

    fn park_aside(path: &Path) -> Result<PathBuf, std::io::Error> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        for _ in 0..20 {
            let candidate = parent.join(format!(".clifm-bulk-aux.{}", util::random_name()));
            if !candidate.exists() {
                std::fs::rename(path, &candidate)?;
                return Ok(candidate);
            }
        }
        Err(std::io::Error::from(std::io::ErrorKind::AlreadyExists))
    }
}

/// Trims one trailing `/` from `new` when longer than one character —
/// some platforms' rename refuses trailing slashes on directory targets.
fn trim_trailing_slash(new: &Path) -> PathBuf {
    let s = new.to_string_lossy();
    if s.len() > 1 && s.ends_with('/') {
        PathBuf::from(&s[..s.len() - 1])
    } else {
        new.to_path_buf()
    }
}

/// Attempts an atomic rename; on `EXDEV` falls back to a foreground `mv`,
/// inheriting its own copy-then-unlink handling of sparse files and xattrs.
fn rename_with_fallback(old: &Path, new: &Path) -> Result<(), std::io::Error> {
    rename_with_fallback_using(old, new, std::fs::rename)
}

/// Same as [`rename_with_fallback`], but with the first-attempt rename
/// call injected — the seam a test uses to force the `EXDEV` path without
/// needing a real cross-device mount.
fn rename_with_fallback_using<F>(old: &Path, new: &Path, rename_fn: F) -> Result<(), std::io::Error>
where
    F: Fn(&Path, &Path) -> std::io::Result<()>,
{
    match rename_fn(old, new) {
        Ok(()) => Ok(()),
        Err(err) if err.raw_os_error() == Some(libc::EXDEV) => {
            let status = Command::new("mv").arg("--").arg(old).arg(new).status()?;
            if status.success() {
                Ok(())
            } else {
                Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("mv exited with status {status}"),
                ))
            }
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_single_trailing_slash() {
        assert_eq!(trim_trailing_slash(Path::new("foo/")), PathBuf::from("foo"));
    }

    #[test]
    fn keeps_root_slash() {
        assert_eq!(trim_trailing_slash(Path::new("/")), PathBuf::from("/"));
    }

    #[test]
    fn leaves_non_trailing_slash_alone() {
        assert_eq!(trim_trailing_slash(Path::new("foo/bar")), PathBuf::from("foo/bar"));
    }

    #[test]
    fn exdev_falls_back_to_mv() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("a");
        let new = dir.path().join("b");
        std::fs::write(&old, b"payload").unwrap();

        let forced_exdev = |_old: &Path, _new: &Path| -> std::io::Result<()> {
            Err(std::io::Error::from_raw_os_error(libc::EXDEV))
        };

        rename_with_fallback_using(&old, &new, forced_exdev).unwrap();

        assert!(!old.exists());
        assert_eq!(std::fs::read(&new).unwrap(), b"payload");
    }

    #[test]
    fn other_errno_is_not_retried_via_mv() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("missing");
        let new = dir.path().join("target");

        let forced_enoent = |_old: &Path, _new: &Path| -> std::io::Result<()> {
            Err(std::io::Error::from_raw_os_error(libc::ENOENT))
        };

        let err = rename_with_fallback_using(&old, &new, forced_enoent).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::ENOENT));
    }
}
