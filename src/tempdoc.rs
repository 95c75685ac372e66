use std::ffi::CString;
use std::fs::File;
use std::io::{Read, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::{FromRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::context::BulkContext;
use crate::error::BulkError;
use crate::util;

const CREATE_MAX_RETRIES: usize = 20;

const RENAME_HEADER: &str = "\
# CliFM - Rename files in bulk
# Edit file names below, then save and quit the editor.
# Lines starting with '#' are comments and are ignored.
# Quit without saving (or without changes) to cancel.
#
";

const REMOVE_HEADER: &str = "\
# CliFM - Remove files in bulk
# Delete the lines of the files you want to remove, then save and quit.
# Lines starting with '#' are comments and are ignored.
# Quit without saving (or without changes) to cancel.
#
";

/// What the document is for, selecting the fixed header text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocKind {
    Rename,
    Remove,
}

/// The editable surface handed to the external editor: a secure,
/// exclusively-created temporary file, its owning directory descriptor
/// (for TOCTOU-safe unlink), and the path the editor is told to open.
pub struct TempDoc {
    file: File,
    dir_fd: RawFd,
    name: CString,
    path: PathBuf,
    unlinked: bool,
}

impl TempDoc {
    /// Creates a unique file under the context's configured temp directory,
    /// race-safe and exclusive (`O_CREAT | O_EXCL`), mode 0600 so other
    /// users can't read the paths of otherwise-private files.
    pub fn create(ctx: &BulkContext) -> Result<Self, BulkError> {
        let dir = ctx.resolved_temp_dir();
        std::fs::create_dir_all(&dir).map_err(BulkError::TempCreate)?;

        let dir_cstr = CString::new(dir.as_os_str().as_bytes())
            .map_err(|_| BulkError::TempCreate(std::io::Error::from(std::io::ErrorKind::InvalidInput)))?;

        // SAFETY: dir_cstr is a valid NUL-terminated path; the fd is owned
        // by this TempDoc and closed when it's dropped.
        let dir_fd = unsafe { libc::open(dir_cstr.as_ptr(), libc::O_RDONLY | libc::O_DIRECTORY) };
        if dir_fd < 0 {
            return Err(BulkError::TempCreate(std::io::Error::last_os_error()));
        }

        for _ in 0..CREATE_MAX_RETRIES {
            let name = format!("clifm-bulk.{}", util::random_name());
            let name_cstr = CString::new(name.as_bytes()).expect("random name has no NUL");

            // SAFETY: dir_fd is open and valid; name_cstr is NUL-terminated.
            let fd = unsafe {
                libc::openat(
                    dir_fd,
                    name_cstr.as_ptr(),
                    libc::O_CREAT | libc::O_EXCL | libc::O_RDWR,
                    0o600,
                )
            };

            if fd >= 0 {
                // SAFETY: fd was just opened above and is owned here.
                let file = unsafe { File::from_raw_fd(fd) };
                return Ok(TempDoc {
                    file,
                    dir_fd,
                    name: name_cstr,
                    path: dir.join(&name),
                    unlinked: false,
                });
            }

            let err = std::io::Error::last_os_error();
            if err.raw_os_error() != Some(libc::EEXIST) {
                unsafe { libc::close(dir_fd) };
                return Err(BulkError::TempCreate(err));
            }
        }

        unsafe { libc::close(dir_fd) };
        Err(BulkError::TempCreate(std::io::Error::from(
            std::io::ErrorKind::AlreadyExists,
        )))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_header_and_lines<I, S>(&mut self, kind: DocKind, lines: I) -> Result<(), BulkError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let header = match kind {
            DocKind::Rename => RENAME_HEADER,
            DocKind::Remove => REMOVE_HEADER,
        };
        self.file.write_all(header.as_bytes()).map_err(BulkError::TempIo)?;
        for line in lines {
            self.file
                .write_all(line.as_ref().as_bytes())
                .map_err(BulkError::TempIo)?;
            self.file.write_all(b"\n").map_err(BulkError::TempIo)?;
        }
        self.file.flush().map_err(BulkError::TempIo)?;
        Ok(())
    }

    /// Last-modification time, whole-second resolution — the sole signal
    /// the Differ uses to detect "no edits". Stats the *path*, not the
    /// original creation fd: editors commonly save by writing a sibling
    /// file and renaming it over the original, which swaps in a new inode
    /// that the old fd's `fstat` would never see.
    pub fn mtime(&self) -> Result<SystemTime, BulkError> {
        let meta = std::fs::metadata(&self.path).map_err(BulkError::TempIo)?;
        let mtime = meta.modified().map_err(BulkError::TempIo)?;
        let secs = mtime
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Ok(SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(secs))
    }

    pub fn reopen_for_read(&self) -> Result<String, BulkError> {
        let mut f = File::open(&self.path).map_err(BulkError::TempIo)?;
        let mut contents = String::new();
        f.read_to_string(&mut contents).map_err(BulkError::TempIo)?;
        Ok(contents)
    }

    /// Unlinks the temp document via the holding directory descriptor,
    /// avoiding races with another process that might have created a file
    /// of the same name. Safe to call more than once.
    pub fn unlink(&mut self) {
        if self.unlinked {
            return;
        }
        self.unlinked = true;
        // SAFETY: dir_fd is owned and still open; name is the exact name
        // this TempDoc created under it.
        unsafe {
            libc::unlinkat(self.dir_fd, self.name.as_ptr(), 0);
        }
    }

}

impl Drop for TempDoc {
    fn drop(&mut self) {
        self.unlink();
        unsafe {
            libc::close(self.dir_fd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_in(dir: &Path) -> BulkContext {
        BulkContext {
            stealth_mode: false,
            temp_dir: Some(dir.to_path_buf()),
            auto_list: true,
            cwd: dir.to_path_buf(),
        }
    }

    #[test]
    fn create_write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(dir.path());
        let mut doc = TempDoc::create(&ctx).unwrap();
        doc.write_header_and_lines(DocKind::Rename, ["a", "b"]).unwrap();

        let contents = doc.reopen_for_read().unwrap();
        assert!(contents.contains("a\nb\n"));
        assert!(contents.starts_with("# CliFM"));
    }

    #[test]
    fn unlink_removes_file_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(dir.path());
        let mut doc = TempDoc::create(&ctx).unwrap();
        let path = doc.path().to_path_buf();
        assert!(path.exists());
        doc.unlink();
        assert!(!path.exists());
        doc.unlink(); // must not panic or error
    }

    #[test]
    fn mtime_reflects_replacement_via_rename() {
        // Simulates an editor that saves by writing a sibling file and
        // renaming it over the original — a new inode at the same path.
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(dir.path());
        let mut doc = TempDoc::create(&ctx).unwrap();
        doc.write_header_and_lines(DocKind::Rename, ["a"]).unwrap();
        let before = doc.mtime().unwrap();

        let sibling = doc.path().with_extension("new");
        let sibling_file = File::create(&sibling).unwrap();
        sibling_file
            .set_modified(before + std::time::Duration::from_secs(5))
            .unwrap();
        drop(sibling_file);
        std::fs::rename(&sibling, doc.path()).unwrap();

        let after = doc.mtime().unwrap();
        assert!(after > before);
    }

    #[test]
    fn mode_restricts_other_users() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(dir.path());
        let doc = TempDoc::create(&ctx).unwrap();
        let meta = std::fs::metadata(doc.path()).unwrap();
        assert_eq!(meta.permissions().mode() & 0o077, 0);
    }
}
