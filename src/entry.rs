use std::fs::Metadata;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};

use crate::context::{BulkContext, Ui};
use crate::error::BulkError;
use crate::util;

/// File-system kind of an [`Entry`], classified from `lstat`/directory-entry
/// type. `Door` and `Whiteout` only ever show up on platforms that expose
/// those bits through `st_mode`; elsewhere `Unknown` is the honest fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    Regular,
    Symlink,
    Socket,
    Fifo,
    CharDevice,
    BlockDevice,
    Door,
    Whiteout,
    Unknown,
}

impl EntryKind {
    fn from_metadata(meta: &Metadata) -> Self {
        let ft = meta.file_type();
        if ft.is_dir() {
            EntryKind::Directory
        } else if ft.is_symlink() {
            EntryKind::Symlink
        } else if ft.is_file() {
            EntryKind::Regular
        } else if ft.is_socket() {
            EntryKind::Socket
        } else if ft.is_fifo() {
            EntryKind::Fifo
        } else if ft.is_char_device() {
            EntryKind::CharDevice
        } else if ft.is_block_device() {
            EntryKind::BlockDevice
        } else {
            EntryKind::Unknown
        }
    }

    /// Cosmetic suffix appended on write, stripped on read, for the remove
    /// flow's document lines. Never part of identity.
    pub fn suffix(self) -> Option<char> {
        match self {
            EntryKind::Directory => Some('/'),
            EntryKind::Symlink => Some('@'),
            EntryKind::Socket => Some('='),
            EntryKind::Fifo => Some('|'),
            EntryKind::Unknown => Some('?'),
            _ => None,
        }
    }
}

/// A single participant in a bulk operation. Identity is position in the
/// owning [`EntrySequence`], not the path string.
#[derive(Clone, Debug)]
pub struct Entry {
    pub display_path: PathBuf,
    pub kind: EntryKind,
    pub in_cwd: bool,
}

/// An ordered sequence of [`Entry`]. Built once per invocation and never
/// reordered; the i-th entry is matched against the i-th edited document
/// line by the Differ.
#[derive(Clone, Debug, Default)]
pub struct EntrySequence(pub Vec<Entry>);

impl EntrySequence {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.0.iter()
    }
}

pub struct FileEnumerator;

impl FileEnumerator {
    /// Argument mode (rename): unescape, resolve `./`/`../`, lstat each
    /// argument. Failures are diagnosed and skipped, never fatal on their
    /// own; an empty result is the caller's "nothing to do".
    pub fn from_arguments(args: &[String], ui: &dyn Ui) -> Result<EntrySequence, BulkError> {
        let mut entries = Vec::with_capacity(args.len());

        for raw in args {
            match Self::resolve_argument(raw) {
                Ok((path, meta)) => {
                    let kind = EntryKind::from_metadata(&meta);
                    entries.push(Entry {
                        display_path: path,
                        kind,
                        in_cwd: true,
                    });
                }
                Err(err) => {
                    ui.xerror(&format!("{raw}: {err}"));
                    ui.press_any_key_to_continue();
                }
            }
        }

        if entries.is_empty() {
            return Err(BulkError::NothingToDo);
        }

        Ok(EntrySequence(entries))
    }

    fn resolve_argument(raw: &str) -> Result<(PathBuf, Metadata), std::io::Error> {
        let unescaped = util::unescape(raw);

        let resolved = if unescaped.starts_with("./") || unescaped.starts_with("../") {
            std::fs::canonicalize(&unescaped)?
        } else {
            PathBuf::from(&unescaped)
        };

        let meta = std::fs::symlink_metadata(&resolved)?;
        Ok((resolved, meta))
    }

    /// Directory mode (remove): reuse the cached listing when the target is
    /// the current workspace, otherwise scan the directory, sorted by
    /// alphanumeric collation, excluding `.`/`..`.
    pub fn from_directory(
        target: &Path,
        ctx: &BulkContext,
        cached_listing: Option<&[PathBuf]>,
    ) -> Result<EntrySequence, BulkError> {
        if target == ctx.cwd {
            if let Some(listing) = cached_listing {
                return Self::entries_from_paths(listing);
            }
        }

        if !target.is_dir() {
            return Err(BulkError::NotADirectory(target.to_path_buf()));
        }

        let mut names: Vec<PathBuf> = std::fs::read_dir(target)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();

        if names.is_empty() {
            return Err(BulkError::DirectoryEmpty(target.to_path_buf()));
        }

        util::sort_by_collation(&mut names);

        Self::entries_from_paths(&names)
    }

    fn entries_from_paths(paths: &[PathBuf]) -> Result<EntrySequence, BulkError> {
        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let meta = std::fs::symlink_metadata(path)?;
            entries.push(Entry {
                display_path: path.clone(),
                kind: EntryKind::from_metadata(&meta),
                in_cwd: true,
            });
        }
        if entries.is_empty() {
            return Err(BulkError::NothingToDo);
        }
        Ok(EntrySequence(entries))
    }
}
