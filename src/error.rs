use std::path::PathBuf;
use thiserror::Error;

/// Error taxonomy for both the bulk-rename and bulk-remove flows.
///
/// Variant groups follow the taxonomy laid out for the core: Input,
/// Resource, Editor, Structural, Per-item, Environment.
#[derive(Error, Debug)]
pub enum BulkError {
    /// Input: the entry sequence ended up empty, nothing to operate on.
    #[error("nothing to do")]
    NothingToDo,

    /// Input: neither s1 nor s2 resolved to an executable on PATH.
    #[error("'{0}' is not a directory and not an executable on PATH")]
    InvalidEditor(String),

    /// Resource: creating the temporary document failed.
    #[error("couldn't create temporary file: {0}")]
    TempCreate(#[source] std::io::Error),

    /// Resource: an I/O operation on the temporary document failed.
    #[error("I/O error on temporary file: {0}")]
    TempIo(#[source] std::io::Error),

    /// Editor: the editor exited with a non-zero or missing status.
    #[error("editor exited with non-zero status {0:?}")]
    EditorFailed(Option<i32>),

    /// Structural: the edited document's non-comment line count doesn't
    /// satisfy the invariant for this flow.
    #[error("line mismatch in temporary file: expected {expected}, got {got}")]
    LineMismatch { expected: usize, got: usize },

    /// Per-item: a single rename/unlink failed.
    #[error("{path}: {source}")]
    PerItem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Environment: remove target resolved to something that isn't a directory.
    #[error("{0}: not a directory")]
    NotADirectory(PathBuf),

    /// Environment: remove target directory has nothing but `.`/`..`.
    #[error("{0}: directory is empty")]
    DirectoryEmpty(PathBuf),

    /// Per-item: trash collaborator failed.
    #[error("error when trashing: {0}")]
    Trash(#[from] trash::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BulkError {
    /// Zero on success (handled by the caller), the first nonzero errno
    /// or child exit status for per-item/editor failures, and a fixed
    /// failure code for structural/input errors that never touched the
    /// file system.
    pub fn exit_code(&self) -> i32 {
        match self {
            BulkError::EditorFailed(Some(code)) => *code,
            BulkError::PerItem { source, .. } => source.raw_os_error().unwrap_or(1),
            _ => 1,
        }
    }
}
