//! Editor-mediated bulk file mutation core: materialize the current file
//! set into an editable document, hand it to an external editor, diff the
//! result, confirm, and execute the diff as file-system mutations.
//!
//! Two flows share this pattern: [`bulk_rename`] and [`bulk_remove`].

pub mod context;
pub mod differ;
pub mod editor;
pub mod entry;
pub mod error;
pub mod executor;
mod rename;
mod remove;
pub mod tempdoc;
pub mod util;

pub use context::{BulkContext, Collaborators, RealCollaborators, Ui};
pub use differ::{DiffOutcome, Differ};
pub use editor::EditorGateway;
pub use entry::{Entry, EntryKind, EntrySequence, FileEnumerator};
pub use error::BulkError;
pub use executor::{BulkReport, Executor};
pub use rename::{bulk_rename, HELP as RENAME_HELP};
pub use remove::bulk_remove;
pub use tempdoc::{DocKind, TempDoc};

/// Either the caller asked for usage text, or the operation ran and
/// produced a report.
pub enum BulkOutcome {
    Help,
    Report(BulkReport),
}
