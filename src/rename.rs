use crate::context::{BulkContext, Collaborators, Ui};
use crate::differ::{DiffOutcome, Differ};
use crate::editor::EditorGateway;
use crate::entry::FileEnumerator;
use crate::error::BulkError;
use crate::executor::{BulkReport, Executor};
use crate::tempdoc::{DocKind, TempDoc};
use crate::BulkOutcome;

pub const HELP: &str = "\
Usage: br FILE...

Rename files in bulk by editing a generated list in your editor.
Quit the editor without saving to cancel.
";

/// `bulk_rename(argv)`: `argv[0]` is the command name, `argv[1..]` are the
/// files to rename. `argv[1] == \"--help\"` prints usage instead of running.
///
/// Runs the Init → Enumerate → Write → Edit → Diff → Confirm → Apply →
/// Report state machine; every exit path unlinks the temporary document.
pub fn bulk_rename(
    argv: &[String],
    editor: Option<&str>,
    ctx: &BulkContext,
    ui: &dyn Ui,
    collab: &dyn Collaborators,
) -> Result<BulkOutcome, BulkError> {
    if argv.get(1).map(String::as_str) == Some("--help") {
        return Ok(BulkOutcome::Help);
    }

    let args = &argv[1.min(argv.len())..];
    let seq = FileEnumerator::from_arguments(args, ui)?;

    let mut doc = TempDoc::create(ctx)?;
    let lines: Vec<String> = seq
        .iter()
        .map(|e| e.display_path.to_string_lossy().into_owned())
        .collect();
    doc.write_header_and_lines(DocKind::Rename, lines)?;
    let saved_mtime = doc.mtime()?;

    if let Err(err) = EditorGateway::open(doc.path(), editor, collab) {
        doc.unlink();
        return Err(err);
    }

    let current_mtime = doc.mtime()?;
    let contents = doc.reopen_for_read()?;
    let outcome = Differ::diff_rename(&seq, &contents, saved_mtime, current_mtime)?;
    doc.unlink();

    match outcome {
        DiffOutcome::Unchanged => {
            ui.print_reload_msg("Nothing to do");
            Ok(BulkOutcome::Report(BulkReport {
                succeeded: 0,
                first_error: None,
            }))
        }
        DiffOutcome::LineMismatch { expected, got } => Err(BulkError::LineMismatch { expected, got }),
        DiffOutcome::RenameChanges(changes) if changes.is_empty() => {
            ui.print_reload_msg("Nothing to do");
            Ok(BulkOutcome::Report(BulkReport {
                succeeded: 0,
                first_error: None,
            }))
        }
        DiffOutcome::RenameChanges(changes) => {
            for (_, old, new) in &changes {
                println!("Rename: {} -> {}", old.display(), new.display());
            }
            if !ui.confirm("Continue? [y/n]") {
                ui.print_reload_msg("Nothing to do");
                return Ok(BulkOutcome::Report(BulkReport {
                    succeeded: 0,
                    first_error: None,
                }));
            }

            let report = Executor::apply_rename(&changes, ctx, ui, collab);
            println!("{} file(s) renamed", report.succeeded);
            Ok(BulkOutcome::Report(report))
        }
        DiffOutcome::RemoveChanges(_) => unreachable!("diff_rename never returns RemoveChanges"),
    }
}
