use std::path::PathBuf;

use crate::context::{BulkContext, Collaborators, Ui};
use crate::differ::{DiffOutcome, Differ};
use crate::editor::EditorGateway;
use crate::entry::FileEnumerator;
use crate::error::BulkError;
use crate::executor::{BulkReport, Executor};
use crate::tempdoc::{DocKind, TempDoc};
use crate::util;
use crate::BulkOutcome;

/// Resolves `(s1, s2)` into `(target directory, editor)` per the
/// parameter-parsing rules: an empty/absent `s1` targets the current
/// workspace with the default opener; a directory `s1` sets the target;
/// otherwise `s1` must resolve to an executable on `PATH` and becomes the
/// editor, with the target staying the current workspace. `s2`, when
/// present, always overrides the editor and must itself resolve on `PATH`.
fn parse_args(
    s1: Option<&str>,
    s2: Option<&str>,
    ctx: &BulkContext,
) -> Result<(PathBuf, Option<String>), BulkError> {
    let (target, mut editor) = match s1.filter(|s| !s.is_empty()) {
        None => (ctx.cwd.clone(), None),
        Some(s1) => {
            let candidate = PathBuf::from(s1);
            if candidate.is_dir() {
                (candidate, None)
            } else if let Some(resolved) = util::resolve_on_path(s1) {
                (ctx.cwd.clone(), Some(resolved.to_string_lossy().into_owned()))
            } else {
                return Err(BulkError::InvalidEditor(s1.to_string()));
            }
        }
    };

    if let Some(s2) = s2.filter(|s| !s.is_empty()) {
        match util::resolve_on_path(s2) {
            Some(resolved) => editor = Some(resolved.to_string_lossy().into_owned()),
            None => return Err(BulkError::InvalidEditor(s2.to_string())),
        }
    }

    Ok((target, editor))
}

/// `bulk_remove(s1, s2)`: runs the same Init → Enumerate → Write → Edit →
/// Diff → Confirm → Apply → Report machine as [`crate::rename::bulk_rename`],
/// seeded from a directory scan (or the cached workspace listing) instead
/// of an argument vector.
pub fn bulk_remove(
    s1: Option<&str>,
    s2: Option<&str>,
    ctx: &BulkContext,
    ui: &dyn Ui,
    collab: &dyn Collaborators,
) -> Result<BulkOutcome, BulkError> {
    let (target, editor) = parse_args(s1, s2, ctx)?;

    let selection = collab.selected_files();
    let cached_listing = if target == ctx.cwd && !selection.is_empty() {
        Some(selection.as_slice())
    } else {
        None
    };
    let seq = FileEnumerator::from_directory(&target, ctx, cached_listing)?;

    let mut doc = TempDoc::create(ctx)?;
    let lines: Vec<String> = seq
        .iter()
        .map(|e| {
            let name = e.display_path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            match e.kind.suffix() {
                Some(suffix) => format!("{name}{suffix}"),
                None => name,
            }
        })
        .collect();
    doc.write_header_and_lines(DocKind::Remove, lines)?;
    let saved_mtime = doc.mtime()?;

    if let Err(err) = EditorGateway::open(doc.path(), editor.as_deref(), collab) {
        doc.unlink();
        return Err(err);
    }

    let current_mtime = doc.mtime()?;
    let contents = doc.reopen_for_read()?;
    let outcome = Differ::diff_remove(&seq, &contents, saved_mtime, current_mtime)?;
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
        DiffOutcome::RemoveChanges(removals) if removals.is_empty() => {
            ui.print_reload_msg("Nothing to do");
            Ok(BulkOutcome::Report(BulkReport {
                succeeded: 0,
                first_error: None,
            }))
        }
        DiffOutcome::RemoveChanges(removals) => {
            for path in &removals {
                println!("Delete: {}", path.display());
            }
            if !ui.confirm("Continue? [y/n]") {
                ui.print_reload_msg("Nothing to do");
                return Ok(BulkOutcome::Report(BulkReport {
                    succeeded: 0,
                    first_error: None,
                }));
            }

            let report = Executor::apply_remove(&removals, ctx, ui, collab);
            println!("{} file(s) removed", report.succeeded);
            Ok(BulkOutcome::Report(report))
        }
        DiffOutcome::RenameChanges(_) => unreachable!("diff_remove never returns RenameChanges"),
    }
}
