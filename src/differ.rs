use std::path::PathBuf;
use std::time::SystemTime;

use crate::entry::EntrySequence;
use crate::error::BulkError;

const REMOVE_SUFFIXES: [char; 5] = ['/', '@', '=', '|', '?'];

/// Result of comparing the edited document against the saved one.
#[derive(Debug)]
pub enum DiffOutcome {
    /// mtime unchanged: the user quit without saving (or without edits).
    Unchanged,
    /// Non-comment line count violates the invariant for this flow.
    LineMismatch { expected: usize, got: usize },
    /// Rename changes: `(index, old_path, new_path)`, in sequence order.
    RenameChanges(Vec<(usize, PathBuf, PathBuf)>),
    /// Remove targets, in sequence order.
    RemoveChanges(Vec<PathBuf>),
}

fn is_comment_or_blank(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Strips the remove flow's cosmetic trailing kind suffix, if present.
fn strip_suffix(line: &str) -> &str {
    if let Some(last) = line.chars().last() {
        if REMOVE_SUFFIXES.contains(&last) {
            return &line[..line.len() - last.len_utf8()];
        }
    }
    line
}

pub struct Differ;

impl Differ {
    /// Rename flow: the edited document must have exactly as many
    /// non-comment lines as the original sequence; the i-th non-comment
    /// line is compared against `seq[i]`.
    pub fn diff_rename(
        seq: &EntrySequence,
        document: &str,
        saved_mtime: SystemTime,
        current_mtime: SystemTime,
    ) -> Result<DiffOutcome, BulkError> {
        if current_mtime == saved_mtime {
            return Ok(DiffOutcome::Unchanged);
        }

        let lines: Vec<&str> = document.lines().filter(|l| !is_comment_or_blank(l)).collect();

        if lines.len() != seq.len() {
            return Ok(DiffOutcome::LineMismatch {
                expected: seq.len(),
                got: lines.len(),
            });
        }

        let mut changes = Vec::new();
        for (i, (entry, line)) in seq.iter().zip(lines.iter()).enumerate() {
            let new_path = PathBuf::from(line);
            if new_path != entry.display_path {
                changes.push((i, entry.display_path.clone(), new_path));
            }
        }

        Ok(DiffOutcome::RenameChanges(changes))
    }

    /// Remove flow: a document with more non-comment lines than the
    /// original is tolerated (Open Question (b)) — user-added lines are
    /// ignored, never treated as new entries. Any entry whose display
    /// path is absent from the surviving lines is scheduled for removal.
    pub fn diff_remove(
        seq: &EntrySequence,
        document: &str,
        saved_mtime: SystemTime,
        current_mtime: SystemTime,
    ) -> Result<DiffOutcome, BulkError> {
        if current_mtime == saved_mtime {
            return Ok(DiffOutcome::Unchanged);
        }

        let non_comment_lines = document.lines().filter(|l| !is_comment_or_blank(l)).count();
        if non_comment_lines > seq.len() {
            log::debug!(
                "remove document has {non_comment_lines} non-comment lines, {} expected; extras ignored",
                seq.len()
            );
        }

        let surviving: std::collections::HashSet<&str> = document
            .lines()
            .filter(|l| !is_comment_or_blank(l))
            .map(strip_suffix)
            .collect();

        let mut removals = Vec::new();
        for entry in seq.iter() {
            let name = entry
                .display_path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default();
            if !surviving.contains(name.as_ref()) {
                removals.push(entry.display_path.clone());
            }
        }

        Ok(DiffOutcome::RemoveChanges(removals))
    }
}
