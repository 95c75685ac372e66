use std::io::IsTerminal;
use std::path::Path;
use std::process::Command;

use crate::context::Collaborators;
use crate::error::BulkError;

/// Invokes an external editor on the temporary document, synchronously,
/// in the foreground.
pub struct EditorGateway;

impl EditorGateway {
    /// With `editor` given, spawns it directly with argv `[editor, path]`.
    /// Without one, delegates to the file-opener collaborator (MIME
    /// associations), requesting the same foreground, synchronous
    /// behavior.
    pub fn open(
        path: &Path,
        editor: Option<&str>,
        collab: &dyn Collaborators,
    ) -> Result<(), BulkError> {
        match editor {
            Some(editor) => Self::spawn(editor, path),
            None => collab
                .open_file(path)
                .map_err(|_| BulkError::EditorFailed(None)),
        }
    }

    fn spawn(editor: &str, path: &Path) -> Result<(), BulkError> {
        let mut command = Command::new(editor);
        command.arg(path);

        // If our own stdin isn't a tty (e.g. invoked from a pipe), hand the
        // editor the controlling terminal directly, the way a foreground
        // child expects.
        if !std::io::stdin().is_terminal() {
            if let Ok(tty) = std::fs::File::open("/dev/tty") {
                command.stdin(tty);
            }
        }

        let saved = Self::save_terminal_state();
        let status = command.status().map_err(|_| BulkError::EditorFailed(None))?;
        Self::restore_terminal_state(saved);

        if status.success() {
            Ok(())
        } else {
            Err(BulkError::EditorFailed(status.code()))
        }
    }

    /// Captures the controlling terminal's `termios` so it can be put back
    /// into cooked/echoing state after the editor returns, in case the
    /// editor left raw mode set on a crash or abnormal exit.
    fn save_terminal_state() -> Option<libc::termios> {
        if !std::io::stdin().is_terminal() {
            return None;
        }
        // SAFETY: termios is a plain-old-data struct, zero-initialized
        // before tcgetattr fills it in; fd 0 is stdin.
        unsafe {
            let mut term: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(0, &mut term) == 0 {
                Some(term)
            } else {
                None
            }
        }
    }

    fn restore_terminal_state(saved: Option<libc::termios>) {
        if let Some(term) = saved {
            // SAFETY: `term` was populated by a prior successful tcgetattr.
            unsafe {
                libc::tcsetattr(0, libc::TCSANOW, &term);
            }
        }
    }
}
