use std::path::{Path, PathBuf};

use question::{Answer, Question};

use crate::error::BulkError;

/// Explicit, non-global process state the core reads. Stands in for the
/// ambient globals (current workspace, stealth mode, temp dir, auto-list
/// preference) that the source reads directly. The selection set is not
/// part of this context — it belongs to the collaborator
/// (`Collaborators::selected_files`), not to core state.
#[derive(Clone, Debug)]
pub struct BulkContext {
    pub stealth_mode: bool,
    pub temp_dir: Option<PathBuf>,
    pub auto_list: bool,
    pub cwd: PathBuf,
}

impl BulkContext {
    pub fn from_env() -> std::io::Result<Self> {
        let stealth_mode = std::env::var_os("CLIFM_STEALTH").is_some();
        let temp_dir = std::env::var_os("CLIFM_TMPDIR").map(PathBuf::from);
        let auto_list = std::env::var_os("CLIFM_AUTO_LS").map_or(true, |v| v != "0");
        let cwd = std::env::current_dir()?;
        Ok(BulkContext {
            stealth_mode,
            temp_dir,
            auto_list,
            cwd,
        })
    }

    pub fn resolved_temp_dir(&self) -> PathBuf {
        if self.stealth_mode {
            return std::env::temp_dir();
        }
        self.temp_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("clifm"))
    }
}

/// Diagnostics, pauses, and the confirmation prompt — kept separate from
/// [`Collaborators`] since these are purely about talking to the user.
pub trait Ui {
    fn xerror(&self, msg: &str);
    fn press_any_key_to_continue(&self);
    fn print_reload_msg(&self, msg: &str);
    fn confirm(&self, prompt: &str) -> bool;
}

/// File-manager-side collaborators the core depends on but does not
/// reimplement.
pub trait Collaborators {
    fn open_file(&self, path: &Path) -> std::io::Result<()>;
    fn remove_files(&self, paths: &[PathBuf]) -> Result<(), BulkError>;
    fn is_file_in_cwd(&self, path: &Path) -> bool;
    fn reload_dirlist(&self);
    fn selected_files(&self) -> Vec<PathBuf>;
}

/// Production `Ui`/`Collaborators` implementation, backing the real binary.
pub struct RealCollaborators {
    pub cwd: PathBuf,
    pub trash: bool,
}

impl Ui for RealCollaborators {
    fn xerror(&self, msg: &str) {
        log::error!("{msg}");
        eprintln!("clifm-bulk: {msg}");
    }

    fn press_any_key_to_continue(&self) {
        use std::io::Read;
        eprint!("Press any key to continue... ");
        let mut buf = [0u8; 1];
        let _ = std::io::stdin().read(&mut buf);
    }

    fn print_reload_msg(&self, msg: &str) {
        log::debug!("reload: {msg}");
        println!("{msg}");
    }

    fn confirm(&self, prompt: &str) -> bool {
        let answer = Question::new(prompt).default(Answer::YES).show_defaults().confirm();
        answer == Answer::YES
    }
}

impl Collaborators for RealCollaborators {
    fn open_file(&self, path: &Path) -> std::io::Result<()> {
        // No MIME-association database in this core: fall back to the
        // same $VISUAL/$EDITOR resolution the explicit-editor path uses.
        let editor = std::env::var("VISUAL")
            .or_else(|_| std::env::var("EDITOR"))
            .unwrap_or_else(|_| "vi".to_string());
        let status = std::process::Command::new(&editor).arg(path).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("'{editor}' exited with status {status}"),
            ))
        }
    }

    fn remove_files(&self, paths: &[PathBuf]) -> Result<(), BulkError> {
        if self.trash {
            trash::delete_all(paths)?;
        } else {
            for path in paths {
                if path.is_dir() && !path.is_symlink() {
                    std::fs::remove_dir_all(path).map_err(|source| BulkError::PerItem {
                        path: path.clone(),
                        source,
                    })?;
                } else {
                    std::fs::remove_file(path).map_err(|source| BulkError::PerItem {
                        path: path.clone(),
                        source,
                    })?;
                }
            }
        }
        Ok(())
    }

    fn is_file_in_cwd(&self, path: &Path) -> bool {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent == self.cwd,
            _ => true,
        }
    }

    fn reload_dirlist(&self) {
        log::debug!("directory listing reload requested");
    }

    fn selected_files(&self) -> Vec<PathBuf> {
        // CliFM keeps the selection box on disk (the "selbox" file) rather
        // than in this process's memory; the path is handed down via
        // environment the same way the temp dir and auto-list flag are.
        let Some(selbox) = std::env::var_os("CLIFM_SELFILE") else {
            return Vec::new();
        };
        let Ok(contents) = std::fs::read_to_string(selbox) else {
            return Vec::new();
        };
        contents.lines().filter(|l| !l.is_empty()).map(PathBuf::from).collect()
    }
}
