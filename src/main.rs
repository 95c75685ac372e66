use std::path::Path;

use clifm_bulk::{bulk_remove, bulk_rename, BulkContext, BulkOutcome, RealCollaborators};

const HELP: &str = "\
Usage: br [--help] FILE...
       rr [TARGET|EDITOR] [EDITOR]

Modes:
    br    Bulk-rename files passed as arguments
    rr    Bulk-remove files from a target directory (defaults to cwd)

Options:
    -h, --help      Prints help information
    -t, --trash     Remove files via the trash instead of unlinking them
    -e, --editor    Explicit editor to use instead of $VISUAL/$EDITOR
    --remove        Run in bulk-remove mode regardless of the binary name
";

fn basename_is(argv0: &str, name: &str) -> bool {
    Path::new(argv0).file_name().map(|f| f == name).unwrap_or(false)
}

fn main() -> Result<(), main_error::MainError> {
    env_logger::init();

    let mut pargs = pico_args::Arguments::from_env();
    let argv0 = std::env::args().next().unwrap_or_default();

    let help = pargs.contains(["-h", "--help"]);
    let trash = pargs.contains(["-t", "--trash"]);
    let explicit_editor: Option<String> = pargs.opt_value_from_str(["-e", "--editor"]).unwrap_or(None);
    let remove_flag = pargs.contains("--remove");

    if help {
        print!("{HELP}");
        return Ok(());
    }

    let remaining: Vec<String> = pargs
        .finish()
        .into_iter()
        .map(|s| s.to_string_lossy().into_owned())
        .collect();

    let ctx = BulkContext::from_env()?;
    let collab = RealCollaborators {
        cwd: ctx.cwd.clone(),
        trash,
    };

    let is_remove = remove_flag || basename_is(&argv0, "rr");

    let outcome = if is_remove {
        let s1 = remaining.first().map(String::as_str);
        // `-e/--editor` always wins over a positional s2, matching
        // bulk_remove's own "s2 always overrides the editor" rule.
        let s2 = explicit_editor.as_deref().or_else(|| remaining.get(1).map(String::as_str));
        bulk_remove(s1, s2, &ctx, &collab, &collab)
    } else {
        let mut argv = vec![argv0];
        argv.extend(remaining);
        bulk_rename(&argv, explicit_editor.as_deref(), &ctx, &collab, &collab)
    };

    match outcome {
        Ok(BulkOutcome::Help) => {
            print!("{}", clifm_bulk::RENAME_HELP);
            Ok(())
        }
        Ok(BulkOutcome::Report(report)) => match report.first_error {
            Some(err) => {
                eprintln!("clifm-bulk: {err}");
                std::process::exit(err.exit_code());
            }
            None => Ok(()),
        },
        Err(err) => {
            eprintln!("clifm-bulk: {err}");
            std::process::exit(err.exit_code());
        }
    }
}
