use rand::distributions::Alphanumeric;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::cell::UnsafeCell;
use std::path::{Path, PathBuf};

const TEMPNAME_LENGTH: usize = 8;

thread_local! {
    static THREAD_RNG: UnsafeCell<SmallRng> = UnsafeCell::new(SmallRng::from_entropy());
}

/// Generates a random alphanumeric name component, the same way the
/// original `tmpfile` helper filled an `OsString` byte by byte.
pub fn random_name() -> String {
    THREAD_RNG.with(|rng| unsafe {
        (&mut *rng.get())
            .sample_iter(&Alphanumeric)
            .take(TEMPNAME_LENGTH)
            .map(|b| b as char)
            .collect()
    })
}

/// Unescapes backslash escapes in a bulk-rename argument (`\ ` → ` `,
/// `\\` → `\`, and so on).
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                out.push(next);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Sorts paths by their final component using plain `str`/`OsStr`
/// ordering, standing in for the platform's alphanumeric collation
/// (what `strcoll` reduces to under the C/POSIX locale this core targets).
pub fn sort_by_collation(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
}

/// Resolves `name` against `$PATH`, returning the first executable match.
pub fn resolve_on_path(name: &str) -> Option<PathBuf> {
    if name.contains('/') {
        return is_executable(Path::new(name)).then(|| PathBuf::from(name));
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).find_map(|dir| {
        let candidate = dir.join(name);
        is_executable(&candidate).then_some(candidate)
    })
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_space() {
        assert_eq!(unescape(r"foo\ bar"), "foo bar");
    }

    #[test]
    fn unescape_backslash() {
        assert_eq!(unescape(r"foo\\bar"), r"foo\bar");
    }

    #[test]
    fn unescape_no_escapes() {
        assert_eq!(unescape("plain"), "plain");
    }

    #[test]
    fn unescape_trailing_backslash() {
        assert_eq!(unescape(r"foo\"), r"foo\");
    }

    #[test]
    fn sort_collation_orders_by_filename() {
        let mut paths = vec![
            PathBuf::from("/dir/c"),
            PathBuf::from("/dir/a"),
            PathBuf::from("/dir/b"),
        ];
        sort_by_collation(&mut paths);
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/dir/a"),
                PathBuf::from("/dir/b"),
                PathBuf::from("/dir/c"),
            ]
        );
    }

    #[test]
    fn random_name_has_requested_length() {
        assert_eq!(random_name().chars().count(), TEMPNAME_LENGTH);
    }
}
