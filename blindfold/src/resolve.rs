//! Locating the engine executable.

use std::path::{Path, PathBuf};

/// Directories checked after `PATH`; distro packages often install engines
/// under `/usr/games`.
const FALLBACK_DIRS: &[&str] = &["/usr/games", "/usr/local/bin", "/opt/homebrew/bin"];

/// Resolve an engine name or path to an executable.
///
/// The resolution strategy is:
/// 1. Anything with a directory component is used as-is.
/// 2. Otherwise each `PATH` entry, then [`FALLBACK_DIRS`], is searched for an
///    executable file of that name.
/// 3. If nothing matches, the name is returned unchanged and spawning it
///    reports the failure.
pub fn resolve_engine_path(engine: &str) -> PathBuf {
    let path = Path::new(engine);
    if path.is_absolute() || path.components().count() > 1 {
        return path.to_path_buf();
    }

    let search_path = std::env::var_os("PATH");
    let dirs = search_path
        .iter()
        .flat_map(|paths| std::env::split_paths(paths).collect::<Vec<_>>())
        .chain(FALLBACK_DIRS.iter().map(PathBuf::from));

    match find_in_dirs(engine, dirs) {
        Some(found) => {
            tracing::debug!("Resolved engine '{}' to {:?}", engine, found);
            found
        }
        None => {
            tracing::debug!("Engine '{}' not found in search path", engine);
            PathBuf::from(engine)
        }
    }
}

fn find_in_dirs(name: &str, dirs: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    dirs.into_iter()
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn make_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;

        fs::write(path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_path_with_directory_is_kept() {
        assert_eq!(
            resolve_engine_path("./engines/stockfish"),
            PathBuf::from("./engines/stockfish")
        );
        assert_eq!(
            resolve_engine_path("/opt/engines/lc0"),
            PathBuf::from("/opt/engines/lc0")
        );
    }

    #[test]
    fn test_unknown_name_passes_through() {
        let name = "blindfold-test-engine-that-does-not-exist";
        assert_eq!(resolve_engine_path(name), PathBuf::from(name));
    }

    #[cfg(unix)]
    #[test]
    fn test_find_in_dirs_skips_non_executables() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(first.path().join("fish"), "not executable").unwrap();
        make_executable(&second.path().join("fish"));

        let found = find_in_dirs(
            "fish",
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
        );
        assert_eq!(found, Some(second.path().join("fish")));
    }

    #[test]
    fn test_find_in_dirs_none() {
        let empty = TempDir::new().unwrap();
        assert_eq!(find_in_dirs("fish", vec![empty.path().to_path_buf()]), None);
    }
}
