//! Path resolution relative to the project root.

use std::path::{Path, PathBuf};

/// Join `value` onto `root` unless it is already absolute
pub fn resolve_path(root: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        root.join(value)
    }
}

/// Default project root when `--project-root` is not given.
///
/// A binary shipped next to the project's `CMakeLists.txt` builds that
/// project; otherwise the current directory is used.
pub fn default_project_root() -> std::io::Result<PathBuf> {
    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
        && dir.join("CMakeLists.txt").exists()
    {
        return Ok(dir.to_path_buf());
    }
    std::env::current_dir()
}

/// Make `root` absolute without requiring it to exist
pub fn absolute_root(root: &Path) -> std::io::Result<PathBuf> {
    if root.is_absolute() {
        return Ok(root.to_path_buf());
    }
    match root.canonicalize() {
        Ok(p) => Ok(p),
        Err(_) => Ok(std::env::current_dir()?.join(root)),
    }
}

/// First entry in `dir` whose extension is `ext`, if any
pub fn find_with_extension(dir: &Path, ext: &str) -> Option<PathBuf> {
    let mut matches: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .collect();
    matches.sort();
    matches.into_iter().next()
}
