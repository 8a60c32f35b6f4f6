use std::path::{Component, Path, PathBuf};

/// Lexically absolutize `path` against `cwd`, folding `.` and `..`
/// components without touching the filesystem. Symlinks are deliberately not
/// resolved: the identity of a script is the path the user invoked it by,
/// and resolving links would make the digest depend on disk state.
#[must_use]
pub fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
