//! Path helpers shared by the pattern store and its callers.

use std::path::{Component, Path, PathBuf};

/// Version-control metadata directory, never traversed or matched into.
pub const VCS_DIR: &str = ".git";

/// Normalize a workspace-relative path.
///
/// Backslashes become `/`, `.` components are dropped. Returns `None` for
/// the empty path, `.`, absolute paths and paths that climb out with `..`.
pub fn normalize_relative(path: &Path) -> Option<PathBuf> {
    let unified = path.to_string_lossy().replace('\\', "/");
    let mut normalized = PathBuf::new();

    for component in Path::new(&unified).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if normalized.as_os_str().is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Express `path` relative to `root` using `/` separators.
///
/// Returns an empty string for the root itself and `None` when `path`
/// lies outside `root`.
pub fn relative_to(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Lowercase extension without the dot, empty when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_relative() {
        assert_eq!(
            normalize_relative(Path::new("./src/lib.rs")),
            Some(PathBuf::from("src/lib.rs"))
        );
        assert_eq!(
            normalize_relative(Path::new("src\\nested\\mod.rs")),
            Some(PathBuf::from("src/nested/mod.rs"))
        );
        assert_eq!(
            normalize_relative(Path::new("build/")),
            Some(PathBuf::from("build"))
        );
        assert_eq!(normalize_relative(Path::new("")), None);
        assert_eq!(normalize_relative(Path::new(".")), None);
        assert_eq!(normalize_relative(Path::new("../outside")), None);
        assert_eq!(normalize_relative(Path::new("/etc/passwd")), None);
    }

    #[test]
    fn test_relative_to() {
        let root = Path::new("/work/project");
        assert_eq!(
            relative_to(root, Path::new("/work/project/src/a.ts")),
            Some("src/a.ts".to_string())
        );
        assert_eq!(relative_to(root, root), Some(String::new()));
        assert_eq!(relative_to(root, Path::new("/work/other/a.ts")), None);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("src/App.TSX")), "tsx");
        assert_eq!(extension_of(Path::new("Makefile")), "");
        assert_eq!(extension_of(Path::new("archive.tar.gz")), "gz");
    }
}
