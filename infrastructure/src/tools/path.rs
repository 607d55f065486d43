//! Path resolution for filesystem tools
//!
//! Paths the model sends are user-facing strings: `~` expands to the home
//! directory and relative paths resolve against the session's working
//! directory. The result is always absolute and lexically normalized, so
//! envelopes report the same path no matter how the model spelled it.

use std::path::{Component, Path, PathBuf};

/// Resolves tool path arguments against a base directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    base: PathBuf,
}

impl PathResolver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: normalize(&base.into()),
        }
    }

    /// Resolver rooted at the process's current directory.
    pub fn current_dir() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Expand `~`, anchor relative paths at the base, drop `.` and `..`.
    pub fn resolve(&self, raw: &str) -> PathBuf {
        let expanded = expand_home(raw);
        let absolute = if expanded.is_absolute() {
            expanded
        } else {
            self.base.join(expanded)
        };
        normalize(&absolute)
    }
}

fn expand_home(raw: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (raw, home) {
        ("~", Some(home)) => home,
        (raw, Some(home)) if raw.starts_with("~/") => home.join(&raw[2..]),
        (raw, _) => PathBuf::from(raw),
    }
}

/// Lexical normalization. The target may not exist yet (edit_file creates
/// files), so this never touches the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths_join_base() {
        let resolver = PathResolver::new("/work/project");
        assert_eq!(
            resolver.resolve("src/main.rs"),
            PathBuf::from("/work/project/src/main.rs")
        );
        assert_eq!(resolver.resolve("."), PathBuf::from("/work/project"));
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let resolver = PathResolver::new("/work");
        assert_eq!(resolver.resolve("/etc/hosts"), PathBuf::from("/etc/hosts"));
    }

    #[test]
    fn test_dot_segments_are_normalized() {
        let resolver = PathResolver::new("/work/project");
        assert_eq!(
            resolver.resolve("./a/../b/./c.txt"),
            PathBuf::from("/work/project/b/c.txt")
        );
        assert_eq!(resolver.resolve("../other"), PathBuf::from("/work/other"));
    }

    #[test]
    fn test_home_expansion() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let resolver = PathResolver::new("/work");
        assert_eq!(resolver.resolve("~"), normalize(&home));
        assert_eq!(resolver.resolve("~/notes.md"), normalize(&home.join("notes.md")));
        // Only a leading `~/` expands.
        assert_eq!(resolver.resolve("a/~/b"), PathBuf::from("/work/a/~/b"));
    }
}
