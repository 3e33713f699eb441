use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Resolves `path` to the canonical absolute form used as a tracked-path key.
///
/// Symlinks and `.`/`..` segments are resolved through the filesystem. When the
/// path does not exist (a deleted file, say) the longest existing ancestor is
/// canonicalized and the remaining components are appended lexically, so two
/// spellings of the same location still map to one key. If nothing can be
/// resolved the lexically cleaned absolute path is returned.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let absolute = make_absolute(path).unwrap_or_else(|_| path.to_path_buf());
    if let Ok(canonical) = absolute.canonicalize() {
        return canonical;
    }

    let cleaned = clean(&absolute);
    let mut ancestor = cleaned.as_path();
    let mut tail: Vec<&std::ffi::OsStr> = Vec::new();

    while let Some(parent) = ancestor.parent() {
        if let Some(name) = ancestor.file_name() {
            tail.push(name);
        }
        ancestor = parent;
        if let Ok(mut resolved) = ancestor.canonicalize() {
            for name in tail.iter().rev() {
                resolved.push(name);
            }
            return resolved;
        }
    }

    cleaned
}

/// Lexically removes `.` and resolves `..` without touching the filesystem.
fn clean(path: &Path) -> PathBuf {
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

/// Makes `path` relative to `base` for display; paths outside `base` are
/// returned unchanged.
#[must_use]
pub fn normalize_to_relative(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.strip_prefix(base).unwrap_or(path).to_path_buf()
    } else {
        path.to_path_buf()
    }
}

/// Ensures parent directories exist for a given path
///
/// # Errors
///
/// Returns an error if the parent directories cannot be created
pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create parent directories for {}", path.display())
        })?;
    }
    Ok(())
}

/// Expands tilde in path to home directory
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    if let Some(path_str) = path.to_str() {
        if path_str.starts_with("~/") || path_str == "~" {
            let home = dirs::home_dir().context("Could not find home directory")?;
            if path_str == "~" {
                Ok(home)
            } else {
                Ok(home.join(&path_str[2..]))
            }
        } else {
            Ok(path.to_path_buf())
        }
    } else {
        Ok(path.to_path_buf())
    }
}

/// Makes a path absolute, resolving relative paths from current directory
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined
pub fn make_absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir()?;
        Ok(current_dir.join(path))
    }
}

/// Resolves a user-supplied path against the watched root.
///
/// Accepts `~/`-prefixed, absolute, or root-relative input and returns the
/// normalized absolute form.
///
/// # Errors
///
/// Returns an error if a `~/` path is given and the home directory is unknown.
pub fn resolve_against_root(input: &Path, root: &Path) -> Result<PathBuf> {
    let expanded = expand_tilde(input)?;
    let joined = if expanded.is_absolute() {
        expanded
    } else {
        root.join(expanded)
    };
    Ok(normalize(&joined))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_resolves_dot_segments() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;
        fs::create_dir_all(root.join("a/b"))?;
        fs::write(root.join("a/b/file.txt"), "x")?;

        let messy = root.join("a/./b/../b/file.txt");
        assert_eq!(normalize(&messy), root.join("a/b/file.txt"));
        assert_eq!(normalize(&normalize(&messy)), normalize(&messy));
        Ok(())
    }

    #[test]
    fn test_normalize_missing_file_uses_existing_ancestor() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;

        let missing = temp_dir.path().join("gone/deeper/file.txt");
        assert_eq!(normalize(&missing), root.join("gone/deeper/file.txt"));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_follows_symlinks() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;
        fs::create_dir(root.join("real"))?;
        fs::write(root.join("real/notes.txt"), "A")?;
        std::os::unix::fs::symlink(root.join("real"), root.join("alias"))?;

        assert_eq!(
            normalize(&root.join("alias/notes.txt")),
            normalize(&root.join("real/notes.txt"))
        );
        Ok(())
    }

    #[test]
    fn test_normalize_to_relative() {
        let base = PathBuf::from("/home/user");
        let path = PathBuf::from("/home/user/documents/file.txt");

        let result = normalize_to_relative(&path, &base);
        assert_eq!(result, PathBuf::from("documents/file.txt"));

        let outside = PathBuf::from("/etc/hosts");
        assert_eq!(normalize_to_relative(&outside, &base), outside);
    }

    #[test]
    fn test_ensure_parent_dirs() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let nested_file = temp_dir.path().join("a/b/c/file.txt");

        ensure_parent_dirs(&nested_file)?;
        assert!(temp_dir.path().join("a/b/c").is_dir());
        Ok(())
    }

    #[test]
    fn test_make_absolute() -> Result<()> {
        let absolute = PathBuf::from("/absolute/path");
        assert_eq!(make_absolute(&absolute)?, absolute);

        let relative = PathBuf::from("relative/path");
        let result = make_absolute(&relative)?;
        assert!(result.is_absolute());
        assert!(result.ends_with("relative/path"));
        Ok(())
    }

    #[test]
    fn test_resolve_against_root() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;
        fs::write(root.join("scratch.tmp"), "new")?;

        assert_eq!(
            resolve_against_root(Path::new("scratch.tmp"), &root)?,
            root.join("scratch.tmp")
        );
        assert_eq!(
            resolve_against_root(&root.join("scratch.tmp"), &root)?,
            root.join("scratch.tmp")
        );
        Ok(())
    }
}
