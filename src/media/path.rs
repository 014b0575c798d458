//! Path resolution for media references.
//!
//! A media reference is a path relative to the export directory. Resolution
//! canonicalizes it and refuses anything that lands outside the export
//! directory, whether through `..` components, an absolute path, or a symlink.

use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::MediaType;
use crate::error::SkipReason;

/// An existing, canonical file inside the base directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedPath {
    /// Canonical absolute path.
    pub path: PathBuf,
    /// Name of the immediate parent directory.
    pub parent: String,
}

impl ResolvedPath {
    /// Classifies the file by its parent directory.
    pub fn media_type(&self) -> MediaType {
        MediaType::from_dir_name(&self.parent)
    }

    /// Returns the file name, used as the output name.
    pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.path.file_name()
    }
}

/// Resolves `raw` against `base_dir`.
///
/// Every failure is logged and reported as a [`SkipReason`]; I/O problems
/// other than a missing file are reported as [`SkipReason::NotFound`].
pub fn resolve(base_dir: &Path, raw: &str) -> Result<ResolvedPath, SkipReason> {
    try_resolve(base_dir, raw).map_err(|rejection| {
        rejection.log(raw);
        rejection.reason()
    })
}

/// Same checks as [`resolve`], without logging.
///
/// For scans that run ahead of the pass that reports skipped media.
pub fn resolve_silent(base_dir: &Path, raw: &str) -> Result<ResolvedPath, SkipReason> {
    try_resolve(base_dir, raw).map_err(|rejection| rejection.reason())
}

enum Rejection {
    Unresolvable { path: PathBuf, err: io::Error },
    Escapes { resolved: PathBuf, base: PathBuf },
    Directory(PathBuf),
}

impl Rejection {
    fn reason(&self) -> SkipReason {
        match self {
            Rejection::Unresolvable { .. } => SkipReason::NotFound,
            Rejection::Escapes { .. } => SkipReason::OutOfBounds,
            Rejection::Directory(_) => SkipReason::IsDirectory,
        }
    }

    fn log(&self, raw: &str) {
        match self {
            Rejection::Unresolvable { path, err } if err.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "media skipped (not found)");
            }
            Rejection::Unresolvable { path, err } => {
                warn!(path = %path.display(), error = %err, "media skipped (unreadable)");
            }
            Rejection::Escapes { resolved, base } => {
                warn!(
                    path = %raw,
                    resolved = %resolved.display(),
                    base = %base.display(),
                    "media path escapes the export directory, skipping"
                );
            }
            Rejection::Directory(path) => {
                warn!(path = %path.display(), "media path is a directory, skipping");
            }
        }
    }
}

fn try_resolve(base_dir: &Path, raw: &str) -> Result<ResolvedPath, Rejection> {
    let candidate = base_dir.join(raw);

    let resolved = candidate
        .canonicalize()
        .map_err(|err| Rejection::Unresolvable {
            path: candidate.clone(),
            err,
        })?;
    let base = base_dir
        .canonicalize()
        .map_err(|err| Rejection::Unresolvable {
            path: base_dir.to_path_buf(),
            err,
        })?;

    if !resolved.starts_with(&base) {
        return Err(Rejection::Escapes { resolved, base });
    }

    if resolved.is_dir() {
        return Err(Rejection::Directory(resolved));
    }

    let parent = resolved
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(ResolvedPath {
        path: resolved,
        parent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_existing_file() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("photos")).unwrap();
        fs::write(dir.path().join("photos/p.jpg"), b"jpg").unwrap();

        let resolved = resolve(dir.path(), "photos/p.jpg").unwrap();
        assert!(resolved.path.is_absolute());
        assert_eq!(resolved.parent, "photos");
        assert_eq!(resolved.media_type(), MediaType::Photo);
        assert_eq!(resolved.file_name().unwrap(), "p.jpg");
    }

    #[test]
    fn test_resolve_missing_file() {
        let dir = tempdir().unwrap();
        assert_eq!(
            resolve(dir.path(), "photos/missing.jpg"),
            Err(SkipReason::NotFound)
        );
    }

    #[test]
    fn test_resolve_directory() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("photos")).unwrap();
        assert_eq!(resolve(dir.path(), "photos"), Err(SkipReason::IsDirectory));
    }

    #[test]
    fn test_resolve_parent_traversal() {
        let root = tempdir().unwrap();
        let base = root.path().join("export");
        fs::create_dir(&base).unwrap();
        fs::write(root.path().join("secret.txt"), b"secret").unwrap();

        assert_eq!(resolve(&base, "../secret.txt"), Err(SkipReason::OutOfBounds));
    }

    #[test]
    fn test_resolve_absolute_path_outside() {
        let root = tempdir().unwrap();
        let base = root.path().join("export");
        fs::create_dir(&base).unwrap();
        let outside = root.path().join("outside.bin");
        fs::write(&outside, b"x").unwrap();

        assert_eq!(
            resolve(&base, outside.to_str().unwrap()),
            Err(SkipReason::OutOfBounds)
        );
    }

    #[test]
    fn test_resolve_dotdot_that_stays_inside() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("photos")).unwrap();
        fs::create_dir(dir.path().join("files")).unwrap();
        fs::write(dir.path().join("files/a.txt"), b"a").unwrap();

        let resolved = resolve(dir.path(), "photos/../files/a.txt").unwrap();
        assert_eq!(resolved.parent, "files");
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_symlink_escape() {
        let root = tempdir().unwrap();
        let base = root.path().join("export");
        fs::create_dir_all(base.join("photos")).unwrap();
        fs::write(root.path().join("secret.jpg"), b"secret").unwrap();
        std::os::unix::fs::symlink(root.path().join("secret.jpg"), base.join("photos/link.jpg"))
            .unwrap();

        assert_eq!(resolve(&base, "photos/link.jpg"), Err(SkipReason::OutOfBounds));
    }

    #[test]
    fn test_resolve_silent_agrees_with_resolve() {
        let root = tempdir().unwrap();
        let base = root.path().join("export");
        fs::create_dir_all(base.join("photos")).unwrap();
        fs::write(base.join("photos/p.jpg"), b"jpg").unwrap();
        fs::write(root.path().join("secret.txt"), b"secret").unwrap();

        for raw in ["photos/p.jpg", "photos/missing.jpg", "photos", "../secret.txt"] {
            assert_eq!(resolve_silent(&base, raw), resolve(&base, raw), "{raw}");
        }
    }
}
