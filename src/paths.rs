//! Containment checks for stored file paths
//!
//! File records hold paths relative to the output root. Nothing derived from
//! a record may be read unless it resolves to an existing regular file inside
//! that root, after symlinks are followed.

use crate::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Resolve `relative` against `root`, returning the absolute path of an
/// existing regular file inside `root`
///
/// # Errors
///
/// - [`Error::PathViolation`] if the path is absolute, climbs above the root,
///   or resolves (through symlinks) to a location outside the root
/// - [`Error::NotFound`] if the resolved location does not exist or is not a
///   regular file
pub fn resolve_within(root: &Path, relative: &Path) -> Result<PathBuf> {
    let violation = || Error::PathViolation {
        path: relative.to_path_buf(),
        root: root.to_path_buf(),
    };

    let mut normalized = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(violation());
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(violation()),
        }
    }

    let canonical_root = root
        .canonicalize()
        .map_err(|e| Error::NotFound(format!("output root {}: {}", root.display(), e)))?;

    let canonical = canonical_root
        .join(&normalized)
        .canonicalize()
        .map_err(|_| Error::NotFound(format!("file {}", relative.display())))?;

    if !canonical.starts_with(&canonical_root) {
        tracing::warn!(
            path = %relative.display(),
            "stored path resolves outside the output root"
        );
        return Err(violation());
    }

    if !canonical.is_file() {
        return Err(Error::NotFound(format!("file {}", relative.display())));
    }

    Ok(canonical)
}
