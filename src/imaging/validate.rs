//! Source/destination checks shared by both operations.
//!
//! [`Endpoints::resolve`] is the single validation step every operation runs
//! before touching pixels. It answers two questions: can the source be read,
//! and can the target be written?

use super::backend::ImagingError;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// A validated source and the file the result will be written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub source: PathBuf,
    pub target: PathBuf,
}

impl Endpoints {
    /// Validate `source` and the optional `dest`.
    ///
    /// Without a destination the source is overwritten, so it must be writable.
    /// A destination that is an existing directory is accepted as-is; callers
    /// that support it pick a file name inside it.
    pub fn resolve(source: &Path, dest: Option<&Path>) -> Result<Self, ImagingError> {
        ensure_readable_source(source)?;

        let target = match dest {
            Some(dest) => {
                ensure_writable_destination(dest)?;
                dest.to_path_buf()
            }
            None => {
                if is_read_only(source) {
                    return Err(ImagingError::Validation(format!(
                        "Insufficient privileges to write to {}",
                        source.display()
                    )));
                }
                source.to_path_buf()
            }
        };

        Ok(Self {
            source: source.to_path_buf(),
            target,
        })
    }

    /// Whether the target is the source file itself.
    pub fn in_place(&self) -> bool {
        same_file(&self.source, &self.target)
    }
}

fn ensure_readable_source(path: &Path) -> Result<(), ImagingError> {
    if !path.is_file() {
        return Err(ImagingError::Validation(format!(
            "Source file {} does not exist",
            path.display()
        )));
    }
    File::open(path).map_err(|e| {
        ImagingError::Validation(format!("Source file {} is not readable: {e}", path.display()))
    })?;
    Ok(())
}

fn ensure_writable_destination(path: &Path) -> Result<(), ImagingError> {
    let dir = if path.is_dir() {
        path
    } else {
        match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    };

    if !dir.is_dir() {
        return Err(ImagingError::Validation(format!(
            "Destination directory {} does not exist",
            dir.display()
        )));
    }
    if is_read_only(dir) {
        return Err(ImagingError::Validation(format!(
            "Destination directory {} is not writable",
            dir.display()
        )));
    }
    Ok(())
}

fn is_read_only(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.permissions().readonly())
        .unwrap_or(true)
}

/// Compare two paths by their canonical form. Paths that don't exist yet are never the same file.
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
