//! Input path validation

use std::path::{Component, Path, PathBuf};

use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};

/// Extension an input file must carry
pub const CSV_EXTENSION: &str = "csv";

/// Check that `path` names an existing regular file with a `.csv` extension.
///
/// Runs before the pipeline starts so a bad path never creates an output file.
pub fn validate_input_path(path: &Path) -> ConversionResult<()> {
    if !has_csv_extension(path) {
        return Err(ConversionError::conversion(ConversionErrorKind::NotCsv {
            path: path.to_path_buf(),
        }));
    }

    if !path.exists() {
        return Err(ConversionError::conversion(
            ConversionErrorKind::InputNotFound {
                path: path.to_path_buf(),
            },
        ));
    }

    if !path.is_file() {
        return Err(ConversionError::conversion(ConversionErrorKind::NotAFile {
            path: path.to_path_buf(),
        }));
    }

    Ok(())
}

pub fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case(CSV_EXTENSION))
}

/// True when `a` and `b` name the same file once `.`, `..` and symlinks are
/// resolved. Either path may not exist yet.
pub fn is_same_path(a: &Path, b: &Path) -> bool {
    resolve_path(a) == resolve_path(b)
}

/// Canonicalize the longest existing ancestor of `path` and apply the
/// remaining components lexically.
fn resolve_path(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut rest = Vec::new();
    loop {
        let base = if existing.as_os_str().is_empty() {
            Path::new(".")
        } else {
            existing
        };
        if let Ok(mut resolved) = base.canonicalize() {
            for part in rest.iter().rev() {
                match part {
                    Component::ParentDir => {
                        resolved.pop();
                    }
                    Component::CurDir => {}
                    other => resolved.push(other),
                }
            }
            return resolved;
        }
        match (existing.parent(), existing.components().next_back()) {
            (Some(parent), Some(last)) => {
                rest.push(last);
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}
