use crate::utils::{Result, SproutError};
use glob::glob;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Expand glob patterns under `src_dir` into an ordered, deduplicated list of
/// source files. Files without an extension (LICENSE, README) are excluded.
///
/// An empty result is an error unless `allow_none` is set.
pub fn resolve_input_files(
    src_dir: &Path,
    patterns: &[String],
    allow_none: bool,
) -> Result<Vec<PathBuf>> {
    let mut matched = BTreeSet::new();

    for pattern in patterns {
        let full = src_dir.join(pattern).to_string_lossy().into_owned();
        for entry in glob(&full)? {
            let path = entry.map_err(|e| SproutError::Io(e.into_error()))?;
            if !path.is_file() {
                continue;
            }
            if path.extension().is_none() {
                continue;
            }
            matched.insert(path);
        }
    }

    if matched.is_empty() && !allow_none {
        return Err(SproutError::NoInputFiles);
    }
    Ok(matched.into_iter().collect())
}
