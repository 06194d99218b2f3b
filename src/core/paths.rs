//! Output path derivation for compiled assets.
//!
//! The one subtle rule: the chosen base path (digest path or source-relative
//! path) supplies the directory and the stem, but the final extension is
//! always taken from the digest path, so a `style.scss` source compiled to
//! `style-<hash>.css` keeps its `.css` ending even in non-digest mode.

use crate::core::models::{Asset, CompileOptions};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Destination-relative output path for a compiled asset. No asset means an
/// empty path (missing/unresolvable assets are a no-op for the caller).
pub fn derive_asset_path(asset: Option<&Asset>, options: &CompileOptions) -> PathBuf {
    let Some(asset) = asset else {
        return PathBuf::new();
    };

    let base = if options.digest && !options.original_paths {
        asset.digest_path.clone()
    } else {
        strip_leading_separator(&asset.relative_path)
    };

    let stem = file_stem_complete(&base);
    let ext = asset
        .digest_path
        .extension()
        .and_then(OsStr::to_str)
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let dir = if options.original_paths {
        parent_of(&strip_leading_separator(&asset.relative_path))
    } else {
        parent_of(&base)
    };

    dir.join(format!("{}{}", stem, ext))
}

/// File name with its complete (multi-dot) extension removed.
pub fn file_stem_complete(path: &Path) -> String {
    let name = path.file_name().and_then(OsStr::to_str).unwrap_or_default();
    let ext = complete_extname(path);
    name[..name.len() - ext.len()].to_string()
}

/// Complete extension of a file name, covering compound forms like
/// `.tar.gz`. The extension is the longest trailing run of dot-separated
/// segments that each start with an ASCII letter, so version-like segments
/// (`app.v1.2.js`) stay in the stem. Returns "" when there is no extension.
pub fn complete_extname(path: &Path) -> String {
    let Some(name) = path.file_name().and_then(OsStr::to_str) else {
        return String::new();
    };
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() < 2 {
        return String::new();
    }

    let mut start = parts.len();
    for i in (1..parts.len()).rev() {
        let looks_like_ext = parts[i]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic());
        if looks_like_ext {
            start = i;
        } else {
            break;
        }
    }

    // dot-files like `.gitignore` have no extension
    if start == parts.len() || parts[..start].join(".").is_empty() {
        return String::new();
    }

    let mut ext = String::new();
    for seg in &parts[start..] {
        ext.push('.');
        ext.push_str(seg);
    }
    ext
}

/// Strip a single leading path separator, if present.
pub fn strip_leading_separator(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    let stripped = s
        .strip_prefix('/')
        .or_else(|| s.strip_prefix('\\'))
        .unwrap_or(&s);
    PathBuf::from(stripped)
}

fn parent_of(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::AssetKind;

    fn asset(relative: &str, digest_path: &str) -> Asset {
        Asset {
            logical_path: relative.trim_start_matches('/').to_string(),
            relative_path: PathBuf::from(relative),
            digest_path: PathBuf::from(digest_path),
            digest: "abcd1234".to_string(),
            mtime: None,
            kind: AssetKind::Bundled,
            buffer: Vec::new(),
            source: None,
            source_map: None,
        }
    }

    #[test]
    fn digest_mode_uses_digest_path() {
        let a = asset("css/style.scss", "css/style-abcd1234.css");
        let path = derive_asset_path(Some(&a), &CompileOptions::default());
        assert_eq!(path, PathBuf::from("css/style-abcd1234.css"));
    }

    #[test]
    fn non_digest_mode_keeps_relative_path_with_compiled_extension() {
        let a = asset("css/style.scss", "css/style-abcd1234.css");
        let options = CompileOptions {
            digest: false,
            ..Default::default()
        };
        // extension comes from the digest path, not from the source
        assert_eq!(
            derive_asset_path(Some(&a), &options),
            PathBuf::from("css/style.css")
        );
    }

    #[test]
    fn non_digest_mode_strips_single_leading_separator() {
        let a = asset("/app.js", "app-abcd1234.js");
        let options = CompileOptions {
            digest: false,
            ..Default::default()
        };
        assert_eq!(derive_asset_path(Some(&a), &options), PathBuf::from("app.js"));
    }

    #[test]
    fn original_paths_overrides_directory_but_keeps_compiled_extension() {
        let a = asset("css/style.scss", "assets/style-abcd1234.css");
        let options = CompileOptions {
            original_paths: true,
            ..Default::default()
        };
        assert_eq!(
            derive_asset_path(Some(&a), &options),
            PathBuf::from("css/style.css")
        );
    }

    #[test]
    fn missing_asset_derives_empty_path() {
        assert_eq!(
            derive_asset_path(None, &CompileOptions::default()),
            PathBuf::new()
        );
    }

    #[test]
    fn complete_extname_handles_multi_dot_names() {
        assert_eq!(complete_extname(Path::new("archive.tar.gz")), ".tar.gz");
        assert_eq!(complete_extname(Path::new("bundle.min.js")), ".min.js");
        assert_eq!(complete_extname(Path::new("style.css")), ".css");
        assert_eq!(complete_extname(Path::new("LICENSE")), "");
        assert_eq!(complete_extname(Path::new(".gitignore")), "");
    }

    #[test]
    fn complete_extname_leaves_version_segments_in_the_stem() {
        assert_eq!(complete_extname(Path::new("app.v1.2.js")), ".js");
        assert_eq!(
            complete_extname(Path::new("release.2024.tar.gz")),
            ".tar.gz"
        );
    }

    #[test]
    fn stem_and_extension_splitting_are_consistent() {
        for name in ["archive.tar.gz", "bundle.min.js", "app.v1.2.js", "LICENSE"] {
            let path = Path::new(name);
            let rebuilt = format!("{}{}", file_stem_complete(path), complete_extname(path));
            assert_eq!(rebuilt, name);
        }
    }

    #[test]
    fn multi_dot_stem_survives_non_digest_derivation() {
        let a = asset("vendor/jquery.min.js", "vendor/jquery.min-abcd1234.js");
        let options = CompileOptions {
            digest: false,
            ..Default::default()
        };
        assert_eq!(
            derive_asset_path(Some(&a), &options),
            PathBuf::from("vendor/jquery.js")
        );
    }
}
