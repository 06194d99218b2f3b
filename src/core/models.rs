use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Kind of artifact an environment produced for a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Concatenated/compiled artifact (js, css bundles)
    Bundled,
    /// Passthrough file served as-is (images, fonts, ...)
    Static,
}

impl AssetKind {
    pub fn from_output_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "css" => AssetKind::Bundled,
            _ => AssetKind::Static,
        }
    }

    pub fn is_bundled(self) -> bool {
        matches!(self, AssetKind::Bundled)
    }
}

/// Compiled build artifact for one logical source file.
///
/// Produced by an `AssetEnvironment` and immutable for the duration of a
/// compile pass.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Stable, source-relative identifier (compiled extension applied)
    pub logical_path: String,
    /// Path within the source tree
    pub relative_path: PathBuf,
    /// Content-hash-qualified output path
    pub digest_path: PathBuf,
    /// Content hash of the compiled bytes
    pub digest: String,
    pub mtime: Option<DateTime<Utc>>,
    pub kind: AssetKind,
    /// Compiled output bytes
    pub buffer: Vec<u8>,
    /// Textual output, present when the buffer is valid UTF-8
    pub source: Option<String>,
    /// Serialized source map document, when the environment produced one
    pub source_map: Option<String>,
}

impl Asset {
    /// Trailing comment pointing consumers at the asset's source map file.
    /// CSS gets the block-comment form, everything else the line form.
    pub fn mapping_url_comment(&self, map_file_name: &str) -> String {
        let ext = self
            .digest_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if ext.eq_ignore_ascii_case("css") {
            format!("\n/*# sourceMappingURL={} */\n", map_file_name)
        } else {
            format!("\n//# sourceMappingURL={}\n", map_file_name)
        }
    }
}

/// Options controlling one compile pass. Read-only during the pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileOptions {
    /// Content-hash output paths (cache busting)
    pub digest: bool,
    /// Preserve source directory structure instead of the digest directory
    pub original_paths: bool,
    pub source_maps: bool,
    pub embed_mapping_comments: bool,
    /// Emit gzip siblings for bundled assets
    pub compress: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            digest: true,
            original_paths: false,
            source_maps: false,
            embed_mapping_comments: false,
            compress: false,
        }
    }
}

/// One `files` record of the manifest document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestFileEntry {
    pub logical_path: String,
    /// Size in bytes of the written asset
    pub size: u64,
    pub mtime: Option<DateTime<Utc>>,
    pub digest: String,
}

/// Manifest emitted at the end of a compile pass.
///
/// `assets` maps logical paths to output relative paths; `files` maps output
/// relative paths to their metadata. Both are rebuilt from scratch on every
/// pass and never partially persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestDocument {
    pub assets: BTreeMap<String, String>,
    pub files: BTreeMap<String, ManifestFileEntry>,
}

impl ManifestDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one compiled asset. Recurring logical paths overwrite their
    /// previous entry (mapping semantics, not append).
    pub fn record(&mut self, asset: &Asset, output_path: &Path, size: u64) {
        let output = output_path.to_string_lossy().replace('\\', "/");
        self.assets
            .insert(asset.logical_path.clone(), output.clone());
        self.files.insert(
            output,
            ManifestFileEntry {
                logical_path: asset.logical_path.clone(),
                size,
                mtime: asset.mtime,
                digest: asset.digest.clone(),
            },
        );
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.files.is_empty()
    }

    /// Pretty-printed JSON, two-space indent.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Build configuration, loadable from `sprout.config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildConfig {
    pub src_dir: PathBuf,
    pub dest_dir: PathBuf,
    /// Glob patterns selecting source assets, relative to `src_dir`
    pub input_files: Vec<String>,
    pub digest: bool,
    pub original_paths: bool,
    /// Manifest file name at the destination root; `None` disables emission
    pub manifest: Option<String>,
    pub source_maps: bool,
    pub embed_mapping_comments: bool,
    pub compress: bool,
    /// Named environment features to enable
    pub enable: Vec<String>,
    /// Engine name -> engine settings
    pub engines: BTreeMap<String, serde_json::Value>,
    /// Additional asset-lookup directories (relative ones are joined onto
    /// `src_dir`)
    pub paths: Vec<String>,
    /// Tolerate zero matched input files
    pub allow_none: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from("."),
            dest_dir: PathBuf::from("dist"),
            input_files: vec!["**/*".to_string()],
            digest: true,
            original_paths: false,
            manifest: Some("manifest.json".to_string()),
            source_maps: false,
            embed_mapping_comments: false,
            compress: false,
            enable: Vec::new(),
            engines: BTreeMap::new(),
            paths: Vec::new(),
            allow_none: false,
        }
    }
}

impl BuildConfig {
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            digest: self.digest,
            original_paths: self.original_paths,
            source_maps: self.source_maps,
            embed_mapping_comments: self.embed_mapping_comments,
            compress: self.compress,
        }
    }
}

/// Summary of one finished build, for reporting.
#[derive(Debug, Default)]
pub struct BuildSummary {
    pub assets_written: usize,
    pub manifest_path: Option<PathBuf>,
    pub build_time: std::time::Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(logical: &str, digest_path: &str) -> Asset {
        Asset {
            logical_path: logical.to_string(),
            relative_path: PathBuf::from(logical),
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
    fn mapping_comment_uses_css_block_form_for_css() {
        let a = asset("style.css", "style-abcd1234.css");
        assert_eq!(
            a.mapping_url_comment("style.css.map"),
            "\n/*# sourceMappingURL=style.css.map */\n"
        );
    }

    #[test]
    fn mapping_comment_uses_line_form_for_js() {
        let a = asset("app.js", "app-abcd1234.js");
        assert_eq!(
            a.mapping_url_comment("app.js.map"),
            "\n//# sourceMappingURL=app.js.map\n"
        );
    }

    #[test]
    fn manifest_record_overwrites_recurring_logical_paths() {
        let mut manifest = ManifestDocument::new();
        let a = asset("app.js", "app-abcd1234.js");
        manifest.record(&a, Path::new("app-abcd1234.js"), 10);
        manifest.record(&a, Path::new("app-ffff0000.js"), 12);

        assert_eq!(manifest.assets.len(), 1);
        assert_eq!(manifest.assets["app.js"], "app-ffff0000.js");
        // both output paths remain keyed in files; the logical mapping moved
        assert_eq!(manifest.files.len(), 2);
    }

    #[test]
    fn compile_options_default_to_digest_only() {
        let options = CompileOptions::default();
        assert!(options.digest);
        assert!(!options.original_paths);
        assert!(!options.source_maps);
        assert!(!options.embed_mapping_comments);
        assert!(!options.compress);
    }

    #[test]
    fn manifest_serializes_camel_case_fields() {
        let mut manifest = ManifestDocument::new();
        let a = asset("app.js", "app-abcd1234.js");
        manifest.record(&a, Path::new("app-abcd1234.js"), 10);

        let json = manifest.to_pretty_json().unwrap();
        assert!(json.contains("\"logicalPath\""));
        assert!(json.contains("\"assets\""));
        assert!(json.contains("\"files\""));
    }
}
