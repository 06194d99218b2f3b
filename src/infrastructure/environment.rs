use crate::core::interfaces::{
    AssetEnvironment, CompressorFn, Engine, EngineContext, HelperFn,
};
use crate::core::models::{Asset, AssetKind};
use crate::core::paths::{complete_extname, file_stem_complete};
use crate::utils::{Result, SproutError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::fs;

// A chain like `style.css.scss` resolves in two steps; anything deeper than
// this is a misconfigured engine cycle.
const MAX_ENGINE_CHAIN: usize = 8;

/// Concrete `AssetEnvironment` adapter: reads source files, runs the engine
/// chain selected by extension, digests the output and classifies it.
///
/// Engines, features, helpers and compressors live on the instance; nothing
/// is registered process-wide, so concurrent builds in one process cannot
/// leak configuration into each other.
pub struct PipelineEnvironment {
    root: PathBuf,
    search_paths: Vec<PathBuf>,
    features: HashSet<String>,
    engines: HashMap<String, Box<dyn Engine>>,
    engines_by_ext: HashMap<String, String>,
    helpers: HashMap<String, HelperFn>,
    js_compressor: Option<CompressorFn>,
    css_compressor: Option<CompressorFn>,
}

impl PipelineEnvironment {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            search_paths: Vec::new(),
            features: HashSet::new(),
            engines: HashMap::new(),
            engines_by_ext: HashMap::new(),
            helpers: HashMap::new(),
            js_compressor: None,
            css_compressor: None,
        }
    }

    pub fn enable(&mut self, feature: &str) {
        self.features.insert(feature.to_string());
    }

    pub fn is_enabled(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    /// Add an asset-lookup directory. Relative directories are joined onto
    /// the environment root.
    pub fn append_path(&mut self, dir: impl AsRef<Path>) {
        let dir = dir.as_ref();
        let resolved = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.root.join(dir)
        };
        self.search_paths.push(resolved);
    }

    pub fn register_helper(&mut self, name: &str, helper: HelperFn) {
        self.helpers.insert(name.to_string(), helper);
    }

    pub fn register_engine(&mut self, name: &str, engine: Box<dyn Engine>) {
        self.engines_by_ext
            .insert(engine.input_extension().to_string(), name.to_string());
        self.engines.insert(name.to_string(), engine);
    }

    /// Apply configuration settings to a registered engine. Settings for a
    /// name nobody registered are an error, matching the configuration
    /// failure surface of the build.
    pub fn configure_engine(&mut self, name: &str, settings: &serde_json::Value) -> Result<()> {
        match self.engines.get_mut(name) {
            Some(engine) => engine.configure(settings),
            None => Err(SproutError::invalid_engine(name)),
        }
    }

    pub fn set_js_compressor(&mut self, compressor: CompressorFn) {
        self.js_compressor = Some(compressor);
    }

    pub fn set_css_compressor(&mut self, compressor: CompressorFn) {
        self.css_compressor = Some(compressor);
    }

    /// Locate a source file: absolute existing paths win, otherwise the root
    /// and every appended search path are probed in order.
    fn locate(&self, path: &Path) -> Result<PathBuf> {
        if path.is_absolute() && path.is_file() {
            return Ok(path.to_path_buf());
        }
        for base in std::iter::once(&self.root).chain(self.search_paths.iter()) {
            let candidate = base.join(path);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        Err(SproutError::asset_not_found(path))
    }

    /// Path of `file` within the source tree (root first, then search
    /// paths); falls back to the bare file name for out-of-tree files.
    fn relative_path_of(&self, file: &Path) -> PathBuf {
        for base in std::iter::once(&self.root).chain(self.search_paths.iter()) {
            if let Ok(relative) = file.strip_prefix(base) {
                return relative.to_path_buf();
            }
        }
        file.file_name().map(PathBuf::from).unwrap_or_default()
    }

    /// Run the engine chain for `file_name` over `bytes`. Extensions are
    /// consumed right to left (`style.css.scss` → scss engine → `style.css`)
    /// until no engine claims the current extension.
    fn run_engine_chain(
        &self,
        relative: &Path,
        mut file_name: String,
        mut bytes: Vec<u8>,
    ) -> Result<(String, Vec<u8>)> {
        let relative_str = relative.to_string_lossy().replace('\\', "/");

        for _ in 0..MAX_ENGINE_CHAIN {
            let ext = match Path::new(&file_name).extension().and_then(OsStr::to_str) {
                Some(ext) => ext.to_lowercase(),
                None => break,
            };
            let Some(engine_name) = self.engines_by_ext.get(&ext) else {
                break;
            };
            let engine = &self.engines[engine_name];

            let source = String::from_utf8(bytes).map_err(|_| {
                SproutError::build(format!(
                    "engine {} requires UTF-8 source: {}",
                    engine_name, relative_str
                ))
            })?;
            let ctx = EngineContext::new(&relative_str, &self.helpers);
            bytes = engine.render(&source, &ctx)?.into_bytes();

            let stem = &file_name[..file_name.len() - ext.len() - 1];
            let output_ext = engine.output_extension();
            let already_chained = Path::new(stem)
                .extension()
                .and_then(OsStr::to_str)
                .is_some_and(|e| e.eq_ignore_ascii_case(output_ext));
            file_name = if already_chained {
                stem.to_string()
            } else {
                format!("{}.{}", stem, output_ext)
            };
        }

        Ok((file_name, bytes))
    }

    fn apply_compressor(&self, ext: &str, bytes: Vec<u8>, relative: &Path) -> Result<Vec<u8>> {
        let compressor = match ext {
            "js" | "mjs" => self.js_compressor.as_ref(),
            "css" => self.css_compressor.as_ref(),
            _ => None,
        };
        let Some(compressor) = compressor else {
            return Ok(bytes);
        };
        let source = String::from_utf8(bytes).map_err(|_| {
            SproutError::build(format!(
                "compressor requires UTF-8 output: {}",
                relative.display()
            ))
        })?;
        Ok(compressor(&source)?.into_bytes())
    }

    fn identity_source_map(&self, file_name: &str, relative: &Path) -> String {
        serde_json::json!({
            "version": 3,
            "file": file_name,
            "sources": [relative.to_string_lossy().replace('\\', "/")],
            "names": [],
            "mappings": "",
        })
        .to_string()
    }
}

#[async_trait]
impl AssetEnvironment for PipelineEnvironment {
    async fn resolve(&self, path: &Path) -> Result<Asset> {
        let file = self.locate(path)?;

        let metadata = fs::metadata(&file).await?;
        let mtime: Option<DateTime<Utc>> = metadata.modified().ok().map(DateTime::from);

        let bytes = fs::read(&file).await?;
        let relative = self.relative_path_of(&file);

        let source_name = relative
            .file_name()
            .and_then(OsStr::to_str)
            .ok_or_else(|| SproutError::asset_not_found(&file))?
            .to_string();
        let (file_name, bytes) = self.run_engine_chain(&relative, source_name, bytes)?;

        let compiled_ext = Path::new(&file_name)
            .extension()
            .and_then(OsStr::to_str)
            .unwrap_or("")
            .to_lowercase();
        let kind = AssetKind::from_output_extension(&compiled_ext);

        let bytes = if kind.is_bundled() {
            self.apply_compressor(&compiled_ext, bytes, &relative)?
        } else {
            bytes
        };

        let digest = blake3::hash(&bytes).to_hex().to_string();
        let dir = relative.parent().map(Path::to_path_buf).unwrap_or_default();

        let compiled_name = Path::new(&file_name);
        let digest_name = format!(
            "{}-{}{}",
            file_stem_complete(compiled_name),
            digest,
            complete_extname(compiled_name)
        );
        let digest_path = dir.join(digest_name);

        let logical_path = dir
            .join(&file_name)
            .to_string_lossy()
            .replace('\\', "/");
        let relative_path = relative.clone();

        let source = String::from_utf8(bytes.clone()).ok();
        let source_map = (self.is_enabled("source_maps") && kind.is_bundled())
            .then(|| self.identity_source_map(&file_name, &relative));

        Ok(Asset {
            logical_path,
            relative_path,
            digest_path,
            digest,
            mtime,
            kind,
            buffer: bytes,
            source,
            source_map,
        })
    }
}
