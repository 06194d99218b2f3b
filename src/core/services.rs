use crate::core::interfaces::*;
use crate::core::models::*;
use crate::core::paths::derive_asset_path;
use crate::infrastructure::compress::gzip;
use crate::infrastructure::environment::PipelineEnvironment;
use crate::infrastructure::inputs::resolve_input_files;
use crate::utils::{Logger, Result, Timer};
use std::borrow::Cow;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// 4-byte guard prepended to source map files so a JSON-like payload cannot
/// be executed as a script when fetched cross-origin.
pub const XSSI_PREFIX: &[u8] = b")]}'\n";

/// The core compile routine: turns an ordered list of source files into
/// written artifacts plus a manifest document.
///
/// One instance serves one pass against one destination directory; failures
/// propagate immediately and leave the destination partially written.
pub struct ManifestCompiler {
    environment: Arc<dyn AssetEnvironment>,
    fs: Arc<dyn FileSystemService>,
    dest_dir: PathBuf,
    manifest_path: Option<PathBuf>,
}

impl ManifestCompiler {
    pub fn new(
        environment: Arc<dyn AssetEnvironment>,
        fs: Arc<dyn FileSystemService>,
        dest_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            environment,
            fs,
            dest_dir: dest_dir.into(),
            manifest_path: None,
        }
    }

    /// Enable manifest emission under the given file name at the destination
    /// root. Without this the pass writes assets only.
    pub fn with_manifest(mut self, file_name: &str) -> Self {
        self.manifest_path = Some(self.dest_dir.join(file_name));
        self
    }

    pub fn manifest_path(&self) -> Option<&Path> {
        self.manifest_path.as_deref()
    }

    /// Compile every input file, in order, writing artifacts into the
    /// destination directory and returning the populated manifest.
    pub async fn compile(
        &self,
        files: &[PathBuf],
        options: &CompileOptions,
    ) -> Result<ManifestDocument> {
        let _timer = Timer::start("manifest compile");
        let mut manifest = ManifestDocument::new();

        for file in files {
            let asset = self.environment.resolve(file).await?;
            Logger::compiling_asset(&asset.logical_path);

            let output_path = derive_asset_path(Some(&asset), options);
            let dest_file = self.dest_dir.join(&output_path);

            let bytes = self.asset_bytes(&asset, &output_path, options);
            manifest.record(&asset, &output_path, bytes.len() as u64);

            self.fs.write_bytes(&dest_file, &bytes, asset.mtime).await?;
            Logger::wrote_asset(&output_path.to_string_lossy(), bytes.len());

            if asset.kind.is_bundled() && options.compress {
                let sibling = with_suffix(&dest_file, ".gz");
                self.fs
                    .write_bytes(&sibling, &gzip(&bytes)?, asset.mtime)
                    .await?;
                Logger::wrote_sibling(&sibling.to_string_lossy());
            }

            if let Some(map) = &asset.source_map {
                let payload = xssi_guarded(map);
                let map_file = with_suffix(&dest_file, ".map");
                self.fs
                    .write_bytes(&map_file, &payload, asset.mtime)
                    .await?;
                Logger::wrote_sibling(&map_file.to_string_lossy());

                if options.compress {
                    let sibling = with_suffix(&dest_file, ".map.gz");
                    self.fs
                        .write_bytes(&sibling, &gzip(&payload)?, asset.mtime)
                        .await?;
                    Logger::wrote_sibling(&sibling.to_string_lossy());
                }
            }
        }

        match &self.manifest_path {
            Some(manifest_path) => {
                let json = manifest.to_pretty_json()?;
                self.fs
                    .write_bytes(manifest_path, json.as_bytes(), None)
                    .await?;
                Logger::manifest_written(&manifest_path.to_string_lossy(), manifest.assets.len());
            }
            None => Logger::manifest_disabled(),
        }

        Ok(manifest)
    }

    /// Bytes to write for an asset: the raw compiled buffer, or (when both
    /// mapping-comment embedding and source maps are on and a map exists)
    /// the textual source with a trailing comment referencing the map file.
    fn asset_bytes<'a>(
        &self,
        asset: &'a Asset,
        output_path: &Path,
        options: &CompileOptions,
    ) -> Cow<'a, [u8]> {
        if options.embed_mapping_comments && options.source_maps && asset.source_map.is_some() {
            if let Some(source) = &asset.source {
                let map_name = format!(
                    "{}.map",
                    output_path
                        .file_name()
                        .and_then(OsStr::to_str)
                        .unwrap_or_default()
                );
                let annotated = format!("{}{}", source, asset.mapping_url_comment(&map_name));
                return Cow::Owned(annotated.into_bytes());
            }
        }
        Cow::Borrowed(&asset.buffer)
    }
}

fn xssi_guarded(map: &str) -> Vec<u8> {
    let mut payload = Vec::with_capacity(XSSI_PREFIX.len() + map.len());
    payload.extend_from_slice(XSSI_PREFIX);
    payload.extend_from_slice(map.as_bytes());
    payload
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}

type EngineFactory = Box<dyn Fn() -> Box<dyn Engine> + Send + Sync>;

/// Driver for one-shot builds: expands input globs, configures a fresh
/// environment per pass and runs the manifest compiler against it.
pub struct SproutBuildService {
    fs: Arc<dyn FileSystemService>,
    engine_factories: HashMap<String, EngineFactory>,
    helpers: HashMap<String, HelperFn>,
    js_compressor: Option<CompressorFn>,
    css_compressor: Option<CompressorFn>,
}

impl SproutBuildService {
    pub fn new(fs: Arc<dyn FileSystemService>) -> Self {
        Self {
            fs,
            engine_factories: HashMap::new(),
            helpers: HashMap::new(),
            js_compressor: None,
            css_compressor: None,
        }
    }

    /// Register an engine under its configuration name. A fresh engine is
    /// built for every pass so settings never leak across builds.
    pub fn with_engine<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Engine> + Send + Sync + 'static,
    {
        self.engine_factories
            .insert(name.to_string(), Box::new(factory));
        self
    }

    pub fn with_helper(mut self, name: &str, helper: HelperFn) -> Self {
        self.helpers.insert(name.to_string(), helper);
        self
    }

    pub fn with_js_compressor(mut self, compressor: CompressorFn) -> Self {
        self.js_compressor = Some(compressor);
        self
    }

    pub fn with_css_compressor(mut self, compressor: CompressorFn) -> Self {
        self.css_compressor = Some(compressor);
        self
    }

    /// Run one build pass. Strictly sequential; the first failure aborts the
    /// pass and surfaces to the caller.
    pub async fn build(&self, config: &BuildConfig) -> Result<BuildSummary> {
        let start = Instant::now();
        Logger::build_start(
            &config.src_dir.to_string_lossy(),
            &config.dest_dir.to_string_lossy(),
        );

        let files =
            resolve_input_files(&config.src_dir, &config.input_files, config.allow_none)?;
        if files.is_empty() {
            Logger::no_assets_tolerated();
        } else {
            Logger::found_assets(files.len());
        }

        let environment = self.configure_environment(config)?;
        let environment: Arc<dyn AssetEnvironment> = Arc::new(environment);

        let mut compiler = ManifestCompiler::new(environment, self.fs.clone(), &config.dest_dir);
        if let Some(name) = &config.manifest {
            compiler = compiler.with_manifest(name);
        }

        let options = config.compile_options();
        let manifest = compiler.compile(&files, &options).await?;

        let summary = BuildSummary {
            assets_written: manifest.files.len(),
            manifest_path: compiler.manifest_path().map(Path::to_path_buf),
            build_time: start.elapsed(),
        };
        Logger::build_complete(
            summary.assets_written,
            summary.build_time,
            &config.dest_dir.to_string_lossy(),
        );
        Ok(summary)
    }

    fn configure_environment(&self, config: &BuildConfig) -> Result<PipelineEnvironment> {
        let mut environment = PipelineEnvironment::new(&config.src_dir);

        for (name, factory) in &self.engine_factories {
            environment.register_engine(name, factory());
        }
        // settings for a name nobody registered are a configuration error
        for (name, settings) in &config.engines {
            environment.configure_engine(name, settings)?;
        }

        for feature in &config.enable {
            environment.enable(feature);
        }
        if config.source_maps {
            environment.enable("source_maps");
        }

        for (name, helper) in &self.helpers {
            environment.register_helper(name, helper.clone());
        }
        if let Some(compressor) = &self.js_compressor {
            environment.set_js_compressor(compressor.clone());
        }
        if let Some(compressor) = &self.css_compressor {
            environment.set_css_compressor(compressor.clone());
        }

        for dir in &config.paths {
            environment.append_path(dir);
        }

        Ok(environment)
    }
}
