use crate::core::models::Asset;
use crate::utils::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Helper callable registered into the environment, addressable by engines.
pub type HelperFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Post-compile compressor hook for bundled output (js or css).
pub type CompressorFn = Arc<dyn Fn(&str) -> Result<String> + Send + Sync>;

/// Compiled-asset backend. Resolves source files to immutable `Asset`s;
/// everything the manifest compiler knows about an asset comes through here.
#[async_trait]
pub trait AssetEnvironment: Send + Sync {
    /// Resolve one source file to its compiled asset.
    async fn resolve(&self, path: &Path) -> Result<Asset>;
}

/// Per-render context handed to engines, exposing the registered helpers.
pub struct EngineContext<'a> {
    pub logical_path: &'a str,
    helpers: &'a HashMap<String, HelperFn>,
}

impl<'a> EngineContext<'a> {
    pub fn new(logical_path: &'a str, helpers: &'a HashMap<String, HelperFn>) -> Self {
        Self {
            logical_path,
            helpers,
        }
    }

    pub fn helper(&self, name: &str) -> Option<&HelperFn> {
        self.helpers.get(name)
    }
}

/// One content transformation step, keyed by source extension.
///
/// Engines are supplied by the embedder and registered per environment
/// instance; this crate ships no language engines of its own.
pub trait Engine: Send + Sync {
    /// Extension this engine consumes, without the dot (e.g. "scss").
    fn input_extension(&self) -> &str;

    /// Extension of the compiled output (e.g. "css").
    fn output_extension(&self) -> &str;

    /// Transform the source text.
    fn render(&self, source: &str, ctx: &EngineContext<'_>) -> Result<String>;

    /// Apply settings from the `engines` configuration table.
    fn configure(&mut self, _settings: &serde_json::Value) -> Result<()> {
        Ok(())
    }
}

/// File system operations interface
#[async_trait]
pub trait FileSystemService: Send + Sync {
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write `bytes` to `path`, creating parent directories as needed and
    /// stamping atime/mtime with `mtime` (current time when absent).
    async fn write_bytes(
        &self,
        path: &Path,
        bytes: &[u8],
        mtime: Option<DateTime<Utc>>,
    ) -> Result<()>;

    async fn create_directory(&self, path: &Path) -> Result<()>;

    fn file_exists(&self, path: &Path) -> bool;
}
