use std::time::Instant;
use tracing::{debug, error, info, warn};

pub struct Logger;

impl Logger {
    pub fn init() {
        tracing_subscriber::fmt()
            .with_env_filter("sprout=info")
            .with_target(false)
            .init();
    }

    pub fn build_start(src: &str, dest: &str) {
        info!("🥦 Sprout - Asset Pipeline Build");
        info!("═══════════════════════════════════════");
        info!("📁 Source: {}", src);
        info!("📦 Destination: {}", dest);
    }

    pub fn found_assets(count: usize) {
        info!("📦 Found {} source assets", count);
    }

    pub fn no_assets_tolerated() {
        warn!("⚠️  No input files matched - continuing with an empty manifest");
    }

    pub fn compiling_asset(logical_path: &str) {
        debug!("⚡ Compiling: {}", logical_path);
    }

    pub fn wrote_asset(output_path: &str, size: usize) {
        debug!("💾 Wrote: {} ({} bytes)", output_path, size);
    }

    pub fn wrote_sibling(output_path: &str) {
        debug!("💾 Wrote sibling: {}", output_path);
    }

    pub fn manifest_written(path: &str, entries: usize) {
        info!("📄 Manifest: {} ({} entries)", path, entries);
    }

    pub fn manifest_disabled() {
        debug!("📄 Manifest emission disabled");
    }

    pub fn build_complete(assets: usize, build_time: std::time::Duration, dest: &str) {
        info!("");
        info!("📊 Build Statistics:");
        info!("  • Assets written: {}", assets);
        info!("  • Build time: {:.2?}", build_time);
        info!("  • Output directory: {}", dest);
        info!("");
        info!("✅ Build completed successfully!");
    }

    pub fn error(msg: &str) {
        error!("❌ {}", msg);
    }

    pub fn warn(msg: &str) {
        warn!("⚠️  {}", msg);
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        debug!("⏱️  Completed: {} in {:.2?}", self.name, self.elapsed());
    }
}
