use crate::config;
use crate::core::interfaces::FileSystemService;
use crate::core::services::SproutBuildService;
use crate::infrastructure::TokioFileSystemService;
use crate::utils::{Logger, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sprout")]
#[command(about = "Sprout - asset pipeline compiler with digest paths and build manifests")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile assets into a destination directory
    Build {
        /// Source directory
        #[arg(short, long, default_value = ".")]
        src: String,
        /// Destination directory
        #[arg(short, long, default_value = "dist")]
        dest: String,
        /// Glob patterns selecting source assets (defaults to the config
        /// file's patterns, or everything)
        patterns: Vec<String>,
        /// Disable content-hashed output paths
        #[arg(long)]
        no_digest: bool,
        /// Preserve source directory structure
        #[arg(long)]
        original_paths: bool,
        /// Manifest file name at the destination root
        #[arg(long)]
        manifest: Option<String>,
        /// Skip writing a manifest file
        #[arg(long, conflicts_with = "manifest")]
        no_manifest: bool,
        /// Emit source map files
        #[arg(long)]
        source_maps: bool,
        /// Append sourceMappingURL comments to written assets
        #[arg(long)]
        embed_mapping_comments: bool,
        /// Emit gzip siblings for bundled assets
        #[arg(long)]
        compress: bool,
        /// Succeed with an empty manifest when no files match
        #[arg(long)]
        allow_none: bool,
    },
    /// Show pipeline information
    Info,
}

pub struct CliHandler;

impl CliHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(&self) -> Result<()> {
        // Initialize logging
        Logger::init();

        let cli = Cli::parse();

        match cli.command {
            Commands::Build {
                src,
                dest,
                patterns,
                no_digest,
                original_paths,
                manifest,
                no_manifest,
                source_maps,
                embed_mapping_comments,
                compress,
                allow_none,
            } => {
                let mut config = config::load_config(Path::new(&src))?;
                config.src_dir = PathBuf::from(src);
                config.dest_dir = PathBuf::from(dest);
                if !patterns.is_empty() {
                    config.input_files = patterns;
                }
                if no_digest {
                    config.digest = false;
                }
                if original_paths {
                    config.original_paths = true;
                }
                if no_manifest {
                    config.manifest = None;
                } else if manifest.is_some() {
                    config.manifest = manifest;
                }
                config.source_maps |= source_maps;
                config.embed_mapping_comments |= embed_mapping_comments;
                config.compress |= compress;
                config.allow_none |= allow_none;

                let fs_service: Arc<dyn FileSystemService> = Arc::new(TokioFileSystemService);
                let build_service = SproutBuildService::new(fs_service);
                build_service.build(&config).await?;
                Ok(())
            }
            Commands::Info => self.handle_info_command(),
        }
    }

    fn handle_info_command(&self) -> Result<()> {
        tracing::info!("🥦 Sprout v{}", env!("CARGO_PKG_VERSION"));
        tracing::info!("══════════════════════════════════════");
        tracing::info!("Asset pipeline compiler");
        tracing::info!("");
        tracing::info!("🎯 Features:");
        tracing::info!("  • Glob-based input selection");
        tracing::info!("  • Content-hashed (digest) output paths");
        tracing::info!("  • JSON build manifest");
        tracing::info!("  • Gzip siblings for bundled assets");
        tracing::info!("  • Source map files with XSSI protection");
        tracing::info!("  • Pluggable per-build engine registry");

        Ok(())
    }
}

impl Default for CliHandler {
    fn default() -> Self {
        Self::new()
    }
}
