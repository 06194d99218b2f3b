use async_trait::async_trait;
use sprout::core::interfaces::AssetEnvironment;
use sprout::core::models::{Asset, AssetKind, CompileOptions, ManifestDocument};
use sprout::core::services::ManifestCompiler;
use sprout::infrastructure::TokioFileSystemService;
use sprout::utils::{Result, SproutError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Environment stub serving pre-built assets, for driving the compiler
/// without a real source tree.
struct StubEnvironment {
    assets: HashMap<PathBuf, Asset>,
}

impl StubEnvironment {
    fn new(assets: Vec<(&str, Asset)>) -> Arc<Self> {
        Arc::new(Self {
            assets: assets
                .into_iter()
                .map(|(path, asset)| (PathBuf::from(path), asset))
                .collect(),
        })
    }
}

#[async_trait]
impl AssetEnvironment for StubEnvironment {
    async fn resolve(&self, path: &Path) -> Result<Asset> {
        self.assets
            .get(path)
            .cloned()
            .ok_or_else(|| SproutError::asset_not_found(path))
    }
}

fn asset(logical: &str, kind: AssetKind, content: &[u8]) -> Asset {
    let digest = blake3::hash(content).to_hex().to_string();
    let relative = PathBuf::from(logical);
    let stem = relative.file_stem().unwrap().to_string_lossy();
    let ext = relative.extension().unwrap().to_string_lossy();
    let digest_name = format!("{}-{}.{}", stem, digest, ext);
    let digest_path = relative
        .parent()
        .map(|d| d.join(&digest_name))
        .unwrap_or_else(|| PathBuf::from(&digest_name));

    Asset {
        logical_path: logical.to_string(),
        relative_path: relative,
        digest_path,
        digest,
        mtime: None,
        kind,
        buffer: content.to_vec(),
        source: String::from_utf8(content.to_vec()).ok(),
        source_map: None,
    }
}

fn compiler(env: Arc<dyn AssetEnvironment>, dest: &Path) -> ManifestCompiler {
    ManifestCompiler::new(env, Arc::new(TokioFileSystemService), dest).with_manifest("manifest.json")
}

#[tokio::test]
async fn test_resolution_failure_propagates_and_leaves_partial_output() {
    let temp = TempDir::new().unwrap();
    let env = StubEnvironment::new(vec![("a.js", asset("a.js", AssetKind::Bundled, b"a();"))]);
    let compiler = compiler(env, temp.path());

    let files = vec![PathBuf::from("a.js"), PathBuf::from("missing.js")];
    let err = compiler
        .compile(&files, &CompileOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SproutError::AssetNotFound { .. }));

    // no rollback: the first asset stays written, the manifest does not
    let first = asset("a.js", AssetKind::Bundled, b"a();");
    assert!(temp.path().join(&first.digest_path).exists());
    assert!(!temp.path().join("manifest.json").exists());
}

#[tokio::test]
async fn test_static_assets_get_no_gzip_sibling_even_when_compressing() {
    let temp = TempDir::new().unwrap();
    let env = StubEnvironment::new(vec![
        ("app.js", asset("app.js", AssetKind::Bundled, b"app();")),
        ("logo.png", asset("logo.png", AssetKind::Static, b"\x89PNG")),
    ]);
    let compiler = compiler(env, temp.path());

    let options = CompileOptions {
        digest: false,
        compress: true,
        ..Default::default()
    };
    let manifest = compiler
        .compile(&[PathBuf::from("app.js"), PathBuf::from("logo.png")], &options)
        .await
        .unwrap();

    assert!(temp.path().join("app.js.gz").exists());
    assert!(!temp.path().join("logo.png.gz").exists());
    assert_eq!(manifest.files.len(), 2);
}

#[tokio::test]
async fn test_recurring_logical_path_keeps_mapping_semantics() {
    let temp = TempDir::new().unwrap();
    // two input paths resolving to the same logical asset with different
    // content, as a re-listed glob match would
    let env = StubEnvironment::new(vec![
        ("one/app.js", asset("app.js", AssetKind::Bundled, b"v1();")),
        ("two/app.js", asset("app.js", AssetKind::Bundled, b"v2();")),
    ]);
    let compiler = compiler(env, temp.path());

    let manifest = compiler
        .compile(
            &[PathBuf::from("one/app.js"), PathBuf::from("two/app.js")],
            &CompileOptions::default(),
        )
        .await
        .unwrap();

    // assets is a mapping: exactly one entry, pointing at the last output
    assert_eq!(manifest.assets.len(), 1);
    let output = manifest.assets["app.js"].clone();
    let v2_digest = blake3::hash(b"v2();").to_hex().to_string();
    assert_eq!(output, format!("app-{}.js", v2_digest));
    assert_eq!(manifest.files[&output].digest, v2_digest);
}

#[tokio::test]
async fn test_manifest_json_is_two_space_indented() {
    let temp = TempDir::new().unwrap();
    let env = StubEnvironment::new(vec![("a.js", asset("a.js", AssetKind::Bundled, b"a();"))]);
    let compiler = compiler(env, temp.path());

    compiler
        .compile(&[PathBuf::from("a.js")], &CompileOptions::default())
        .await
        .unwrap();

    let written = std::fs::read_to_string(temp.path().join("manifest.json")).unwrap();
    assert!(written.starts_with("{\n  \"assets\""));

    // and it round-trips into the document type
    let parsed: ManifestDocument = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed.assets.len(), 1);
}

#[tokio::test]
async fn test_compile_order_follows_input_order() {
    let temp = TempDir::new().unwrap();
    let env = StubEnvironment::new(vec![
        ("b.js", asset("b.js", AssetKind::Bundled, b"b();")),
        ("a.js", asset("a.js", AssetKind::Bundled, b"a();")),
    ]);
    let compiler = compiler(env, temp.path());

    let options = CompileOptions {
        digest: false,
        ..Default::default()
    };
    let manifest = compiler
        .compile(&[PathBuf::from("b.js"), PathBuf::from("a.js")], &options)
        .await
        .unwrap();

    // every input produced exactly one entry pair
    assert_eq!(manifest.assets.len(), 2);
    assert_eq!(manifest.files.len(), 2);
    assert!(temp.path().join("a.js").exists());
    assert!(temp.path().join("b.js").exists());
}
