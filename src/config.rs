use crate::core::models::BuildConfig;
use crate::utils::{Result, SproutError};
use std::path::Path;

/// Load `sprout.config.json` from the source root, falling back to defaults
/// when the file is absent. CLI flags are applied on top by the caller.
pub fn load_config(root: &Path) -> Result<BuildConfig> {
    let config_path = root.join("sprout.config.json");

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        let config: BuildConfig = serde_json::from_str(&content).map_err(|e| {
            SproutError::config(format!("{}: {}", config_path.display(), e))
        })?;
        Ok(config)
    } else {
        Ok(BuildConfig::default())
    }
}
