use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Environment variable that points at an alternative configuration directory.
pub const CONFIGURATION_DIRECTORY_KEY: &str = "APP_CONFIGURATION_DIRECTORY";

fn configuration_directory() -> anyhow::Result<PathBuf> {
    if let Ok(directory) = std::env::var(CONFIGURATION_DIRECTORY_KEY) {
        return Ok(PathBuf::from(directory));
    }
    let base_path = std::env::current_dir().context("Failed to determine the current directory")?;
    Ok(base_path.join("configuration"))
}

pub fn config<Settings: DeserializeOwned>() -> anyhow::Result<Settings> {
    let directory = configuration_directory()?;
    config_from(&directory)
}

/// Reads `base.yaml` (or `test.yaml` in tests) from `directory` and overlays
/// `APP_`-prefixed environment variables, nested with `__`.
pub fn config_from<Settings: DeserializeOwned>(directory: &Path) -> anyhow::Result<Settings> {
    let file = if cfg!(test) { "test.yaml" } else { "base.yaml" };
    let settings = config::Config::builder()
        .add_source(config::File::from(directory.join(file)))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .with_context(|| format!("Failed to build configuration from {}", directory.display()))?;

    settings
        .try_deserialize::<Settings>()
        .context("Failed to deserialize settings")
}
