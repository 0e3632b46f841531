use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::EnvContext;

pub const DEFAULT_SETTINGS_FILE: &str = "dispatch.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub catalog_path: PathBuf,
    pub env_key: Option<EnvContext>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("./handlers"),
            env_key: None,
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    catalog_path: Option<PathBuf>,
    env_key: Option<String>,
    log_filter: Option<String>,
}

impl Settings {
    fn apply_file(&mut self, raw: &str) -> anyhow::Result<()> {
        let file_cfg: FileSettings = toml::from_str(raw)?;
        if let Some(v) = file_cfg.catalog_path {
            self.catalog_path = v;
        }
        if let Some(v) = file_cfg.env_key {
            self.env_key = Some(v.into());
        }
        if let Some(v) = file_cfg.log_filter {
            self.log_filter = v;
        }
        Ok(())
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("DISPATCH_CATALOG") {
            self.catalog_path = v.into();
        }
        if let Some(v) = var("APP__CATALOG_PATH") {
            self.catalog_path = v.into();
        }

        if let Some(v) = var("DISPATCH_ENV") {
            self.env_key = Some(v.into());
        }
        if let Some(v) = var("APP__ENV_KEY") {
            self.env_key = Some(v.into());
        }

        if let Some(v) = var("APP__LOG_FILTER") {
            self.log_filter = v;
        }
    }
}

/// Defaults, then the settings file if present, then environment overrides.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

fn load_settings_with(
    path: Option<&Path>,
    var: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    let path = path.unwrap_or(Path::new(DEFAULT_SETTINGS_FILE));

    match fs::read_to_string(path) {
        Ok(raw) => settings
            .apply_file(&raw)
            .with_context(|| format!("invalid settings file '{}'", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    settings.apply_env(var);
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
