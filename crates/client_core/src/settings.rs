use std::{fmt, fs, path::Path, str::FromStr};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

use crate::error::SettingsError;

pub const SETTINGS_FILE: &str = "catalog.toml";

/// Which resolved fetch outcomes are allowed to reach the collection state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Every outcome is applied; whichever resolves last wins.
    #[default]
    LastResolved,
    /// Only the outcome of the most recently dispatched fetch is applied.
    LatestDispatched,
}

impl ResolutionPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LastResolved => "last-resolved",
            Self::LatestDispatched => "latest-dispatched",
        }
    }
}

impl fmt::Display for ResolutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionPolicy {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "last-resolved" => Ok(Self::LastResolved),
            "latest-dispatched" => Ok(Self::LatestDispatched),
            other => Err(SettingsError::UnknownResolutionPolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    pub catalog_url: String,
    pub request_timeout_secs: u64,
    pub resolution_policy: ResolutionPolicy,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            catalog_url: "http://127.0.0.1:3000".into(),
            request_timeout_secs: 30,
            resolution_policy: ResolutionPolicy::LastResolved,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    catalog_url: Option<String>,
    request_timeout_secs: Option<u64>,
    resolution_policy: Option<String>,
}

pub fn load_settings() -> CatalogSettings {
    let mut settings = CatalogSettings::default();

    if Path::new(SETTINGS_FILE).exists() {
        match read_settings_file(Path::new(SETTINGS_FILE)) {
            Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
            Err(err) => warn!("config: ignoring {SETTINGS_FILE}: {err:#}"),
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn read_settings_file(path: &Path) -> anyhow::Result<FileSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("failed to parse '{}'", path.display()))
}

fn apply_file_settings(settings: &mut CatalogSettings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.catalog_url {
        settings.catalog_url = v;
    }
    match file_cfg.request_timeout_secs {
        Some(0) => warn!("config: ignoring request_timeout_secs = 0"),
        Some(v) => settings.request_timeout_secs = v,
        None => {}
    }
    if let Some(v) = file_cfg.resolution_policy {
        match v.parse() {
            Ok(policy) => settings.resolution_policy = policy,
            Err(err) => warn!("config: {err}"),
        }
    }
}

fn apply_env_overrides(settings: &mut CatalogSettings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("CATALOG_URL") {
        settings.catalog_url = v;
    }
    if let Some(v) = var("APP__CATALOG_URL") {
        settings.catalog_url = v;
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        // zero would time out every request
        if let Ok(parsed @ 1..) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Some(v) = var("APP__RESOLUTION_POLICY") {
        if let Ok(policy) = v.parse() {
            settings.resolution_policy = policy;
        }
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
