use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use crate::error::LaunchError;

const DEFAULTS: &str = include_str!("../../config/default.toml");
const LOCAL_CONFIG: &str = "launcher.toml";
const NO_PAUSE_VAR: &str = "FINAURA_NO_PAUSE";

#[derive(Debug, Clone, Deserialize)]
pub struct LauncherConfig {
    pub general: GeneralConfig,
    pub interpreter: InterpreterConfig,
    pub install: InstallConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    pub title: String,
    pub download_url: String,
    pub pause: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterpreterConfig {
    /// Programs tried in order; empty falls back to the platform defaults.
    #[serde(default)]
    pub candidates: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallConfig {
    pub packages: Vec<PackageSpec>,
    pub quiet: bool,
    pub skip_importable: bool,
}

/// A distribution to install, and the module name it is imported by.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageSpec {
    pub name: String,
    #[serde(default)]
    pub import: Option<String>,
}

impl PackageSpec {
    pub fn import_name(&self) -> &str {
        self.import.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub script: PathBuf,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl LauncherConfig {
    /// The built-in configuration alone.
    pub fn defaults() -> Result<Self> {
        Self::load_from(&[])
    }

    /// Load configuration with layering: defaults → user config dir → launcher dir.
    pub fn load(base_dir: &Path) -> Result<Self> {
        let mut layers = Vec::new();
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "finaura") {
            layers.push(proj_dirs.config_dir().join("config.toml"));
        }
        layers.push(base_dir.join(LOCAL_CONFIG));

        Self::load_or_defaults(&layers, |key| std::env::var(key).ok())
    }

    /// Like [`load_from`](Self::load_from), but an unusable layer drops back to the
    /// defaults instead of failing. Environment overrides apply on both paths.
    pub fn load_or_defaults(
        layers: &[PathBuf],
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = match Self::load_from(layers) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("config ignored, using defaults: {err:#}");
                eprintln!("warning: {err:#}; using defaults");
                Self::defaults()?
            }
        };
        config.apply_env(var);
        Ok(config)
    }

    /// Merge each existing file in `layers` over the defaults, later files winning.
    pub fn load_from(layers: &[PathBuf]) -> Result<Self> {
        let mut merged: toml::Table = toml::from_str(DEFAULTS)?;

        for path in layers {
            if !path.is_file() {
                continue;
            }
            let raw = fs::read_to_string(path)?;
            let layer: toml::Table = toml::from_str(&raw).map_err(|source| LaunchError::Config {
                path: path.clone(),
                source,
            })?;
            tracing::info!("config layer loaded: {}", path.display());
            merge_tables(&mut merged, layer);
        }

        Ok(toml::Value::Table(merged).try_into()?)
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(value) = var(NO_PAUSE_VAR) {
            if !value.is_empty() && value != "0" {
                self.general.pause = false;
            }
        }
    }

    pub fn interpreter_candidates(&self) -> Vec<String> {
        if !self.interpreter.candidates.is_empty() {
            return self.interpreter.candidates.clone();
        }

        let defaults: &[&str] = if cfg!(windows) {
            &["python", "py"]
        } else {
            &["python3", "python"]
        };
        defaults.iter().map(|s| (*s).to_string()).collect()
    }
}

/// Tables merge key by key; any other value in `overlay` replaces the base.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
