use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::io::ReadMode;
use crate::render::PreviewFormat;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Store directory; the platform data dir is used when unset
    pub notes_root: Option<PathBuf>,
    pub read_mode: ReadMode,
    pub preview_format: PreviewFormat,
    /// One of off, error, warn, info, debug, trace
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            notes_root: None,
            read_mode: ReadMode::default(),
            preview_format: PreviewFormat::default(),
            log_level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("org", "mdnotes", "mdnotes")
    }

    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::project_dirs() {
                Some(dirs) => dirs.config_dir().join("config.json"),
                None => return Ok(Self::default()),
            },
        };

        if explicit.is_none() && !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config =
            Self::from_json(&raw).with_context(|| format!("parsing config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.log_filter()?;
        Ok(config)
    }

    pub fn log_filter(&self) -> Result<LevelFilter> {
        self.log_level
            .parse::<LevelFilter>()
            .with_context(|| format!("unknown log level {:?}", self.log_level))
    }

    pub fn notes_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.notes_root {
            return Ok(root.clone());
        }
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join("notes"))
            .context("could not determine a data directory for notes; pass --root")
    }
}
