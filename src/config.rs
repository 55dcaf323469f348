//! Optional TOML configuration.
//!
//! Looked up from `--config` or `<config_dir>/era5-jobs/config.toml`. Every
//! value has a default, so the file only needs the keys a site wants to change.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;

use crate::{
    credentials,
    error::{Era5Error, Result},
    rda,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scheduler: SchedulerConfig,
    pub templates: TemplateConfig,
    pub paths: PathConfig,
    pub credentials: CredentialConfig,
    pub rda: RdaConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    pub submit_command: String,
    pub extra_args: Vec<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            submit_command: "sbatch".to_string(),
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateConfig {
    pub download: PathBuf,
    pub convert: PathBuf,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        TemplateConfig {
            download: PathBuf::from("templates/download.sbatch"),
            convert: PathBuf::from("templates/convert.sbatch"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathConfig {
    pub data_root: PathBuf,
    pub job_dir: Option<PathBuf>,
}

impl Default for PathConfig {
    fn default() -> Self {
        PathConfig {
            data_root: PathBuf::from("./era5_rda_data"),
            job_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CredentialConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RdaConfig {
    pub base_url: String,
}

impl Default for RdaConfig {
    fn default() -> Self {
        RdaConfig {
            base_url: rda::BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Loads `explicit` if given, otherwise the default location when it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => {
                    debug!("No configuration file, using defaults");
                    Ok(Config::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Era5Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&contents).map_err(|reason| Era5Error::Config {
            path: path.to_path_buf(),
            reason,
        })?;
        debug!("Loaded configuration from {}", path.display());

        Ok(config)
    }

    fn from_toml_str(contents: &str) -> std::result::Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.credentials
            .path
            .clone()
            .unwrap_or_else(credentials::default_path)
    }

    pub fn job_dir(&self, data_root: &Path) -> PathBuf {
        self.paths
            .job_dir
            .clone()
            .unwrap_or_else(|| data_root.join("jobs"))
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("era5-jobs").join("config.toml"))
}

// -- Tests -------------------------------------------------------------------
