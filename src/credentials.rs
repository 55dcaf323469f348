//! RDA credential detection.
//!
//! Credentials come from the `RDA_EMAIL`/`RDA_KEY` environment variables or
//! from the `[RDA]` section of `~/.cdsapirc`:
//!
//! ```text
//! [RDA]
//! email: you@example.com
//! key: 0123456789abcdef
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::{Era5Error, Result};

pub const EMAIL_VAR: &str = "RDA_EMAIL";
pub const KEY_VAR: &str = "RDA_KEY";
const SECTION: &str = "[RDA]";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// `~/.cdsapirc`
pub fn default_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cdsapirc")
}

impl Credentials {
    /// Environment variables win over the credentials file.
    pub fn locate(path: &Path) -> Result<Self> {
        Self::locate_with(path, process_env)
    }

    /// Like [`Credentials::locate`], reading variables through `env`.
    pub fn locate_with(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let (Some(email), Some(key)) = (env(EMAIL_VAR), env(KEY_VAR)) {
            if let Some(credentials) = Self::new(&email, &key) {
                debug!("Using RDA credentials from {} and {}", EMAIL_VAR, KEY_VAR);
                return Ok(credentials);
            }
        }

        Self::from_file(path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let missing = || Era5Error::MissingCredentials {
            path: path.to_path_buf(),
        };

        if !path.is_file() {
            return Err(missing());
        }

        let contents = fs::read_to_string(path)?;
        let credentials = parse_rda_section(&contents).ok_or_else(missing)?;
        debug!("Using RDA credentials from {}", path.display());

        Ok(credentials)
    }

    fn new(email: &str, key: &str) -> Option<Self> {
        let (email, key) = (email.trim(), key.trim());
        if email.is_empty() || key.is_empty() {
            return None;
        }

        Some(Credentials {
            email: email.to_string(),
            key: key.to_string(),
        })
    }
}

fn parse_rda_section(contents: &str) -> Option<Credentials> {
    let mut in_section = false;
    let mut email = None;
    let mut key = None;

    for line in contents.lines().map(str::trim) {
        if line.starts_with('[') {
            in_section = line == SECTION;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((name, value)) = line.split_once([':', '=']) {
            match name.trim() {
                "email" => email = Some(value.trim()),
                "key" => key = Some(value.trim()),
                _ => {}
            }
        }
    }

    Credentials::new(email?, key?)
}

#[cfg(not(test))]
fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

// Unit tests must not pick up an operator's RDA_EMAIL/RDA_KEY.
#[cfg(test)]
fn process_env(_name: &str) -> Option<String> {
    None
}

/// Instructions shown when no credentials could be found.
pub fn remediation(path: &Path) -> String {
    format!(
        "To use this tool you need to:\n\
         1. Register for a free account at: https://rda.ucar.edu/\n\
         2. Get your API key from: https://rda.ucar.edu/#!lfd\n\
         3. Create {} with your API key:\n\
         \x20  [RDA]\n\
         \x20  email: your_email@example.com\n\
         \x20  key: your_api_key_from_rda\n\
         \n\
         Alternative: set the environment variables {} and {}",
        path.display(),
        EMAIL_VAR,
        KEY_VAR
    )
}

// -- Tests -------------------------------------------------------------------
