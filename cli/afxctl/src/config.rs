//! Configuration and stored tokens.
//!
//! Handles:
//! - server domain resolution from `--server` and `--customer`
//! - per-customer token storage in `config.json`

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "AFX_CONFIG_DIR";

/// Environment variable overriding the resolved server domain.
pub const DOMAIN_ENV: &str = "AFX_DOMAIN";

/// Local development server.
const DEV_DOMAIN: &str = "http://127.0.0.1:8000";

/// Get the config directory path.
fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    ProjectDirs::from("io", "archfx", "afx")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

/// Path of the config file.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Which server to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ServerType {
    /// `https://<customer>.archfx.io`
    #[default]
    Prod,
    /// Local server on port 8000.
    Dev,
}

/// Resolves the server domain; `domain_override` wins when set.
pub fn resolve_domain(server: ServerType, customer: &str, domain_override: Option<&str>) -> String {
    if let Some(domain) = domain_override.filter(|d| !d.is_empty()) {
        return domain.trim_end_matches('/').to_string();
    }

    match server {
        ServerType::Prod => format!("https://{customer}.archfx.io"),
        ServerType::Dev => DEV_DOMAIN.to_string(),
    }
}

/// Tokens stored for one customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSection {
    /// Long-lived API token (`token` scheme).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// JWT access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_access: Option<String>,

    /// JWT refresh token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_refresh: Option<String>,
}

impl CustomerSection {
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.jwt_access.is_none() && self.jwt_refresh.is_none()
    }
}

/// CLI configuration: one `c-<customer>` section per customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    sections: BTreeMap<String, CustomerSection>,
}

fn section_name(customer: &str) -> String {
    format!("c-{customer}")
}

impl Config {
    /// Load config from disk, or return default.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let contents = serde_json::to_string_pretty(self)?;

        // Tokens live here; keep the file private on Unix.
        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;

            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)
                .with_context(|| format!("Failed to write config to {:?}", path))?;
            file.write_all(contents.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            fs::write(path, contents)
                .with_context(|| format!("Failed to write config to {:?}", path))?;
        }

        Ok(())
    }

    /// Tokens stored for `customer`, if any.
    pub fn customer(&self, customer: &str) -> Option<&CustomerSection> {
        self.sections
            .get(&section_name(customer))
            .filter(|section| !section.is_empty())
    }

    /// Replaces the tokens stored for `customer`.
    pub fn set_customer(&mut self, customer: &str, section: CustomerSection) {
        self.sections.insert(section_name(customer), section);
    }

    /// Drops the tokens stored for `customer`. Returns whether any were stored.
    pub fn remove_customer(&mut self, customer: &str) -> bool {
        self.sections.remove(&section_name(customer)).is_some()
    }
}
