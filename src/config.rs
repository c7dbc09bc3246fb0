use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ExplorerError;

pub const DEFAULT_CONFIG_FILE: &str = "chembl-explorer.json";
pub const DEFAULT_BASE_URL: &str = "https://www.ebi.ac.uk/chembl/api/data";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PAGE_SIZE: u32 = 1000;
const MAX_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub max_records: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChemblSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub page_size: u32,
    /// Stop paging once this many records were collected.
    pub max_records: Option<usize>,
}

impl Default for ChemblSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
            max_records: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub chembl: ChemblSettings,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads the config file if there is one. Without an explicit path a
    /// missing `chembl-explorer.json` just means defaults.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, ExplorerError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            tracing::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| ExplorerError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| ExplorerError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, ExplorerError> {
        let schema_version = config.schema_version.unwrap_or(1);

        let base_url = config
            .base_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ExplorerError::InvalidConfig(format!(
                "base_url must be an http(s) URL, got `{base_url}`"
            )));
        }

        let timeout_secs = config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ExplorerError::InvalidConfig(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        let page_size = config.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ExplorerError::InvalidConfig(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }

        if config.max_records == Some(0) {
            return Err(ExplorerError::InvalidConfig(
                "max_records must be greater than zero".to_string(),
            ));
        }

        Ok(ResolvedConfig {
            schema_version,
            chembl: ChemblSettings {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
                page_size,
                max_records: config.max_records,
            },
        })
    }
}
