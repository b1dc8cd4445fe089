use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
pub const BASE_URL_ENV: &str = "TODODASH_API_BASE_URL";
pub const DEFAULT_PAGE_LIMIT: u32 = 6;

const CONFIG_FILE_NAME: &str = "config.json";
const LOG_FILE_NAME: &str = "tododash.log";

/// On-disk settings; every field is optional.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub page_limit: Option<u32>,
    #[serde(default)]
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub page_limit: u32,
    /// Tracing filter from the config file; the binary picks a default per mode.
    pub log_filter: Option<String>,
    pub data_dir: PathBuf,
}

impl Config {
    /// Loads `config.json` from `base_dir` (default `~/.tododash`) and applies
    /// the base URL environment override.
    pub fn load(base_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match base_dir {
            Some(dir) => dir,
            None => dirs::home_dir()
                .ok_or_else(|| anyhow!("Could not determine home directory"))?
                .join(".tododash"),
        };
        let file = read_file_config(&data_dir.join(CONFIG_FILE_NAME))?;
        let env_base_url = std::env::var(BASE_URL_ENV).ok();
        Ok(Self::resolve(data_dir, file, env_base_url))
    }

    /// Precedence: environment > file > built-in default.
    pub fn resolve(data_dir: PathBuf, file: FileConfig, env_base_url: Option<String>) -> Self {
        let base_url = env_base_url
            .filter(|v| !v.trim().is_empty())
            .or(file.base_url.filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let page_limit = file
            .page_limit
            .filter(|limit| *limit >= 1)
            .unwrap_or(DEFAULT_PAGE_LIMIT);
        let log_filter = file.log_filter.filter(|f| !f.trim().is_empty());

        Self {
            base_url: normalize_base_url(&base_url),
            page_limit,
            log_filter,
            data_dir,
        }
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|v| !v.trim().is_empty()) {
            info!(base_url = %url, "base URL overridden from command line");
            self.base_url = normalize_base_url(&url);
        }
        self
    }

    pub fn with_page_limit(mut self, limit: Option<u32>) -> Self {
        if let Some(limit) = limit.filter(|l| *l >= 1) {
            self.page_limit = limit;
        }
        self
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(FileConfig::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Malformed config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_set() {
        let cfg = Config::resolve(PathBuf::from("/tmp/x"), FileConfig::default(), None);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.page_limit, DEFAULT_PAGE_LIMIT);
        assert!(cfg.log_filter.is_none());
        assert_eq!(cfg.log_path(), PathBuf::from("/tmp/x/tododash.log"));
    }

    #[test]
    fn test_env_beats_file_and_flag_beats_env() {
        let file = FileConfig {
            base_url: Some("http://file:1/api".to_string()),
            page_limit: Some(0),
            log_filter: Some("debug".to_string()),
        };
        let cfg = Config::resolve(
            PathBuf::from("/tmp/x"),
            file,
            Some("http://env:2/api/".to_string()),
        );
        assert_eq!(cfg.base_url, "http://env:2/api");
        assert_eq!(cfg.page_limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(cfg.log_filter.as_deref(), Some("debug"));

        let cfg = cfg
            .with_base_url(Some("http://flag:3/api".to_string()))
            .with_page_limit(Some(12));
        assert_eq!(cfg.base_url, "http://flag:3/api");
        assert_eq!(cfg.page_limit, 12);
    }

    #[test]
    fn test_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"base_url": "http://example.test/api", "page_limit": 9}"#,
        )
        .unwrap();
        let file = read_file_config(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(file.base_url.as_deref(), Some("http://example.test/api"));
        assert_eq!(file.page_limit, Some(9));
    }

    #[test]
    fn test_malformed_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "{not json").unwrap();
        assert!(read_file_config(&dir.path().join(CONFIG_FILE_NAME)).is_err());
    }
}
