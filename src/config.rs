use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::source::github::{RepoRef, infer_from_pages_url};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub reader: ReaderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Github,
    Local,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// A `https://<owner>.github.io/<repo>/` URL; fills in owner and repo
    /// when they are left empty.
    #[serde(default)]
    pub pages_url: Option<String>,
    /// GitHub token. Falls back to the `GITHUB_TOKEN` environment variable.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_raw_base")]
    pub raw_base: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Directory served by the local source.
    #[serde(default)]
    pub root_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_exclude_paths")]
    pub exclude_paths: Vec<String>,
    #[serde(default)]
    pub path_filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReaderConfig {
    /// Fetch every chapter at startup to replace fallback titles.
    #[serde(default)]
    pub prefetch_titles: bool,
    /// Parallel fetches for title prefetch and statistics.
    #[serde(default = "default_prefetch_concurrency")]
    pub prefetch_concurrency: usize,
    /// Chapters with fewer non-whitespace characters are reported as short.
    #[serde(default = "default_low_word_threshold")]
    pub low_word_threshold: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            owner: String::new(),
            repo: String::new(),
            branch: default_branch(),
            pages_url: None,
            token: None,
            api_base: default_api_base(),
            raw_base: default_raw_base(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            root_path: None,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_paths: default_exclude_paths(),
            path_filter: None,
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            prefetch_titles: false,
            prefetch_concurrency: default_prefetch_concurrency(),
            low_word_threshold: default_low_word_threshold(),
        }
    }
}

impl SourceConfig {
    /// Repository to read, with owner and repo inferred from `pages_url`
    /// where not set explicitly. A `?branch=` in `pages_url` overrides the
    /// default branch, never an explicitly configured one.
    pub fn repo_ref(&self) -> RepoRef {
        let inferred = self.pages_url.as_deref().and_then(infer_from_pages_url);
        let owner = if self.owner.is_empty() {
            inferred
                .as_ref()
                .map(|pages| pages.owner.clone())
                .unwrap_or_default()
        } else {
            self.owner.clone()
        };
        let repo = if self.repo.is_empty() {
            inferred
                .as_ref()
                .and_then(|pages| pages.repo.clone())
                .unwrap_or_default()
        } else {
            self.repo.clone()
        };
        let branch = if self.branch == default_branch() {
            inferred
                .and_then(|pages| pages.branch)
                .unwrap_or_else(|| self.branch.clone())
        } else {
            self.branch.clone()
        };
        RepoRef {
            owner,
            repo,
            branch,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.source.kind {
            SourceKind::Github => {
                let repo = self.source.repo_ref();
                if repo.owner.is_empty() || repo.repo.is_empty() {
                    return Err(ConfigError::Invalid(
                        "source: github needs `owner` and `repo` (or `pages_url`)".to_string(),
                    ));
                }
                if repo.branch.is_empty() {
                    return Err(ConfigError::Invalid(
                        "source.branch must not be empty".to_string(),
                    ));
                }
            }
            SourceKind::Local => {
                if self.source.root_path.is_none() {
                    return Err(ConfigError::Invalid(
                        "source: local needs `root_path`".to_string(),
                    ));
                }
            }
        }
        if self.catalog.extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "catalog.extensions must list at least one extension".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

// Default value functions

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_raw_base() -> String {
    "https://raw.githubusercontent.com".to_string()
}

fn default_user_agent() -> String {
    concat!("mdnovel/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string()]
}

fn default_exclude_paths() -> Vec<String> {
    vec!["README.md".to_string()]
}

fn default_prefetch_concurrency() -> usize {
    8
}

fn default_low_word_threshold() -> usize {
    3000
}
