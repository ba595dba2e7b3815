//! Where chapter listings and chapter text come from.

pub mod github;
pub mod local;

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::TreeEntry;
use crate::config::{SourceConfig, SourceKind};

pub use github::{GithubSource, RepoRef};
pub use local::LocalSource;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid document path: {0}")]
    InvalidPath(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Directory-listing and document-fetch provider.
pub trait ChapterSource: Send + Sync {
    /// Every entry of the repository tree, files and folders alike.
    fn list(&self) -> impl Future<Output = Result<Vec<TreeEntry>, SourceError>> + Send;

    /// Raw text of one document, by repository-relative path.
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, SourceError>> + Send;
}

/// The source selected by configuration.
pub enum Source {
    Github(GithubSource),
    Local(LocalSource),
}

impl Source {
    pub fn from_config(cfg: &SourceConfig) -> Result<Self, SourceError> {
        match cfg.kind {
            SourceKind::Github => {
                let token = cfg
                    .token
                    .clone()
                    .or_else(|| std::env::var("GITHUB_TOKEN").ok())
                    .filter(|t| !t.is_empty());
                let source = GithubSource::new(
                    cfg.repo_ref(),
                    &cfg.api_base,
                    &cfg.raw_base,
                    &cfg.user_agent,
                    Duration::from_secs(cfg.timeout_secs),
                    token,
                )?;
                Ok(Source::Github(source))
            }
            SourceKind::Local => {
                let root = cfg.root_path.clone().ok_or_else(|| {
                    SourceError::InvalidPath("local source has no root_path".to_string())
                })?;
                Ok(Source::Local(LocalSource::new(root)))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Source::Github(s) => {
                let repo = s.repo();
                format!("github:{}/{}@{}", repo.owner, repo.repo, repo.branch)
            }
            Source::Local(s) => format!("local:{}", s.root().display()),
        }
    }
}

impl ChapterSource for Source {
    async fn list(&self) -> Result<Vec<TreeEntry>, SourceError> {
        match self {
            Source::Github(s) => s.list().await,
            Source::Local(s) => s.list().await,
        }
    }

    async fn fetch(&self, path: &str) -> Result<String, SourceError> {
        match self {
            Source::Github(s) => s.fetch(path).await,
            Source::Local(s) => s.fetch(path).await,
        }
    }
}
