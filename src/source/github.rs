use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{ChapterSource, SourceError};
use crate::catalog::TreeEntry;

/// A branch of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

/// Repository details recovered from a GitHub Pages URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagesRepo {
    pub owner: String,
    pub repo: Option<String>,
    /// From a `?branch=` query parameter.
    pub branch: Option<String>,
}

/// Owner, repository name and branch override from a GitHub Pages URL
/// such as `https://owner.github.io/repo/?branch=dev`.
pub fn infer_from_pages_url(url: &str) -> Option<PagesRepo> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let rest = rest.split_once('#').map_or(rest, |(head, _)| head);
    let (rest, query) = rest.split_once('?').unwrap_or((rest, ""));
    let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
    let host = host.split(':').next().unwrap_or(host);
    let owner = host.strip_suffix(".github.io")?;
    if owner.is_empty() {
        return None;
    }
    let repo = path
        .split('/')
        .find(|segment| !segment.is_empty())
        .map(str::to_string);
    let branch = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "branch")
        .map(|(_, value)| {
            urlencoding::decode(value).map_or_else(|_| value.to_string(), |v| v.into_owned())
        })
        .filter(|branch| !branch.is_empty());
    Some(PagesRepo {
        owner: owner.to_string(),
        repo,
        branch,
    })
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

/// Reads a repository through the GitHub git-trees API and
/// raw.githubusercontent.com.
pub struct GithubSource {
    client: Client,
    repo: RepoRef,
    api_base: String,
    raw_base: String,
    token: Option<String>,
}

impl GithubSource {
    pub fn new(
        repo: RepoRef,
        api_base: &str,
        raw_base: &str,
        user_agent: &str,
        timeout: Duration,
        token: Option<String>,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(SourceError::Client)?;
        Ok(Self {
            client,
            repo,
            api_base: api_base.trim_end_matches('/').to_string(),
            raw_base: raw_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    pub fn tree_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.api_base, self.repo.owner, self.repo.repo, self.repo.branch
        )
    }

    /// Raw file URL; each path segment is percent-encoded on its own.
    pub fn raw_url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/{}/{}/{}/{}",
            self.raw_base,
            self.repo.owner,
            self.repo.repo,
            self.repo.branch,
            encoded.join("/")
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get(&self, url: &str, accept: &str) -> Result<reqwest::Response, SourceError> {
        let response = self
            .authorized(self.client.get(url))
            .header(reqwest::header::ACCEPT, accept)
            .send()
            .await
            .map_err(|source| SourceError::Http {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl ChapterSource for GithubSource {
    async fn list(&self) -> Result<Vec<TreeEntry>, SourceError> {
        let url = self.tree_url();
        debug!("Listing {url}");
        let response = self.get(&url, "application/vnd.github+json").await?;
        let body: TreeResponse = response
            .json()
            .await
            .map_err(|source| SourceError::Http { url: url.clone(), source })?;
        if body.truncated {
            warn!(
                "GitHub truncated the tree listing for {}/{}; some chapters may be missing",
                self.repo.owner, self.repo.repo
            );
        }
        Ok(body.tree)
    }

    async fn fetch(&self, path: &str) -> Result<String, SourceError> {
        let url = self.raw_url(path);
        debug!("Fetching {url}");
        let response = self.get(&url, "text/plain").await?;
        response
            .text()
            .await
            .map_err(|source| SourceError::Http { url, source })
    }
}
