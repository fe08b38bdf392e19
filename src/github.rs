// SPDX-License-Identifier: MIT

//! GitHub pull-request client

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::{RepowardenError, Result};

const DEFAULT_API_URL: &str = "https://api.github.com";

/// `owner/name` pair addressing a hosted repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    /// Parse the owner and repository name out of a remote URL. Handles
    /// both `https://github.com/owner/repo.git` and
    /// `git@github.com:owner/repo.git` forms.
    pub fn parse(url: &str) -> Option<Self> {
        let trimmed = url.trim().trim_end_matches('/');
        let mut segments = trimmed.rsplit('/');

        let name = segments.next()?.trim_end_matches(".git");
        let owner_segment = segments.next()?;
        // ssh form carries `git@host:owner` as one segment
        let owner = owner_segment.rsplit(':').next()?;

        if name.is_empty() || owner.is_empty() || owner.contains('@') {
            return None;
        }

        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Parameters for one pull request
#[derive(Debug, Clone)]
pub struct PullRequestSpec {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

/// Capability to open pull requests against a hosting service
#[async_trait]
pub trait PullRequestClient: Send + Sync {
    /// Open a pull request, returning its web URL
    async fn create_pull(&self, slug: &RepoSlug, spec: &PullRequestSpec) -> Result<String>;
}

/// GitHub REST API client
pub struct GithubClient {
    client: Client,
    token: String,
    api_url: String,
}

#[derive(Serialize)]
struct CreatePullBody<'a> {
    title: &'a str,
    body: &'a str,
    head: &'a str,
    base: &'a str,
}

#[derive(Deserialize)]
struct PullResponse {
    html_url: String,
}

impl GithubClient {
    /// Create a new client authenticated with a personal access token
    pub fn new(token: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            token: token.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

#[async_trait]
impl PullRequestClient for GithubClient {
    async fn create_pull(&self, slug: &RepoSlug, spec: &PullRequestSpec) -> Result<String> {
        let url = format!("{}/repos/{}/{}/pulls", self.api_url, slug.owner, slug.name);

        debug!("Opening pull request on {}: {}", slug, spec.title);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header(USER_AGENT, "repowarden")
            .header(ACCEPT, "application/vnd.github+json")
            .json(&CreatePullBody {
                title: &spec.title,
                body: &spec.body,
                head: &spec.head,
                base: &spec.base,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RepowardenError::PullRequest(format!(
                "GitHub returned {}: {}",
                status,
                body.trim()
            )));
        }

        let pull: PullResponse = response.json().await?;
        Ok(pull.html_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_https_remote() {
        let slug = RepoSlug::parse("https://github.com/acme/widgets.git").unwrap();
        assert_eq!(slug.owner, "acme");
        assert_eq!(slug.name, "widgets");
    }

    #[test]
    fn parses_ssh_remote() {
        let slug = RepoSlug::parse("git@github.com:acme/widgets.git").unwrap();
        assert_eq!(slug.owner, "acme");
        assert_eq!(slug.name, "widgets");
    }

    #[test]
    fn parses_remote_without_git_suffix() {
        let slug = RepoSlug::parse("https://github.com/acme/widgets").unwrap();
        assert_eq!(slug.to_string(), "acme/widgets");
    }

    #[test]
    fn rejects_url_without_owner() {
        assert!(RepoSlug::parse("widgets.git").is_none());
        assert!(RepoSlug::parse("").is_none());
    }
}
