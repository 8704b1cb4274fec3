//! GitHub REST API client.

use std::collections::HashSet;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

use crate::error::TrackerError;
use crate::http::check_response;
use crate::{ContentUpdate, IssueRef, IssueTracker, Milestone, NewIssue, RemoteContent};

/// Page size for list endpoints (GitHub's maximum).
const PER_PAGE: u32 = 100;

const API_VERSION: &str = "2022-11-28";

#[derive(serde::Deserialize)]
struct IssueSummary {
    title: String,
}

#[derive(serde::Deserialize)]
struct ContentResponse {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(serde::Serialize)]
struct MilestoneRequest<'a> {
    title: &'a str,
}

#[derive(serde::Serialize)]
struct ContentRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

/// HTTP client for one GitHub repository.
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    repository: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a client for `repository` (`owner/name`).
    ///
    /// An empty or missing token sends unauthenticated requests, which is
    /// enough to read public repositories during a dry run.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotConfigured`] for an empty repository and
    /// [`TrackerError::Http`] if the underlying `reqwest::Client` fails to build.
    pub fn new(
        api_url: &str,
        repository: &str,
        token: Option<String>,
    ) -> Result<Self, TrackerError> {
        if repository.trim().is_empty() {
            return Err(TrackerError::NotConfigured(
                "no repository set (expected owner/name)".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("plansync/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            repository: repository.trim().to_string(),
            token: token.filter(|token| !token.is_empty()),
        })
    }

    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{path}", self.api_url, self.repository)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Fetch every page of a list endpoint until an empty page comes back.
    async fn paginate<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, TrackerError> {
        collect_pages(path, |query| async move {
            let url = self.repo_url(&query);
            let resp = check_response(self.request(reqwest::Method::GET, &url).send().await?).await?;
            let batch: Vec<T> = resp.json().await?;
            Ok::<_, TrackerError>(batch)
        })
        .await
    }
}

/// Request `{path}&per_page=100&page=N` for N = 1, 2, ... until a page is empty.
async fn collect_pages<T, F, Fut>(path: &str, mut fetch_page: F) -> Result<Vec<T>, TrackerError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Vec<T>, TrackerError>>,
{
    let mut items = Vec::new();
    let mut page = 1u32;
    loop {
        let batch = fetch_page(format!("{path}&per_page={PER_PAGE}&page={page}")).await?;
        if batch.is_empty() {
            break;
        }
        tracing::debug!(path, page, count = batch.len(), "fetched page");
        items.extend(batch);
        page += 1;
    }
    Ok(items)
}

impl IssueTracker for GitHubClient {
    async fn list_issue_titles(&self) -> Result<HashSet<String>, TrackerError> {
        let issues: Vec<IssueSummary> = self.paginate("issues?state=all").await?;
        Ok(issues.into_iter().map(|issue| issue.title).collect())
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<IssueRef, TrackerError> {
        let url = self.repo_url("issues");
        let resp = check_response(
            self.request(reqwest::Method::POST, &url)
                .json(issue)
                .send()
                .await?,
        )
        .await?;
        Ok(resp.json().await?)
    }

    async fn list_milestones(&self) -> Result<Vec<Milestone>, TrackerError> {
        self.paginate("milestones?state=all").await
    }

    async fn create_milestone(&self, title: &str) -> Result<Milestone, TrackerError> {
        let url = self.repo_url("milestones");
        let resp = check_response(
            self.request(reqwest::Method::POST, &url)
                .json(&MilestoneRequest { title })
                .send()
                .await?,
        )
        .await?;
        Ok(resp.json().await?)
    }

    async fn get_content(&self, path: &str) -> Result<Option<RemoteContent>, TrackerError> {
        let url = self.repo_url(&format!("contents/{}", encode_path(path)));
        let resp = self.request(reqwest::Method::GET, &url).send().await?;
        if resp.status() == 404 {
            return Ok(None);
        }

        let data: ContentResponse = check_response(resp).await?.json().await?;
        Ok(Some(RemoteContent {
            content: decode_content(&data.content)?,
            sha: data.sha,
        }))
    }

    async fn put_content(&self, path: &str, update: &ContentUpdate) -> Result<(), TrackerError> {
        let url = self.repo_url(&format!("contents/{}", encode_path(path)));
        let body = ContentRequest {
            message: &update.message,
            content: STANDARD.encode(update.content.as_bytes()),
            sha: update.sha.as_deref(),
        };
        check_response(
            self.request(reqwest::Method::PUT, &url)
                .json(&body)
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }
}

/// Percent-encode each segment of a repository path, keeping the slashes.
fn encode_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Decode the base64 payload of the contents API (wrapped at 60 columns).
fn decode_content(encoded: &str) -> Result<String, TrackerError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| TrackerError::Parse(format!("invalid base64 content: {e}")))?;
    String::from_utf8(bytes).map_err(|e| TrackerError::Parse(format!("content is not UTF-8: {e}")))
}
