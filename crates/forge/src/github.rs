use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use domain::{Error, Result};
use reqwest::{header, Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{FileContent, ForgeApi, ProposalSummary, ProposalView};

const DEFAULT_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "prattle";

/// GitHub REST implementation of [`ForgeApi`].
pub struct GithubClient {
    http: Client,
    api_base: String,
    token: String,
}

// -----------------------------------------------------------------------------
// Wire types

#[derive(Debug, Deserialize)]
struct GithubError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitRefObject,
}

#[derive(Debug, Deserialize)]
struct GitRefObject {
    sha: String,
}

#[derive(Debug, Serialize)]
struct CreateRef {
    #[serde(rename = "ref")]
    ref_name: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ContentsFile {
    content: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    sha: &'a str,
    branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct PullRequestItem {
    number: u64,
    #[serde(default)]
    title: String,
    head: PullRequestHead,
}

#[derive(Debug, Deserialize)]
struct PullRequestHead {
    label: String,
    #[serde(rename = "ref")]
    ref_name: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestState {
    state: String,
    #[serde(default)]
    merged: bool,
}

#[derive(Debug, Deserialize)]
struct CreatedPullRequest {
    number: u64,
}

#[derive(Debug, Serialize)]
struct CreatePullRequest<'a> {
    title: &'a str,
    body: &'a str,
    head: &'a str,
    base: &'a str,
}

#[derive(Debug, Serialize)]
struct MergePullRequest<'a> {
    commit_message: &'a str,
}

// -----------------------------------------------------------------------------
// Client

impl GithubClient {
    pub fn new(token: String) -> Self {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Point the client at a non-default API base (GitHub Enterprise, test
    /// servers).
    pub fn with_api_base(token: String, api_base: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.into(),
            token,
        }
    }

    async fn request<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<String> {
        let url = format!("{}{}", self.api_base, path);
        debug!(%method, %url, "forge request");

        let mut req = self
            .http
            .request(method, &url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "application/vnd.github+json")
            .header(header::USER_AGENT, USER_AGENT);
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(transport_error)?;
        let status = resp.status();
        let text = resp.text().await.map_err(transport_error)?;
        if status.is_success() {
            return Ok(text);
        }

        // GitHub error bodies carry a human-readable message; fall back to
        // the raw body when parsing fails.
        let message = serde_json::from_str::<GithubError>(&text)
            .map(|e| e.message)
            .unwrap_or(text);
        Err(Error::remote(status.as_u16(), message))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let text = self.request::<()>(Method::GET, path, None).await?;
        parse_json(&text)
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    let status = err.status().map(|s| s.as_u16()).unwrap_or(0);
    Error::Remote {
        status,
        message: err.to_string(),
    }
}

fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| Error::Remote {
        status: 0,
        message: format!("unexpected forge response: {e}"),
    })
}

#[async_trait]
impl ForgeApi for GithubClient {
    async fn get_ref(&self, owner: &str, repo: &str, branch: &str) -> Result<String> {
        let r: GitRef = self
            .get_json(&format!("/repos/{owner}/{repo}/git/refs/heads/{branch}"))
            .await?;
        Ok(r.object.sha)
    }

    async fn create_ref(&self, owner: &str, repo: &str, branch: &str, sha: &str) -> Result<()> {
        let body = CreateRef {
            ref_name: format!("refs/heads/{branch}"),
            sha: sha.to_string(),
        };
        self.request(
            Method::POST,
            &format!("/repos/{owner}/{repo}/git/refs"),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    async fn get_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> Result<FileContent> {
        let path = path.trim_start_matches('/');
        let file: ContentsFile = self
            .get_json(&format!(
                "/repos/{owner}/{repo}/contents/{path}?ref={branch}"
            ))
            .await?;

        // The contents API line-wraps its base64 payload.
        let cleaned: String = file.content.chars().filter(|c| !c.is_whitespace()).collect();
        let data = BASE64.decode(cleaned.as_bytes()).map_err(|e| Error::Remote {
            status: 0,
            message: format!("invalid base64 content for {path}: {e}"),
        })?;

        Ok(FileContent {
            data,
            sha: file.sha,
        })
    }

    async fn put_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
        data: &[u8],
        sha: &str,
        message: &str,
    ) -> Result<()> {
        let path = path.trim_start_matches('/');
        let body = PutContents {
            message,
            content: BASE64.encode(data),
            sha,
            branch,
        };
        self.request(
            Method::PUT,
            &format!("/repos/{owner}/{repo}/contents/{path}"),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    async fn list_open_proposals(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
    ) -> Result<Vec<ProposalSummary>> {
        let prs: Vec<PullRequestItem> = self
            .get_json(&format!("/repos/{owner}/{repo}/pulls?base={base}&state=open"))
            .await?;

        Ok(prs
            .into_iter()
            .map(|pr| {
                // Head labels read "owner:branch".
                let head_owner = pr
                    .head
                    .label
                    .split(':')
                    .next()
                    .unwrap_or_default()
                    .to_string();
                ProposalSummary {
                    number: pr.number,
                    title: pr.title,
                    head_owner,
                    head_branch: pr.head.ref_name,
                }
            })
            .collect())
    }

    async fn create_proposal(
        &self,
        owner: &str,
        repo: &str,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<u64> {
        let payload = CreatePullRequest {
            title,
            body,
            head,
            base,
        };
        let text = self
            .request(
                Method::POST,
                &format!("/repos/{owner}/{repo}/pulls"),
                Some(&payload),
            )
            .await?;
        let pr: CreatedPullRequest = parse_json(&text)?;
        Ok(pr.number)
    }

    async fn get_proposal(&self, owner: &str, repo: &str, number: u64) -> Result<ProposalView> {
        let pr: PullRequestState = self
            .get_json(&format!("/repos/{owner}/{repo}/pulls/{number}"))
            .await?;
        Ok(ProposalView {
            open: pr.state == "open",
            merged: pr.merged,
        })
    }

    async fn sync_fork(
        &self,
        origin_owner: &str,
        fork_owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<()> {
        let head = format!("{origin_owner}:{branch}");
        let payload = CreatePullRequest {
            title: "Update from origin",
            body: "Update from origin",
            head: &head,
            base: branch,
        };
        let text = self
            .request(
                Method::POST,
                &format!("/repos/{fork_owner}/{repo}/pulls"),
                Some(&payload),
            )
            .await?;
        let pr: CreatedPullRequest = parse_json(&text)?;

        let merge = MergePullRequest {
            commit_message: "Merge from upstream",
        };
        self.request(
            Method::PUT,
            &format!("/repos/{fork_owner}/{repo}/pulls/{}/merge", pr.number),
            Some(&merge),
        )
        .await?;
        Ok(())
    }
}
