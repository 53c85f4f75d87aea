//! GitHub pull request client.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;

use crate::task::{
    adapters::http::{AdapterSetupError, join_url, json_client, send_json},
    domain::{Credentials, RemoteResponse, RemoteResult, RepositoryFullName},
    ports::{PullRequestCreated, PullRequestDraft},
};

/// Default GitHub REST API root.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Opens pull requests through the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubPullRequests {
    http: reqwest::Client,
    api_base: String,
    credentials: Credentials,
}

#[derive(Debug, Deserialize)]
struct PullRequestBody {
    number: u64,
    html_url: String,
}

impl GitHubPullRequests {
    /// Creates a client for the API rooted at `api_base`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterSetupError`] when the HTTP client cannot be built.
    pub fn new(
        api_base: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self, AdapterSetupError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        Ok(Self {
            http: json_client(headers)?,
            api_base: api_base.into(),
            credentials,
        })
    }

    /// Opens a pull request on `repository`.
    pub async fn open(
        &self,
        repository: &RepositoryFullName,
        draft: &PullRequestDraft,
    ) -> RemoteResult<PullRequestCreated> {
        tracing::info!(%repository, head = %draft.head, base = %draft.base, "opening pull request");
        let url = join_url(&self.api_base, &format!("repos/{repository}/pulls"));
        let response: RemoteResponse<PullRequestBody> = send_json(
            self.http
                .post(url)
                .basic_auth(login(&self.credentials), Some(&self.credentials.secret))
                .json(&pull_request_body(draft)),
        )
        .await?;
        Ok(RemoteResponse {
            status: response.status,
            reason: response.reason,
            payload: response.payload.map(|created| PullRequestCreated {
                number: created.number,
                url: created.html_url,
            }),
        })
    }
}

/// GitHub authenticates with the username, falling back to the email.
fn login(credentials: &Credentials) -> &str {
    credentials
        .username
        .as_deref()
        .unwrap_or(credentials.email.as_str())
}

fn pull_request_body(draft: &PullRequestDraft) -> serde_json::Value {
    json!({
        "title": draft.title,
        "body": draft.body,
        "head": draft.head.as_str(),
        "base": draft.base.as_str(),
    })
}
