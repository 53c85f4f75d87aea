//! Jira REST adapter for the [`IssueTracker`] port.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::{Value, json};

use super::http::{AdapterSetupError, join_url, json_client, send_empty, send_json};
use crate::task::{
    domain::{Credentials, IssueKey, IssueLink, RemoteResponse, RemoteResult},
    ports::{IssueTracker, NewIssue, WorkLogEntry},
};

/// Issue tracker backed by the Jira Cloud REST API (v3).
#[derive(Debug, Clone)]
pub struct JiraIssueTracker {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    id: String,
    key: String,
    #[serde(rename = "self")]
    url: String,
}

impl JiraIssueTracker {
    /// Creates an adapter for the tracker at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterSetupError`] when the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self, AdapterSetupError> {
        Ok(Self {
            http: json_client(HeaderMap::new())?,
            base_url: base_url.into(),
            credentials,
        })
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(join_url(&self.base_url, path))
            .basic_auth(&self.credentials.email, Some(&self.credentials.secret))
    }
}

/// Builds the issue-creation body, with the description as a one-paragraph
/// document.
fn create_issue_body(issue: &NewIssue) -> Value {
    let mut fields = json!({
        "summary": issue.summary,
        "project": { "id": issue.project_id },
        "description": {
            "type": "doc",
            "version": 1,
            "content": [{
                "type": "paragraph",
                "content": [{
                    "type": "text",
                    "text": issue.description.as_deref().unwrap_or_default(),
                }],
            }],
        },
    });
    if let Some(type_id) = &issue.issue_type_id {
        fields["issuetype"] = json!({ "id": type_id });
    }
    if let Some(assignee) = &issue.assignee {
        fields["assignee"] = json!({ "name": assignee });
    }
    json!({ "fields": fields })
}

#[async_trait]
impl IssueTracker for JiraIssueTracker {
    async fn create_issue(&self, issue: &NewIssue) -> RemoteResult<IssueLink> {
        tracing::info!(project = %issue.project_id, "creating issue");
        let response: RemoteResponse<CreatedIssue> =
            send_json(self.post("rest/api/3/issue").json(&create_issue_body(issue))).await?;

        let status = response.status;
        let link = response.payload.and_then(|created| {
            IssueKey::new(created.key).ok().map(|key| IssueLink {
                id: created.id,
                key,
                url: created.url,
            })
        });
        Ok(RemoteResponse {
            status,
            reason: response.reason,
            payload: link,
        })
    }

    async fn transition_issue(&self, key: &IssueKey, transition_id: &str) -> RemoteResult<()> {
        tracing::info!(issue = %key, transition_id, "transitioning issue");
        let body = json!({ "transition": { "id": transition_id } });
        send_empty(
            self.post(&format!("rest/api/3/issue/{key}/transitions"))
                .json(&body),
        )
        .await
    }

    async fn log_work(&self, key: &IssueKey, entry: &WorkLogEntry) -> RemoteResult<()> {
        tracing::info!(issue = %key, time_spent = %entry.time_spent, "logging work");
        let body = json!({
            "comment": entry.comment,
            "started": entry.started,
            "timeSpent": entry.time_spent,
        });
        send_empty(self.post(&format!("rest/api/3/issue/{key}/worklog")).json(&body)).await
    }
}
