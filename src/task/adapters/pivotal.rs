//! Pivotal Tracker REST adapter for the [`StoryTracker`] port.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::http::{AdapterSetupError, join_url, json_client, send_empty, send_json};
use crate::task::{
    domain::{Credentials, RemoteResponse, RemoteResult, StoryId, StoryState},
    ports::{NewStory, StoryDetails, StoryTracker},
};

const TOKEN_HEADER: &str = "X-TrackerToken";

/// Story tracker backed by the Pivotal Tracker v5 API.
#[derive(Debug, Clone)]
pub struct PivotalStoryTracker {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct StoryBody {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl StoryBody {
    fn into_details(self) -> Option<StoryDetails> {
        Some(StoryDetails {
            id: StoryId::new(self.id.to_string()).ok()?,
            name: self.name,
            description: self.description,
            url: self.url,
        })
    }
}

impl PivotalStoryTracker {
    /// Creates an adapter for the API rooted at `base_url`, authenticating
    /// with the account's API token.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterSetupError`] when the token is not a valid header
    /// value or the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        credentials: &Credentials,
    ) -> Result<Self, AdapterSetupError> {
        let mut headers = HeaderMap::new();
        let mut token = HeaderValue::from_str(credentials.secret.trim())?;
        token.set_sensitive(true);
        headers.insert(TOKEN_HEADER, token);
        Ok(Self {
            http: json_client(headers)?,
            base_url: base_url.into(),
        })
    }

    fn story_path(id: &StoryId) -> String {
        format!("services/v5/stories/{id}")
    }
}

fn into_story(response: RemoteResponse<StoryBody>) -> RemoteResponse<StoryDetails> {
    RemoteResponse {
        status: response.status,
        reason: response.reason,
        payload: response.payload.and_then(StoryBody::into_details),
    }
}

/// Builds the story-creation body; description and estimate are only sent
/// when present.
fn create_story_body(story: &NewStory) -> Value {
    let mut body = Map::new();
    body.insert("current_state".to_owned(), json!(StoryState::Unstarted.as_str()));
    body.insert("name".to_owned(), json!(story.name));
    body.insert("story_type".to_owned(), json!(story.story_type.as_str()));
    if let Some(description) = &story.description {
        body.insert("description".to_owned(), json!(description));
    }
    if let Some(estimate) = story.estimate {
        body.insert("estimate".to_owned(), json!(estimate));
    }
    Value::Object(body)
}

#[async_trait]
impl StoryTracker for PivotalStoryTracker {
    async fn fetch_story(&self, id: &StoryId) -> RemoteResult<StoryDetails> {
        tracing::info!(story = %id, "fetching story");
        let url = join_url(&self.base_url, &Self::story_path(id));
        send_json(self.http.get(url)).await.map(into_story)
    }

    async fn create_story(&self, story: &NewStory) -> RemoteResult<StoryDetails> {
        tracing::info!(project = %story.project_id, "creating story");
        let url = join_url(
            &self.base_url,
            &format!("services/v5/projects/{}/stories", story.project_id),
        );
        send_json(self.http.post(url).json(&create_story_body(story)))
            .await
            .map(into_story)
    }

    async fn update_story_state(&self, id: &StoryId, state: StoryState) -> RemoteResult<()> {
        tracing::info!(story = %id, state = state.as_str(), "updating story state");
        let url = join_url(&self.base_url, &Self::story_path(id));
        send_empty(
            self.http
                .put(url)
                .json(&json!({ "current_state": state.as_str() })),
        )
        .await
    }
}
