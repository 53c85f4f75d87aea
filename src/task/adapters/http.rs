//! Shared HTTP plumbing for the remote tracker adapters.

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::task::domain::{ConnectionFailed, RemoteResponse, RemoteResult};

/// User agent sent with every request.
pub const USER_AGENT_VALUE: &str = concat!("hourglass/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_REASON_CHARS: usize = 300;

/// Errors raised while configuring an HTTP adapter.
#[derive(Debug, Error)]
pub enum AdapterSetupError {
    /// A credential could not be encoded as a header value.
    #[error("invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
    /// The HTTP client could not be constructed.
    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Builds a JSON client with the shared default headers plus `extra`.
///
/// # Errors
///
/// Returns [`AdapterSetupError::Client`] when the TLS backend fails to
/// initialise.
pub fn json_client(extra: HeaderMap) -> Result<reqwest::Client, AdapterSetupError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.extend(extra);
    Ok(reqwest::Client::builder()
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Joins a base URL and a relative path with exactly one slash.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Sends `request` and parses a JSON body on success.
///
/// A success status whose body does not parse yields a response without a
/// payload.
pub async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> RemoteResult<T> {
    let response = send(request).await?;
    let status = response.status();
    if !status.is_success() && !status.is_redirection() {
        return Ok(failure(response).await);
    }
    match response.json::<T>().await {
        Ok(payload) => Ok(RemoteResponse::with_payload(status.as_u16(), payload)),
        Err(err) => {
            tracing::warn!(error = %err, status = status.as_u16(), "unparsable response body");
            Ok(RemoteResponse::status_only(status.as_u16(), err.to_string()))
        }
    }
}

/// Sends `request` and discards the body.
pub async fn send_empty(request: RequestBuilder) -> RemoteResult<()> {
    let response = send(request).await?;
    let status = response.status();
    if !status.is_success() && !status.is_redirection() {
        return Ok(failure(response).await);
    }
    Ok(RemoteResponse::with_payload(status.as_u16(), ()))
}

async fn send(request: RequestBuilder) -> Result<Response, ConnectionFailed> {
    request.send().await.map_err(|err| {
        tracing::debug!(error = %err, "remote request failed");
        ConnectionFailed(err.to_string())
    })
}

async fn failure<T>(response: Response) -> RemoteResponse<T> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let reason = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or_default().to_owned()
    } else {
        body.chars().take(MAX_REASON_CHARS).collect()
    };
    RemoteResponse::status_only(status.as_u16(), reason)
}

#[cfg(test)]
mod tests {
    use super::join_url;
    use rstest::rstest;

    #[rstest]
    #[case("https://acme.atlassian.net/", "rest/api/3/issue", "https://acme.atlassian.net/rest/api/3/issue")]
    #[case("https://acme.atlassian.net", "/rest/api/3/issue", "https://acme.atlassian.net/rest/api/3/issue")]
    fn joins_with_single_slash(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        assert_eq!(join_url(base, path), expected);
    }
}
