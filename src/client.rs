//! GraphQL transport client.
//!
//! One `query` call maps to exactly one HTTPS POST of a `{query, variables}`
//! envelope and classifies the outcome as a typed result or one of the
//! failure kinds in [`crate::error::LinearError`]. No retries: a failed
//! attempt is a reported failure.

use std::cell::Cell;
use std::time::Duration;

use const_format::formatcp;
use reqwest::header::{self, HeaderMap};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LinearError, Result};

const API_ENDPOINT: &str = "https://api.linear.app/graphql";
const USER_AGENT: &str = formatcp!("linctl/{}", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Minimal query whose only purpose is to trigger a header-bearing response.
const PING_QUERY: &str = "query Ping { __typename }";

pub struct LinearClient {
    http: Client,
    endpoint: String,
    auth_header: String,
    // Last-observed snapshot, overwritten on every call that carried the
    // headers. Advisory, last-write-wins.
    last_rate_limit: Cell<Option<RateLimit>>,
}

#[derive(Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<Value>,
}

#[derive(Deserialize)]
struct GraphQLResponse {
    data: Option<Value>,
    errors: Option<Vec<GraphQLError>>,
}

/// One entry of the server-reported `errors` list. Only `message` is
/// guaranteed to be present.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<ErrorLocation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Value>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ErrorLocation {
    pub line: u32,
    pub column: u32,
}

/// Request and complexity quotas parsed from response headers.
/// Reset instants are epoch milliseconds.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RateLimit {
    #[serde(rename = "requestsLimit")]
    pub requests_limit: Option<u64>,
    #[serde(rename = "requestsRemaining")]
    pub requests_remaining: Option<u64>,
    #[serde(rename = "requestsReset")]
    pub requests_reset: Option<u64>,
    pub complexity: Option<u64>,
    #[serde(rename = "complexityLimit")]
    pub complexity_limit: Option<u64>,
    #[serde(rename = "complexityRemaining")]
    pub complexity_remaining: Option<u64>,
    #[serde(rename = "complexityReset")]
    pub complexity_reset: Option<u64>,
}

impl RateLimit {
    /// Parse a snapshot from response headers. Individual values that are
    /// missing or malformed are treated as absent; returns `None` only when
    /// no quota header parsed at all.
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let snapshot = RateLimit {
            requests_limit: header_u64(headers, "X-RateLimit-Requests-Limit"),
            requests_remaining: header_u64(headers, "X-RateLimit-Requests-Remaining"),
            requests_reset: header_u64(headers, "X-RateLimit-Requests-Reset"),
            complexity: header_u64(headers, "X-Complexity"),
            complexity_limit: header_u64(headers, "X-RateLimit-Complexity-Limit"),
            complexity_remaining: header_u64(headers, "X-RateLimit-Complexity-Remaining"),
            complexity_reset: header_u64(headers, "X-RateLimit-Complexity-Reset"),
        };

        let present = snapshot.requests_limit.is_some()
            || snapshot.requests_remaining.is_some()
            || snapshot.requests_reset.is_some()
            || snapshot.complexity.is_some()
            || snapshot.complexity_limit.is_some()
            || snapshot.complexity_remaining.is_some()
            || snapshot.complexity_reset.is_some();

        present.then_some(snapshot)
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

impl LinearClient {
    /// Create a client against the production endpoint. The authorization
    /// header value is sent verbatim: pass a raw API key, or an OAuth token
    /// already carrying its `Bearer ` prefix.
    pub fn new(auth_header: String) -> Result<Self> {
        Self::with_endpoint(auth_header, API_ENDPOINT.to_string())
    }

    /// Create a client against an explicit endpoint. Used by tests.
    pub fn with_endpoint(auth_header: String, endpoint: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(LinearError::Transport)?;

        Ok(Self {
            http,
            endpoint,
            auth_header,
            last_rate_limit: Cell::new(None),
        })
    }

    /// Execute one operation and decode `data` into the caller's type.
    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<Value>,
    ) -> Result<T> {
        let data = self.execute(query, variables).await?;
        serde_json::from_value(data).map_err(LinearError::Decode)
    }

    /// Execute one operation and return the undecoded `data` payload, for
    /// callers that post-process flexibly.
    pub async fn query_raw(&self, query: &str, variables: Option<Value>) -> Result<Value> {
        self.execute(query, variables).await
    }

    async fn execute(&self, query: &str, variables: Option<Value>) -> Result<Value> {
        let request = GraphQLRequest { query, variables };
        let body = serde_json::to_vec(&request).map_err(LinearError::Marshal)?;

        let response = self
            .http
            .post(&self.endpoint)
            .header(header::AUTHORIZATION, &self.auth_header)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, USER_AGENT)
            .body(body)
            .send()
            .await?;

        // Snapshot before any error classification: failed calls still
        // update it when the headers were present.
        if let Some(snapshot) = RateLimit::from_headers(response.headers()) {
            self.last_rate_limit.set(Some(snapshot));
        }

        let status = response.status();
        if !status.is_success() {
            // Non-200 bodies need not conform to the envelope; carry the
            // raw text instead of parsing it.
            return Err(LinearError::Status {
                status: status.as_u16(),
                body: response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<failed to read response body>".to_string()),
            });
        }

        let bytes = response.bytes().await?;
        let envelope: GraphQLResponse =
            serde_json::from_slice(&bytes).map_err(LinearError::Decode)?;

        // Any error entry fails the call, even when data is also populated.
        if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
            return Err(LinearError::GraphQL { errors });
        }

        envelope
            .data
            .filter(|data| !data.is_null())
            .ok_or(LinearError::EmptyResponse)
    }

    /// Issue a minimal no-op query to refresh the quota headers, then return
    /// the snapshot. Fails when the server never reported the headers.
    pub async fn rate_limit(&self) -> Result<RateLimit> {
        self.query_raw(PING_QUERY, None).await?;
        self.last_rate_limit().ok_or(LinearError::RateLimitUnavailable)
    }

    /// Last-observed snapshot, if any call so far carried the headers.
    pub fn last_rate_limit(&self) -> Option<RateLimit> {
        self.last_rate_limit.get()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[derive(Deserialize, Debug)]
    struct ViewerData {
        viewer: Viewer,
    }

    #[derive(Deserialize, Debug)]
    struct Viewer {
        id: String,
    }

    async fn client_for(server: &MockServer) -> LinearClient {
        LinearClient::with_endpoint("test-key".to_string(), server.uri()).unwrap()
    }

    #[tokio::test]
    async fn decodes_data_into_typed_target() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({
                    "data": { "viewer": { "id": "u1" } }
                })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let data: ViewerData = client
            .query("query Me { viewer { id } }", None)
            .await
            .expect("query should succeed");

        assert_eq!(data.viewer.id, "u1");
    }

    #[tokio::test]
    async fn sends_auth_header_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Authorization", "test-key"))
            .and(header("Content-Type", "application/json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "__typename": "Query" } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let data = client.query_raw(PING_QUERY, None).await.unwrap();
        assert_eq!(data["__typename"], "Query");
    }

    #[tokio::test]
    async fn omits_absent_variables_from_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "query": PING_QUERY })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "__typename": "Query" } })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client.query_raw(PING_QUERY, None).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body.get("variables").is_none());
    }

    #[tokio::test]
    async fn non_200_carries_status_and_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .query::<ViewerData>("query Me { viewer { id } }", None)
            .await
            .unwrap_err();

        match &err {
            LinearError::Status { status, body } => {
                assert_eq!(*status, 500);
                assert_eq!(body, "internal error");
            }
            other => panic!("expected Status error, got {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("internal error"));
    }

    #[tokio::test]
    async fn graphql_errors_fail_even_with_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({
                    "data": { "viewer": { "id": "u1" } },
                    "errors": [
                        { "message": "Unauthorized" },
                        { "message": "Rate limited", "locations": [{ "line": 1, "column": 9 }], "path": ["viewer"] }
                    ]
                })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .query::<ViewerData>("query Me { viewer { id } }", None)
            .await
            .unwrap_err();

        match &err {
            LinearError::GraphQL { errors } => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].message, "Unauthorized");
                assert_eq!(errors[1].locations[0].line, 1);
            }
            other => panic!("expected GraphQL error, got {other:?}"),
        }
        assert!(err.to_string().contains("Unauthorized"));
    }

    #[tokio::test]
    async fn malformed_envelope_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.query_raw(PING_QUERY, None).await.unwrap_err();
        assert!(matches!(err, LinearError::Decode(_)));
    }

    #[tokio::test]
    async fn null_data_without_errors_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.query_raw(PING_QUERY, None).await.unwrap_err();
        assert!(matches!(err, LinearError::EmptyResponse));
    }

    #[tokio::test]
    async fn snapshot_updates_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "__typename": "Query" } }))
                    .insert_header("X-RateLimit-Requests-Limit", "1500")
                    .insert_header("X-RateLimit-Requests-Remaining", "1499")
                    .insert_header("X-RateLimit-Requests-Reset", "1717000000000")
                    .insert_header("X-Complexity", "1")
                    .insert_header("X-RateLimit-Complexity-Limit", "250000")
                    .insert_header("X-RateLimit-Complexity-Remaining", "249999")
                    .insert_header("X-RateLimit-Complexity-Reset", "1717000000000"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(client.last_rate_limit().is_none());

        let snapshot = client.rate_limit().await.unwrap();
        assert_eq!(snapshot.requests_limit, Some(1500));
        assert_eq!(snapshot.requests_remaining, Some(1499));
        assert_eq!(snapshot.requests_reset, Some(1_717_000_000_000));
        assert_eq!(snapshot.complexity, Some(1));
        assert_eq!(snapshot.complexity_remaining, Some(249_999));
    }

    #[tokio::test]
    async fn snapshot_updates_even_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_string("rate limited")
                    .insert_header("X-RateLimit-Requests-Limit", "1500")
                    .insert_header("X-RateLimit-Requests-Remaining", "0"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.query_raw(PING_QUERY, None).await.unwrap_err();
        assert!(matches!(err, LinearError::Status { status: 429, .. }));

        let snapshot = client.last_rate_limit().expect("snapshot should be set");
        assert_eq!(snapshot.requests_remaining, Some(0));
    }

    #[tokio::test]
    async fn rate_limit_fails_without_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "__typename": "Query" } })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.rate_limit().await.unwrap_err();
        assert!(matches!(err, LinearError::RateLimitUnavailable));
    }

    #[tokio::test]
    async fn malformed_header_values_are_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "__typename": "Query" } }))
                    .insert_header("X-RateLimit-Requests-Limit", "not-a-number")
                    .insert_header("X-RateLimit-Requests-Remaining", "42"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let snapshot = client.rate_limit().await.unwrap();
        assert_eq!(snapshot.requests_limit, None);
        assert_eq!(snapshot.requests_remaining, Some(42));
    }

    #[tokio::test]
    async fn transport_failure_is_transport_error() {
        // Nothing is listening on this port.
        let client =
            LinearClient::with_endpoint("test-key".to_string(), "http://127.0.0.1:1".to_string())
                .unwrap();
        let err = client.query_raw(PING_QUERY, None).await.unwrap_err();
        assert!(matches!(err, LinearError::Transport(_)));
    }
}
