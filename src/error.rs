use std::path::PathBuf;
use thiserror::Error;

use crate::client::GraphQLError;

#[derive(Error, Debug)]
pub enum LinearError {
    #[error("failed to encode GraphQL request: {0}")]
    Marshal(#[source] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode GraphQL response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("GraphQL errors: {}", join_messages(errors))]
    GraphQL { errors: Vec<GraphQLError> },

    #[error("Empty response from API")]
    EmptyResponse,

    #[error("{0} reported failure")]
    SoftFailure(String),

    #[error("API did not report rate limit headers")]
    RateLimitUnavailable,

    #[error("Not authenticated. Run 'linctl auth login' or set LINEAR_API_KEY")]
    NotAuthenticated,

    #[error("Stored access token has expired. Run 'linctl auth login' again")]
    Expired,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to parse credentials file at {path}: {source}")]
    CredentialsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("Team not specified and no default_team in config")]
    NoTeam,

    #[error("Issue not found: {0}")]
    IssueNotFound(String),

    #[error("Team not found: {0}")]
    TeamNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Cycle not found: {0}")]
    CycleNotFound(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Initiative not found: {0}")]
    InitiativeNotFound(String),

    #[error("Workflow state not found: {0}")]
    WorkflowStateNotFound(String),

    #[error("No attachment with URL {url} on {issue}")]
    AttachmentNotFound { issue: String, url: String },

    #[error("No favorite found for {0}")]
    FavoriteNotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

fn join_messages(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, LinearError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphql_error_joins_all_messages() {
        let err = LinearError::GraphQL {
            errors: vec![
                GraphQLError {
                    message: "Unauthorized".to_string(),
                    locations: Vec::new(),
                    path: Vec::new(),
                },
                GraphQLError {
                    message: "Field missing".to_string(),
                    locations: Vec::new(),
                    path: Vec::new(),
                },
            ],
        };
        assert_eq!(err.to_string(), "GraphQL errors: Unauthorized, Field missing");
    }

    #[test]
    fn status_error_carries_raw_body() {
        let err = LinearError::Status {
            status: 500,
            body: "internal error".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("internal error"));
    }

    #[test]
    fn soft_failure_names_operation() {
        let err = LinearError::SoftFailure("issueArchive".to_string());
        assert_eq!(err.to_string(), "issueArchive reported failure");
    }
}
