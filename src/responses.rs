//! Shared GraphQL response types used across commands.

use serde::Deserialize;

use crate::error::{LinearError, Result};

/// Paginated collection envelope.
#[derive(Deserialize)]
pub struct Connection<T> {
    pub nodes: Vec<T>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: Option<PageInfo>,
}

/// Cursor info for paginated queries. The cursor is opaque; it is only
/// ever passed back to the server unchanged.
#[derive(Deserialize, Debug, Clone)]
pub struct PageInfo {
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
    #[serde(rename = "endCursor")]
    pub end_cursor: Option<String>,
}

/// Mutation payload that carries nothing but the success flag.
#[derive(Deserialize)]
pub struct MutationAck {
    pub success: bool,
}

/// The API can signal soft failure: a mutation that completes without any
/// HTTP- or GraphQL-level error but reports `success: false`. Every
/// mutation accessor routes its flag through here.
pub fn ensure_success(operation: &str, success: bool) -> Result<()> {
    if success {
        Ok(())
    } else {
        Err(LinearError::SoftFailure(operation.to_string()))
    }
}

/// Viewer (current user) response for ID lookups.
#[derive(Deserialize)]
pub struct ViewerIdResponse {
    pub viewer: ViewerId,
}

#[derive(Deserialize)]
pub struct ViewerId {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn ensure_success_passes_true() {
        assert!(ensure_success("issueCreate", true).is_ok());
    }

    #[test]
    fn ensure_success_reports_soft_failure() {
        let err = ensure_success("issueArchive", false).unwrap_err();
        match err {
            LinearError::SoftFailure(op) => assert_eq!(op, "issueArchive"),
            other => panic!("expected SoftFailure, got {other:?}"),
        }
    }

    #[test]
    fn connection_decodes_nodes_and_page_info() {
        let value = json!({
            "nodes": [{ "id": "a" }, { "id": "b" }],
            "pageInfo": { "hasNextPage": true, "endCursor": "cursor-1" }
        });

        #[derive(Deserialize)]
        struct Node {
            id: String,
        }

        let connection: Connection<Node> = serde_json::from_value(value).unwrap();
        assert_eq!(connection.nodes.len(), 2);
        assert_eq!(connection.nodes[1].id, "b");

        let page_info = connection.page_info.unwrap();
        assert!(page_info.has_next_page);
        assert_eq!(page_info.end_cursor.as_deref(), Some("cursor-1"));
    }

    #[test]
    fn connection_tolerates_missing_page_info() {
        let value = json!({ "nodes": [] });

        #[derive(Deserialize)]
        struct Node {}

        let connection: Connection<Node> = serde_json::from_value(value).unwrap();
        assert!(connection.nodes.is_empty());
        assert!(connection.page_info.is_none());
    }
}
