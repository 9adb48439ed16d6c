use serde::Deserialize;
use serde_json::json;
use tabled::Tabled;

use crate::cli::CommentArgs;
use crate::client::LinearClient;
use crate::error::{LinearError, Result};
use crate::output::{self, format_relative, truncate};
use crate::responses::{ensure_success, Connection};
use crate::types::Comment;

const LIST_COMMENTS_QUERY: &str = r#"
query ListComments($issueId: String!) {
    issue(id: $issueId) {
        comments {
            nodes {
                id
                body
                createdAt
                user {
                    id
                    name
                    email
                }
            }
        }
    }
}
"#;

const CREATE_COMMENT_MUTATION: &str = r#"
mutation CreateComment($issueId: String!, $body: String!) {
    commentCreate(input: { issueId: $issueId, body: $body }) {
        success
        comment {
            id
        }
    }
}
"#;

#[derive(Deserialize)]
struct CommentsResponse {
    issue: Option<IssueWithComments>,
}

#[derive(Deserialize)]
struct IssueWithComments {
    comments: Connection<Comment>,
}

#[derive(Deserialize)]
struct CreateCommentResponse {
    #[serde(rename = "commentCreate")]
    comment_create: CommentCreateResult,
}

#[derive(Deserialize)]
struct CommentCreateResult {
    success: bool,
}

#[derive(Tabled)]
struct CommentRow {
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Comment")]
    body: String,
}

impl From<&Comment> for CommentRow {
    fn from(comment: &Comment) -> Self {
        Self {
            author: comment
                .user
                .as_ref()
                .map(|u| u.name.clone())
                .unwrap_or_default(),
            when: format_relative(&comment.created_at),
            body: truncate(&comment.body.replace('\n', " "), 60),
        }
    }
}

fn comment_line(comment: &Comment) -> String {
    format!(
        "{}\t{}\t{}",
        comment.user.as_ref().map(|u| u.name.as_str()).unwrap_or(""),
        comment.created_at,
        comment.body.replace('\n', " ")
    )
}

pub async fn list(client: &LinearClient, id: &str) -> Result<()> {
    let variables = json!({ "issueId": id });
    let response: CommentsResponse = client.query(LIST_COMMENTS_QUERY, Some(variables)).await?;

    let comments = response
        .issue
        .ok_or_else(|| LinearError::IssueNotFound(id.to_string()))?
        .comments
        .nodes;

    if comments.is_empty() {
        output::print_message("No comments found");
        return Ok(());
    }

    output::print_table(&comments, |c| CommentRow::from(c), comment_line);

    Ok(())
}

pub async fn add(client: &LinearClient, args: CommentArgs) -> Result<()> {
    let variables = json!({
        "issueId": args.id,
        "body": args.body
    });

    let response: CreateCommentResponse =
        client.query(CREATE_COMMENT_MUTATION, Some(variables)).await?;

    ensure_success("commentCreate", response.comment_create.success)?;
    output::print_message(&format!("Commented on {}", args.id));

    Ok(())
}
