use serde::Deserialize;
use serde_json::{json, Map};
use tabled::Tabled;

use crate::cli::AttachUrlArgs;
use crate::client::LinearClient;
use crate::error::{LinearError, Result};
use crate::output::{self, format_relative, truncate};
use crate::responses::{ensure_success, Connection, MutationAck};
use crate::types::Attachment;

const LIST_ATTACHMENTS_QUERY: &str = r#"
query ListAttachments($issueId: String!) {
    issue(id: $issueId) {
        attachments {
            nodes {
                id
                title
                subtitle
                url
                createdAt
            }
        }
    }
}
"#;

const ATTACH_URL_MUTATION: &str = r#"
mutation AttachUrl($issueId: String!, $url: String!, $title: String) {
    attachmentLinkURL(issueId: $issueId, url: $url, title: $title) {
        success
        attachment {
            id
        }
    }
}
"#;

const DELETE_ATTACHMENT_MUTATION: &str = r#"
mutation DeleteAttachment($id: String!) {
    attachmentDelete(id: $id) {
        success
    }
}
"#;

#[derive(Deserialize)]
struct AttachmentsResponse {
    issue: Option<IssueWithAttachments>,
}

#[derive(Deserialize)]
struct IssueWithAttachments {
    attachments: Connection<Attachment>,
}

#[derive(Deserialize)]
struct AttachUrlResponse {
    #[serde(rename = "attachmentLinkURL")]
    attachment_link: AttachResult,
}

#[derive(Deserialize)]
struct AttachResult {
    success: bool,
}

#[derive(Deserialize)]
struct DeleteAttachmentResponse {
    #[serde(rename = "attachmentDelete")]
    attachment_delete: MutationAck,
}

#[derive(Tabled)]
struct AttachmentRow {
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Added")]
    added: String,
}

impl From<&Attachment> for AttachmentRow {
    fn from(attachment: &Attachment) -> Self {
        Self {
            title: truncate(&attachment.title, 30),
            url: truncate(attachment.url.as_deref().unwrap_or(""), 50),
            added: format_relative(&attachment.created_at),
        }
    }
}

fn attachment_line(attachment: &Attachment) -> String {
    format!(
        "{}\t{}",
        attachment.title,
        attachment.url.as_deref().unwrap_or("")
    )
}

async fn fetch_attachments(client: &LinearClient, issue_id: &str) -> Result<Vec<Attachment>> {
    let variables = json!({ "issueId": issue_id });
    let response: AttachmentsResponse =
        client.query(LIST_ATTACHMENTS_QUERY, Some(variables)).await?;

    Ok(response
        .issue
        .ok_or_else(|| LinearError::IssueNotFound(issue_id.to_string()))?
        .attachments
        .nodes)
}

pub async fn list(client: &LinearClient, id: &str) -> Result<()> {
    let attachments = fetch_attachments(client, id).await?;

    if attachments.is_empty() {
        output::print_message("No attachments found");
        return Ok(());
    }

    output::print_table(&attachments, |a| AttachmentRow::from(a), attachment_line);

    Ok(())
}

pub async fn attach(client: &LinearClient, args: AttachUrlArgs) -> Result<()> {
    url::Url::parse(&args.url).map_err(|_| LinearError::InvalidUrl(args.url.clone()))?;

    let mut variables = Map::new();
    variables.insert("issueId".to_string(), json!(args.id));
    variables.insert("url".to_string(), json!(args.url));
    if let Some(title) = args.title.filter(|t| !t.is_empty()) {
        variables.insert("title".to_string(), json!(title));
    }

    let response: AttachUrlResponse = client
        .query(ATTACH_URL_MUTATION, Some(variables.into()))
        .await?;

    ensure_success("attachmentLinkURL", response.attachment_link.success)?;
    output::print_message(&format!("Attached {} to {}", args.url, args.id));

    Ok(())
}

/// Find the attachment on the issue whose URL matches, then delete it by
/// id. Two calls with no transactional guarantee between them.
pub async fn detach(client: &LinearClient, id: &str, url: &str) -> Result<()> {
    let attachments = fetch_attachments(client, id).await?;

    let attachment_id = attachments
        .iter()
        .find(|a| a.url.as_deref() == Some(url))
        .map(|a| a.id.clone())
        .ok_or_else(|| LinearError::AttachmentNotFound {
            issue: id.to_string(),
            url: url.to_string(),
        })?;

    let variables = json!({ "id": attachment_id });
    let response: DeleteAttachmentResponse = client
        .query(DELETE_ATTACHMENT_MUTATION, Some(variables))
        .await?;

    ensure_success("attachmentDelete", response.attachment_delete.success)?;
    output::print_message(&format!("Detached {url} from {id}"));

    Ok(())
}
