use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tabled::Tabled;

use crate::client::LinearClient;
use crate::error::Result;
use crate::output::{self, format_relative, truncate};
use crate::responses::{ensure_success, Connection, MutationAck};
use crate::types::Notification;

const LIST_NOTIFICATIONS_QUERY: &str = r#"
query ListNotifications {
    notifications {
        nodes {
            id
            type
            readAt
            createdAt
            ... on IssueNotification {
                issue {
                    id
                    identifier
                    title
                }
            }
        }
    }
}
"#;

const MARK_READ_MUTATION: &str = r#"
mutation MarkNotificationRead($id: String!, $input: NotificationUpdateInput!) {
    notificationUpdate(id: $id, input: $input) {
        success
    }
}
"#;

const MARK_ALL_READ_MUTATION: &str = r#"
mutation MarkAllNotificationsRead($readAt: DateTime!) {
    notificationMarkReadAll(readAt: $readAt) {
        success
    }
}
"#;

#[derive(Deserialize)]
struct NotificationsResponse {
    notifications: Connection<Notification>,
}

#[derive(Deserialize)]
struct MarkReadResponse {
    #[serde(rename = "notificationUpdate")]
    notification_update: MutationAck,
}

#[derive(Deserialize)]
struct MarkAllReadResponse {
    #[serde(rename = "notificationMarkReadAll")]
    mark_read_all: MutationAck,
}

#[derive(Tabled)]
struct NotificationRow {
    #[tabled(rename = "Type")]
    notification_type: String,
    #[tabled(rename = "Issue")]
    issue: String,
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Read")]
    read: String,
}

impl From<&Notification> for NotificationRow {
    fn from(notification: &Notification) -> Self {
        Self {
            notification_type: notification.notification_type.clone(),
            issue: notification
                .issue
                .as_ref()
                .map(|i| truncate(&format!("{} - {}", i.identifier, i.title), 50))
                .unwrap_or_default(),
            when: format_relative(&notification.created_at),
            read: if notification.is_read() { "yes" } else { "" }.to_string(),
        }
    }
}

fn notification_line(notification: &Notification) -> String {
    format!(
        "{}\t{}\t{}",
        notification.notification_type,
        notification
            .issue
            .as_ref()
            .map(|i| i.identifier.as_str())
            .unwrap_or(""),
        notification.created_at
    )
}

pub async fn list(client: &LinearClient, all: bool) -> Result<()> {
    let response: NotificationsResponse = client.query(LIST_NOTIFICATIONS_QUERY, None).await?;

    let notifications: Vec<Notification> = response
        .notifications
        .nodes
        .into_iter()
        .filter(|n| all || !n.is_read())
        .collect();

    if notifications.is_empty() {
        output::print_message("No notifications");
        return Ok(());
    }

    output::print_table(&notifications, |n| NotificationRow::from(n), notification_line);

    Ok(())
}

pub async fn read(client: &LinearClient, id: &str) -> Result<()> {
    let variables = json!({
        "id": id,
        "input": { "readAt": Utc::now().to_rfc3339() }
    });

    let response: MarkReadResponse = client.query(MARK_READ_MUTATION, Some(variables)).await?;

    ensure_success("notificationUpdate", response.notification_update.success)?;
    output::print_message("Marked as read");

    Ok(())
}

pub async fn read_all(client: &LinearClient) -> Result<()> {
    let variables = json!({ "readAt": Utc::now().to_rfc3339() });

    let response: MarkAllReadResponse = client
        .query(MARK_ALL_READ_MUTATION, Some(variables))
        .await?;

    ensure_success("notificationMarkReadAll", response.mark_read_all.success)?;
    output::print_message("Marked all notifications as read");

    Ok(())
}
