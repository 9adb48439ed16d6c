use serde::{Deserialize, Serialize};

use super::IssueRef;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    #[serde(rename = "readAt", default)]
    pub read_at: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    /// Present on issue notifications only.
    #[serde(default)]
    pub issue: Option<IssueRef>,
}

impl Notification {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}
