use serde::{Deserialize, Serialize};

use super::{Cycle, Priority, Project, Team, User};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Issue {
    pub id: String,
    pub identifier: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub state: Option<WorkflowState>,
    pub assignee: Option<User>,
    pub team: Team,
    pub project: Option<Project>,
    pub cycle: Option<Cycle>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct WorkflowState {
    pub id: String,
    pub name: String,
    pub color: String,
    /// State category: triage, backlog, unstarted, started, completed,
    /// canceled.
    #[serde(rename = "type", default)]
    pub state_type: Option<String>,
}

/// Minimal issue reference embedded in other entities.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct IssueRef {
    pub id: String,
    pub identifier: String,
    pub title: String,
}
