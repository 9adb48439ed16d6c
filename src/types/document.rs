use serde::{Deserialize, Serialize};

use super::Project;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub project: Option<Project>,
    pub creator: Option<DocumentCreator>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DocumentCreator {
    pub id: String,
    pub name: String,
}
