use serde::{Deserialize, Serialize};

/// A favorite points at exactly one entity; the others are null.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Favorite {
    pub id: String,
    #[serde(rename = "type")]
    pub favorite_type: String,
    #[serde(default)]
    pub issue: Option<FavoriteIssueRef>,
    #[serde(default)]
    pub project: Option<FavoriteProjectRef>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FavoriteIssueRef {
    pub id: String,
    pub identifier: String,
    pub title: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FavoriteProjectRef {
    pub id: String,
    pub name: String,
}
