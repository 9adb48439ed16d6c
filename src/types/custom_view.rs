use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CustomView {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Entity type the view filters: Issue, Project, ...
    #[serde(rename = "modelName", default)]
    pub model_name: Option<String>,
}
