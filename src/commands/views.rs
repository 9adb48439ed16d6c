use serde::Deserialize;
use tabled::Tabled;

use crate::client::LinearClient;
use crate::error::Result;
use crate::output::{self, truncate};
use crate::responses::Connection;
use crate::types::CustomView;

const LIST_VIEWS_QUERY: &str = r#"
query ListCustomViews {
    customViews {
        nodes {
            id
            name
            description
            modelName
        }
    }
}
"#;

#[derive(Deserialize)]
struct CustomViewsResponse {
    #[serde(rename = "customViews")]
    custom_views: Connection<CustomView>,
}

#[derive(Tabled)]
struct ViewRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    model: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&CustomView> for ViewRow {
    fn from(view: &CustomView) -> Self {
        Self {
            name: view.name.clone(),
            model: view.model_name.clone().unwrap_or_default(),
            description: truncate(view.description.as_deref().unwrap_or(""), 40),
        }
    }
}

pub async fn list(client: &LinearClient) -> Result<()> {
    let response: CustomViewsResponse = client.query(LIST_VIEWS_QUERY, None).await?;

    let views = response.custom_views.nodes;
    if views.is_empty() {
        output::print_message("No custom views found");
        return Ok(());
    }

    output::print_table(
        &views,
        |v| ViewRow::from(v),
        |v| format!("{}\t{}", v.name, v.model_name.as_deref().unwrap_or("")),
    );

    Ok(())
}
