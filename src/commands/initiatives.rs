use serde::Deserialize;
use serde_json::json;
use tabled::Tabled;

use crate::client::LinearClient;
use crate::error::{LinearError, Result};
use crate::output::{self, format_date_only, truncate};
use crate::responses::Connection;
use crate::types::Initiative;

const LIST_INITIATIVES_QUERY: &str = r#"
query ListInitiatives {
    initiatives {
        nodes {
            id
            name
            description
            status
            targetDate
        }
    }
}
"#;

const GET_INITIATIVE_QUERY: &str = r#"
query GetInitiative($id: String!) {
    initiative(id: $id) {
        id
        name
        description
        status
        targetDate
    }
}
"#;

#[derive(Deserialize)]
struct InitiativesResponse {
    initiatives: Connection<Initiative>,
}

#[derive(Deserialize)]
struct InitiativeResponse {
    initiative: Option<Initiative>,
}

#[derive(Tabled)]
struct InitiativeRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&Initiative> for InitiativeRow {
    fn from(initiative: &Initiative) -> Self {
        Self {
            name: truncate(&initiative.name, 40),
            status: initiative.status.clone().unwrap_or_default(),
            target: initiative
                .target_date
                .as_deref()
                .map(format_date_only)
                .unwrap_or_default(),
            id: initiative.id.clone(),
        }
    }
}

fn initiative_line(initiative: &Initiative) -> String {
    format!(
        "{}\t{}\t{}",
        initiative.name,
        initiative.status.as_deref().unwrap_or(""),
        initiative.id
    )
}

pub async fn list(client: &LinearClient) -> Result<()> {
    let response: InitiativesResponse = client.query(LIST_INITIATIVES_QUERY, None).await?;

    let initiatives = response.initiatives.nodes;
    if initiatives.is_empty() {
        output::print_message("No initiatives found");
        return Ok(());
    }

    output::print_table(&initiatives, |i| InitiativeRow::from(i), initiative_line);

    Ok(())
}

pub async fn view(client: &LinearClient, id: &str) -> Result<()> {
    let variables = json!({ "id": id });
    let response: InitiativeResponse =
        client.query(GET_INITIATIVE_QUERY, Some(variables)).await?;

    let initiative = response
        .initiative
        .ok_or_else(|| LinearError::InitiativeNotFound(id.to_string()))?;

    output::print_item(&initiative, |initiative| {
        println!("{}", initiative.name);
        if let Some(desc) = &initiative.description {
            println!();
            println!("{desc}");
        }
        println!();
        println!("Status: {}", initiative.status.as_deref().unwrap_or("-"));
        if let Some(target) = &initiative.target_date {
            println!("Target: {}", format_date_only(target));
        }
        println!("ID:     {}", initiative.id);
    });

    Ok(())
}
