use serde::Deserialize;
use serde_json::json;
use tabled::Tabled;

use crate::client::LinearClient;
use crate::error::{LinearError, Result};
use crate::output::{self, truncate};
use crate::responses::Connection;
use crate::types::Team;

const LIST_TEAMS_QUERY: &str = r#"
query ListTeams {
    teams {
        nodes {
            id
            key
            name
            description
        }
    }
}
"#;

const GET_TEAM_QUERY: &str = r#"
query GetTeam($key: String!) {
    teams(filter: { key: { eq: $key } }) {
        nodes {
            id
            key
            name
            description
        }
    }
}
"#;

#[derive(Deserialize)]
struct TeamsResponse {
    teams: Connection<Team>,
}

#[derive(Tabled)]
struct TeamRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Team> for TeamRow {
    fn from(team: &Team) -> Self {
        Self {
            key: team.key.clone(),
            name: team.name.clone(),
            description: truncate(team.description.as_deref().unwrap_or(""), 40),
        }
    }
}

fn team_line(team: &Team) -> String {
    format!("{}\t{}", team.key, team.name)
}

pub async fn list(client: &LinearClient) -> Result<()> {
    let response: TeamsResponse = client.query(LIST_TEAMS_QUERY, None).await?;

    let teams = response.teams.nodes;
    if teams.is_empty() {
        output::print_message("No teams found");
        return Ok(());
    }

    output::print_table(&teams, |t| TeamRow::from(t), team_line);

    Ok(())
}

pub async fn view(client: &LinearClient, key: &str) -> Result<()> {
    let team = find_by_key(client, key).await?;

    output::print_item(&team, |team| {
        println!("{} ({})", team.name, team.key);
        if let Some(desc) = &team.description {
            println!();
            println!("{desc}");
        }
        println!();
        println!("ID: {}", team.id);
    });

    Ok(())
}

/// Resolve a team key (e.g., ENG) to its UUID.
pub async fn resolve_team_id(client: &LinearClient, key: &str) -> Result<String> {
    find_by_key(client, key).await.map(|team| team.id)
}

async fn find_by_key(client: &LinearClient, key: &str) -> Result<Team> {
    let variables = json!({ "key": key });
    let response: TeamsResponse = client.query(GET_TEAM_QUERY, Some(variables)).await?;

    response
        .teams
        .nodes
        .into_iter()
        .next()
        .ok_or_else(|| LinearError::TeamNotFound(key.to_string()))
}
