use serde::Deserialize;
use serde_json::json;
use tabled::Tabled;

use crate::cli::CycleListArgs;
use crate::client::LinearClient;
use crate::config::Config;
use crate::error::{LinearError, Result};
use crate::output::{self, format_date_only};
use crate::responses::Connection;
use crate::types::Cycle;

const LIST_CYCLES_QUERY: &str = r#"
query ListCycles($filter: CycleFilter) {
    cycles(filter: $filter) {
        nodes {
            id
            name
            number
            startsAt
            endsAt
            completedAt
        }
    }
}
"#;

const GET_CYCLE_QUERY: &str = r#"
query GetCycle($id: String!) {
    cycle(id: $id) {
        id
        name
        number
        startsAt
        endsAt
        completedAt
    }
}
"#;

#[derive(Deserialize)]
struct CyclesResponse {
    cycles: Connection<Cycle>,
}

#[derive(Deserialize)]
struct CycleResponse {
    cycle: Option<Cycle>,
}

#[derive(Tabled)]
struct CycleRow {
    #[tabled(rename = "Cycle")]
    name: String,
    #[tabled(rename = "Starts")]
    starts: String,
    #[tabled(rename = "Ends")]
    ends: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Cycle> for CycleRow {
    fn from(cycle: &Cycle) -> Self {
        Self {
            name: display_name(cycle),
            starts: format_date_only(&cycle.starts_at),
            ends: format_date_only(&cycle.ends_at),
            status: if cycle.completed_at.is_some() {
                "completed".to_string()
            } else {
                String::new()
            },
        }
    }
}

fn display_name(cycle: &Cycle) -> String {
    match &cycle.name {
        Some(name) => name.clone(),
        None => format!("Cycle {}", cycle.number),
    }
}

fn cycle_line(cycle: &Cycle) -> String {
    format!(
        "{}\t{}\t{}",
        display_name(cycle),
        format_date_only(&cycle.starts_at),
        format_date_only(&cycle.ends_at)
    )
}

pub async fn list(client: &LinearClient, config: &Config, args: CycleListArgs) -> Result<()> {
    let team_key = config.resolve_team(args.team.as_deref());

    let variables = team_key.filter(|k| !k.is_empty()).map(|key| {
        json!({
            "filter": {
                "team": {
                    "key": { "eq": key }
                }
            }
        })
    });

    let response: CyclesResponse = client.query(LIST_CYCLES_QUERY, variables).await?;

    let cycles = response.cycles.nodes;
    if cycles.is_empty() {
        output::print_message("No cycles found");
        return Ok(());
    }

    output::print_table(&cycles, |c| CycleRow::from(c), cycle_line);

    Ok(())
}

pub async fn view(client: &LinearClient, id: &str) -> Result<()> {
    let variables = json!({ "id": id });
    let response: CycleResponse = client.query(GET_CYCLE_QUERY, Some(variables)).await?;

    let cycle = response
        .cycle
        .ok_or_else(|| LinearError::CycleNotFound(id.to_string()))?;

    output::print_item(&cycle, |cycle| {
        println!("{}", display_name(cycle));
        println!();
        println!("Starts: {}", format_date_only(&cycle.starts_at));
        println!("Ends:   {}", format_date_only(&cycle.ends_at));
        if let Some(completed) = &cycle.completed_at {
            println!("Completed: {}", format_date_only(completed));
        }
        println!("ID:     {}", cycle.id);
    });

    Ok(())
}
