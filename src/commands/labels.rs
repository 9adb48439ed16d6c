use serde::Deserialize;
use serde_json::{json, Map};
use tabled::Tabled;

use crate::cli::LabelCreateArgs;
use crate::client::LinearClient;
use crate::commands::teams;
use crate::config::Config;
use crate::error::Result;
use crate::output::{self, is_json_output, status_colored, truncate};
use crate::responses::{ensure_success, Connection};
use crate::types::Label;

const LIST_LABELS_QUERY: &str = r#"
query ListLabels($filter: IssueLabelFilter) {
    issueLabels(filter: $filter) {
        nodes {
            id
            name
            color
            description
        }
    }
}
"#;

const CREATE_LABEL_MUTATION: &str = r#"
mutation CreateLabel($input: IssueLabelCreateInput!) {
    issueLabelCreate(input: $input) {
        success
        issueLabel {
            id
            name
        }
    }
}
"#;

#[derive(Deserialize)]
struct LabelsResponse {
    #[serde(rename = "issueLabels")]
    issue_labels: Connection<Label>,
}

#[derive(Deserialize)]
struct CreateLabelResponse {
    #[serde(rename = "issueLabelCreate")]
    label_create: LabelMutationResult,
}

#[derive(Deserialize)]
struct LabelMutationResult {
    success: bool,
    #[serde(rename = "issueLabel")]
    issue_label: Option<LabelStub>,
}

#[derive(Deserialize)]
struct LabelStub {
    name: String,
}

#[derive(Tabled)]
struct LabelRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&Label> for LabelRow {
    fn from(label: &Label) -> Self {
        Self {
            name: if is_json_output() {
                label.name.clone()
            } else {
                status_colored(&label.name, Some(&label.color))
            },
            description: truncate(label.description.as_deref().unwrap_or(""), 40),
            id: label.id.clone(),
        }
    }
}

pub async fn list(client: &LinearClient, config: &Config, team: Option<String>) -> Result<()> {
    let team_key = config.resolve_team(team.as_deref());

    let variables = team_key.filter(|k| !k.is_empty()).map(|key| {
        json!({
            "filter": {
                "team": {
                    "key": { "eq": key }
                }
            }
        })
    });

    let response: LabelsResponse = client.query(LIST_LABELS_QUERY, variables).await?;

    let labels = response.issue_labels.nodes;
    if labels.is_empty() {
        output::print_message("No labels found");
        return Ok(());
    }

    output::print_table(&labels, |l| LabelRow::from(l), |l| l.name.clone());

    Ok(())
}

pub async fn create(client: &LinearClient, config: &Config, args: LabelCreateArgs) -> Result<()> {
    let mut input = Map::new();
    input.insert("name".to_string(), json!(args.name));

    if let Some(color) = args.color.filter(|c| !c.is_empty()) {
        input.insert("color".to_string(), json!(color));
    }
    // Workspace-level label when no team is given, explicitly or via config.
    if let Some(team_key) = config.resolve_team(args.team.as_deref()) {
        let team_id = teams::resolve_team_id(client, &team_key).await?;
        input.insert("teamId".to_string(), json!(team_id));
    }

    let variables = json!({ "input": input });
    let response: CreateLabelResponse =
        client.query(CREATE_LABEL_MUTATION, Some(variables)).await?;

    ensure_success("issueLabelCreate", response.label_create.success)?;
    if let Some(label) = response.label_create.issue_label {
        output::print_message(&format!("Created label {}", label.name));
    }

    Ok(())
}
