use serde::Deserialize;
use serde_json::{json, Map};
use tabled::Tabled;

use crate::cli::{MilestoneCreateArgs, ProjectCreateArgs, ProjectUpdateArgs};
use crate::client::LinearClient;
use crate::commands::teams;
use crate::config::Config;
use crate::error::{LinearError, Result};
use crate::output::{self, format_date_only, truncate};
use crate::responses::{ensure_success, Connection};
use crate::types::{Project, ProjectMilestone};

const LIST_PROJECTS_QUERY: &str = r#"
query ListProjects($filter: ProjectFilter) {
    projects(filter: $filter) {
        nodes {
            id
            name
            state
            description
            targetDate
        }
    }
}
"#;

const GET_PROJECT_QUERY: &str = r#"
query GetProject($id: String!) {
    project(id: $id) {
        id
        name
        state
        description
        targetDate
    }
}
"#;

const FIND_PROJECT_QUERY: &str = r#"
query FindProject($name: String!) {
    projects(filter: { name: { containsIgnoreCase: $name } }) {
        nodes {
            id
            name
            state
            description
            targetDate
        }
    }
}
"#;

const CREATE_PROJECT_MUTATION: &str = r#"
mutation CreateProject($input: ProjectCreateInput!) {
    projectCreate(input: $input) {
        success
        project {
            id
            name
        }
    }
}
"#;

const UPDATE_PROJECT_MUTATION: &str = r#"
mutation UpdateProject($id: String!, $input: ProjectUpdateInput!) {
    projectUpdate(id: $id, input: $input) {
        success
        project {
            id
            name
        }
    }
}
"#;

const LIST_MILESTONES_QUERY: &str = r#"
query ListMilestones($projectId: String!) {
    project(id: $projectId) {
        projectMilestones {
            nodes {
                id
                name
                description
                targetDate
            }
        }
    }
}
"#;

const CREATE_MILESTONE_MUTATION: &str = r#"
mutation CreateMilestone($input: ProjectMilestoneCreateInput!) {
    projectMilestoneCreate(input: $input) {
        success
        projectMilestone {
            id
            name
        }
    }
}
"#;

#[derive(Deserialize)]
struct ProjectsResponse {
    projects: Connection<Project>,
}

#[derive(Deserialize)]
struct ProjectResponse {
    project: Option<Project>,
}

#[derive(Deserialize)]
struct CreateProjectResponse {
    #[serde(rename = "projectCreate")]
    project_create: ProjectMutationResult,
}

#[derive(Deserialize)]
struct UpdateProjectResponse {
    #[serde(rename = "projectUpdate")]
    project_update: ProjectMutationResult,
}

#[derive(Deserialize)]
struct ProjectMutationResult {
    success: bool,
    project: Option<ProjectStub>,
}

#[derive(Deserialize)]
struct ProjectStub {
    name: String,
}

#[derive(Deserialize)]
struct MilestonesResponse {
    project: Option<ProjectWithMilestones>,
}

#[derive(Deserialize)]
struct ProjectWithMilestones {
    #[serde(rename = "projectMilestones")]
    project_milestones: Connection<ProjectMilestone>,
}

#[derive(Deserialize)]
struct CreateMilestoneResponse {
    #[serde(rename = "projectMilestoneCreate")]
    milestone_create: MilestoneMutationResult,
}

#[derive(Deserialize)]
struct MilestoneMutationResult {
    success: bool,
    #[serde(rename = "projectMilestone")]
    project_milestone: Option<MilestoneStub>,
}

#[derive(Deserialize)]
struct MilestoneStub {
    name: String,
}

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&Project> for ProjectRow {
    fn from(project: &Project) -> Self {
        Self {
            name: truncate(&project.name, 40),
            state: project.state.clone().unwrap_or_default(),
            target: project
                .target_date
                .as_deref()
                .map(format_date_only)
                .unwrap_or_default(),
            id: project.id.clone(),
        }
    }
}

fn project_line(project: &Project) -> String {
    format!(
        "{}\t{}\t{}",
        project.name,
        project.state.as_deref().unwrap_or(""),
        project.id
    )
}

#[derive(Tabled)]
struct MilestoneRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&ProjectMilestone> for MilestoneRow {
    fn from(milestone: &ProjectMilestone) -> Self {
        Self {
            name: milestone.name.clone(),
            target: milestone
                .target_date
                .as_deref()
                .map(format_date_only)
                .unwrap_or_default(),
            id: milestone.id.clone(),
        }
    }
}

fn looks_like_uuid(s: &str) -> bool {
    s.len() == 36 && s.chars().all(|c| c == '-' || c.is_ascii_hexdigit())
}

pub async fn list(client: &LinearClient, config: &Config, team: Option<String>) -> Result<()> {
    let team_key = config.resolve_team(team.as_deref());

    let variables = team_key.filter(|k| !k.is_empty()).map(|key| {
        json!({
            "filter": {
                "accessibleTeams": {
                    "key": { "eq": key }
                }
            }
        })
    });

    let response: ProjectsResponse = client.query(LIST_PROJECTS_QUERY, variables).await?;

    let projects = response.projects.nodes;
    if projects.is_empty() {
        output::print_message("No projects found");
        return Ok(());
    }

    output::print_table(&projects, |p| ProjectRow::from(p), project_line);

    Ok(())
}

pub async fn view(client: &LinearClient, id: &str) -> Result<()> {
    let project = find_project(client, id).await?;

    output::print_item(&project, |project| {
        println!("{}", project.name);
        if let Some(desc) = &project.description {
            println!();
            println!("{desc}");
        }
        println!();
        println!(
            "State:  {}",
            project.state.as_deref().unwrap_or("-")
        );
        if let Some(target) = &project.target_date {
            println!("Target: {}", format_date_only(target));
        }
        println!("ID:     {}", project.id);
    });

    Ok(())
}

pub async fn create(client: &LinearClient, config: &Config, args: ProjectCreateArgs) -> Result<()> {
    let team_key = config
        .resolve_team(args.team.as_deref())
        .ok_or(LinearError::NoTeam)?;
    let team_id = teams::resolve_team_id(client, &team_key).await?;

    let mut input = Map::new();
    input.insert("name".to_string(), json!(args.name));
    input.insert("teamIds".to_string(), json!([team_id]));
    if let Some(desc) = args.description.filter(|d| !d.is_empty()) {
        input.insert("description".to_string(), json!(desc));
    }

    let variables = json!({ "input": input });
    let response: CreateProjectResponse =
        client.query(CREATE_PROJECT_MUTATION, Some(variables)).await?;

    ensure_success("projectCreate", response.project_create.success)?;
    if let Some(project) = response.project_create.project {
        output::print_message(&format!("Created project {}", project.name));
    }

    Ok(())
}

pub async fn update(client: &LinearClient, args: ProjectUpdateArgs) -> Result<()> {
    let project_id = resolve_project_id(client, &args.id).await?;

    let mut input = Map::new();
    if let Some(name) = args.name.filter(|n| !n.is_empty()) {
        input.insert("name".to_string(), json!(name));
    }
    if let Some(desc) = args.description.filter(|d| !d.is_empty()) {
        input.insert("description".to_string(), json!(desc));
    }
    if let Some(state) = args.state.filter(|s| !s.is_empty()) {
        input.insert("state".to_string(), json!(state));
    }
    if let Some(target) = args.target_date.filter(|t| !t.is_empty()) {
        input.insert("targetDate".to_string(), json!(target));
    }

    if input.is_empty() {
        output::print_message("No updates specified");
        return Ok(());
    }

    let variables = json!({
        "id": project_id,
        "input": input
    });

    let response: UpdateProjectResponse =
        client.query(UPDATE_PROJECT_MUTATION, Some(variables)).await?;

    ensure_success("projectUpdate", response.project_update.success)?;
    if let Some(project) = response.project_update.project {
        output::print_message(&format!("Updated project {}", project.name));
    }

    Ok(())
}

pub async fn milestones(client: &LinearClient, id: &str) -> Result<()> {
    let project_id = resolve_project_id(client, id).await?;

    let variables = json!({ "projectId": project_id });
    let response: MilestonesResponse =
        client.query(LIST_MILESTONES_QUERY, Some(variables)).await?;

    let milestones = response
        .project
        .ok_or_else(|| LinearError::ProjectNotFound(id.to_string()))?
        .project_milestones
        .nodes;

    if milestones.is_empty() {
        output::print_message("No milestones found");
        return Ok(());
    }

    output::print_table(
        &milestones,
        |m| MilestoneRow::from(m),
        |m| format!("{}\t{}", m.name, m.target_date.as_deref().unwrap_or("")),
    );

    Ok(())
}

pub async fn add_milestone(client: &LinearClient, args: MilestoneCreateArgs) -> Result<()> {
    let project_id = resolve_project_id(client, &args.project).await?;

    let mut input = Map::new();
    input.insert("projectId".to_string(), json!(project_id));
    input.insert("name".to_string(), json!(args.name));
    if let Some(target) = args.target_date.filter(|t| !t.is_empty()) {
        input.insert("targetDate".to_string(), json!(target));
    }

    let variables = json!({ "input": input });
    let response: CreateMilestoneResponse = client
        .query(CREATE_MILESTONE_MUTATION, Some(variables))
        .await?;

    ensure_success("projectMilestoneCreate", response.milestone_create.success)?;
    if let Some(milestone) = response.milestone_create.project_milestone {
        output::print_message(&format!("Created milestone {}", milestone.name));
    }

    Ok(())
}

/// Resolve a project name (case-insensitive substring) or UUID to its UUID.
pub async fn resolve_project_id(client: &LinearClient, name_or_id: &str) -> Result<String> {
    find_project(client, name_or_id).await.map(|p| p.id)
}

async fn find_project(client: &LinearClient, name_or_id: &str) -> Result<Project> {
    if looks_like_uuid(name_or_id) {
        let variables = json!({ "id": name_or_id });
        let response: ProjectResponse = client.query(GET_PROJECT_QUERY, Some(variables)).await?;
        return response
            .project
            .ok_or_else(|| LinearError::ProjectNotFound(name_or_id.to_string()));
    }

    let variables = json!({ "name": name_or_id });
    let response: ProjectsResponse = client.query(FIND_PROJECT_QUERY, Some(variables)).await?;

    response
        .projects
        .nodes
        .into_iter()
        .next()
        .ok_or_else(|| LinearError::ProjectNotFound(name_or_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_shape_is_recognized() {
        assert!(looks_like_uuid("b3a4c8d0-1234-4abc-9def-0123456789ab"));
    }

    #[test]
    fn names_are_not_uuids() {
        assert!(!looks_like_uuid("Backend rewrite"));
        assert!(!looks_like_uuid("b3a4c8d0"));
        // Right length, wrong characters.
        assert!(!looks_like_uuid("this-is-not-a-uuid-but-is-36-chars-x"));
    }
}
