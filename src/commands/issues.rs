use serde::Deserialize;
use serde_json::{json, Map, Value};
use tabled::Tabled;

use crate::cli::{IssueCreateArgs, IssueListArgs, IssueUpdateArgs};
use crate::client::LinearClient;
use crate::commands::{projects, teams};
use crate::config::Config;
use crate::error::{LinearError, Result};
use crate::output::{self, format_date, status_colored, truncate};
use crate::responses::{ensure_success, Connection, ViewerIdResponse};
use crate::types::Issue;

const ISSUE_FIELDS: &str = r#"
        id
        identifier
        title
        description
        priority
        state {
            id
            name
            color
            type
        }
        assignee {
            id
            name
            email
        }
        team {
            id
            key
            name
        }
        project {
            id
            name
            state
        }
        cycle {
            id
            name
            number
            startsAt
            endsAt
        }
        url
        createdAt
        updatedAt"#;

const LIST_ISSUES_QUERY: &str = const_format::formatcp!(
    r#"
query ListIssues($filter: IssueFilter, $first: Int, $after: String) {{
    issues(filter: $filter, first: $first, after: $after) {{
        nodes {{{ISSUE_FIELDS}
        }}
        pageInfo {{
            hasNextPage
            endCursor
        }}
    }}
}}
"#
);

const GET_ISSUE_QUERY: &str = const_format::formatcp!(
    r#"
query GetIssue($id: String!) {{
    issue(id: $id) {{{ISSUE_FIELDS}
    }}
}}
"#
);

const CREATE_ISSUE_MUTATION: &str = r#"
mutation CreateIssue($input: IssueCreateInput!) {
    issueCreate(input: $input) {
        success
        issue {
            id
            identifier
            title
        }
    }
}
"#;

const UPDATE_ISSUE_MUTATION: &str = r#"
mutation UpdateIssue($id: String!, $input: IssueUpdateInput!) {
    issueUpdate(id: $id, input: $input) {
        success
        issue {
            id
            identifier
            title
        }
    }
}
"#;

const ARCHIVE_ISSUE_MUTATION: &str = r#"
mutation ArchiveIssue($id: String!) {
    issueArchive(id: $id) {
        success
        entity {
            id
            identifier
        }
    }
}
"#;

const DELETE_ISSUE_MUTATION: &str = r#"
mutation DeleteIssue($id: String!) {
    issueDelete(id: $id) {
        success
    }
}
"#;

const GET_VIEWER_QUERY: &str = r#"
query Viewer {
    viewer {
        id
    }
}
"#;

const GET_STATES_QUERY: &str = r#"
query GetStates($teamId: String!) {
    workflowStates(filter: { team: { id: { eq: $teamId } } }) {
        nodes {
            id
            name
            type
        }
    }
}
"#;

const GET_ISSUE_ID_QUERY: &str = r#"
query GetIssueId($id: String!) {
    issue(id: $id) { id }
}
"#;

#[derive(Deserialize)]
struct IssuesResponse {
    issues: Connection<Issue>,
}

#[derive(Deserialize)]
struct IssueResponse {
    issue: Option<Issue>,
}

#[derive(Deserialize)]
struct CreateIssueResponse {
    #[serde(rename = "issueCreate")]
    issue_create: IssueMutationResult,
}

#[derive(Deserialize)]
struct UpdateIssueResponse {
    #[serde(rename = "issueUpdate")]
    issue_update: IssueMutationResult,
}

#[derive(Deserialize)]
struct IssueMutationResult {
    success: bool,
    issue: Option<IssueStub>,
}

#[derive(Deserialize)]
struct IssueStub {
    identifier: String,
    title: String,
}

#[derive(Deserialize)]
struct ArchiveIssueResponse {
    #[serde(rename = "issueArchive")]
    issue_archive: ArchiveResult,
}

#[derive(Deserialize)]
struct ArchiveResult {
    success: bool,
    entity: Option<ArchivedIssue>,
}

#[derive(Deserialize)]
struct ArchivedIssue {
    identifier: String,
}

#[derive(Deserialize)]
struct DeleteIssueResponse {
    #[serde(rename = "issueDelete")]
    issue_delete: crate::responses::MutationAck,
}

#[derive(Deserialize)]
struct WorkflowStatesResponse {
    #[serde(rename = "workflowStates")]
    workflow_states: Connection<WorkflowStateNode>,
}

#[derive(Deserialize)]
struct WorkflowStateNode {
    id: String,
    name: String,
    #[serde(rename = "type")]
    state_type: String,
}

#[derive(Deserialize)]
struct IssueIdResponse {
    issue: Option<IssueId>,
}

#[derive(Deserialize)]
struct IssueId {
    id: String,
}

#[derive(Tabled)]
struct IssueRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
}

impl From<&Issue> for IssueRow {
    fn from(issue: &Issue) -> Self {
        Self {
            id: issue.identifier.clone(),
            title: truncate(&issue.title, 50),
            status: issue
                .state
                .as_ref()
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            priority: issue.priority.label().to_string(),
            assignee: issue
                .assignee
                .as_ref()
                .map(|u| u.name.clone())
                .unwrap_or_default(),
        }
    }
}

fn issue_line(issue: &Issue) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        issue.identifier,
        issue.title,
        issue.state.as_ref().map(|s| s.name.as_str()).unwrap_or(""),
        issue.priority.label(),
        issue.assignee.as_ref().map(|u| u.name.as_str()).unwrap_or("")
    )
}

fn build_issue_filter(
    team: Option<&str>,
    status: Option<&str>,
    project: Option<&str>,
    label: Option<&str>,
    assignee_id: Option<&str>,
) -> Map<String, Value> {
    let mut filter = Map::new();

    if let Some(team_key) = team.filter(|s| !s.is_empty()) {
        filter.insert("team".to_string(), json!({ "key": { "eq": team_key } }));
    }
    if let Some(status) = status.filter(|s| !s.is_empty()) {
        filter.insert(
            "state".to_string(),
            json!({ "name": { "containsIgnoreCase": status } }),
        );
    }
    if let Some(project) = project.filter(|s| !s.is_empty()) {
        filter.insert(
            "project".to_string(),
            json!({ "name": { "containsIgnoreCase": project } }),
        );
    }
    if let Some(label) = label.filter(|s| !s.is_empty()) {
        filter.insert(
            "labels".to_string(),
            json!({ "name": { "eq": label } }),
        );
    }
    if let Some(assignee_id) = assignee_id.filter(|s| !s.is_empty()) {
        filter.insert("assignee".to_string(), json!({ "id": { "eq": assignee_id } }));
    }

    filter
}

fn list_variables(filter: Map<String, Value>, first: u32, after: Option<&str>) -> Value {
    let mut variables = Map::new();

    if !filter.is_empty() {
        variables.insert("filter".to_string(), Value::Object(filter));
    }
    variables.insert("first".to_string(), json!(first));
    if let Some(cursor) = after.filter(|c| !c.is_empty()) {
        variables.insert("after".to_string(), json!(cursor));
    }

    Value::Object(variables)
}

pub async fn list(client: &LinearClient, config: &Config, args: IssueListArgs) -> Result<()> {
    let viewer_id = if args.mine {
        let viewer: ViewerIdResponse = client.query(GET_VIEWER_QUERY, None).await?;
        Some(viewer.viewer.id)
    } else {
        None
    };

    let team = config.resolve_team(args.team.as_deref());
    let filter = build_issue_filter(
        team.as_deref(),
        args.status.as_deref(),
        args.project.as_deref(),
        args.label.as_deref(),
        viewer_id.as_deref(),
    );

    let variables = list_variables(filter, args.limit.min(250), args.cursor.as_deref());
    let response: IssuesResponse = client.query(LIST_ISSUES_QUERY, Some(variables)).await?;

    let issues = response.issues.nodes;
    if issues.is_empty() {
        output::print_message("No issues found");
        return Ok(());
    }

    output::print_table(&issues, |i| IssueRow::from(i), issue_line);

    if let Some(page_info) = response.issues.page_info {
        if page_info.has_next_page {
            if let Some(cursor) = page_info.end_cursor {
                output::print_message(&format!("More results: pass --cursor {cursor}"));
            }
        }
    }

    Ok(())
}

pub async fn view(client: &LinearClient, id: &str) -> Result<()> {
    let variables = json!({ "id": id });
    let response: IssueResponse = client.query(GET_ISSUE_QUERY, Some(variables)).await?;

    let issue = response
        .issue
        .ok_or_else(|| LinearError::IssueNotFound(id.to_string()))?;

    output::print_item(&issue, |issue| {
        println!("{} - {}", issue.identifier, issue.title);
        println!();

        if let Some(desc) = &issue.description {
            println!("{desc}");
            println!();
        }

        println!("Team:     {}", issue.team.name);
        println!(
            "Status:   {}",
            issue
                .state
                .as_ref()
                .map(|s| status_colored(&s.name, Some(&s.color)))
                .unwrap_or_else(|| "-".to_string())
        );
        println!("Priority: {}", issue.priority.colored());
        println!(
            "Assignee: {}",
            issue.assignee.as_ref().map(|u| &u.name[..]).unwrap_or("-")
        );
        if let Some(project) = &issue.project {
            println!("Project:  {}", project.name);
        }
        if let Some(cycle) = &issue.cycle {
            match &cycle.name {
                Some(name) => println!("Cycle:    {name}"),
                None => println!("Cycle:    Cycle {}", cycle.number),
            }
        }
        if let Some(url) = &issue.url {
            println!("URL:      {url}");
        }
        println!("Created:  {}", format_date(&issue.created_at));
        println!("Updated:  {}", format_date(&issue.updated_at));
    });

    Ok(())
}

pub async fn create(client: &LinearClient, config: &Config, args: IssueCreateArgs) -> Result<()> {
    let team_key = config
        .resolve_team(args.team.as_deref())
        .ok_or(LinearError::NoTeam)?;
    let team_id = teams::resolve_team_id(client, &team_key).await?;

    let mut input = Map::new();
    input.insert("title".to_string(), json!(args.title));
    input.insert("teamId".to_string(), json!(team_id));

    if let Some(desc) = args.description.filter(|d| !d.is_empty()) {
        input.insert("description".to_string(), json!(desc));
    }
    if let Some(priority) = args.priority {
        input.insert("priority".to_string(), json!(priority.as_i32()));
    }
    if let Some(project) = args.project.filter(|p| !p.is_empty()) {
        let project_id = projects::resolve_project_id(client, &project).await?;
        input.insert("projectId".to_string(), json!(project_id));
    }

    let variables = json!({ "input": input });
    let response: CreateIssueResponse =
        client.query(CREATE_ISSUE_MUTATION, Some(variables)).await?;

    ensure_success("issueCreate", response.issue_create.success)?;
    if let Some(issue) = response.issue_create.issue {
        output::print_message(&format!("Created {} - {}", issue.identifier, issue.title));
    }

    Ok(())
}

pub async fn update(client: &LinearClient, args: IssueUpdateArgs) -> Result<()> {
    let mut input = Map::new();

    if let Some(title) = args.title.filter(|t| !t.is_empty()) {
        input.insert("title".to_string(), json!(title));
    }
    if let Some(desc) = args.description.filter(|d| !d.is_empty()) {
        input.insert("description".to_string(), json!(desc));
    }
    if let Some(priority) = args.priority {
        input.insert("priority".to_string(), json!(priority.as_i32()));
    }

    // Status change needs the name resolved to a state ID within the
    // issue's team.
    if let Some(status_name) = args.status.as_deref().filter(|s| !s.is_empty()) {
        let issue_response: IssueResponse = client
            .query(GET_ISSUE_QUERY, Some(json!({ "id": args.id })))
            .await?;

        let issue = issue_response
            .issue
            .ok_or_else(|| LinearError::IssueNotFound(args.id.clone()))?;

        let state_id = find_state_by_name(client, &issue.team.id, status_name).await?;
        input.insert("stateId".to_string(), json!(state_id));
    }

    if let Some(assignee) = args.assignee.as_deref().filter(|a| !a.is_empty()) {
        let assignee_id = if assignee == "me" {
            let viewer: ViewerIdResponse = client.query(GET_VIEWER_QUERY, None).await?;
            viewer.viewer.id
        } else {
            assignee.to_string()
        };
        input.insert("assigneeId".to_string(), json!(assignee_id));
    }

    if input.is_empty() {
        output::print_message("No updates specified");
        return Ok(());
    }

    let variables = json!({
        "id": args.id,
        "input": input
    });

    let response: UpdateIssueResponse =
        client.query(UPDATE_ISSUE_MUTATION, Some(variables)).await?;

    ensure_success("issueUpdate", response.issue_update.success)?;
    if let Some(issue) = response.issue_update.issue {
        output::print_message(&format!("Updated {} - {}", issue.identifier, issue.title));
    }

    Ok(())
}

/// Set an issue's status to its team's completed state.
pub async fn close(client: &LinearClient, id: &str) -> Result<()> {
    let issue_response: IssueResponse = client
        .query(GET_ISSUE_QUERY, Some(json!({ "id": id })))
        .await?;

    let issue = issue_response
        .issue
        .ok_or_else(|| LinearError::IssueNotFound(id.to_string()))?;

    let states_response: WorkflowStatesResponse = client
        .query(GET_STATES_QUERY, Some(json!({ "teamId": issue.team.id })))
        .await?;

    let state_id = states_response
        .workflow_states
        .nodes
        .iter()
        .find(|s| s.state_type == "completed")
        .map(|s| s.id.clone())
        .ok_or_else(|| LinearError::WorkflowStateNotFound("completed".to_string()))?;

    let variables = json!({
        "id": id,
        "input": { "stateId": state_id }
    });

    let response: UpdateIssueResponse =
        client.query(UPDATE_ISSUE_MUTATION, Some(variables)).await?;

    ensure_success("issueUpdate", response.issue_update.success)?;
    output::print_message(&format!("Closed {}", issue.identifier));

    Ok(())
}

pub async fn archive(client: &LinearClient, id: &str) -> Result<()> {
    let issue_id = resolve_issue_id(client, id).await?;

    let response: ArchiveIssueResponse = client
        .query(ARCHIVE_ISSUE_MUTATION, Some(json!({ "id": issue_id })))
        .await?;

    ensure_success("issueArchive", response.issue_archive.success)?;
    match response.issue_archive.entity {
        Some(issue) => output::print_message(&format!("Archived {}", issue.identifier)),
        None => output::print_message(&format!("Archived {id}")),
    }

    Ok(())
}

pub async fn delete(client: &LinearClient, id: &str) -> Result<()> {
    let issue_id = resolve_issue_id(client, id).await?;

    let response: DeleteIssueResponse = client
        .query(DELETE_ISSUE_MUTATION, Some(json!({ "id": issue_id })))
        .await?;

    ensure_success("issueDelete", response.issue_delete.success)?;
    output::print_message(&format!("Deleted {id}"));

    Ok(())
}

async fn find_state_by_name(client: &LinearClient, team_id: &str, name: &str) -> Result<String> {
    let states_response: WorkflowStatesResponse = client
        .query(GET_STATES_QUERY, Some(json!({ "teamId": team_id })))
        .await?;

    states_response
        .workflow_states
        .nodes
        .iter()
        .find(|s| s.name.to_lowercase().contains(&name.to_lowercase()))
        .map(|s| s.id.clone())
        .ok_or_else(|| LinearError::WorkflowStateNotFound(name.to_string()))
}

/// Resolve an issue identifier (e.g., ENG-123) to its UUID.
pub async fn resolve_issue_id(client: &LinearClient, identifier: &str) -> Result<String> {
    let response: IssueIdResponse = client
        .query(GET_ISSUE_ID_QUERY, Some(json!({ "id": identifier })))
        .await?;

    response
        .issue
        .map(|i| i.id)
        .ok_or_else(|| LinearError::IssueNotFound(identifier.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_is_omitted_from_variables() {
        let variables = list_variables(Map::new(), 25, None);
        assert!(variables.get("filter").is_none());
        assert_eq!(variables["first"], 25);
        assert!(variables.get("after").is_none());
    }

    #[test]
    fn cursor_is_passed_through_opaquely() {
        let variables = list_variables(Map::new(), 25, Some("b64:opaque=="));
        assert_eq!(variables["after"], "b64:opaque==");
    }

    #[test]
    fn empty_cursor_is_omitted() {
        let variables = list_variables(Map::new(), 25, Some(""));
        assert!(variables.get("after").is_none());
    }

    #[test]
    fn filter_omits_empty_optional_strings() {
        let filter = build_issue_filter(Some("ENG"), Some(""), None, None, None);
        assert_eq!(filter.len(), 1);
        assert_eq!(filter["team"], json!({ "key": { "eq": "ENG" } }));
    }

    #[test]
    fn filter_includes_present_values_verbatim() {
        let filter = build_issue_filter(
            Some("ENG"),
            Some("In Progress"),
            Some("Backend"),
            Some("bug"),
            Some("user-1"),
        );
        assert_eq!(filter.len(), 5);
        assert_eq!(
            filter["state"],
            json!({ "name": { "containsIgnoreCase": "In Progress" } })
        );
        assert_eq!(filter["assignee"], json!({ "id": { "eq": "user-1" } }));
    }

    #[test]
    fn list_query_requests_page_info() {
        assert!(LIST_ISSUES_QUERY.contains("pageInfo"));
        assert!(LIST_ISSUES_QUERY.contains("endCursor"));
    }

    mod archive {
        use serde_json::json;
        use wiremock::matchers::{body_string_contains, method};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        use crate::client::LinearClient;
        use crate::error::LinearError;

        async fn server_with_issue() -> MockServer {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(body_string_contains("GetIssueId"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "data": { "issue": { "id": "uuid-1" } }
                })))
                .mount(&server)
                .await;
            server
        }

        #[tokio::test]
        async fn success_false_is_soft_failure() {
            let server = server_with_issue().await;
            Mock::given(method("POST"))
                .and(body_string_contains("ArchiveIssue"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "data": { "issueArchive": { "success": false } }
                })))
                .mount(&server)
                .await;

            let client =
                LinearClient::with_endpoint("test-key".to_string(), server.uri()).unwrap();
            let err = super::super::archive(&client, "ENG-1").await.unwrap_err();
            match err {
                LinearError::SoftFailure(op) => assert_eq!(op, "issueArchive"),
                other => panic!("expected SoftFailure, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn success_reports_archived_identifier() {
            let server = server_with_issue().await;
            Mock::given(method("POST"))
                .and(body_string_contains("ArchiveIssue"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "data": {
                        "issueArchive": {
                            "success": true,
                            "entity": { "id": "uuid-1", "identifier": "ENG-1" }
                        }
                    }
                })))
                .mount(&server)
                .await;

            let client =
                LinearClient::with_endpoint("test-key".to_string(), server.uri()).unwrap();
            super::super::archive(&client, "ENG-1").await.unwrap();
        }
    }
}
