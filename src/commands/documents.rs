use serde::Deserialize;
use serde_json::{json, Map};
use tabled::Tabled;

use crate::cli::DocumentCreateArgs;
use crate::client::LinearClient;
use crate::commands::projects;
use crate::error::{LinearError, Result};
use crate::output::{self, format_relative, truncate};
use crate::responses::{ensure_success, Connection};
use crate::types::Document;

const LIST_DOCUMENTS_QUERY: &str = r#"
query ListDocuments($filter: DocumentFilter) {
    documents(filter: $filter) {
        nodes {
            id
            title
            project {
                id
                name
                state
            }
            creator {
                id
                name
            }
            createdAt
            updatedAt
        }
    }
}
"#;

const GET_DOCUMENT_QUERY: &str = r#"
query GetDocument($id: String!) {
    document(id: $id) {
        id
        title
        content
        project {
            id
            name
            state
        }
        creator {
            id
            name
        }
        createdAt
        updatedAt
    }
}
"#;

const CREATE_DOCUMENT_MUTATION: &str = r#"
mutation CreateDocument($input: DocumentCreateInput!) {
    documentCreate(input: $input) {
        success
        document {
            id
            title
        }
    }
}
"#;

#[derive(Deserialize)]
struct DocumentsResponse {
    documents: Connection<Document>,
}

#[derive(Deserialize)]
struct DocumentResponse {
    document: Option<Document>,
}

#[derive(Deserialize)]
struct CreateDocumentResponse {
    #[serde(rename = "documentCreate")]
    document_create: DocumentMutationResult,
}

#[derive(Deserialize)]
struct DocumentMutationResult {
    success: bool,
    document: Option<DocumentStub>,
}

#[derive(Deserialize)]
struct DocumentStub {
    title: String,
}

#[derive(Tabled)]
struct DocumentRow {
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Updated")]
    updated: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&Document> for DocumentRow {
    fn from(document: &Document) -> Self {
        Self {
            title: truncate(&document.title, 40),
            project: document
                .project
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            updated: format_relative(&document.updated_at),
            id: document.id.clone(),
        }
    }
}

fn document_line(document: &Document) -> String {
    format!(
        "{}\t{}\t{}",
        document.title,
        document
            .project
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or(""),
        document.id
    )
}

pub async fn list(client: &LinearClient, project: Option<String>) -> Result<()> {
    let variables = project.filter(|p| !p.is_empty()).map(|name| {
        json!({
            "filter": {
                "project": {
                    "name": { "containsIgnoreCase": name }
                }
            }
        })
    });

    let response: DocumentsResponse = client.query(LIST_DOCUMENTS_QUERY, variables).await?;

    let documents = response.documents.nodes;
    if documents.is_empty() {
        output::print_message("No documents found");
        return Ok(());
    }

    output::print_table(&documents, |d| DocumentRow::from(d), document_line);

    Ok(())
}

pub async fn view(client: &LinearClient, id: &str) -> Result<()> {
    let variables = json!({ "id": id });
    let response: DocumentResponse = client.query(GET_DOCUMENT_QUERY, Some(variables)).await?;

    let document = response
        .document
        .ok_or_else(|| LinearError::DocumentNotFound(id.to_string()))?;

    output::print_item(&document, |document| {
        println!("{}", document.title);
        if let Some(project) = &document.project {
            println!("Project: {}", project.name);
        }
        if let Some(creator) = &document.creator {
            println!("Author:  {}", creator.name);
        }
        println!("Updated: {}", format_relative(&document.updated_at));
        if let Some(content) = &document.content {
            println!();
            println!("{content}");
        }
    });

    Ok(())
}

pub async fn create(client: &LinearClient, args: DocumentCreateArgs) -> Result<()> {
    let mut input = Map::new();
    input.insert("title".to_string(), json!(args.title));

    if let Some(content) = args.content.filter(|c| !c.is_empty()) {
        input.insert("content".to_string(), json!(content));
    }
    if let Some(project) = args.project.filter(|p| !p.is_empty()) {
        let project_id = projects::resolve_project_id(client, &project).await?;
        input.insert("projectId".to_string(), json!(project_id));
    }

    let variables = json!({ "input": input });
    let response: CreateDocumentResponse = client
        .query(CREATE_DOCUMENT_MUTATION, Some(variables))
        .await?;

    ensure_success("documentCreate", response.document_create.success)?;
    if let Some(document) = response.document_create.document {
        output::print_message(&format!("Created document {}", document.title));
    }

    Ok(())
}
