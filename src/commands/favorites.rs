use serde::Deserialize;
use serde_json::json;
use tabled::Tabled;

use crate::client::LinearClient;
use crate::commands::issues;
use crate::error::{LinearError, Result};
use crate::output::{self, truncate};
use crate::responses::{ensure_success, Connection, MutationAck};
use crate::types::Favorite;

const LIST_FAVORITES_QUERY: &str = r#"
query ListFavorites {
    favorites {
        nodes {
            id
            type
            issue {
                id
                identifier
                title
            }
            project {
                id
                name
            }
        }
    }
}
"#;

const CREATE_FAVORITE_MUTATION: &str = r#"
mutation CreateFavorite($input: FavoriteCreateInput!) {
    favoriteCreate(input: $input) {
        success
        favorite {
            id
        }
    }
}
"#;

const DELETE_FAVORITE_MUTATION: &str = r#"
mutation DeleteFavorite($id: String!) {
    favoriteDelete(id: $id) {
        success
    }
}
"#;

#[derive(Deserialize)]
struct FavoritesResponse {
    favorites: Connection<Favorite>,
}

#[derive(Deserialize)]
struct CreateFavoriteResponse {
    #[serde(rename = "favoriteCreate")]
    favorite_create: FavoriteCreateResult,
}

#[derive(Deserialize)]
struct FavoriteCreateResult {
    success: bool,
}

#[derive(Deserialize)]
struct DeleteFavoriteResponse {
    #[serde(rename = "favoriteDelete")]
    favorite_delete: MutationAck,
}

#[derive(Tabled)]
struct FavoriteRow {
    #[tabled(rename = "Type")]
    favorite_type: String,
    #[tabled(rename = "Item")]
    item: String,
}

impl From<&Favorite> for FavoriteRow {
    fn from(favorite: &Favorite) -> Self {
        Self {
            favorite_type: favorite.favorite_type.clone(),
            item: truncate(&describe(favorite), 60),
        }
    }
}

fn describe(favorite: &Favorite) -> String {
    if let Some(issue) = &favorite.issue {
        return format!("{} - {}", issue.identifier, issue.title);
    }
    if let Some(project) = &favorite.project {
        return project.name.clone();
    }
    favorite.id.clone()
}

pub async fn list(client: &LinearClient) -> Result<()> {
    let response: FavoritesResponse = client.query(LIST_FAVORITES_QUERY, None).await?;

    let favorites = response.favorites.nodes;
    if favorites.is_empty() {
        output::print_message("No favorites found");
        return Ok(());
    }

    output::print_table(
        &favorites,
        |f| FavoriteRow::from(f),
        |f| format!("{}\t{}", f.favorite_type, describe(f)),
    );

    Ok(())
}

pub async fn add_issue(client: &LinearClient, identifier: &str) -> Result<()> {
    let issue_id = issues::resolve_issue_id(client, identifier).await?;

    let variables = json!({ "input": { "issueId": issue_id } });
    let response: CreateFavoriteResponse = client
        .query(CREATE_FAVORITE_MUTATION, Some(variables))
        .await?;

    ensure_success("favoriteCreate", response.favorite_create.success)?;
    output::print_message(&format!("Favorited {identifier}"));

    Ok(())
}

/// Find the favorite pointing at the given issue, then delete it by id.
/// Two calls with no transactional guarantee between them.
pub async fn remove(client: &LinearClient, identifier: &str) -> Result<()> {
    let response: FavoritesResponse = client.query(LIST_FAVORITES_QUERY, None).await?;

    let favorite_id = response
        .favorites
        .nodes
        .iter()
        .find(|f| {
            f.issue
                .as_ref()
                .is_some_and(|i| i.identifier == identifier || i.id == identifier)
        })
        .map(|f| f.id.clone())
        .ok_or_else(|| LinearError::FavoriteNotFound(identifier.to_string()))?;

    let variables = json!({ "id": favorite_id });
    let response: DeleteFavoriteResponse = client
        .query(DELETE_FAVORITE_MUTATION, Some(variables))
        .await?;

    ensure_success("favoriteDelete", response.favorite_delete.success)?;
    output::print_message(&format!("Removed favorite for {identifier}"));

    Ok(())
}
