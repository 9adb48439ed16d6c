use serde::Deserialize;
use serde_json::json;
use tabled::Tabled;

use crate::client::LinearClient;
use crate::error::{LinearError, Result};
use crate::output;
use crate::responses::Connection;
use crate::types::User;

const GET_VIEWER_QUERY: &str = r#"
query Viewer {
    viewer {
        id
        name
        email
        active
    }
}
"#;

const LIST_USERS_QUERY: &str = r#"
query ListUsers {
    users {
        nodes {
            id
            name
            email
            active
        }
    }
}
"#;

const GET_USER_QUERY: &str = r#"
query GetUser($id: String!) {
    user(id: $id) {
        id
        name
        email
        active
    }
}
"#;

#[derive(Deserialize)]
struct ViewerResponse {
    viewer: User,
}

#[derive(Deserialize)]
struct UsersResponse {
    users: Connection<User>,
}

#[derive(Deserialize)]
struct UserResponse {
    user: Option<User>,
}

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone().unwrap_or_default(),
            id: user.id.clone(),
        }
    }
}

fn user_line(user: &User) -> String {
    format!(
        "{}\t{}\t{}",
        user.name,
        user.email.as_deref().unwrap_or(""),
        user.id
    )
}

fn print_user(user: &User) {
    output::print_item(user, |user| {
        println!("{}", user.name);
        if let Some(email) = &user.email {
            println!("Email:  {email}");
        }
        if let Some(active) = user.active {
            println!("Active: {}", if active { "yes" } else { "no" });
        }
        println!("ID:     {}", user.id);
    });
}

pub async fn me(client: &LinearClient) -> Result<()> {
    let response: ViewerResponse = client.query(GET_VIEWER_QUERY, None).await?;
    print_user(&response.viewer);
    Ok(())
}

pub async fn list(client: &LinearClient) -> Result<()> {
    let response: UsersResponse = client.query(LIST_USERS_QUERY, None).await?;

    // The API includes deactivated accounts; keep only active ones.
    let users: Vec<User> = response
        .users
        .nodes
        .into_iter()
        .filter(|u| u.active.unwrap_or(true))
        .collect();

    if users.is_empty() {
        output::print_message("No users found");
        return Ok(());
    }

    output::print_table(&users, |u| UserRow::from(u), user_line);

    Ok(())
}

pub async fn view(client: &LinearClient, id: &str) -> Result<()> {
    let variables = json!({ "id": id });
    let response: UserResponse = client.query(GET_USER_QUERY, Some(variables)).await?;

    let user = response
        .user
        .ok_or_else(|| LinearError::UserNotFound(id.to_string()))?;
    print_user(&user);

    Ok(())
}
