use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::auth::{self, Credentials};
use crate::cli::AuthLoginArgs;
use crate::client::{LinearClient, RateLimit};
use crate::error::{LinearError, Result};
use crate::output;

const GET_VIEWER_QUERY: &str = r#"
query Viewer {
    viewer {
        id
        name
        email
    }
}
"#;

#[derive(Deserialize)]
struct ViewerResponse {
    viewer: Viewer,
}

#[derive(Deserialize, Serialize)]
struct Viewer {
    id: String,
    name: String,
    email: Option<String>,
}

pub async fn login(args: AuthLoginArgs) -> Result<()> {
    let credentials = match (args.key, args.token) {
        (Some(key), _) => Credentials {
            api_key: Some(key),
            ..Default::default()
        },
        (None, Some(token)) => Credentials {
            access_token: Some(token),
            expires_at: args
                .expires_in
                .map(|seconds| chrono::Utc::now().timestamp() + seconds),
            ..Default::default()
        },
        (None, None) => Credentials {
            api_key: Some(prompt_for_key()?),
            ..Default::default()
        },
    };

    // Reject the credentials before persisting them.
    let client = LinearClient::new(credentials.header_value()?)?;
    let response: ViewerResponse = client.query(GET_VIEWER_QUERY, None).await?;

    credentials.save()?;
    output::print_message(&format!(
        "Logged in as {} ({})",
        response.viewer.name,
        auth::auth_path()?.display()
    ));

    Ok(())
}

fn prompt_for_key() -> Result<String> {
    print!("Linear API key: ");
    io::stdout().flush()?;

    let mut key = String::new();
    io::stdin().read_line(&mut key)?;

    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(LinearError::NotAuthenticated);
    }
    Ok(key)
}

pub async fn logout() -> Result<()> {
    auth::delete()?;
    output::print_message("Logged out");
    Ok(())
}

pub async fn status(client: &LinearClient) -> Result<()> {
    let response: ViewerResponse = client.query(GET_VIEWER_QUERY, None).await?;

    output::print_item(&response.viewer, |viewer| {
        println!("Logged in as {}", viewer.name);
        if let Some(email) = &viewer.email {
            println!("Email: {email}");
        }
        println!("ID:    {}", viewer.id);
    });

    Ok(())
}

pub async fn rate_limit(client: &LinearClient) -> Result<()> {
    let snapshot = client.rate_limit().await?;

    output::print_item(&snapshot, print_snapshot);

    Ok(())
}

fn print_snapshot(snapshot: &RateLimit) {
    println!("Requests");
    println!("  Limit:     {}", quota(snapshot.requests_limit));
    println!("  Remaining: {}", quota(snapshot.requests_remaining));
    println!("  Resets:    {}", reset(snapshot.requests_reset));
    println!("Complexity");
    println!("  Last call: {}", quota(snapshot.complexity));
    println!("  Limit:     {}", quota(snapshot.complexity_limit));
    println!("  Remaining: {}", quota(snapshot.complexity_remaining));
    println!("  Resets:    {}", reset(snapshot.complexity_reset));
}

fn quota(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Render an epoch-milliseconds reset instant as local time.
fn reset(value: Option<u64>) -> String {
    use chrono::{DateTime, Local};

    value
        .and_then(|millis| DateTime::from_timestamp_millis(millis as i64))
        .map(|dt| {
            dt.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_quota_renders_dash() {
        assert_eq!(quota(None), "-");
        assert_eq!(quota(Some(1500)), "1500");
    }

    #[test]
    fn reset_renders_epoch_millis() {
        assert_eq!(reset(None), "-");
        // Any valid instant formats as a date, not a raw number.
        let rendered = reset(Some(1_717_000_000_000));
        assert!(rendered.starts_with("20"));
    }
}
