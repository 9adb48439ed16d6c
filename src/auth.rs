//! Credential storage.
//!
//! A single JSON file in the user's home directory holds either a personal
//! API key (sent as the Authorization value verbatim) or an OAuth access
//! token (sent with a `Bearer ` prefix) plus its expiry instant. The file
//! is written with owner-only permissions and re-read on every
//! authenticated invocation. Expiry is checked on load, not on use.

use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::{LinearError, Result};

const AUTH_FILE_NAME: &str = ".linctl-auth.json";

/// Env var that takes precedence over the credentials file. Its value is
/// used as the Authorization header verbatim.
pub const API_KEY_ENV: &str = "LINEAR_API_KEY";

#[derive(Serialize, Deserialize, Default, Debug)]
pub struct Credentials {
    #[serde(rename = "apiKey", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(rename = "accessToken", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Expiry instant in epoch seconds. Only meaningful for OAuth tokens.
    #[serde(rename = "expiresAt", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl Credentials {
    pub fn load() -> Result<Self> {
        Self::load_from(&auth_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LinearError::NotAuthenticated);
        }

        let contents = fs::read_to_string(path)?;
        let credentials: Credentials =
            serde_json::from_str(&contents).map_err(|e| LinearError::CredentialsParse {
                path: path.to_path_buf(),
                source: e,
            })?;

        if credentials.access_token.is_some() {
            if let Some(expires_at) = credentials.expires_at {
                if expires_at <= chrono::Utc::now().timestamp() {
                    return Err(LinearError::Expired);
                }
            }
        }

        Ok(credentials)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&auth_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self).map_err(LinearError::Marshal)?;
        fs::write(path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// The Authorization header value: API key verbatim, or the OAuth
    /// access token with its `Bearer ` prefix.
    pub fn header_value(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            return Ok(key.to_string());
        }
        if let Some(token) = self.access_token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(format!("Bearer {token}"));
        }
        Err(LinearError::NotAuthenticated)
    }
}

/// Remove the credentials file. Succeeds when it does not exist.
pub fn delete() -> Result<()> {
    let path = auth_path()?;
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

pub fn auth_path() -> Result<PathBuf> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(AUTH_FILE_NAME))
        .ok_or(LinearError::NoHomeDir)
}

/// Resolve the Authorization header value for this invocation, with the
/// env var taking precedence over the credentials file.
pub fn resolve_header_value() -> Result<String> {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.is_empty() {
            return Ok(key);
        }
    }

    Credentials::load()?.header_value()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_auth_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join(AUTH_FILE_NAME)
    }

    #[test]
    fn api_key_round_trips_and_is_used_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_auth_path(&dir);

        let credentials = Credentials {
            api_key: Some("lin_api_abc123".to_string()),
            ..Default::default()
        };
        credentials.save_to(&path).unwrap();

        let loaded = Credentials::load_from(&path).unwrap();
        assert_eq!(loaded.header_value().unwrap(), "lin_api_abc123");
    }

    #[test]
    fn access_token_gets_bearer_prefix() {
        let credentials = Credentials {
            access_token: Some("oauth-token".to_string()),
            ..Default::default()
        };
        assert_eq!(credentials.header_value().unwrap(), "Bearer oauth-token");
    }

    #[test]
    fn api_key_wins_over_access_token() {
        let credentials = Credentials {
            api_key: Some("lin_api_abc123".to_string()),
            access_token: Some("oauth-token".to_string()),
            expires_at: None,
        };
        assert_eq!(credentials.header_value().unwrap(), "lin_api_abc123");
    }

    #[test]
    fn missing_file_is_not_authenticated() {
        let dir = tempfile::tempdir().unwrap();
        let err = Credentials::load_from(&temp_auth_path(&dir)).unwrap_err();
        assert!(matches!(err, LinearError::NotAuthenticated));
    }

    #[test]
    fn empty_credentials_are_not_authenticated() {
        let err = Credentials::default().header_value().unwrap_err();
        assert!(matches!(err, LinearError::NotAuthenticated));
    }

    #[test]
    fn expired_token_fails_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_auth_path(&dir);

        let credentials = Credentials {
            access_token: Some("oauth-token".to_string()),
            expires_at: Some(chrono::Utc::now().timestamp() - 60),
            ..Default::default()
        };
        credentials.save_to(&path).unwrap();

        let err = Credentials::load_from(&path).unwrap_err();
        assert!(matches!(err, LinearError::Expired));
    }

    #[test]
    fn unexpired_token_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_auth_path(&dir);

        let credentials = Credentials {
            access_token: Some("oauth-token".to_string()),
            expires_at: Some(chrono::Utc::now().timestamp() + 3600),
            ..Default::default()
        };
        credentials.save_to(&path).unwrap();

        let loaded = Credentials::load_from(&path).unwrap();
        assert_eq!(loaded.header_value().unwrap(), "Bearer oauth-token");
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = temp_auth_path(&dir);

        let credentials = Credentials {
            api_key: Some("lin_api_abc123".to_string()),
            ..Default::default()
        };
        credentials.save_to(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn garbage_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_auth_path(&dir);
        fs::write(&path, "not json").unwrap();

        let err = Credentials::load_from(&path).unwrap_err();
        assert!(matches!(err, LinearError::CredentialsParse { .. }));
    }
}
