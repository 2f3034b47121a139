//! Deployment configuration and credential loading.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Role gating which views a user sees. Only JPM staff get the full
/// operations dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    City,
    Jpm,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub display_name: String,
    pub role: Role,
}

/// Deployment configuration, stored as plain JSON on disk:
/// ```json
/// {
///   "folder_id": "1ogx3zPe...",
///   "address_sheet_id": "1JJeufDk...",
///   "users": {
///     "mlondo": { "display_name": "M. Londo", "role": "jpm" }
///   }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct OpsConfig {
    /// Drive folder holding the weekly logs and the master log.
    pub folder_id: String,
    /// Spreadsheet ID of the address list.
    pub address_sheet_id: String,
    #[serde(default)]
    pub users: HashMap<String, UserProfile>,
}

impl OpsConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{path}'"))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn user(&self, username: &str) -> Option<&UserProfile> {
        self.users.get(username)
    }
}

/// How the sheets client authenticates against the Google APIs.
#[derive(Debug, Clone)]
pub enum SheetsAuth {
    /// OAuth refresh-token flow; exchanged for an access token at startup.
    OAuth {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
    /// Simple API key for link-shared (public) spreadsheets.
    ApiKey(String),
}

impl SheetsAuth {
    /// Reads credentials from the environment (`.env` supported).
    /// `GOOGLE_API_KEY` takes the simple-key path; otherwise the three
    /// OAuth variables must all be set.
    pub fn from_env() -> Result<Self> {
        if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            return Ok(SheetsAuth::ApiKey(key));
        }
        Ok(SheetsAuth::OAuth {
            client_id: std::env::var("GOOGLE_CLIENT_ID")
                .context("GOOGLE_CLIENT_ID must be set")?,
            client_secret: std::env::var("GOOGLE_CLIENT_SECRET")
                .context("GOOGLE_CLIENT_SECRET must be set")?,
            refresh_token: std::env::var("GOOGLE_REFRESH_TOKEN")
                .context("GOOGLE_REFRESH_TOKEN must be set")?,
        })
    }
}
