use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Duration as Days;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use missed_stops_ops::fetch::{BasicClient, HttpClient, auth::ApiKey, auth::UrlParam, fetch_json};
use missed_stops_ops::records::{self, AddressRecord, MissRecord};
use missed_stops_ops::schedule::calendar::{
    TabDay, daily_tab_label, next_saturday, tab_date, today_local, week_ending_title,
};

use crate::infra::config::SheetsAuth;
use crate::services::record_source::{FetchError, RecordSource, Window};

/// Name of the all-time log spreadsheet in the shared folder.
const MASTER_LOG_TITLE: &str = "Master Misses Log";

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
    grant_type: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Record source backed by the Google Drive and Sheets REST APIs.
///
/// Weekly logs are located by name inside the shared folder; tabs are read
/// as plain value grids and parsed into [`MissRecord`]s.
pub struct SheetsClient {
    drive_base_url: String,
    sheets_base_url: String,
    folder_id: String,
    client: Box<dyn HttpClient>,
}

impl SheetsClient {
    pub async fn new(auth: &SheetsAuth, folder_id: String) -> Result<Self> {
        let client: Box<dyn HttpClient> = match auth {
            SheetsAuth::OAuth {
                client_id,
                client_secret,
                refresh_token,
            } => {
                // Exchange refresh token for access token
                let access_token =
                    Self::exchange_token(client_id, client_secret, refresh_token).await?;
                Box::new(ApiKey::bearer(BasicClient::new(), access_token))
            }
            SheetsAuth::ApiKey(key) => Box::new(UrlParam {
                inner: BasicClient::new(),
                param_name: "key".to_string(),
                key: key.clone(),
            }),
        };

        Ok(Self {
            drive_base_url: "https://www.googleapis.com/drive/v3".to_string(),
            sheets_base_url: "https://sheets.googleapis.com/v4".to_string(),
            folder_id,
            client,
        })
    }

    async fn exchange_token(
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let token_request = TokenRequest {
            client_id,
            client_secret,
            refresh_token,
            grant_type: "refresh_token",
        };

        let response = client
            .post("https://oauth2.googleapis.com/token")
            .form(&token_request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send token request: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Token exchange failed with status {}: {}",
                status,
                body
            ));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse token response: {}", e))?;

        Ok(token_response.access_token)
    }

    /// Finds a spreadsheet by exact name inside the shared folder, returning
    /// its file ID if it exists.
    async fn find_spreadsheet(&self, title: &str) -> Result<Option<String>> {
        let mut url = Url::parse(&format!("{}/files", self.drive_base_url))?;
        let query = format!(
            "'{}' in parents and name='{}' and mimeType='application/vnd.google-apps.spreadsheet'",
            self.folder_id, title
        );
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("fields", "files(id, name)");

        let json: serde_json::Value = fetch_json(self.client.as_ref(), url).await?;

        let id = json["files"]
            .as_array()
            .and_then(|files| files.first())
            .and_then(|file| file["id"].as_str())
            .map(|s| s.to_string());
        Ok(id)
    }

    /// Reads one tab of a spreadsheet as a grid of strings. Returns `None`
    /// when the tab does not exist (the Sheets API reports that as an
    /// invalid range).
    async fn read_tab(&self, spreadsheet_id: &str, range: &str) -> Result<Option<Vec<Vec<String>>>> {
        let mut url = Url::parse(&self.sheets_base_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("invalid sheets base URL"))?
            .extend(["spreadsheets", spreadsheet_id, "values", range]);

        let req = reqwest::Request::new(reqwest::Method::GET, url);
        let resp = self.client.execute(req).await?;

        if resp.status() == reqwest::StatusCode::BAD_REQUEST
            || resp.status() == reqwest::StatusCode::NOT_FOUND
        {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Sheets API returned status {}: {}",
                status,
                body
            ));
        }

        let json: serde_json::Value = resp.json().await?;
        let values = json["values"]
            .as_array()
            .map(|rows| {
                rows.iter()
                    .map(|row| {
                        row.as_array()
                            .map(|cells| cells.iter().map(cell_to_string).collect())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(Some(values))
    }

    /// Records for the "today" or "yesterday" tab. A missing weekly log or
    /// daily tab is not an error for these views.
    #[tracing::instrument(skip(self))]
    async fn tab_records(&self, day: TabDay) -> Result<Vec<MissRecord>> {
        let date = tab_date(day, today_local());
        let title = week_ending_title(date);
        let tab = daily_tab_label(date);

        let Some(sheet_id) = self.find_spreadsheet(&title).await? else {
            debug!(%title, "Weekly log not found; no records for the day");
            return Ok(Vec::new());
        };
        match self.read_tab(&sheet_id, &tab).await? {
            Some(values) => Ok(records::from_rows(&values)),
            None => Ok(Vec::new()),
        }
    }

    /// Union of all six daily tabs of the current weekly log. The weekly
    /// view cannot render without its log sheet, so a missing sheet is
    /// fatal here.
    #[tracing::instrument(skip(self))]
    async fn week_records(&self) -> Result<Vec<MissRecord>, FetchError> {
        let today = today_local();
        let title = week_ending_title(today);
        let Some(sheet_id) = self.find_spreadsheet(&title).await? else {
            return Err(FetchError::MissingWeeklyLog { title });
        };

        let monday = next_saturday(today) - Days::days(5);
        let mut week = Vec::new();
        for offset in 0..6 {
            let tab = daily_tab_label(monday + Days::days(offset));
            match self.read_tab(&sheet_id, &tab).await? {
                Some(values) => week.extend(records::from_rows(&values)),
                None => warn!(%tab, "Daily tab missing from weekly log"),
            }
        }
        Ok(week)
    }

    /// All rows of the master log. The master keeps everything on its first
    /// sheet, which is what an unqualified range reads.
    #[tracing::instrument(skip(self))]
    async fn master_records(&self) -> Result<Vec<MissRecord>> {
        let Some(sheet_id) = self.find_spreadsheet(MASTER_LOG_TITLE).await? else {
            debug!("Master log not found; no records");
            return Ok(Vec::new());
        };
        match self.read_tab(&sheet_id, "A:Z").await? {
            Some(values) => Ok(records::from_rows(&values)),
            None => Ok(Vec::new()),
        }
    }

    /// Master rows whose submission timestamp falls in the current month.
    async fn month_records(&self) -> Result<Vec<MissRecord>> {
        let this_month = today_local().format("%Y-%m").to_string();
        let all = self.master_records().await?;
        Ok(all
            .into_iter()
            .filter(|r| r.time_sent_to_jpm.starts_with(&this_month))
            .collect())
    }

    /// The address list, read from its own spreadsheet.
    pub async fn address_records(&self, sheet_id: &str) -> Result<Vec<AddressRecord>> {
        match self.read_tab(sheet_id, "A:Z").await? {
            Some(values) => Ok(records::address_from_rows(&values)),
            None => Ok(Vec::new()),
        }
    }
}

fn cell_to_string(cell: &serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

#[async_trait]
impl RecordSource for SheetsClient {
    async fn fetch_records(&self, window: Window) -> Result<Vec<MissRecord>, FetchError> {
        match window {
            Window::Today => Ok(self.tab_records(TabDay::Today).await?),
            Window::Yesterday => Ok(self.tab_records(TabDay::Yesterday).await?),
            Window::ThisWeek => self.week_records().await,
            Window::ThisMonth => Ok(self.month_records().await?),
            Window::AllTime => Ok(self.master_records().await?),
        }
    }
}
