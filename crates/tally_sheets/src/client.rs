//! Ledger transport.

use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tally_protocol::LedgerSection;
use tracing::debug;

/// Whole-range access to the external ledger, as rows of string cells.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn read_range(&self) -> Result<Vec<Vec<String>>>;
    async fn write_range(&self, rows: &[Vec<String>]) -> Result<()>;
}

/// Body of the Sheets v4 `values` endpoints.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    major_dimension: Option<String>,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Google Sheets v4 values API client for a single range.
#[derive(Clone)]
pub struct SheetsClient {
    http_client: reqwest::Client,
    api_base: String,
    spreadsheet_id: String,
    range: String,
    token: String,
}

impl std::fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsClient")
            .field("api_base", &self.api_base)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

impl SheetsClient {
    pub fn new(
        api_base: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        range: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_base: api_base.into(),
            spreadsheet_id: spreadsheet_id.into(),
            range: range.into(),
            token: token.into(),
        }
    }

    /// Build from `[ledger]`, reading the bearer token from the configured env var.
    pub fn from_config(ledger: &LedgerSection) -> Result<Self> {
        if ledger.spreadsheet_id.trim().is_empty() {
            return Err(LedgerError::NotConfigured(
                "ledger.spreadsheet_id is empty".to_string(),
            ));
        }
        let token = std::env::var(&ledger.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| LedgerError::MissingToken(ledger.token_env.clone()))?;
        Ok(Self::new(
            ledger.api_base.clone(),
            ledger.spreadsheet_id.clone(),
            ledger.range.clone(),
            token,
        ))
    }

    fn values_url(&self) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}",
            self.api_base.trim_end_matches('/'),
            self.spreadsheet_id,
            self.range
        )
    }

    /// Formulas and text cells come back as entered, so writing the range
    /// back with `USER_ENTERED` leaves untouched rows as they were.
    fn read_request(&self) -> Result<reqwest::Request> {
        Ok(self
            .http_client
            .get(self.values_url())
            .query(&[("valueRenderOption", "FORMULA")])
            .bearer_auth(&self.token)
            .build()?)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(LedgerError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl LedgerClient for SheetsClient {
    async fn read_range(&self) -> Result<Vec<Vec<String>>> {
        let response = self.http_client.execute(self.read_request()?).await?;
        let body: ValueRange = Self::check(response).await?.json().await?;
        debug!(rows = body.values.len(), range = %self.range, "read ledger range");
        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn write_range(&self, rows: &[Vec<String>]) -> Result<()> {
        let body = ValueRange {
            range: Some(self.range.clone()),
            major_dimension: Some("ROWS".to_string()),
            values: rows
                .iter()
                .map(|row| row.iter().cloned().map(Value::String).collect())
                .collect(),
        };
        let response = self
            .http_client
            .put(self.values_url())
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        debug!(rows = rows.len(), range = %self.range, "wrote ledger range");
        Ok(())
    }
}

/// Cells normally arrive as strings; numbers and bools are stringified,
/// nulls become empty cells.
fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
