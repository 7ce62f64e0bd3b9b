use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use super::{check_status, GoogleApiError, GoogleWorkspace, SheetSource};
use crate::participant::RawTable;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

lazy_static! {
    static ref SHEET_ID: Regex = Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)")
        .expect("sheet id pattern is valid");
}

/// The spreadsheet id inside a Google Sheets link.
pub fn extract_sheet_id(url: &str) -> Option<String> {
    SHEET_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A1 range covering a whole worksheet.
fn sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

#[async_trait]
impl SheetSource for GoogleWorkspace {
    async fn fetch_table(&self, sheet_id: &str) -> Result<RawTable, GoogleApiError> {
        let token = self.bearer().await?;

        let meta: SpreadsheetMeta = check_status(
            self.http
                .get(format!("{SHEETS_API}/{sheet_id}"))
                .query(&[("fields", "sheets.properties.title")])
                .bearer_auth(&token)
                .send()
                .await?,
        )
        .await?
        .json()
        .await?;

        let title = meta
            .sheets
            .into_iter()
            .next()
            .map(|sheet| sheet.properties.title)
            .ok_or_else(|| {
                GoogleApiError::UnexpectedResponse(format!("spreadsheet {sheet_id} has no worksheets"))
            })?;

        let mut url = reqwest::Url::parse(SHEETS_API)
            .map_err(|e| GoogleApiError::UnexpectedResponse(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| GoogleApiError::UnexpectedResponse("invalid Sheets API base".to_string()))?
            .extend([sheet_id, "values", sheet_range(&title).as_str()]);

        let range: ValueRange = check_status(self.http.get(url).bearer_auth(&token).send().await?)
            .await?
            .json()
            .await?;

        log::info!(
            "Read {} rows from worksheet '{}' of sheet {}",
            range.values.len(),
            title,
            sheet_id
        );

        let values = range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        Ok(RawTable::from_values(values))
    }
}
