//! Google Sheets v4 REST client.
//!
//! Reads go through the `values` endpoint, the row write through a ranged
//! `values` update with user-entered semantics, and the format copy through a
//! `batchUpdate` copy-paste request addressed by grid id. Calls are blocking
//! and carry the bearer token from the environment credentials.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::credentials::Credentials;
use crate::sheets::{row_range, sheet_range, TableRef, TableService};

const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const IO_TIMEOUT: Duration = Duration::from_secs(30);
/// Upper bound on error body text carried into error messages.
const ERROR_BODY_LIMIT: usize = 256;

pub struct SheetsClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl SheetsClient {
    pub fn new(credentials: &Credentials) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(IO_TIMEOUT)
            .timeout_write(IO_TIMEOUT)
            .build();
        Self {
            agent,
            base_url: BASE_URL.to_string(),
            token: credentials.bearer().to_string(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl TableService for SheetsClient {
    fn read_grid(&self, table: &TableRef) -> Result<Vec<Vec<String>>> {
        let url = format!(
            "{}/{}/values/{}",
            self.base_url,
            table.spreadsheet_id,
            encode_path_segment(&sheet_range(&table.sheet_title))
        );
        let response = self
            .agent
            .get(&url)
            .query("majorDimension", "ROWS")
            .set("authorization", &self.auth_header())
            .call()
            .map_err(|err| request_error("read", &table.sheet_title, err))?;
        let body: ValueRange = response
            .into_json()
            .with_context(|| format!("decode values of sheet {:?}", table.sheet_title))?;
        let grid: Vec<Vec<String>> = body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        tracing::debug!(sheet = %table.sheet_title, rows = grid.len(), "grid fetched");
        Ok(grid)
    }

    fn write_row(&self, table: &TableRef, row: u32, values: &[String]) -> Result<()> {
        let range = row_range(&table.sheet_title, row, 1, values.len() as u32);
        let url = format!(
            "{}/{}/values/{}",
            self.base_url,
            table.spreadsheet_id,
            encode_path_segment(&range)
        );
        self.agent
            .put(&url)
            .query("valueInputOption", "USER_ENTERED")
            .set("authorization", &self.auth_header())
            .send_json(json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": [values],
            }))
            .map_err(|err| request_error("write", &table.sheet_title, err))?;
        tracing::info!(sheet = %table.sheet_title, row, "row written");
        Ok(())
    }

    fn copy_row_format(
        &self,
        table: &TableRef,
        source_row: u32,
        dest_row: u32,
        columns: u32,
    ) -> Result<()> {
        let url = format!("{}/{}:batchUpdate", self.base_url, table.spreadsheet_id);
        self.agent
            .post(&url)
            .set("authorization", &self.auth_header())
            .send_json(json!({
                "requests": [{
                    "copyPaste": {
                        "source": grid_span(table.sheet_gid, source_row, columns),
                        "destination": grid_span(table.sheet_gid, dest_row, columns),
                        "pasteType": "PASTE_FORMAT",
                        "pasteOrientation": "NORMAL",
                    }
                }]
            }))
            .map_err(|err| request_error("format copy", &table.sheet_title, err))?;
        tracing::debug!(sheet = %table.sheet_title, source_row, dest_row, "format copied");
        Ok(())
    }
}

/// Half-open 0-based span of one row over the first `columns` columns, as
/// the batch-update API expects.
fn grid_span(sheet_gid: i64, row: u32, columns: u32) -> serde_json::Value {
    json!({
        "sheetId": sheet_gid,
        "startRowIndex": row - 1,
        "endRowIndex": row,
        "startColumnIndex": 0,
        "endColumnIndex": columns,
    })
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn request_error(op: &str, sheet: &str, err: ureq::Error) -> anyhow::Error {
    match err {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            let body: String = body.trim().chars().take(ERROR_BODY_LIMIT).collect();
            anyhow!("sheet {sheet:?} {op} failed with http status {code}: {body}")
        }
        ureq::Error::Transport(err) => anyhow!("sheet {sheet:?} {op} transport error: {err}"),
    }
}

/// Percent-encode an A1 range for use as a URL path segment. Sheet titles
/// carry spaces, quotes, and non-ASCII freely.
fn encode_path_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            other => {
                out.push('%');
                out.push_str(&format!("{other:02X}"));
            }
        }
    }
    out
}
