use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{SheetRange, SheetsBackend, SheetsError};
use crate::auth::AccessTokenSource;
use crate::config::SheetsConfig;

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: Option<SheetProperties>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Serialize)]
struct BatchUpdateRequest {
    requests: Vec<BatchRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchRequest {
    add_sheet: AddSheetRequest,
}

#[derive(Debug, Serialize)]
struct AddSheetRequest {
    properties: SheetProperties,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody<'a> {
    range: String,
    major_dimension: &'a str,
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ValueRangeResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Sheets REST v4 client for a single spreadsheet.
#[derive(Clone)]
pub struct GoogleSheetsClient {
    client: Client,
    base_url: Url,
    spreadsheet_id: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl GoogleSheetsClient {
    pub fn new(config: &SheetsConfig, tokens: Arc<dyn AccessTokenSource>) -> Result<Self, SheetsError> {
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| SheetsError::Url(format!("{}: {}", config.api_base_url, e)))?;

        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_seconds))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url,
            spreadsheet_id: config.spreadsheet_id.clone(),
            tokens,
        })
    }

    /// `{base}/v4/spreadsheets/{id}{suffix}/{extra...}`
    fn endpoint(&self, suffix: &str, extra: &[&str]) -> Result<Url, SheetsError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SheetsError::Url(self.base_url.to_string()))?;
            segments
                .pop_if_empty()
                .push("v4")
                .push("spreadsheets")
                .push(&format!("{}{}", self.spreadsheet_id, suffix))
                .extend(extra);
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, SheetsError> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api { status, body });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, SheetsError> {
        response
            .json()
            .await
            .map_err(|e| SheetsError::Decode(e.to_string()))
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetsBackend for GoogleSheetsClient {
    fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    async fn list_tab_titles(&self) -> Result<Vec<String>, SheetsError> {
        let url = self.endpoint("", &[])?;
        let request = self
            .client
            .get(url)
            .query(&[("fields", "sheets.properties.title")]);

        let meta: SpreadsheetMeta = Self::decode(self.send(request).await?).await?;
        Ok(meta
            .sheets
            .into_iter()
            .filter_map(|s| s.properties.map(|p| p.title))
            .collect())
    }

    async fn add_tab(&self, title: &str) -> Result<(), SheetsError> {
        let url = self.endpoint(":batchUpdate", &[])?;
        let body = BatchUpdateRequest {
            requests: vec![BatchRequest {
                add_sheet: AddSheetRequest {
                    properties: SheetProperties {
                        title: title.to_string(),
                    },
                },
            }],
        };

        self.send(self.client.post(url).json(&body)).await?;
        debug!("Added tab {}", title);
        Ok(())
    }

    async fn write_rows(&self, range: &SheetRange, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        let a1 = range.a1();
        let url = self.endpoint("", &["values", &a1])?;
        let body = ValueRangeBody {
            range: a1,
            major_dimension: "ROWS",
            values: rows,
        };

        let request = self
            .client
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .json(&body);
        self.send(request).await?;
        Ok(())
    }

    async fn read_rows(&self, range: &SheetRange) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.endpoint("", &["values", &range.a1()])?;
        let body: ValueRangeResponse = Self::decode(self.send(self.client.get(url)).await?).await?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }
}
