use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::models::MouRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sheet service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("sheet service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("attachment {name:?} not found")]
    AttachmentMissing { name: String },
}

/// Row identity is positional: updates address a row by its fetch-time index.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch_all_records(&self) -> Result<Vec<MouRecord>, StoreError>;
    async fn append_record(&self, record: &MouRecord) -> Result<(), StoreError>;
    async fn update_record_at(&self, index: usize, record: &MouRecord)
        -> Result<(), StoreError>;
    async fn upload_attachment(&self, bytes: Vec<u8>, name: &str) -> Result<String, StoreError>;
    async fn download_attachment(&self, name: &str) -> Result<Vec<u8>, StoreError>;
}

pub struct SheetClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct SheetValues {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct UploadReply {
    #[serde(rename = "fileId")]
    file_id: String,
}

impl SheetClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl RecordStore for SheetClient {
    async fn fetch_all_records(&self) -> Result<Vec<MouRecord>, StoreError> {
        let response = self.client.get(self.url("/sheet-data1")).send().await?;
        let payload: SheetValues = ensure_success(response).await?.json().await?;
        Ok(payload
            .values
            .iter()
            .enumerate()
            .map(|(index, row)| MouRecord::from_row(index, row))
            .collect())
    }

    async fn append_record(&self, record: &MouRecord) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.url("/append1"))
            .json(&json!({ "values": record.to_row() }))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn update_record_at(
        &self,
        index: usize,
        record: &MouRecord,
    ) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.url("/update-mou"))
            .json(&json!({ "rowIndex": index, "updatedData": record }))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn upload_attachment(&self, bytes: Vec<u8>, name: &str) -> Result<String, StoreError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(format!("{name}.pdf"))
            .mime_str("application/pdf")?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("name", name.to_string());
        let response = self
            .client
            .post(self.url("/upload-pdf"))
            .multipart(form)
            .send()
            .await?;
        let reply: UploadReply = ensure_success(response).await?.json().await?;
        Ok(reply.file_id)
    }

    async fn download_attachment(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let response = self
            .client
            .get(self.url(&format!("/get-pdf/{name}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::AttachmentMissing {
                name: name.to_string(),
            });
        }
        let bytes = ensure_success(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(240)
        .collect();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
pub(crate) struct MemoryStore {
    rows: tokio::sync::Mutex<Vec<Vec<String>>>,
    attachments: tokio::sync::Mutex<std::collections::HashMap<String, Vec<u8>>>,
}

#[cfg(test)]
impl MemoryStore {
    pub(crate) fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: tokio::sync::Mutex::new(rows),
            attachments: tokio::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }

    pub(crate) async fn row(&self, index: usize) -> Option<Vec<String>> {
        self.rows.lock().await.get(index).cloned()
    }
}

#[cfg(test)]
#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_all_records(&self) -> Result<Vec<MouRecord>, StoreError> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .enumerate()
            .map(|(index, row)| MouRecord::from_row(index, row))
            .collect())
    }

    async fn append_record(&self, record: &MouRecord) -> Result<(), StoreError> {
        self.rows.lock().await.push(record.to_row());
        Ok(())
    }

    async fn update_record_at(
        &self,
        index: usize,
        record: &MouRecord,
    ) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().await;
        if index >= rows.len() {
            return Err(StoreError::Status {
                status: 400,
                body: format!("row {index} does not exist"),
            });
        }
        rows[index] = record.to_row();
        Ok(())
    }

    async fn upload_attachment(&self, bytes: Vec<u8>, name: &str) -> Result<String, StoreError> {
        self.attachments
            .lock()
            .await
            .insert(name.to_string(), bytes);
        Ok(format!("file-{name}"))
    }

    async fn download_attachment(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        self.attachments
            .lock()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::AttachmentMissing {
                name: name.to_string(),
            })
    }
}
