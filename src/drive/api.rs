//! The [`DriveApi`] trait and the wire shapes it returns.

use serde::Deserialize;
use std::io::Read;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriveError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Drive returned HTTP {status} while {action}")]
    Status { status: u16, action: String },
    #[error("Access token rejected by Drive while {0}; check the service account credentials")]
    Unauthorized(String),
    #[error("Failed to read service account key {path}: {source}")]
    Credentials {
        path: String,
        source: std::io::Error,
    },
    #[error("Authentication failed: {0}")]
    Auth(String),
}

/// Listing parameters passed through to `files.list` unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page_size: u32,
    pub order_by: String,
}

/// Export target for Google Docs and Sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    PlainText,
    Csv,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::PlainText => "text/plain",
            ExportFormat::Csv => "text/csv",
        }
    }
}

/// One page of `files.list`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListPage {
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub files: Vec<RawFile>,
}

/// A file record exactly as `files.list` returns it.
///
/// Drive encodes `size` and `durationMillis` as decimal strings (int64).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parents: Vec<String>,
    pub mime_type: String,
    pub description: Option<String>,
    pub image_media_metadata: Option<RawImageMetadata>,
    pub video_media_metadata: Option<RawVideoMetadata>,
    pub file_extension: Option<String>,
    pub size: Option<String>,
    pub sha256_checksum: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImageMetadata {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVideoMetadata {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration_millis: Option<String>,
}

/// A streaming media body.
pub struct Download {
    /// Body length as announced by the server, when known.
    pub content_length: Option<u64>,
    pub body: Box<dyn Read>,
}

/// The three Drive calls the pipeline makes.
///
/// Every call blocks until complete; errors are never retried.
pub trait DriveApi {
    /// Fetch one listing page. `page_token` is `None` for the first page.
    fn list_page(
        &self,
        query: &ListQuery,
        page_token: Option<&str>,
    ) -> Result<FileListPage, DriveError>;

    /// Export a Google Doc or Sheet in the given format.
    fn export(&self, file_id: &str, format: ExportFormat) -> Result<Vec<u8>, DriveError>;

    /// Open the binary content of a file for streaming.
    fn download(&self, file_id: &str) -> Result<Download, DriveError>;
}
