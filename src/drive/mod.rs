//! Google Drive v3 access.
//!
//! The pipeline talks to Drive exclusively through the [`DriveApi`] trait:
//! one listing page, one export, one download. [`HttpDrive`] is the
//! production implementation over `reqwest::blocking`; tests substitute a
//! fake that serves canned pages and bodies.
//!
//! | Operation | Endpoint |
//! |---|---|
//! | List | `GET /drive/v3/files?pageToken=…` |
//! | Export | `GET /drive/v3/files/{id}/export?mimeType=…` |
//! | Download | `GET /drive/v3/files/{id}?alt=media` |
//!
//! [`auth`] turns a service-account key file into the bearer token
//! [`HttpDrive`] sends with every request.

mod api;
pub mod auth;
mod http;

pub use api::{
    Download, DriveApi, DriveError, ExportFormat, FileListPage, ListQuery, RawFile,
    RawImageMetadata, RawVideoMetadata,
};
pub use http::HttpDrive;

/// Mime type Drive reports for folders.
pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
/// Mime type Drive reports for Google Docs.
pub const DOCUMENT_MIME: &str = "application/vnd.google-apps.document";
/// Mime type Drive reports for Google Sheets.
pub const SHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
