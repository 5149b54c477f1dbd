//! Blocking HTTP implementation of [`DriveApi`].

use super::api::{Download, DriveApi, DriveError, ExportFormat, FileListPage, ListQuery};
use reqwest::blocking::{Client, Response};
use reqwest::redirect::Policy;
use std::time::Duration;

/// Base URL of the Drive v3 REST API.
pub const DRIVE_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Fields requested from `files.list`; everything the index needs, nothing more.
const LIST_FIELDS: &str = "nextPageToken, files(id,name,parents,mimeType,description,\
imageMediaMetadata,videoMediaMetadata,fileExtension,size,sha256Checksum)";

/// Drive client authenticated with a single bearer token.
pub struct HttpDrive {
    client: Client,
    base: String,
    access_token: String,
}

impl HttpDrive {
    pub fn new(access_token: String) -> Result<Self, DriveError> {
        Self::with_base(access_token, DRIVE_BASE)
    }

    /// Point the client at a different API root (used by integration setups
    /// that proxy Drive).
    pub fn with_base(access_token: String, base: &str) -> Result<Self, DriveError> {
        // No overall timeout: large videos stream for as long as they take.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(Option::<Duration>::None)
            .redirect(Policy::limited(10))
            .build()?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    fn get(&self, url: &str, query: &[(&str, &str)], action: &str) -> Result<Response, DriveError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()?;
        check_status(response, action)
    }
}

fn check_status(response: Response, action: &str) -> Result<Response, DriveError> {
    let status = response.status();
    if status.as_u16() == 401 {
        return Err(DriveError::Unauthorized(action.to_string()));
    }
    if !status.is_success() {
        return Err(DriveError::Status {
            status: status.as_u16(),
            action: action.to_string(),
        });
    }
    Ok(response)
}

impl DriveApi for HttpDrive {
    fn list_page(
        &self,
        query: &ListQuery,
        page_token: Option<&str>,
    ) -> Result<FileListPage, DriveError> {
        let page_size = query.page_size.to_string();
        let mut params = vec![
            ("pageSize", page_size.as_str()),
            ("fields", LIST_FIELDS),
            ("orderBy", query.order_by.as_str()),
            ("includeItemsFromAllDrives", "true"),
            ("supportsAllDrives", "true"),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let url = format!("{}/files", self.base);
        let response = self.get(&url, &params, "listing files")?;
        Ok(response.json()?)
    }

    fn export(&self, file_id: &str, format: ExportFormat) -> Result<Vec<u8>, DriveError> {
        let url = format!("{}/files/{}/export", self.base, file_id);
        let action = format!("exporting {file_id} as {}", format.mime_type());
        let response = self.get(&url, &[("mimeType", format.mime_type())], &action)?;
        Ok(response.bytes()?.to_vec())
    }

    fn download(&self, file_id: &str) -> Result<Download, DriveError> {
        let url = format!("{}/files/{}", self.base, file_id);
        let action = format!("downloading {file_id}");
        let response = self.get(
            &url,
            &[("alt", "media"), ("supportsAllDrives", "true")],
            &action,
        )?;
        Ok(Download {
            content_length: response.content_length(),
            body: Box::new(response),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_base_strips_trailing_slash() {
        let drive = HttpDrive::with_base("token".into(), "http://localhost:9000/drive/v3/").unwrap();
        assert_eq!(drive.base, "http://localhost:9000/drive/v3");
    }

    #[test]
    fn list_fields_cover_index_requirements() {
        for field in [
            "id",
            "name",
            "parents",
            "mimeType",
            "description",
            "imageMediaMetadata",
            "videoMediaMetadata",
            "fileExtension",
            "size",
            "sha256Checksum",
            "nextPageToken",
        ] {
            assert!(LIST_FIELDS.contains(field), "missing field {field}");
        }
    }
}
