//! Shared test utilities for the drive-content-sync test suite.
//!
//! Provides [`FakeDrive`], an in-memory [`DriveApi`] that serves canned
//! listing pages, exports and media bodies and records every call, plus
//! builders for raw Drive records, normalized items and synthetic images.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (drive, index) = sample_site();
//! let home = home_content(&drive, &index, ROOT).unwrap();
//! assert_eq!(home.photos.len(), 2);
//! assert!(drive.download_calls().is_empty());
//! ```

use crate::drive::{
    DOCUMENT_MIME, Download, DriveApi, DriveError, ExportFormat, FOLDER_MIME, FileListPage,
    ListQuery, RawFile, RawImageMetadata, RawVideoMetadata, SHEET_MIME,
};
use crate::index::{DriveIndex, ImageMetadata, ItemKind, RemoteItem, VideoMetadata, build_index};
use image::RgbImage;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::path::Path;
use std::sync::Mutex;

/// Id of the content root in every fixture.
pub const ROOT: &str = "root";

// =========================================================================
// Fake Drive
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveCall {
    List(Option<String>),
    Export(String, ExportFormat),
    Download(String),
}

#[derive(Clone)]
enum Body {
    Complete(Vec<u8>),
    /// Served without a `Content-Length`.
    Unsized(Vec<u8>),
    /// Serves the bytes, then fails mid-stream.
    Failing(Vec<u8>),
}

/// In-memory Drive. Missing exports and bodies answer HTTP 404.
#[derive(Default)]
pub struct FakeDrive {
    pages: Vec<Vec<RawFile>>,
    exports: HashMap<String, Vec<u8>>,
    bodies: HashMap<String, Body>,
    fail_list: bool,
    calls: Mutex<Vec<DriveCall>>,
}

impl FakeDrive {
    /// Serve `pages` in order, linked by `page-N` continuation tokens.
    pub fn with_pages(pages: Vec<Vec<RawFile>>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    pub fn failing_list() -> Self {
        Self {
            fail_list: true,
            ..Self::default()
        }
    }

    pub fn set_export(&mut self, file_id: &str, text: &str) {
        self.set_export_bytes(file_id, text.as_bytes().to_vec());
    }

    pub fn set_export_bytes(&mut self, file_id: &str, bytes: Vec<u8>) {
        self.exports.insert(file_id.to_string(), bytes);
    }

    pub fn set_body(&mut self, file_id: &str, bytes: Vec<u8>) {
        self.bodies.insert(file_id.to_string(), Body::Complete(bytes));
    }

    pub fn set_body_without_length(&mut self, file_id: &str, bytes: Vec<u8>) {
        self.bodies.insert(file_id.to_string(), Body::Unsized(bytes));
    }

    pub fn set_failing_body(&mut self, file_id: &str, bytes: Vec<u8>) {
        self.bodies.insert(file_id.to_string(), Body::Failing(bytes));
    }

    /// Take over the exports and media bodies of `other`, keeping this
    /// drive's listing.
    pub fn copy_content_from(&mut self, other: &FakeDrive) {
        self.exports = other.exports.clone();
        self.bodies = other.bodies.clone();
    }

    pub fn calls(&self) -> Vec<DriveCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Page tokens passed to each `list_page` call.
    pub fn list_calls(&self) -> Vec<Option<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DriveCall::List(token) => Some(token),
                _ => None,
            })
            .collect()
    }

    pub fn download_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DriveCall::Download(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: DriveCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn not_found(action: String) -> DriveError {
    DriveError::Status {
        status: 404,
        action,
    }
}

impl DriveApi for FakeDrive {
    fn list_page(
        &self,
        _query: &ListQuery,
        page_token: Option<&str>,
    ) -> Result<FileListPage, DriveError> {
        self.record(DriveCall::List(page_token.map(str::to_string)));
        if self.fail_list {
            return Err(DriveError::Status {
                status: 500,
                action: "listing files".into(),
            });
        }

        let page = match page_token {
            None => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| not_found(format!("listing page {token}")))?,
        };
        let next_page_token = (page + 1 < self.pages.len()).then(|| format!("page-{}", page + 1));
        Ok(FileListPage {
            next_page_token,
            files: self.pages.get(page).cloned().unwrap_or_default(),
        })
    }

    fn export(&self, file_id: &str, format: ExportFormat) -> Result<Vec<u8>, DriveError> {
        self.record(DriveCall::Export(file_id.to_string(), format));
        self.exports
            .get(file_id)
            .cloned()
            .ok_or_else(|| not_found(format!("exporting {file_id}")))
    }

    fn download(&self, file_id: &str) -> Result<Download, DriveError> {
        self.record(DriveCall::Download(file_id.to_string()));
        match self.bodies.get(file_id) {
            Some(Body::Complete(bytes)) => Ok(Download {
                content_length: Some(bytes.len() as u64),
                body: Box::new(Cursor::new(bytes.clone())),
            }),
            Some(Body::Unsized(bytes)) => Ok(Download {
                content_length: None,
                body: Box::new(Cursor::new(bytes.clone())),
            }),
            Some(Body::Failing(bytes)) => Ok(Download {
                content_length: Some(bytes.len() as u64 * 2),
                body: Box::new(FailingReader {
                    data: Cursor::new(bytes.clone()),
                }),
            }),
            None => Err(not_found(format!("downloading {file_id}"))),
        }
    }
}

struct FailingReader {
    data: Cursor<Vec<u8>>,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.data.read(buf)? {
            0 => Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset")),
            n => Ok(n),
        }
    }
}

// =========================================================================
// Synthetic media
// =========================================================================

/// 8px black/white checkerboard with a colour gradient, so blur and resize
/// both visibly change pixels.
pub fn checkerboard(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            image::Rgb([255, (x % 256) as u8, (y % 256) as u8])
        } else {
            image::Rgb([0, 0, 0])
        }
    })
}

pub fn write_png(path: &Path, img: &RgbImage) {
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Deterministic PNG encoding of [`checkerboard`].
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    checkerboard(width, height)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

/// A few KiB of bytes standing in for a video body.
pub fn video_bytes(file_id: &str) -> Vec<u8> {
    format!("fake video {file_id}\n").repeat(256).into_bytes()
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

// =========================================================================
// Raw Drive records
// =========================================================================

fn raw(id: &str, name: &str, parent: &str, mime_type: &str) -> RawFile {
    RawFile {
        id: id.into(),
        name: name.into(),
        parents: vec![parent.into()],
        mime_type: mime_type.into(),
        ..RawFile::default()
    }
}

pub fn raw_folder(id: &str, name: &str, parent: &str) -> RawFile {
    raw(id, name, parent, FOLDER_MIME)
}

pub fn raw_doc(id: &str, name: &str, parent: &str) -> RawFile {
    raw(id, name, parent, DOCUMENT_MIME)
}

pub fn raw_sheet(id: &str, name: &str, parent: &str) -> RawFile {
    raw(id, name, parent, SHEET_MIME)
}

/// PNG image record whose size and checksum match [`png_bytes`].
pub fn raw_image(id: &str, name: &str, parent: &str, width: u32, height: u32) -> RawFile {
    let bytes = png_bytes(width, height);
    RawFile {
        image_media_metadata: Some(RawImageMetadata {
            width: Some(width),
            height: Some(height),
        }),
        file_extension: Some("png".into()),
        size: Some(bytes.len().to_string()),
        sha256_checksum: Some(sha256_hex(&bytes)),
        ..raw(id, name, parent, "image/png")
    }
}

/// MP4 record whose size and checksum match [`video_bytes`].
pub fn raw_video(
    id: &str,
    name: &str,
    parent: &str,
    width: u32,
    height: u32,
    duration_ms: u64,
) -> RawFile {
    let bytes = video_bytes(id);
    RawFile {
        video_media_metadata: Some(RawVideoMetadata {
            width: Some(width),
            height: Some(height),
            duration_millis: Some(duration_ms.to_string()),
        }),
        file_extension: Some("mp4".into()),
        size: Some(bytes.len().to_string()),
        sha256_checksum: Some(sha256_hex(&bytes)),
        ..raw(id, name, parent, "video/mp4")
    }
}

// =========================================================================
// Normalized items
// =========================================================================

/// A directory item.
pub fn item(id: &str, name: &str, parent: &str) -> RemoteItem {
    RemoteItem {
        id: id.into(),
        kind: ItemKind::Directory,
        parent_id: Some(parent.into()),
        name: name.into(),
        description: None,
    }
}

pub fn image_item(id: &str, name: &str, parent: &str, width: u32, height: u32) -> RemoteItem {
    let bytes = png_bytes(width, height);
    RemoteItem {
        kind: ItemKind::Image(ImageMetadata {
            width,
            height,
            extension: "png".into(),
            size: bytes.len() as u64,
            sha256: sha256_hex(&bytes),
        }),
        ..item(id, name, parent)
    }
}

pub fn video_item(id: &str, name: &str, parent: &str, duration_ms: u64) -> RemoteItem {
    let bytes = video_bytes(id);
    RemoteItem {
        kind: ItemKind::Video(VideoMetadata {
            width: 1920,
            height: 1080,
            duration_ms,
            extension: "mp4".into(),
            size: bytes.len() as u64,
            sha256: sha256_hex(&bytes),
        }),
        ..item(id, name, parent)
    }
}

// =========================================================================
// Sample site
// =========================================================================

/// Image ids and dimensions in the sample site, in listing order.
pub const SAMPLE_IMAGES: &[(&str, u32, u32)] = &[
    ("home-img-2", 30, 40),
    ("home-img-1", 40, 30),
    ("land-1", 64, 48),
    ("land-2", 48, 64),
    ("port-1", 32, 32),
    ("video-cover", 16, 16),
];

/// Raw listing of a complete website content tree, split over two pages.
pub fn sample_listing() -> Vec<Vec<RawFile>> {
    let mut unknown = raw_doc("cv", "cv.pdf", ROOT);
    unknown.mime_type = "application/pdf".into();

    let mut described = raw_image("home-img-2", "harbour.png", "home-images", 30, 40);
    described.description = Some("  Harbour at dusk  ".into());

    vec![
        vec![
            raw_folder("home", "home", ROOT),
            raw_doc("bio", "bio", "home"),
            raw_doc("introduction", "introduction", "home"),
            raw_sheet("quotes", "quotes", "home"),
            raw_sheet("name_checks", "name_checks", "home"),
            raw_folder("home-images", "images", "home"),
            described,
            raw_image("home-img-1", "field.png", "home-images", 40, 30),
            raw_doc("home-notes", "notes", "home-images"),
            raw_sheet("contact", "contact", ROOT),
            unknown,
        ],
        vec![
            raw_folder("portfolio", "portfolio", ROOT),
            raw_folder("landscapes", "Landscapes", "portfolio"),
            raw_image("land-1", "hills.png", "landscapes", 64, 48),
            raw_image("land-2", "coast.png", "landscapes", 48, 64),
            raw_folder("portraits", "Portraits", "portfolio"),
            raw_image("port-1", "anna.png", "portraits", 32, 32),
            raw_doc("portfolio-readme", "readme", "portfolio"),
            raw_folder("video", "video", ROOT),
            raw_video("vid-1", "reel.mp4", "video", 1920, 1080, 61000),
            raw_image("video-cover", "cover.png", "video", 16, 16),
        ],
    ]
}

/// A [`FakeDrive`] serving the sample site, and the index built from it.
///
/// The index build is not left in the call log.
pub fn sample_site() -> (FakeDrive, DriveIndex) {
    let mut drive = FakeDrive::with_pages(sample_listing());
    drive.set_export("bio", "I photograph light.");
    drive.set_export("introduction", "Welcome to the portfolio.");
    drive.set_export(
        "quotes",
        "\"Stunning, as always\",A. Critic\nQuietly brilliant,Åse Berg\n",
    );
    drive.set_export("name_checks", "\"Gallery, London\",https://gallery.example\n");
    drive.set_export(
        "contact",
        "email,hello@example.com\nphone,0123 456\ninstagram,@example\n",
    );
    for &(id, width, height) in SAMPLE_IMAGES {
        drive.set_body(id, png_bytes(width, height));
    }
    drive.set_body("vid-1", video_bytes("vid-1"));

    let query = ListQuery {
        page_size: 100,
        order_by: "name_natural,recency".into(),
    };
    let index = build_index(&drive, &query).unwrap();
    drive.calls.lock().unwrap().clear();
    (drive, index)
}
