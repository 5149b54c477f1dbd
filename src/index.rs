//! Remote item index.
//!
//! Drive returns a flat listing in which hierarchy is only expressed through
//! `parents` references. [`build_index`] pages through that listing once,
//! normalizes every record into a typed [`RemoteItem`], and stores the result
//! in an immutable arena:
//!
//! ```text
//! items:     Vec<RemoteItem>            fetch order (name_natural, recency)
//! positions: id        → position       O(1) lookup
//! children:  parent_id → [position]     O(1) directory listing, fetch order
//! ```
//!
//! ## Classification
//!
//! | Mime type | Kind |
//! |---|---|
//! | `application/vnd.google-apps.folder` | [`ItemKind::Directory`] |
//! | `application/vnd.google-apps.document` | [`ItemKind::Document`] |
//! | `application/vnd.google-apps.spreadsheet` | [`ItemKind::Sheet`] |
//! | `image/*` | [`ItemKind::Image`] |
//! | `video/*` | [`ItemKind::Video`] |
//!
//! Unknown mime types are recorded in [`DriveIndex::skipped`] and left out of
//! the index; new content types routinely show up in Drive. A recognized
//! media type that lacks its metadata, or any item with several parents, is a
//! fatal [`IndexError`]: it means the remote content no longer has the shape
//! the website depends on.

use crate::drive::{
    DOCUMENT_MIME, DriveApi, DriveError, FOLDER_MIME, ListQuery, RawFile, SHEET_MIME,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Drive listing failed: {0}")]
    Drive(#[from] DriveError),
    #[error("Google Drive item \"{name}\" has {count} parents. Expected 1.")]
    MultipleParents { name: String, count: usize },
    #[error("Google Drive item \"{name}\" ({id}) is missing required field `{field}`")]
    MissingField {
        id: String,
        name: String,
        field: &'static str,
    },
}

/// Metadata carried by image items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub extension: String,
    #[serde(with = "decimal_string")]
    pub size: u64,
    pub sha256: String,
}

/// Metadata carried by video items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    #[serde(with = "decimal_string")]
    pub duration_ms: u64,
    pub extension: String,
    #[serde(with = "decimal_string")]
    pub size: u64,
    pub sha256: String,
}

/// Closed classification of a remote item, with per-kind metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Directory,
    Document,
    Sheet,
    Image(ImageMetadata),
    Video(VideoMetadata),
}

impl ItemKind {
    pub fn is_directory(&self) -> bool {
        matches!(self, ItemKind::Directory)
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ItemKind::Image(_))
    }

    pub fn is_video(&self) -> bool {
        matches!(self, ItemKind::Video(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Directory => "directory",
            ItemKind::Document => "document",
            ItemKind::Sheet => "sheet",
            ItemKind::Image(_) => "image",
            ItemKind::Video(_) => "video",
        }
    }
}

/// One normalized Drive item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    pub id: String,
    pub kind: ItemKind,
    /// `None` only for items Drive reports without any parent.
    pub parent_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
}

/// An item left out of the index because its mime type is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

/// Immutable id → item arena with a parent → children adjacency index.
#[derive(Debug, Default)]
pub struct DriveIndex {
    items: Vec<RemoteItem>,
    positions: HashMap<String, usize>,
    children: HashMap<String, Vec<usize>>,
    skipped: Vec<SkippedItem>,
}

impl DriveIndex {
    /// Build the arena from items in fetch order.
    ///
    /// A repeated id replaces the earlier record in place, so the first
    /// occurrence fixes the position and the last one wins.
    pub fn from_items(items: impl IntoIterator<Item = RemoteItem>) -> Self {
        let mut index = Self::default();
        for item in items {
            match index.positions.get(&item.id) {
                Some(&pos) => index.items[pos] = item,
                None => {
                    index.positions.insert(item.id.clone(), index.items.len());
                    index.items.push(item);
                }
            }
        }
        for (pos, item) in index.items.iter().enumerate() {
            if let Some(parent) = &item.parent_id {
                index.children.entry(parent.clone()).or_default().push(pos);
            }
        }
        index
    }

    fn with_skipped(mut self, skipped: Vec<SkippedItem>) -> Self {
        self.skipped = skipped;
        self
    }

    pub fn get(&self, id: &str) -> Option<&RemoteItem> {
        self.positions.get(id).map(|&pos| &self.items[pos])
    }

    /// Direct children of `parent_id`, in fetch order, regardless of kind.
    pub fn children_of<'a>(&'a self, parent_id: &str) -> impl Iterator<Item = &'a RemoteItem> {
        self.children
            .get(parent_id)
            .map(|positions| positions.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&pos| &self.items[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RemoteItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items dropped because of an unrecognized mime type.
    pub fn skipped(&self) -> &[SkippedItem] {
        &self.skipped
    }
}

/// Page through the whole listing and build the index.
pub fn build_index(drive: &impl DriveApi, query: &ListQuery) -> Result<DriveIndex, IndexError> {
    let mut raw_files = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = drive.list_page(query, page_token.as_deref())?;
        raw_files.extend(page.files);
        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    let mut items = Vec::with_capacity(raw_files.len());
    let mut skipped = Vec::new();
    for raw in raw_files {
        match normalize(raw)? {
            Normalized::Item(item) => items.push(item),
            Normalized::Skipped(item) => skipped.push(item),
        }
    }

    Ok(DriveIndex::from_items(items).with_skipped(skipped))
}

enum Normalized {
    Item(RemoteItem),
    Skipped(SkippedItem),
}

fn normalize(raw: RawFile) -> Result<Normalized, IndexError> {
    // The tree invariant is checked before anything else, for every record.
    if raw.parents.len() > 1 {
        return Err(IndexError::MultipleParents {
            name: raw.name,
            count: raw.parents.len(),
        });
    }

    let kind = match classify(&raw)? {
        Some(kind) => kind,
        None => {
            return Ok(Normalized::Skipped(SkippedItem {
                id: raw.id,
                name: raw.name,
                mime_type: raw.mime_type,
            }));
        }
    };

    Ok(Normalized::Item(RemoteItem {
        id: raw.id,
        kind,
        parent_id: raw.parents.into_iter().next(),
        name: raw.name,
        description: raw.description,
    }))
}

fn classify(raw: &RawFile) -> Result<Option<ItemKind>, IndexError> {
    let mime = raw.mime_type.as_str();
    let kind = if mime == FOLDER_MIME {
        ItemKind::Directory
    } else if mime == DOCUMENT_MIME {
        ItemKind::Document
    } else if mime == SHEET_MIME {
        ItemKind::Sheet
    } else if mime.starts_with("image/") {
        let meta = required(raw, "imageMediaMetadata", raw.image_media_metadata.as_ref())?;
        ItemKind::Image(ImageMetadata {
            width: required(raw, "imageMediaMetadata.width", meta.width)?,
            height: required(raw, "imageMediaMetadata.height", meta.height)?,
            extension: required(raw, "fileExtension", raw.file_extension.clone())?,
            size: parse_decimal(raw, "size", raw.size.as_deref())?,
            sha256: required(raw, "sha256Checksum", raw.sha256_checksum.clone())?,
        })
    } else if mime.starts_with("video/") {
        let meta = required(raw, "videoMediaMetadata", raw.video_media_metadata.as_ref())?;
        ItemKind::Video(VideoMetadata {
            width: required(raw, "videoMediaMetadata.width", meta.width)?,
            height: required(raw, "videoMediaMetadata.height", meta.height)?,
            duration_ms: parse_decimal(
                raw,
                "videoMediaMetadata.durationMillis",
                meta.duration_millis.as_deref(),
            )?,
            extension: required(raw, "fileExtension", raw.file_extension.clone())?,
            size: parse_decimal(raw, "size", raw.size.as_deref())?,
            sha256: required(raw, "sha256Checksum", raw.sha256_checksum.clone())?,
        })
    } else {
        return Ok(None);
    };
    Ok(Some(kind))
}

fn missing(raw: &RawFile, field: &'static str) -> IndexError {
    IndexError::MissingField {
        id: raw.id.clone(),
        name: raw.name.clone(),
        field,
    }
}

fn required<T>(raw: &RawFile, field: &'static str, value: Option<T>) -> Result<T, IndexError> {
    value.ok_or_else(|| missing(raw, field))
}

fn parse_decimal(raw: &RawFile, field: &'static str, value: Option<&str>) -> Result<u64, IndexError> {
    required(raw, field, value)?
        .trim()
        .parse()
        .map_err(|_| missing(raw, field))
}

/// Serializes a `u64` as a decimal string, the way Drive reports int64 fields
/// and the website reads them.
mod decimal_string {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
