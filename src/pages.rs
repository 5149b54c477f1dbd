//! Page content assembly.
//!
//! Each website page reads a fixed set of logical paths below the content
//! root and turns them into one JSON document:
//!
//! | Page | Sources | Output |
//! |---|---|---|
//! | contact | sheet `contact` | `contact.json` |
//! | home | docs `home/bio`, `home/introduction`; sheets `home/quotes`, `home/name_checks`; images in `home/images` | `home.json` |
//! | portfolio | one directory per album in `portfolio` | `portfolio.json` |
//! | video | videos in `video` | `video.json` |
//!
//! Ordering always follows the index (Drive's `name_natural,recency`); nothing
//! here re-sorts.

use crate::drive::{DriveApi, DriveError, ExportFormat};
use crate::index::{DriveIndex, ImageMetadata, ItemKind, RemoteItem, VideoMetadata};
use crate::resolve::{ResolveError, list_children, resolve_file};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::ser::{Formatter, PrettyFormatter};
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error(transparent)]
    Drive(#[from] DriveError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("Failed to parse sheet as CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Exported text of {path} is not valid UTF-8: {source}")]
    Utf8 {
        path: String,
        source: std::string::FromUtf8Error,
    },
    #[error("Row {row} of sheet {path} has {cells} cell(s). Expected 2.")]
    MalformedRow {
        path: String,
        row: usize,
        cells: usize,
    },
    #[error("Contact details are missing: {0}")]
    MissingContact(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Kind-specific part of a [`MediaEntry`], flattened into the entry's JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Media {
    Image(ImageMetadata),
    Video(VideoMetadata),
}

impl Media {
    pub fn extension(&self) -> &str {
        match self {
            Media::Image(meta) => &meta.extension,
            Media::Video(meta) => &meta.extension,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            Media::Image(meta) => meta.size,
            Media::Video(meta) => meta.size,
        }
    }

    pub fn sha256(&self) -> &str {
        match self {
            Media::Image(meta) => &meta.sha256,
            Media::Video(meta) => &meta.sha256,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Media::Image(_))
    }
}

/// Download descriptor for one image or video, as the website reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaEntry {
    pub file_id: String,
    pub name: String,
    /// Trimmed; empty when Drive has no description.
    pub description: String,
    #[serde(flatten)]
    pub media: Media,
}

/// Project an image or video item into a [`MediaEntry`].
///
/// Returns `None` for every other kind.
pub fn media_entry(item: &RemoteItem) -> Option<MediaEntry> {
    let media = match &item.kind {
        ItemKind::Image(meta) => Media::Image(meta.clone()),
        ItemKind::Video(meta) => Media::Video(meta.clone()),
        _ => return None,
    };
    Some(MediaEntry {
        file_id: item.id.clone(),
        name: item.name.clone(),
        description: item.description.as_deref().unwrap_or("").trim().to_string(),
        media,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactDetails {
    pub email: String,
    pub instagram: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub quote: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCheck {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeContent {
    pub bio: String,
    pub introduction: String,
    pub quotes: Vec<Quote>,
    pub name_checks: Vec<NameCheck>,
    pub photos: Vec<MediaEntry>,
}

/// Portfolio albums keyed by album name, in index order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PortfolioContent {
    pub photos: Albums,
}

/// Insertion-ordered album map; serializes as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Albums(pub Vec<(String, Vec<MediaEntry>)>);

impl Albums {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MediaEntry])> {
        self.0.iter().map(|(name, photos)| (name.as_str(), photos.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Albums {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, photos) in &self.0 {
            map.serialize_entry(name, photos)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct VideoContent {
    pub videos: Vec<MediaEntry>,
}

// =========================================================================
// Exports
// =========================================================================

/// Export the document at `names` as UTF-8 plain text.
pub fn export_text(
    drive: &impl DriveApi,
    index: &DriveIndex,
    root_id: &str,
    names: &[&str],
) -> Result<String, PageError> {
    let id = resolve_file(index, root_id, names)?;
    let bytes = drive.export(&id, ExportFormat::PlainText)?;
    String::from_utf8(bytes).map_err(|source| PageError::Utf8 {
        path: names.join("/"),
        source,
    })
}

/// Export the sheet at `names` as CSV rows.
pub fn export_sheet(
    drive: &impl DriveApi,
    index: &DriveIndex,
    root_id: &str,
    names: &[&str],
) -> Result<Vec<Vec<String>>, PageError> {
    let id = resolve_file(index, root_id, names)?;
    let bytes = drive.export(&id, ExportFormat::Csv)?;
    parse_csv(&bytes)
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<Vec<String>>, PageError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Split each row into its first two cells. Extra cells are ignored.
fn pairs(rows: Vec<Vec<String>>, names: &[&str]) -> Result<Vec<(String, String)>, PageError> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            let cells = row.len();
            let mut cells_iter = row.into_iter();
            match (cells_iter.next(), cells_iter.next()) {
                (Some(first), Some(second)) => Ok((first, second)),
                _ => Err(PageError::MalformedRow {
                    path: names.join("/"),
                    row: i + 1,
                    cells,
                }),
            }
        })
        .collect()
}

fn media_in(
    index: &DriveIndex,
    root_id: &str,
    names: &[&str],
    keep: fn(&ItemKind) -> bool,
) -> Result<Vec<MediaEntry>, PageError> {
    Ok(list_children(index, root_id, names)?
        .into_iter()
        .filter(|item| keep(&item.kind))
        .filter_map(media_entry)
        .collect())
}

// =========================================================================
// Pages
// =========================================================================

/// Contact page: the `email` and `instagram` rows of the `contact` sheet.
pub fn contact_details(
    drive: &impl DriveApi,
    index: &DriveIndex,
    root_id: &str,
) -> Result<ContactDetails, PageError> {
    let names = ["contact"];
    let rows = pairs(export_sheet(drive, index, root_id, &names)?, &names)?;

    let mut email = None;
    let mut instagram = None;
    for (key, value) in rows {
        match key.as_str() {
            "email" => email = Some(value),
            "instagram" => instagram = Some(value),
            _ => {}
        }
    }

    Ok(ContactDetails {
        email: email.ok_or(PageError::MissingContact("email"))?,
        instagram: instagram.ok_or(PageError::MissingContact("instagram"))?,
    })
}

/// Home page: bio, introduction, quotes, name checks and hero photos.
pub fn home_content(
    drive: &impl DriveApi,
    index: &DriveIndex,
    root_id: &str,
) -> Result<HomeContent, PageError> {
    let bio = export_text(drive, index, root_id, &["home", "bio"])?;
    let introduction = export_text(drive, index, root_id, &["home", "introduction"])?;

    let quote_path = ["home", "quotes"];
    let quotes = pairs(export_sheet(drive, index, root_id, &quote_path)?, &quote_path)?
        .into_iter()
        .map(|(quote, name)| Quote { quote, name })
        .collect();

    let check_path = ["home", "name_checks"];
    let name_checks = pairs(export_sheet(drive, index, root_id, &check_path)?, &check_path)?
        .into_iter()
        .map(|(name, url)| NameCheck { name, url })
        .collect();

    let photos = media_in(index, root_id, &["home", "images"], ItemKind::is_image)?;

    Ok(HomeContent {
        bio,
        introduction,
        quotes,
        name_checks,
        photos,
    })
}

/// Portfolio page: one album per directory in `portfolio`.
///
/// Non-directory children of `portfolio` and non-image children of an album
/// are ignored.
pub fn portfolio_content(index: &DriveIndex, root_id: &str) -> Result<PortfolioContent, PageError> {
    let mut albums = Vec::new();
    for album in list_children(index, root_id, &["portfolio"])? {
        if !album.kind.is_directory() {
            continue;
        }
        let photos = media_in(
            index,
            root_id,
            &["portfolio", album.name.as_str()],
            ItemKind::is_image,
        )?;
        albums.push((album.name.clone(), photos));
    }
    Ok(PortfolioContent {
        photos: Albums(albums),
    })
}

/// Video page: every video in `video`.
pub fn video_content(index: &DriveIndex, root_id: &str) -> Result<VideoContent, PageError> {
    Ok(VideoContent {
        videos: media_in(index, root_id, &["video"], ItemKind::is_video)?,
    })
}

/// Pretty printer that escapes every non-ASCII character as `\uXXXX`
/// (UTF-16 code units, surrogate pairs above the BMP), so output files are
/// plain ASCII.
struct AsciiPrettyFormatter<'a>(PrettyFormatter<'a>);

impl Formatter for AsciiPrettyFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            if c.is_ascii() {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..i])?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + c.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

/// Write `content` to `output_dir/name` as ASCII-only JSON with 4-space
/// indentation, overwriting any existing file.
pub fn write_json<T: Serialize>(content: &T, output_dir: &Path, name: &str) -> Result<(), PageError> {
    let path = output_dir.join(name);
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    let formatter = AsciiPrettyFormatter(PrettyFormatter::with_indent(b"    "));
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    content.serialize(&mut serializer)?;
    std::io::Write::flush(&mut writer)?;
    Ok(())
}
