//! The sync pipeline.
//!
//! ```text
//! 1. Index      files.list (paged)         →  DriveIndex
//! 2. Pages      index + exports            →  contact.json, home.json,
//!                                              portfolio.json, video.json
//! 3. Media      MediaEntry list            →  <id>.<ext> (verified or fetched)
//! 4. Variants   downloaded images          →  <id>.preview|medium|large.<ext>
//! ```
//!
//! Everything runs sequentially on the calling thread and the first error
//! aborts the run. Progress is reported as [`SyncEvent`]s over an optional
//! channel so the CLI can print while the pipeline stays free of I/O to
//! stdout.

use crate::config::SyncConfig;
use crate::drive::{DriveApi, ListQuery};
use crate::imaging::{BackendError, GeneratedVariant, ImageBackend, VariantConfig, generate_variants};
use crate::index::{IndexError, SkippedItem, build_index};
use crate::media::{Freshness, MediaError, MediaEvent, ensure_downloaded};
use crate::pages::{
    self, HomeContent, MediaEntry, PageError, PortfolioContent, VideoContent, write_json,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error("Failed to resize {path}: {source}")]
    Image { path: PathBuf, source: BackendError },
    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Pipeline stages, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Index,
    OutputDir,
    Contact,
    Home,
    Portfolio,
    Video,
    Media,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Index => "Searching Google Drive for content",
            Stage::OutputDir => "Creating output directory",
            Stage::Contact => "Downloading contact details",
            Stage::Home => "Downloading content for home page",
            Stage::Portfolio => "Collecting portfolio albums",
            Stage::Video => "Collecting videos",
            Stage::Media => "Downloading media & creating previews",
        }
    }
}

/// Progress notifications from [`run`].
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Stage(Stage),
    /// Item left out of the index because its type is not recognized.
    Skipped(SkippedItem),
    JsonWritten { path: PathBuf },
    /// A media entry is about to be verified/downloaded. `index` is 1-based.
    MediaStarted {
        index: usize,
        total: usize,
        file_id: String,
        description: String,
    },
    Media(MediaEvent),
    VariantsWritten { variants: Vec<GeneratedVariant> },
    Finished(SyncSummary),
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub media: usize,
    pub downloaded: usize,
    pub up_to_date: usize,
    pub resized: usize,
    pub skipped_items: usize,
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} media files: {} downloaded, {} up to date, {} resized",
            self.media, self.downloaded, self.up_to_date, self.resized
        )?;
        if self.skipped_items > 0 {
            write!(f, " ({} unrecognized items skipped)", self.skipped_items)?;
        }
        Ok(())
    }
}

fn emit(events: &Option<Sender<SyncEvent>>, event: SyncEvent) {
    if let Some(tx) = events {
        // The receiver going away only means nobody is watching.
        tx.send(event).ok();
    }
}

/// Media of all pages in download order: home photos, portfolio photos
/// (album order, then photo order), videos.
pub fn collect_media(
    home: &HomeContent,
    portfolio: &PortfolioContent,
    video: &VideoContent,
) -> Vec<MediaEntry> {
    home.photos
        .iter()
        .chain(portfolio.photos.iter().flat_map(|(_, photos)| photos.iter()))
        .chain(video.videos.iter())
        .cloned()
        .collect()
}

/// Run the whole sync into `output_dir`.
pub fn run(
    drive: &impl DriveApi,
    backend: &impl ImageBackend,
    config: &SyncConfig,
    output_dir: &Path,
    events: Option<Sender<SyncEvent>>,
) -> Result<SyncSummary, SyncError> {
    let root_id = config.drive.root_id.as_str();
    let mut summary = SyncSummary::default();

    emit(&events, SyncEvent::Stage(Stage::Index));
    let query = ListQuery {
        page_size: config.drive.page_size,
        order_by: config.drive.order_by.clone(),
    };
    let index = build_index(drive, &query)?;
    for skipped in index.skipped() {
        emit(&events, SyncEvent::Skipped(skipped.clone()));
    }
    summary.skipped_items = index.skipped().len();

    emit(&events, SyncEvent::Stage(Stage::OutputDir));
    std::fs::create_dir_all(output_dir).map_err(|source| SyncError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let written = |name: &str| SyncEvent::JsonWritten {
        path: output_dir.join(name),
    };

    emit(&events, SyncEvent::Stage(Stage::Contact));
    let contact = pages::contact_details(drive, &index, root_id)?;
    write_json(&contact, output_dir, "contact.json")?;
    emit(&events, written("contact.json"));

    emit(&events, SyncEvent::Stage(Stage::Home));
    let home = pages::home_content(drive, &index, root_id)?;
    write_json(&home, output_dir, "home.json")?;
    emit(&events, written("home.json"));

    emit(&events, SyncEvent::Stage(Stage::Portfolio));
    let portfolio = pages::portfolio_content(&index, root_id)?;
    write_json(&portfolio, output_dir, "portfolio.json")?;
    emit(&events, written("portfolio.json"));

    emit(&events, SyncEvent::Stage(Stage::Video));
    let video = pages::video_content(&index, root_id)?;
    write_json(&video, output_dir, "video.json")?;
    emit(&events, written("video.json"));

    emit(&events, SyncEvent::Stage(Stage::Media));
    let media = collect_media(&home, &portfolio, &video);
    let variant_config = VariantConfig::from(&config.images);
    summary.media = media.len();

    for (i, entry) in media.iter().enumerate() {
        emit(
            &events,
            SyncEvent::MediaStarted {
                index: i + 1,
                total: media.len(),
                file_id: entry.file_id.clone(),
                description: entry.description.clone(),
            },
        );

        let mut fresh = false;
        let path = ensure_downloaded(
            drive,
            entry,
            output_dir,
            config.download.chunk_size,
            &mut |event| {
                if let MediaEvent::Checked { freshness, .. } = &event {
                    fresh = *freshness == Freshness::Current;
                }
                emit(&events, SyncEvent::Media(event));
            },
        )?;
        if fresh {
            summary.up_to_date += 1;
        } else {
            summary.downloaded += 1;
        }

        if !entry.media.is_image() {
            continue;
        }
        let variants = generate_variants(backend, &path, &variant_config)
            .map_err(|source| SyncError::Image {
                path: path.clone(),
                source,
            })?;
        summary.resized += 1;
        emit(&events, SyncEvent::VariantsWritten { variants });
    }

    emit(&events, SyncEvent::Finished(summary.clone()));
    Ok(summary)
}
