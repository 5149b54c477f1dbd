//! Media download with size + hash verification.
//!
//! Every image and video is stored once as `<output_dir>/<file_id>.<ext>`.
//! Before fetching, the existing copy is checked against the size and
//! SHA-256 Drive reports for the file; a match means the remote content has
//! not changed and no request is made at all. This makes re-running the sync
//! after a content edit cheap: only the media that actually changed moves
//! over the network.
//!
//! Downloads stream into `<file_id>.<ext>.part` and are renamed into place
//! only once the whole body has been written, so an interrupted run never
//! leaves a truncated file under the canonical name.

use crate::drive::{DriveApi, DriveError};
use crate::pages::MediaEntry;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufWriter, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Read buffer for hashing local files.
const HASH_CHUNK: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error(transparent)]
    Drive(#[from] DriveError),
    #[error("IO error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

impl MediaError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> MediaError + '_ {
        move |source| MediaError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// State of the local copy of a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Exists with the expected size and hash.
    Current,
    Missing,
    WrongSize,
    WrongHash,
}

/// Progress notifications from [`ensure_downloaded`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    /// Result of checking the local copy.
    Checked { path: PathBuf, freshness: Freshness },
    /// Emitted per chunk once a download needs more than one chunk.
    Progress { percent: u8, done: bool },
    Downloaded { path: PathBuf, bytes: u64 },
}

/// Canonical local path for a media entry.
pub fn media_path(output_dir: &Path, entry: &MediaEntry) -> PathBuf {
    output_dir.join(format!("{}.{}", entry.file_id, entry.media.extension()))
}

/// Streaming SHA-256 of a file as lowercase hex.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_CHUNK];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Compare a local file against the expected size and SHA-256.
///
/// The hash is only computed when the size matches. Hex comparison is
/// case-insensitive.
pub fn check_freshness(path: &Path, size: u64, sha256: &str) -> io::Result<Freshness> {
    if !path.is_file() {
        return Ok(Freshness::Missing);
    }
    if std::fs::metadata(path)?.len() != size {
        return Ok(Freshness::WrongSize);
    }
    if !hash_file(path)?.eq_ignore_ascii_case(sha256) {
        return Ok(Freshness::WrongHash);
    }
    Ok(Freshness::Current)
}

/// Make sure the media file for `entry` exists locally with the right
/// content, downloading it if needed. Returns the canonical path.
pub fn ensure_downloaded(
    drive: &impl DriveApi,
    entry: &MediaEntry,
    output_dir: &Path,
    chunk_size: u64,
    events: &mut dyn FnMut(MediaEvent),
) -> Result<PathBuf, MediaError> {
    let path = media_path(output_dir, entry);
    let freshness = check_freshness(&path, entry.media.size(), entry.media.sha256())
        .map_err(MediaError::io(&path))?;
    events(MediaEvent::Checked {
        path: path.clone(),
        freshness,
    });
    if freshness == Freshness::Current {
        return Ok(path);
    }

    let part = part_path(&path);
    let downloaded = download_to(drive, entry, &part, chunk_size, events).and_then(|bytes| {
        std::fs::rename(&part, &path).map_err(MediaError::io(&path))?;
        Ok(bytes)
    });
    match downloaded {
        Ok(bytes) => {
            events(MediaEvent::Downloaded {
                path: path.clone(),
                bytes,
            });
            Ok(path)
        }
        Err(e) => {
            let _ = std::fs::remove_file(&part);
            Err(e)
        }
    }
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

fn download_to(
    drive: &impl DriveApi,
    entry: &MediaEntry,
    part: &Path,
    chunk_size: u64,
    events: &mut dyn FnMut(MediaEvent),
) -> Result<u64, MediaError> {
    let mut download = drive.download(&entry.file_id)?;
    let total = download.content_length.unwrap_or(entry.media.size());

    let file = File::create(part).map_err(MediaError::io(part))?;
    let mut writer = BufWriter::new(file);
    let mut written = 0u64;
    let mut show_progress = false;

    loop {
        let mut chunk = Read::by_ref(&mut download.body).take(chunk_size);
        let copied = io::copy(&mut chunk, &mut writer).map_err(MediaError::io(part))?;
        written += copied;

        // The body decides when the file is complete; `total` only scales progress.
        let done = copied < chunk_size;
        if !done {
            show_progress = true;
        }
        if show_progress {
            events(MediaEvent::Progress {
                percent: percent(written, total),
                done,
            });
        }
        if done {
            break;
        }
    }

    writer
        .into_inner()
        .map_err(|e| MediaError::Io {
            path: part.to_path_buf(),
            source: e.into_error(),
        })?
        .sync_all()
        .map_err(MediaError::io(part))?;
    Ok(written)
}

fn percent(written: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    (written.saturating_mul(100) / total).min(100) as u8
}
