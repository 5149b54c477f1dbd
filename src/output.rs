//! CLI output formatting for the sync pipeline.
//!
//! # Output Format
//!
//! Every stage opens with a `==>` header. Per-item context is indented by one
//! level underneath it, and each media file leads with its positional index
//! and Drive id so a line in the log can be traced back to the file in Drive.
//!
//! ```text
//! ==> Searching Google Drive for content
//!     Skipped cv.pdf (application/pdf)
//! ==> Creating output directory
//! ==> Downloading contact details
//!     Wrote contact.json
//! ==> Downloading content for home page
//!     Wrote home.json
//! ==> Downloading media & creating previews
//! 001 1aB2cD: Harbour at dusk
//!     Downloading
//!  40% ========================================
//! 100% ====================================================================================================
//!     Downloaded 4823112 bytes
//!     preview: 128x85
//!     medium: 640x427
//!     large: 1920x1280
//! 002 3eF4gH
//!     Up to date
//! ==> Synced 6 media files: 1 downloaded, 5 up to date, 5 resized
//! ```
//!
//! Download progress bars overwrite themselves on one terminal line; only the
//! final bar is followed by a newline.
//!
//! # Architecture
//!
//! [`format_sync_event`] is pure (returns `Vec<String>`) for testability and
//! [`print_sync_event`] is the stdout wrapper used by the CLI's printer thread.

use crate::media::{Freshness, MediaEvent};
use crate::sync::SyncEvent;
use std::io::Write;
use std::path::Path;

/// Longest description shown next to a media id.
const DESCRIPTION_WIDTH: usize = 60;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One `=` per percent, after a right-aligned percentage.
///
/// ```text
///  40% ========================================
/// ```
pub fn format_progress_bar(percent: u8) -> String {
    let percent = percent.min(100);
    format!("{:3}% {}", percent, "=".repeat(percent as usize))
}

fn freshness_line(freshness: Freshness) -> &'static str {
    match freshness {
        Freshness::Current => "Up to date",
        Freshness::Missing => "Downloading",
        Freshness::WrongSize => "Wrong size, downloading again",
        Freshness::WrongHash => "Wrong hash, downloading again",
    }
}

// ============================================================================
// Sync events
// ============================================================================

/// Format a single sync event as display lines.
pub fn format_sync_event(event: &SyncEvent) -> Vec<String> {
    match event {
        SyncEvent::Stage(stage) => vec![format!("==> {}", stage.label())],
        SyncEvent::Skipped(item) => vec![format!(
            "{}Skipped {} ({})",
            indent(1),
            item.name,
            item.mime_type
        )],
        SyncEvent::JsonWritten { path } => {
            vec![format!("{}Wrote {}", indent(1), file_name(path))]
        }
        SyncEvent::MediaStarted {
            index,
            file_id,
            description,
            ..
        } => {
            let description = description.trim();
            if description.is_empty() {
                vec![format!("{} {}", format_index(*index), file_id)]
            } else {
                vec![format!(
                    "{} {}: {}",
                    format_index(*index),
                    file_id,
                    truncate_desc(description, DESCRIPTION_WIDTH)
                )]
            }
        }
        SyncEvent::Media(MediaEvent::Checked { freshness, .. }) => {
            vec![format!("{}{}", indent(1), freshness_line(*freshness))]
        }
        SyncEvent::Media(MediaEvent::Progress { percent, .. }) => {
            vec![format_progress_bar(*percent)]
        }
        SyncEvent::Media(MediaEvent::Downloaded { bytes, .. }) => {
            vec![format!("{}Downloaded {} bytes", indent(1), bytes)]
        }
        SyncEvent::VariantsWritten { variants } => variants
            .iter()
            .map(|v| format!("{}{}: {}x{}", indent(1), v.tag.as_str(), v.width, v.height))
            .collect(),
        SyncEvent::Finished(summary) => vec![format!("==> Synced {}", summary)],
    }
}

/// Print a sync event to stdout.
pub fn print_sync_event(event: &SyncEvent) {
    if let SyncEvent::Media(MediaEvent::Progress { percent, done }) = event {
        let mut stdout = std::io::stdout().lock();
        write!(stdout, "{}\r", format_progress_bar(*percent)).ok();
        if *done {
            writeln!(stdout).ok();
        }
        stdout.flush().ok();
        return;
    }
    for line in format_sync_event(event) {
        println!("{}", line);
    }
}
