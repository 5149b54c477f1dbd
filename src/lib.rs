//! # Drive Content Sync
//!
//! Pulls the content of a website out of a Google Drive folder tree and
//! writes it as local JSON documents plus media files. The Drive folder is the
//! CMS: editors arrange Docs, Sheets, photos and videos in well-known folders
//! and a sync run turns that layout into the files the site is built from.
//!
//! # Architecture: One Sequential Pipeline
//!
//! ```text
//! 1. Index      files.list (every page)    →  DriveIndex (id → item, parent → children)
//! 2. Pages      index + Doc/Sheet exports  →  contact.json, home.json,
//!                                              portfolio.json, video.json
//! 3. Media      referenced images/videos   →  <file_id>.<ext>
//! 4. Variants   each downloaded image      →  <file_id>.preview|medium|large.<ext>
//! ```
//!
//! The whole Drive is listed once up front. Every later lookup (path
//! resolution, album listing, media collection) is answered from that
//! in-memory snapshot, so the only remote calls after indexing are Doc/Sheet
//! exports and media downloads.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`drive`] | `DriveApi` trait, blocking HTTP client, service-account token |
//! | [`index`] | Builds the normalized [`index::DriveIndex`] from the raw listing |
//! | [`resolve`] | Name-path lookups (`home/images`) against the index |
//! | [`pages`] | Assembles the four page documents and writes them as JSON |
//! | [`media`] | Size + SHA-256 freshness checks and chunked, atomic downloads |
//! | [`imaging`] | Pure-Rust blurred preview, medium and large variants |
//! | [`sync`] | Runs the stages in order and reports progress events |
//! | [`config`] | Stock defaults merged with an optional `config.toml` |
//! | [`output`] | CLI output formatting of progress events |
//!
//! # Design Decisions
//!
//! ## Names, Not Ids
//!
//! Only the root folder id is configured. Everything below it is found by
//! name, so editors can rebuild folders in Drive without touching the sync
//! configuration. A name that matches zero or several items is an error, not
//! a guess.
//!
//! ## Verified Media, Never Re-fetched
//!
//! Drive reports a size and SHA-256 for every binary file. A local file with
//! the same size and hash is trusted as-is, which makes repeated runs cheap:
//! only media that actually changed moves over the network.
//!
//! ## Pure-Rust Imaging
//!
//! Variants are produced with the `image` crate (Gaussian blur and Lanczos3
//! resampling). No ImageMagick or other system libraries are needed, so the
//! binary runs anywhere it is copied to.

pub mod config;
pub mod drive;
pub mod imaging;
pub mod index;
pub mod media;
pub mod output;
pub mod pages;
pub mod resolve;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_helpers;
