//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what variants to create) and the [`backend`](super::backend)
//! (which does the actual pixel work), so tests can swap in a mock backend
//! without touching operation logic.

use std::path::PathBuf;

/// Which derived copy of an original photo a variant is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantTag {
    /// Heavily blurred placeholder shown while the real image loads.
    Preview,
    Medium,
    Large,
}

impl VariantTag {
    /// Generation order.
    pub const ALL: [VariantTag; 3] = [VariantTag::Preview, VariantTag::Medium, VariantTag::Large];

    /// Suffix inserted before the extension: `<id>.<tag>.<ext>`.
    pub fn as_str(self) -> &'static str {
        match self {
            VariantTag::Preview => "preview",
            VariantTag::Medium => "medium",
            VariantTag::Large => "large",
        }
    }
}

/// Full specification for rendering one variant.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Gaussian blur sigma applied to the full-size image before scaling.
    pub blur_sigma: Option<f32>,
}
