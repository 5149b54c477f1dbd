//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{fit_within, preview_blur_radius};
use super::params::{VariantParams, VariantTag};
use crate::config::ImagesConfig;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Bounding boxes and blur strength for the three variants.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantConfig {
    pub preview: u32,
    pub medium: u32,
    pub large: u32,
    pub preview_blur: f64,
}

impl VariantConfig {
    pub fn max_size(&self, tag: VariantTag) -> u32 {
        match tag {
            VariantTag::Preview => self.preview,
            VariantTag::Medium => self.medium,
            VariantTag::Large => self.large,
        }
    }
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self::from(&ImagesConfig::default())
    }
}

impl From<&ImagesConfig> for VariantConfig {
    fn from(images: &ImagesConfig) -> Self {
        Self {
            preview: images.preview,
            medium: images.medium,
            large: images.large,
            preview_blur: images.preview_blur,
        }
    }
}

/// One written variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedVariant {
    pub tag: VariantTag,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// `<dir>/<stem>.<tag>.<ext>` next to the original.
pub fn variant_path(source: &Path, tag: VariantTag) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match source.extension() {
        Some(ext) => format!("{}.{}.{}", stem, tag.as_str(), ext.to_string_lossy()),
        None => format!("{}.{}", stem, tag.as_str()),
    };
    source.with_file_name(name)
}

/// Plan all variants for an image of the given dimensions without executing
/// anything.
pub fn plan_variants(
    source: &Path,
    original_dims: (u32, u32),
    config: &VariantConfig,
) -> Vec<VariantParams> {
    VariantTag::ALL
        .iter()
        .map(|&tag| {
            let (width, height) = fit_within(original_dims, config.max_size(tag));
            let blur_sigma = match tag {
                VariantTag::Preview => Some(preview_blur_radius(original_dims, config.preview_blur)),
                VariantTag::Medium | VariantTag::Large => None,
            };
            VariantParams {
                source: source.to_path_buf(),
                output: variant_path(source, tag),
                width,
                height,
                blur_sigma,
            }
        })
        .collect()
}

/// Write the preview, medium and large variants of `source` beside it.
pub fn generate_variants(
    backend: &impl ImageBackend,
    source: &Path,
    config: &VariantConfig,
) -> Result<Vec<GeneratedVariant>> {
    let dims = backend.identify(source)?;
    let plans = plan_variants(source, (dims.width, dims.height), config);

    let mut variants = Vec::with_capacity(plans.len());
    for (tag, params) in VariantTag::ALL.into_iter().zip(plans) {
        backend.render_variant(&params)?;
        variants.push(GeneratedVariant {
            tag,
            path: params.output,
            width: params.width,
            height: params.height,
        });
    }
    Ok(variants)
}
