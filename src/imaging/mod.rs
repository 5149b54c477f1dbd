//! Image variant generation, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Preview** | `fast_blur` at full size, then Lanczos3 down to 128px |
//! | **Medium / Large** | Lanczos3 down to 640px / 1920px |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{fit_within, preview_blur_radius};
pub use operations::{GeneratedVariant, VariantConfig, generate_variants, plan_variants, variant_path};
pub use params::{VariantParams, VariantTag};
pub use rust_backend::RustBackend;
