//! Pure calculation functions for variant dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Fit `source` inside a square bounding box of side `max_size`.
///
/// The longer edge becomes `max_size` and the shorter edge is scaled
/// proportionally and rounded. Images already within the box keep their
/// size; variants are never upscaled.
///
/// # Examples
/// ```
/// # use drive_content_sync::imaging::fit_within;
/// assert_eq!(fit_within((2400, 1600), 1920), (1920, 1280));
/// assert_eq!(fit_within((1000, 3000), 640), (213, 640));
/// assert_eq!(fit_within((100, 50), 640), (100, 50));
/// ```
pub fn fit_within(source: (u32, u32), max_size: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    let longer_edge = src_w.max(src_h);

    if longer_edge <= max_size || longer_edge == 0 {
        return source;
    }

    let scale = max_size as f64 / longer_edge as f64;
    if src_w >= src_h {
        // Landscape or square
        let h = ((src_h as f64 * scale).round() as u32).max(1);
        (max_size, h)
    } else {
        let w = ((src_w as f64 * scale).round() as u32).max(1);
        (w, max_size)
    }
}

/// Blur radius for the preview variant: `blur_fraction` of the longer edge of
/// the original, rounded down, never below 2 pixels.
pub fn preview_blur_radius(source: (u32, u32), blur_fraction: f64) -> f32 {
    let longer_edge = source.0.max(source.1) as f64;
    (longer_edge * blur_fraction).floor().max(2.0) as f32
}
