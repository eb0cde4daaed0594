//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the dimensions of an image scaled to fit inside a `size` x `size` box.
///
/// The aspect ratio is preserved and the longer edge becomes `size`. Images
/// already inside the box are left at their original size (never upscaled).
///
/// # Examples
/// ```
/// # use gallery_meta::imaging::calculate_fit_dimensions;
/// // Landscape 4000x3000 into 300 → 300x225
/// assert_eq!(calculate_fit_dimensions((4000, 3000), 300), (300, 225));
///
/// // Small image is not upscaled
/// assert_eq!(calculate_fit_dimensions((200, 100), 300), (200, 100));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), size: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    let longer = src_w.max(src_h);
    if longer <= size || longer == 0 {
        return source;
    }

    let scale = size as f64 / longer as f64;
    let w = ((src_w as f64 * scale).round() as u32).max(1);
    let h = ((src_h as f64 * scale).round() as u32).max(1);
    (w, h)
}

/// Whether an EXIF orientation code describes a 90° or 270° rotation.
///
/// Codes 5 to 8 all rotate by a quarter turn (5 and 7 also mirror). Cameras in
/// practice write 6 (rotate 90° CW) and 8 (rotate 270° CW).
pub fn is_quarter_turn(orientation: u32) -> bool {
    matches!(orientation, 5..=8)
}

/// Apply EXIF orientation to stored dimensions.
///
/// Returns `(width, height)` as the image is displayed: swapped for quarter turns.
pub fn oriented_dimensions(
    width: Option<u32>,
    height: Option<u32>,
    orientation: Option<u32>,
) -> (Option<u32>, Option<u32>) {
    if orientation.is_some_and(is_quarter_turn) {
        (height, width)
    } else {
        (width, height)
    }
}
