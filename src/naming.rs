//! Derived output file names.
//!
//! When a crop is pointed at a directory instead of a file, the output name is
//! built from the source file name:
//!
//! - `Holiday Photo (2).JPG` cropped left → `holiday_photo_2_square_left.jpg`
//! - `IMG_0042.png` cropped center → `img_0042_square_center.png`
//!
//! The extension comes from the probed source format, not the source name.

use crate::imaging::{CropAnchor, RasterFormat};
use std::path::Path;

/// Reduce a name to lowercase ASCII letters, digits and single underscores.
///
/// Characters outside `[A-Za-z0-9_ ]` become spaces, the result is trimmed,
/// and every run of spaces/underscores collapses to one `_`.
pub fn slugify(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == ' ' {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut slug = String::with_capacity(cleaned.len());
    let mut pending_sep = false;
    for c in cleaned.trim().chars() {
        if c == ' ' || c == '_' {
            pending_sep = true;
        } else {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c);
        }
    }
    slug
}

/// File name for a square crop written into a directory.
pub fn square_crop_file_name(source: &Path, anchor: CropAnchor, format: RasterFormat) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let slug = slugify(&stem);
    let slug = if slug.is_empty() { "image".to_string() } else { slug };
    format!("{slug}_square_{anchor}.{}", format.extension())
}
