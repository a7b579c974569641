//! Shared test utilities for the pixtrim test suite.
//!
//! Provides synthetic image construction and fixture writers so tests never
//! depend on binary files checked into the repository.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let source = tmp.path().join("wide.png");
//! create_test_image(&source, 100, 60, RasterFormat::Png);
//! assert_dimensions(&source, 100, 60);
//! ```

use image::{DynamicImage, RgbImage};
use std::path::Path;

use crate::imaging::{EncodeParams, RasterCodec, RasterFormat, RustCodec};

// =========================================================================
// Synthetic images
// =========================================================================

/// Opaque RGB gradient: red follows x, green follows y.
///
/// Every pixel in a column differs from its neighbours, so crops at
/// different offsets produce distinguishable output.
pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

/// Write a gradient of the given size to `path` in `format`.
pub fn create_test_image(path: &Path, width: u32, height: u32, format: RasterFormat) {
    RustCodec::new()
        .encode(&gradient(width, height), path, &EncodeParams::new(format))
        .unwrap_or_else(|e| panic!("failed to write {format} fixture {}: {e}", path.display()));
}

// =========================================================================
// Assertions
// =========================================================================

/// Probe `path` and assert its dimensions. Panics with the probe error on failure.
pub fn assert_dimensions(path: &Path, width: u32, height: u32) {
    let image = RustCodec::new()
        .probe(path)
        .unwrap_or_else(|e| panic!("failed to probe {}: {e}", path.display()));
    assert_eq!(
        (image.width, image.height),
        (width, height),
        "unexpected dimensions for {}",
        path.display()
    );
}

/// Permission bits of `path` (Unix only).
#[cfg(unix)]
pub fn file_mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).unwrap().permissions().mode() & 0o7777
}
