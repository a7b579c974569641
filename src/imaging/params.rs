//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what to crop or scale) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping codecs
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 100). Clamped on construction.
//! - [`CopyRegion`]: Source and destination rectangles for one resampled copy.
//! - [`EncodeParams`]: Output container, quality, and progressive flag for one encode.
//! - [`CropOptions`] / [`ResizeOptions`]: Caller-facing knobs for the two operations.

use super::calculations::{CropAnchor, CropPlan, ResizePlan};
use super::format::RasterFormat;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(100)
    }
}

/// Rectangles for a resampled copy from a source canvas into a destination canvas.
///
/// When the source and destination sizes match this is a plain pixel copy;
/// otherwise the source rectangle is scaled to the destination rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyRegion {
    pub dst_x: u32,
    pub dst_y: u32,
    pub src_x: u32,
    pub src_y: u32,
    pub src_width: u32,
    pub src_height: u32,
    pub dst_width: u32,
    pub dst_height: u32,
}

impl CopyRegion {
    /// Extract the planned square into a `side × side` canvas without scaling.
    pub fn for_crop(plan: &CropPlan) -> Self {
        Self {
            dst_x: 0,
            dst_y: 0,
            src_x: plan.offset_x,
            src_y: plan.offset_y,
            src_width: plan.side,
            src_height: plan.side,
            dst_width: plan.side,
            dst_height: plan.side,
        }
    }

    /// Scale a whole `width × height` source into the planned canvas.
    pub fn for_resize(width: u32, height: u32, plan: &ResizePlan) -> Self {
        Self {
            dst_x: 0,
            dst_y: 0,
            src_x: 0,
            src_y: 0,
            src_width: width,
            src_height: height,
            dst_width: plan.width,
            dst_height: plan.height,
        }
    }

    pub fn is_scaling(&self) -> bool {
        self.src_width != self.dst_width || self.src_height != self.dst_height
    }
}

/// Parameters for a single encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub format: RasterFormat,
    /// Ignored unless [`RasterFormat::supports_quality`].
    pub quality: Quality,
    /// Request the progressive JPEG variant. Ignored for other formats.
    pub progressive: bool,
}

impl EncodeParams {
    pub fn new(format: RasterFormat) -> Self {
        Self {
            format,
            quality: Quality::default(),
            progressive: false,
        }
    }
}

/// Default mode for square crops: owner rwx, group/other r-x.
pub const DEFAULT_CROP_FILE_MODE: u32 = 0o755;

/// Default mode for resized output: owner rw, group/other r.
pub const DEFAULT_RESIZE_FILE_MODE: u32 = 0o644;

/// Options for [`crop_to_square`](super::operations::crop_to_square).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropOptions {
    pub anchor: CropAnchor,
    pub quality: Quality,
    /// Permission bits applied after a successful write. `None` leaves them alone.
    pub file_mode: Option<u32>,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            anchor: CropAnchor::Center,
            quality: Quality::default(),
            file_mode: Some(DEFAULT_CROP_FILE_MODE),
        }
    }
}

/// Options for [`resize_to_fit`](super::operations::resize_to_fit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOptions {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: Quality,
    /// Permission bits applied after a successful write. `None` leaves them alone.
    pub file_mode: Option<u32>,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            max_width: 1000,
            max_height: 1000,
            quality: Quality::default(),
            file_mode: Some(DEFAULT_RESIZE_FILE_MODE),
        }
    }
}

/// Parse an octal permission string such as `755`, `0755` or `0o755`.
pub fn parse_file_mode(text: &str) -> Result<u32, String> {
    let digits = text.trim();
    let digits = digits
        .strip_prefix("0o")
        .or_else(|| digits.strip_prefix("0O"))
        .unwrap_or(digits);
    let mode = u32::from_str_radix(digits, 8)
        .map_err(|_| format!("'{text}' is not an octal file mode"))?;
    if mode > 0o7777 {
        return Err(format!("file mode {text} is out of range (max 7777)"));
    }
    Ok(mode)
}
