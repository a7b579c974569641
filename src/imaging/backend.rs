//! Raster codec trait and shared types.
//!
//! The [`RasterCodec`] trait is the boundary between the geometry-driven
//! operations and the library that actually touches pixels: probe a header,
//! decode, allocate a blank canvas, resample a region from one canvas into
//! another, and encode.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_backend::RustCodec), built on the `image` crate.

use super::format::RasterFormat;
use super::params::{CopyRegion, EncodeParams};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Every way an operation can fail.
///
/// All variants are terminal for the call. [`ImagingError::Permission`] is
/// only ever produced by the post-write chmod step, which logs and swallows it.
#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
    #[error("Transform failed: {0}")]
    Transform(String),
    #[error("Failed to encode {}: {reason}", path.display())]
    Encode { path: PathBuf, reason: String },
    #[error("Failed to set permissions on {}: {source}", path.display())]
    Permission {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A probed source image: header information only, no pixels.
///
/// `width` and `height` are always non-zero; probing fails otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: RasterFormat,
    /// Progressive (multi-scan) JPEG. Always `false` for other formats.
    pub progressive: bool,
}

/// Trait for raster codecs.
///
/// `Canvas` is the codec's in-memory pixel buffer. Canvases are owned by the
/// calling operation and dropped when it returns, on every path.
pub trait RasterCodec: Sync {
    type Canvas;

    /// Read dimensions and sniff the format from file content.
    fn probe(&self, path: &Path) -> Result<ImageRef, ImagingError>;

    /// Decode the full pixel data of a probed image.
    fn decode(&self, image: &ImageRef) -> Result<Self::Canvas, ImagingError>;

    /// Allocate a blank canvas.
    fn allocate(&self, width: u32, height: u32) -> Result<Self::Canvas, ImagingError>;

    /// Copy (and scale, if the rectangles differ in size) a region of `src` into `dst`.
    fn resampled_copy(
        &self,
        dst: &mut Self::Canvas,
        src: &Self::Canvas,
        region: &CopyRegion,
    ) -> Result<(), ImagingError>;

    /// Write a canvas to `path`, replacing any existing file in a single step.
    fn encode(
        &self,
        canvas: &Self::Canvas,
        path: &Path,
        params: &EncodeParams,
    ) -> Result<(), ImagingError>;
}
