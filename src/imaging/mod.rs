//! Image processing: square crops and bounded resizes.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Probe** | `image::ImageReader::with_guessed_format` + bilevel header sniffing |
//! | **JPEG / PNG / GIF / BMP** | `image` crate codecs |
//! | **XBM / WBMP** | hand-written [`bilevel`] codecs |
//! | **Resample** | `image::imageops` triangle filter |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop/resize geometry (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Format**: [`RasterFormat`] and its MIME/extension table
//! - **Validation**: [`Endpoints`] source/destination checks
//! - **Backend**: [`RasterCodec`] trait + [`RustCodec`]
//! - **Operations**: High-level functions combining calculations + codec

pub mod backend;
pub mod bilevel;
mod calculations;
pub mod format;
pub mod operations;
mod params;
pub mod rust_backend;
pub mod validate;

pub use backend::{ImageRef, ImagingError, RasterCodec};
pub use calculations::{CropAnchor, CropPlan, ResizePlan, plan_resize, plan_square_crop};
pub use format::RasterFormat;
pub use operations::{
    Operation, OperationResult, Outcome, crop_to_square, crop_to_square_file, resize_file,
    resize_to_fit,
};
pub use params::{
    CopyRegion, CropOptions, DEFAULT_CROP_FILE_MODE, DEFAULT_RESIZE_FILE_MODE, EncodeParams,
    Quality, ResizeOptions, parse_file_mode,
};
pub use rust_backend::RustCodec;
pub use validate::Endpoints;
