//! # pixtrim
//!
//! Square-crop or shrink a raster image and write the result next to it, or
//! over it.
//!
//! ```text
//! crop    100×60 (anchor center) → 60×60, taken from x = 20
//! resize  2000×1000 (box 1000×1000) → 1000×500
//! ```
//!
//! Both operations run the same single-threaded pipeline:
//!
//! ```text
//! validate → probe → plan → decode → allocate → resampled copy → encode → chmod
//! ```
//!
//! Planning is pure arithmetic and decides everything: a source that is
//! already square (crop) or already fits (resize) never reaches the decoder.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Geometry, the [`RasterCodec`](imaging::RasterCodec) trait, the `image`-crate codec, and the two operations |
//! | [`naming`] | Output file names derived when a crop targets a directory |
//! | [`config`] | Optional TOML defaults for the CLI, merged over stock defaults |
//! | [`output`] | CLI output formatting for operation results |
//!
//! # Design Decisions
//!
//! ## Content Decides the Decoder, the Destination Decides the Encoder
//!
//! The source format is sniffed from file content, so a mislabelled `.jpg`
//! that is really a PNG still decodes. The output container comes from the
//! destination's extension, so `crop a.png --dest a.jpg` converts. A
//! destination without an extension keeps the source format.
//!
//! ## Atomic Writes
//!
//! Encoders write to a temp file in the destination directory and rename it
//! into place. A failed encode leaves the previous destination untouched, which
//! matters most when the destination is the source.
//!
//! ## Mockable Codec
//!
//! Operations are generic over [`RasterCodec`](imaging::RasterCodec). Tests run
//! them against a recording mock that never touches pixels, so the geometry and
//! pipeline order are checked without encoding a single image.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
