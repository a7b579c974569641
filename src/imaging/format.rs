//! Supported raster formats and the table that describes them.
//!
//! Every format is resolved exactly once, at probe time (content sniffing) or
//! when choosing the output container (destination extension). After that the
//! rest of the pipeline only passes the [`RasterFormat`] tag around.
//!
//! | Format | MIME types | Extensions | Lossy quality |
//! |---|---|---|---|
//! | JPEG | `image/jpeg`, `image/pjpeg` | `jpg`, `jpeg`, `jpe` | yes |
//! | PNG | `image/png` | `png` | no |
//! | GIF | `image/gif` | `gif` | no |
//! | BMP | `image/bmp`, `image/x-ms-bmp` | `bmp` | no |
//! | XBM | `image/x-xbitmap`, `image/xbm` | `xbm` | no |
//! | WBMP | `image/vnd.wap.wbmp` | `wbmp` | no |

use super::backend::ImagingError;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// A raster format this crate can decode and encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Xbm,
    Wbmp,
}

struct FormatEntry {
    format: RasterFormat,
    name: &'static str,
    /// First entry is the canonical MIME type.
    mime_types: &'static [&'static str],
    /// First entry is the canonical extension.
    extensions: &'static [&'static str],
    lossy: bool,
}

/// Indexed by `RasterFormat` discriminant.
const FORMAT_TABLE: &[FormatEntry] = &[
    FormatEntry {
        format: RasterFormat::Jpeg,
        name: "JPEG",
        mime_types: &["image/jpeg", "image/pjpeg"],
        extensions: &["jpg", "jpeg", "jpe"],
        lossy: true,
    },
    FormatEntry {
        format: RasterFormat::Png,
        name: "PNG",
        mime_types: &["image/png"],
        extensions: &["png"],
        lossy: false,
    },
    FormatEntry {
        format: RasterFormat::Gif,
        name: "GIF",
        mime_types: &["image/gif"],
        extensions: &["gif"],
        lossy: false,
    },
    FormatEntry {
        format: RasterFormat::Bmp,
        name: "BMP",
        mime_types: &["image/bmp", "image/x-ms-bmp"],
        extensions: &["bmp"],
        lossy: false,
    },
    FormatEntry {
        format: RasterFormat::Xbm,
        name: "XBM",
        mime_types: &["image/x-xbitmap", "image/xbm"],
        extensions: &["xbm"],
        lossy: false,
    },
    FormatEntry {
        format: RasterFormat::Wbmp,
        name: "WBMP",
        mime_types: &["image/vnd.wap.wbmp"],
        extensions: &["wbmp"],
        lossy: false,
    },
];

impl RasterFormat {
    pub const ALL: [RasterFormat; 6] = [
        RasterFormat::Jpeg,
        RasterFormat::Png,
        RasterFormat::Gif,
        RasterFormat::Bmp,
        RasterFormat::Xbm,
        RasterFormat::Wbmp,
    ];

    fn entry(self) -> &'static FormatEntry {
        &FORMAT_TABLE[self as usize]
    }

    /// Look up a format by file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        FORMAT_TABLE
            .iter()
            .find(|e| e.extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
            .map(|e| e.format)
    }

    /// Look up a format by MIME type (case-insensitive).
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim();
        FORMAT_TABLE
            .iter()
            .find(|e| e.mime_types.iter().any(|m| m.eq_ignore_ascii_case(mime)))
            .map(|e| e.format)
    }

    /// Resolve the format implied by a path's extension.
    ///
    /// Returns `Ok(None)` when the path has no extension at all, and
    /// `UnsupportedFormat` when it has one that is not in the table.
    pub fn from_path(path: &Path) -> Result<Option<Self>, ImagingError> {
        let Some(ext) = path.extension() else {
            return Ok(None);
        };
        let ext = ext.to_string_lossy();
        Self::from_extension(&ext)
            .map(Some)
            .ok_or_else(|| ImagingError::UnsupportedFormat(format!("file extension '.{ext}'")))
    }

    /// Canonical MIME type.
    pub fn mime_type(self) -> &'static str {
        self.entry().mime_types[0]
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        self.entry().extensions[0]
    }

    /// Whether the encoder honors a lossy quality setting.
    ///
    /// Quality is ignored for every other format.
    pub fn supports_quality(self) -> bool {
        self.entry().lossy
    }
}

impl fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entry().name)
    }
}
