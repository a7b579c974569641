//! Pure Rust raster codec built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Probe | `ImageReader::with_guessed_format` + `into_dimensions`; custom sniffing for XBM/WBMP |
//! | Progressive detection | custom JPEG marker walk (SOF2/6/10/14) |
//! | Decode (JPEG, PNG, GIF, BMP) | `image` crate decoders |
//! | Decode / encode (XBM, WBMP) | [`bilevel`](super::bilevel) |
//! | Allocate | `DynamicImage::new_rgba8` |
//! | Resampled copy | `crop_imm` + `resize_exact` (`Triangle`, i.e. bilinear) + `copy_from` |
//! | Encode | `JpegEncoder`, `PngEncoder`, `GifEncoder`, `BmpEncoder` |
//! | Atomic write | `tempfile::NamedTempFile::persist` in the destination directory |

use super::backend::{ImageRef, ImagingError, RasterCodec};
use super::bilevel;
use super::format::RasterFormat;
use super::params::{CopyRegion, EncodeParams};
use image::codecs::bmp::BmpEncoder;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::error::{DecodingError, ImageFormatHint};
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, GenericImage, ImageEncoder, ImageError, ImageReader};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

type DecodeFn = fn(&Path) -> Result<DynamicImage, ImageError>;
type EncodeFn = fn(&DynamicImage, &EncodeParams, &Path, &mut dyn Write) -> Result<(), ImageError>;

/// Decode and encode entry points for one format.
struct FormatCodec {
    decode: DecodeFn,
    encode: EncodeFn,
}

fn codec_for(format: RasterFormat) -> FormatCodec {
    match format {
        RasterFormat::Jpeg => FormatCodec {
            decode: |p| decode_with(p, image::ImageFormat::Jpeg),
            encode: encode_jpeg,
        },
        RasterFormat::Png => FormatCodec {
            decode: |p| decode_with(p, image::ImageFormat::Png),
            encode: encode_png,
        },
        RasterFormat::Gif => FormatCodec {
            decode: |p| decode_with(p, image::ImageFormat::Gif),
            encode: encode_gif,
        },
        RasterFormat::Bmp => FormatCodec {
            decode: |p| decode_with(p, image::ImageFormat::Bmp),
            encode: encode_bmp,
        },
        RasterFormat::Xbm => FormatCodec {
            decode: decode_xbm,
            encode: encode_xbm,
        },
        RasterFormat::Wbmp => FormatCodec {
            decode: decode_wbmp,
            encode: encode_wbmp,
        },
    }
}

fn decode_with(path: &Path, format: image::ImageFormat) -> Result<DynamicImage, ImageError> {
    let mut reader = ImageReader::open(path)?;
    reader.set_format(format);
    reader.decode()
}

fn bilevel_error(name: &'static str, err: bilevel::BilevelError) -> ImageError {
    ImageError::Decoding(DecodingError::new(ImageFormatHint::Name(name.into()), err))
}

fn decode_xbm(path: &Path) -> Result<DynamicImage, ImageError> {
    let text = std::fs::read_to_string(path)?;
    bilevel::decode_xbm(&text)
        .map(DynamicImage::ImageLuma8)
        .map_err(|e| bilevel_error("XBM", e))
}

fn decode_wbmp(path: &Path) -> Result<DynamicImage, ImageError> {
    let bytes = std::fs::read(path)?;
    bilevel::decode_wbmp(&bytes)
        .map(DynamicImage::ImageLuma8)
        .map_err(|e| bilevel_error("WBMP", e))
}

fn encode_jpeg(
    img: &DynamicImage,
    params: &EncodeParams,
    _path: &Path,
    out: &mut dyn Write,
) -> Result<(), ImageError> {
    if params.progressive {
        debug!("JPEG encoder is baseline-only, writing progressive source as baseline");
    }
    // JPEG has no alpha channel.
    let rgb = img.to_rgb8();
    JpegEncoder::new_with_quality(out, params.quality.value() as u8).write_image(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ExtendedColorType::Rgb8,
    )
}

fn encode_png(
    img: &DynamicImage,
    _params: &EncodeParams,
    _path: &Path,
    out: &mut dyn Write,
) -> Result<(), ImageError> {
    let rgba = img.to_rgba8();
    PngEncoder::new(out).write_image(
        rgba.as_raw(),
        rgba.width(),
        rgba.height(),
        ExtendedColorType::Rgba8,
    )
}

fn encode_gif(
    img: &DynamicImage,
    _params: &EncodeParams,
    _path: &Path,
    out: &mut dyn Write,
) -> Result<(), ImageError> {
    GifEncoder::new(out).encode_frame(image::Frame::new(img.to_rgba8()))
}

fn encode_bmp(
    img: &DynamicImage,
    _params: &EncodeParams,
    _path: &Path,
    mut out: &mut dyn Write,
) -> Result<(), ImageError> {
    let rgba = img.to_rgba8();
    BmpEncoder::new(&mut out).write_image(
        rgba.as_raw(),
        rgba.width(),
        rgba.height(),
        ExtendedColorType::Rgba8,
    )
}

fn encode_xbm(
    img: &DynamicImage,
    _params: &EncodeParams,
    path: &Path,
    mut out: &mut dyn Write,
) -> Result<(), ImageError> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = bilevel::xbm_identifier(&stem);
    bilevel::encode_xbm(&img.to_luma8(), &name, &mut out)?;
    Ok(())
}

fn encode_wbmp(
    img: &DynamicImage,
    _params: &EncodeParams,
    _path: &Path,
    mut out: &mut dyn Write,
) -> Result<(), ImageError> {
    bilevel::encode_wbmp(&img.to_luma8(), &mut out)?;
    Ok(())
}

/// Walk JPEG segments until the first start-of-frame marker.
///
/// Returns `true` for the progressive SOF variants (0xC2, 0xC6, 0xCA, 0xCE).
/// Malformed or truncated streams count as baseline.
fn is_progressive_jpeg(reader: &mut impl Read) -> bool {
    let mut buf = [0u8; 2];
    if reader.read_exact(&mut buf).is_err() || buf != [0xFF, 0xD8] {
        return false;
    }
    loop {
        if reader.read_exact(&mut buf).is_err() || buf[0] != 0xFF {
            return false;
        }
        let mut marker = buf[1];
        // Fill bytes before a marker.
        while marker == 0xFF {
            let mut next = [0u8; 1];
            if reader.read_exact(&mut next).is_err() {
                return false;
            }
            marker = next[0];
        }
        match marker {
            0xC2 | 0xC6 | 0xCA | 0xCE => return true,
            0xC0 | 0xC1 | 0xC3 | 0xC5 | 0xC7 | 0xC9 | 0xCB | 0xCD | 0xCF => return false,
            // Standalone markers carry no length.
            0x01 | 0xD0..=0xD7 => continue,
            0xD9 | 0xDA => return false,
            _ => {}
        }
        if reader.read_exact(&mut buf).is_err() {
            return false;
        }
        let len = u16::from_be_bytes(buf) as u64;
        if len < 2 {
            return false;
        }
        let skip = len - 2;
        match io::copy(&mut reader.by_ref().take(skip), &mut io::sink()) {
            Ok(n) if n == skip => {}
            _ => return false,
        }
    }
}

/// Sniff XBM/WBMP from the first bytes of a file the `image` crate didn't recognize.
fn probe_bilevel(path: &Path) -> Result<Option<(RasterFormat, u32, u32)>, ImagingError> {
    let bytes = std::fs::read(path)?;
    if bilevel::looks_like_xbm(&bytes) {
        let text = String::from_utf8_lossy(&bytes);
        let (w, h) = bilevel::xbm_dimensions(&text).map_err(|e| ImagingError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        return Ok(Some((RasterFormat::Xbm, w, h)));
    }
    if bilevel::looks_like_wbmp(&bytes) {
        let (w, h, _) = bilevel::wbmp_header(&bytes).map_err(|e| ImagingError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        return Ok(Some((RasterFormat::Wbmp, w, h)));
    }
    Ok(None)
}

/// Pure Rust codec using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterCodec for RustCodec {
    type Canvas = DynamicImage;

    fn probe(&self, path: &Path) -> Result<ImageRef, ImagingError> {
        // No path-derived format: content alone decides.
        let reader = ImageReader::new(BufReader::new(File::open(path)?)).with_guessed_format()?;

        let (format, width, height) = match reader.format() {
            Some(sniffed) => {
                let format = RasterFormat::from_mime(sniffed.to_mime_type()).ok_or_else(|| {
                    ImagingError::UnsupportedFormat(format!(
                        "{} ({})",
                        sniffed.to_mime_type(),
                        path.display()
                    ))
                })?;
                let (w, h) = reader.into_dimensions().map_err(|e| ImagingError::Decode {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
                (format, w, h)
            }
            None => probe_bilevel(path)?.ok_or_else(|| {
                ImagingError::UnsupportedFormat(format!(
                    "could not detect image type of {}",
                    path.display()
                ))
            })?,
        };

        if width == 0 || height == 0 {
            return Err(ImagingError::Decode {
                path: path.to_path_buf(),
                reason: format!("image has zero dimension ({width}x{height})"),
            });
        }

        let progressive = format == RasterFormat::Jpeg
            && is_progressive_jpeg(&mut BufReader::new(File::open(path)?));

        debug!(path = %path.display(), width, height, %format, progressive, "Probed image");
        Ok(ImageRef {
            path: path.to_path_buf(),
            width,
            height,
            format,
            progressive,
        })
    }

    fn decode(&self, image: &ImageRef) -> Result<DynamicImage, ImagingError> {
        let decoded = (codec_for(image.format).decode)(&image.path).map_err(|e| {
            ImagingError::Decode {
                path: image.path.clone(),
                reason: e.to_string(),
            }
        })?;
        debug!(path = %image.path.display(), format = %image.format, "Decoded image");
        Ok(decoded)
    }

    fn allocate(&self, width: u32, height: u32) -> Result<DynamicImage, ImagingError> {
        if width == 0 || height == 0 {
            return Err(ImagingError::Transform(format!(
                "cannot allocate a {width}x{height} canvas"
            )));
        }
        Ok(DynamicImage::new_rgba8(width, height))
    }

    fn resampled_copy(
        &self,
        dst: &mut DynamicImage,
        src: &DynamicImage,
        region: &CopyRegion,
    ) -> Result<(), ImagingError> {
        let src_fits = u64::from(region.src_x) + u64::from(region.src_width)
            <= u64::from(src.width())
            && u64::from(region.src_y) + u64::from(region.src_height) <= u64::from(src.height());
        let dst_fits = u64::from(region.dst_x) + u64::from(region.dst_width)
            <= u64::from(dst.width())
            && u64::from(region.dst_y) + u64::from(region.dst_height) <= u64::from(dst.height());
        if !src_fits || !dst_fits {
            return Err(ImagingError::Transform(format!(
                "copy region {region:?} exceeds canvas bounds (src {}x{}, dst {}x{})",
                src.width(),
                src.height(),
                dst.width(),
                dst.height()
            )));
        }

        let piece = src.crop_imm(
            region.src_x,
            region.src_y,
            region.src_width,
            region.src_height,
        );
        let piece = if region.is_scaling() {
            piece.resize_exact(region.dst_width, region.dst_height, FilterType::Triangle)
        } else {
            piece
        };

        dst.copy_from(&piece, region.dst_x, region.dst_y)
            .map_err(|e| ImagingError::Transform(e.to_string()))
    }

    fn encode(
        &self,
        canvas: &DynamicImage,
        path: &Path,
        params: &EncodeParams,
    ) -> Result<(), ImagingError> {
        let encode_err = |reason: String| ImagingError::Encode {
            path: path.to_path_buf(),
            reason,
        };

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            (codec_for(params.format).encode)(canvas, params, path, &mut writer)
                .map_err(|e| encode_err(e.to_string()))?;
            writer.flush()?;
        }
        tmp.persist(path).map_err(|e| encode_err(e.error.to_string()))?;

        debug!(
            path = %path.display(),
            format = %params.format,
            mime = params.format.mime_type(),
            quality = params.quality.value(),
            "Encoded image"
        );
        Ok(())
    }
}
