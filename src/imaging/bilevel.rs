//! Minimal codecs for the two 1-bit formats the `image` crate doesn't cover.
//!
//! ## WBMP (type 0)
//!
//! ```text
//! 0x00                 type field
//! 0x00                 fixed header
//! <multi-byte int>     width   (7 bits per byte, high bit = more bytes follow)
//! <multi-byte int>     height
//! rows                 ceil(width / 8) bytes each, MSB first, 1 = white
//! ```
//!
//! ## XBM
//!
//! C source text:
//!
//! ```text
//! #define name_width 16
//! #define name_height 2
//! static unsigned char name_bits[] = {
//!    0xff, 0x00, 0x01, 0x80 };
//! ```
//!
//! Rows are padded to whole bytes, LSB first, 1 = black.
//!
//! Both decoders produce an 8-bit grayscale buffer holding only 0 and 255.
//! Both encoders threshold luma at [`THRESHOLD`].

use image::{GrayImage, Luma};
use std::io::{self, Write};
use thiserror::Error;

/// Luma values below this are black.
pub const THRESHOLD: u8 = 128;

const BLACK: Luma<u8> = Luma([0]);
const WHITE: Luma<u8> = Luma([255]);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BilevelError {
    #[error("unexpected end of data")]
    Truncated,
    #[error("unsupported WBMP type {0} (only type 0 is supported)")]
    UnsupportedWbmpType(u8),
    #[error("dimension does not fit in 32 bits")]
    DimensionOverflow,
    #[error("zero width or height")]
    EmptyImage,
    #[error("missing #define for {0}")]
    MissingDefine(&'static str),
    #[error("invalid value '{0}'")]
    InvalidValue(String),
}

fn row_bytes(width: u32) -> usize {
    width.div_ceil(8) as usize
}

// =============================================================================
// WBMP
// =============================================================================

fn read_multibyte(bytes: &[u8], pos: &mut usize) -> Result<u32, BilevelError> {
    let mut value: u32 = 0;
    loop {
        let byte = *bytes.get(*pos).ok_or(BilevelError::Truncated)?;
        *pos += 1;
        value = value
            .checked_mul(128)
            .ok_or(BilevelError::DimensionOverflow)?
            | u32::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
}

fn write_multibyte(out: &mut impl Write, value: u32) -> io::Result<()> {
    let mut groups = vec![(value & 0x7f) as u8];
    let mut rest = value >> 7;
    while rest > 0 {
        groups.push((rest & 0x7f) as u8 | 0x80);
        rest >>= 7;
    }
    groups.reverse();
    out.write_all(&groups)
}

/// Parse the WBMP header: `(width, height, offset of the first pixel row)`.
pub fn wbmp_header(bytes: &[u8]) -> Result<(u32, u32, usize), BilevelError> {
    let type_field = *bytes.first().ok_or(BilevelError::Truncated)?;
    if type_field != 0 {
        return Err(BilevelError::UnsupportedWbmpType(type_field));
    }
    // Fixed header byte; extension headers (bit 7 set) are not used by type 0.
    let mut pos = 2;
    if bytes.len() < pos {
        return Err(BilevelError::Truncated);
    }
    let width = read_multibyte(bytes, &mut pos)?;
    let height = read_multibyte(bytes, &mut pos)?;
    if width == 0 || height == 0 {
        return Err(BilevelError::EmptyImage);
    }
    Ok((width, height, pos))
}

/// WBMP has no magic number, so only a header whose pixel payload exactly
/// fills the rest of the file counts as a match.
pub fn looks_like_wbmp(bytes: &[u8]) -> bool {
    if bytes.len() < 4 || bytes[0] != 0 || bytes[1] != 0 {
        return false;
    }
    match wbmp_header(bytes) {
        Ok((w, h, offset)) => (row_bytes(w) as u64) * u64::from(h) == (bytes.len() - offset) as u64,
        Err(_) => false,
    }
}

pub fn decode_wbmp(bytes: &[u8]) -> Result<GrayImage, BilevelError> {
    let (width, height, offset) = wbmp_header(bytes)?;
    let stride = row_bytes(width);
    let needed = stride
        .checked_mul(height as usize)
        .ok_or(BilevelError::DimensionOverflow)?;
    let data = bytes
        .get(offset..offset + needed)
        .ok_or(BilevelError::Truncated)?;

    Ok(GrayImage::from_fn(width, height, |x, y| {
        let byte = data[y as usize * stride + (x / 8) as usize];
        if byte & (0x80 >> (x % 8)) != 0 {
            WHITE
        } else {
            BLACK
        }
    }))
}

pub fn encode_wbmp(img: &GrayImage, out: &mut impl Write) -> io::Result<()> {
    out.write_all(&[0, 0])?;
    write_multibyte(out, img.width())?;
    write_multibyte(out, img.height())?;

    let mut row = vec![0u8; row_bytes(img.width())];
    for y in 0..img.height() {
        row.fill(0);
        for x in 0..img.width() {
            if img.get_pixel(x, y).0[0] >= THRESHOLD {
                row[(x / 8) as usize] |= 0x80 >> (x % 8);
            }
        }
        out.write_all(&row)?;
    }
    Ok(())
}

// =============================================================================
// XBM
// =============================================================================

fn xbm_define(text: &str, suffix: &'static str) -> Result<u32, BilevelError> {
    text.lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some("#define"), Some(name), Some(value)) if name.ends_with(suffix) => Some(value),
                _ => None,
            }
        })
        .next()
        .ok_or(BilevelError::MissingDefine(suffix))
        .and_then(|v| {
            v.parse::<u32>()
                .map_err(|_| BilevelError::InvalidValue(v.to_string()))
        })
}

/// Read `(width, height)` from the `#define` lines.
pub fn xbm_dimensions(text: &str) -> Result<(u32, u32), BilevelError> {
    let width = xbm_define(text, "_width")?;
    let height = xbm_define(text, "_height")?;
    if width == 0 || height == 0 {
        return Err(BilevelError::EmptyImage);
    }
    Ok((width, height))
}

pub fn looks_like_xbm(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let head = String::from_utf8_lossy(head);
    head.trim_start().starts_with("#define") && head.contains("_width")
}

fn parse_byte(token: &str) -> Result<u8, BilevelError> {
    let parsed = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => token.parse::<u8>(),
    };
    parsed.map_err(|_| BilevelError::InvalidValue(token.to_string()))
}

pub fn decode_xbm(text: &str) -> Result<GrayImage, BilevelError> {
    let (width, height) = xbm_dimensions(text)?;
    let start = text.find('{').ok_or(BilevelError::Truncated)? + 1;
    let end = text[start..]
        .find('}')
        .map(|i| start + i)
        .ok_or(BilevelError::Truncated)?;

    let data = text[start..end]
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(parse_byte)
        .collect::<Result<Vec<u8>, _>>()?;

    let stride = row_bytes(width);
    if data.len() < stride * height as usize {
        return Err(BilevelError::Truncated);
    }

    Ok(GrayImage::from_fn(width, height, |x, y| {
        let byte = data[y as usize * stride + (x / 8) as usize];
        if byte & (1 << (x % 8)) != 0 {
            BLACK
        } else {
            WHITE
        }
    }))
}

/// Turn a file stem into a C identifier for the `#define` names.
pub fn xbm_identifier(stem: &str) -> String {
    let mut ident: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

pub fn encode_xbm(img: &GrayImage, name: &str, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "#define {name}_width {}", img.width())?;
    writeln!(out, "#define {name}_height {}", img.height())?;
    write!(out, "static unsigned char {name}_bits[] = {{")?;

    let stride = row_bytes(img.width());
    let mut index = 0usize;
    let total = stride * img.height() as usize;
    for y in 0..img.height() {
        for chunk in 0..stride {
            let mut byte = 0u8;
            for bit in 0..8 {
                let x = chunk as u32 * 8 + bit;
                if x < img.width() && img.get_pixel(x, y).0[0] < THRESHOLD {
                    byte |= 1 << bit;
                }
            }
            if index % 12 == 0 {
                write!(out, "\n  ")?;
            }
            index += 1;
            write!(out, "0x{byte:02x}")?;
            if index < total {
                write!(out, ", ")?;
            }
        }
    }
    writeln!(out, "}};")
}
