//! Pure calculation functions for crop and resize geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! Both planners return `None` when the source already satisfies the request,
//! which is how the operations layer detects its no-op outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which end of the longer axis survives a square crop.
///
/// For portrait sources `Left` keeps the top edge and `Right` keeps the bottom.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropAnchor {
    Left,
    #[default]
    Center,
    Right,
}

impl CropAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            CropAnchor::Left => "left",
            CropAnchor::Center => "center",
            CropAnchor::Right => "right",
        }
    }
}

impl fmt::Display for CropAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CropAnchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(CropAnchor::Left),
            "center" | "centre" => Ok(CropAnchor::Center),
            "right" => Ok(CropAnchor::Right),
            other => Err(format!(
                "unknown crop anchor '{other}' (expected left, center or right)"
            )),
        }
    }
}

/// The square sub-rectangle of the source to extract.
///
/// Invariants: `side == min(w, h)`, `offset_x <= w - side`, `offset_y <= h - side`,
/// and at most one of the offsets is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropPlan {
    pub offset_x: u32,
    pub offset_y: u32,
    pub side: u32,
}

/// Target canvas dimensions for an aspect-preserving shrink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    pub width: u32,
    pub height: u32,
}

/// Plan a square crop of a `width × height` source.
///
/// Returns `None` for a square source. Otherwise the offset moves along the
/// longer axis only:
///
/// | Anchor | Offset along the longer axis |
/// |---|---|
/// | `Left` | `0` |
/// | `Center` | `ceil(diff / 2)` |
/// | `Right` | `diff` |
///
/// where `diff = longer - shorter`. Odd differences put the extra pixel of
/// offset at the start, so a 101×60 center crop starts at x = 21.
///
/// # Examples
/// ```
/// # use pixtrim::imaging::{CropAnchor, CropPlan, plan_square_crop};
/// let plan = plan_square_crop(100, 60, CropAnchor::Center).unwrap();
/// assert_eq!(plan, CropPlan { offset_x: 20, offset_y: 0, side: 60 });
/// assert!(plan_square_crop(80, 80, CropAnchor::Left).is_none());
/// ```
pub fn plan_square_crop(width: u32, height: u32, anchor: CropAnchor) -> Option<CropPlan> {
    if width == height {
        return None;
    }

    let side = width.min(height);
    let diff = width.max(height) - side;
    let offset = match anchor {
        CropAnchor::Left => 0,
        CropAnchor::Center => diff.div_ceil(2),
        CropAnchor::Right => diff,
    };

    Some(if width > height {
        CropPlan {
            offset_x: offset,
            offset_y: 0,
            side,
        }
    } else {
        CropPlan {
            offset_x: 0,
            offset_y: offset,
            side,
        }
    })
}

/// Plan a shrink of a `width × height` source into a `max_width × max_height` box.
///
/// Returns `None` when the source already fits. Otherwise clamps in two passes:
///
/// 1. `ratio = width / max_width`. If the width overflows, the width becomes
///    `max_width` and the height `trunc(height / ratio)`.
/// 2. If the height still overflows, `ratio2 = new_height / max_height`, the
///    width becomes `trunc(new_width / ratio2)` and the height `max_height`.
///
/// Divisions are done in `f64` and truncated toward zero at each step, which
/// is what decides the pixel-exact output size. A dimension that truncates to
/// zero on an extreme aspect ratio is raised to one pixel.
///
/// Callers guarantee both bounds are non-zero.
///
/// # Examples
/// ```
/// # use pixtrim::imaging::{ResizePlan, plan_resize};
/// assert_eq!(plan_resize(2000, 1000, 1000, 1000), Some(ResizePlan { width: 1000, height: 500 }));
/// assert_eq!(plan_resize(1000, 3000, 1000, 1000), Some(ResizePlan { width: 333, height: 1000 }));
/// assert_eq!(plan_resize(640, 480, 1000, 1000), None);
/// ```
pub fn plan_resize(width: u32, height: u32, max_width: u32, max_height: u32) -> Option<ResizePlan> {
    if width <= max_width && height <= max_height {
        return None;
    }

    let ratio = width as f64 / max_width as f64;
    let (mut new_w, mut new_h) = if width > max_width {
        (max_width, (height as f64 / ratio) as u32)
    } else {
        (width, height)
    };

    if new_h > max_height {
        let ratio = new_h as f64 / max_height as f64;
        new_w = (new_w as f64 / ratio) as u32;
        new_h = max_height;
    }

    Some(ResizePlan {
        width: new_w.max(1),
        height: new_h.max(1),
    })
}
