//! High-level image operations.
//!
//! These functions combine calculations with codec execution. Each call runs
//! validate → probe → plan → decode → copy → encode → chmod on the calling
//! thread and returns an [`OperationResult`]. Canvases live on the stack of the
//! call and are dropped on every exit path.
//!
//! Format policy: the decoder is picked by sniffing the source content; the
//! encoder by the destination's extension, falling back to the source format
//! when the destination has none.

use super::backend::{ImageRef, ImagingError, RasterCodec};
use super::calculations::{plan_resize, plan_square_crop};
use super::format::RasterFormat;
use super::params::{CopyRegion, CropOptions, EncodeParams, Quality, ResizeOptions};
use super::rust_backend::RustCodec;
use super::validate::Endpoints;
use crate::naming::square_crop_file_name;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ImagingError>;

/// Which operation produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Crop,
    Resize,
}

/// How an operation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A new image was encoded to the destination.
    Success,
    /// The source was already square; nothing was resampled.
    AlreadySquare,
    /// The source already fit the bounds; nothing was resampled.
    WithinBounds,
}

impl Outcome {
    pub fn is_no_op(self) -> bool {
        !matches!(self, Outcome::Success)
    }
}

/// What a single crop or resize call did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationResult {
    pub operation: Operation,
    pub outcome: Outcome,
    pub source: PathBuf,
    pub destination: PathBuf,
    /// The destination is the source file itself.
    pub in_place: bool,
    pub source_width: u32,
    pub source_height: u32,
    pub output_width: u32,
    pub output_height: u32,
}

impl OperationResult {
    fn new(
        operation: Operation,
        outcome: Outcome,
        image: &ImageRef,
        endpoints: Endpoints,
        in_place: bool,
        output: (u32, u32),
    ) -> Self {
        Self {
            operation,
            outcome,
            source: endpoints.source,
            destination: endpoints.target,
            in_place,
            source_width: image.width,
            source_height: image.height,
            output_width: output.0,
            output_height: output.1,
        }
    }
}

/// Crop an image to a square of side `min(width, height)`.
///
/// Without `dest` the source is overwritten. A `dest` that is an existing
/// directory receives `<slug>_square_<anchor>.<ext>` (see
/// [`square_crop_file_name`]).
///
/// A square source is not re-encoded: its bytes are copied to a distinct
/// destination, or left alone when the destination is the source. Either way
/// the destination must name a supported format.
pub fn crop_to_square(
    codec: &impl RasterCodec,
    source: &Path,
    dest: Option<&Path>,
    options: &CropOptions,
) -> Result<OperationResult> {
    let mut endpoints = Endpoints::resolve(source, dest)?;
    let image = codec.probe(&endpoints.source)?;

    if endpoints.target.is_dir() {
        endpoints.target = endpoints
            .target
            .join(square_crop_file_name(source, options.anchor, image.format));
    }
    let params = encode_params(&image, &endpoints.target, options.quality)?;
    let in_place = endpoints.in_place();

    let Some(plan) = plan_square_crop(image.width, image.height, options.anchor) else {
        debug!(source = %source.display(), side = image.width, "already square");
        copy_unless_in_place(&endpoints, in_place)?;
        return Ok(OperationResult::new(
            Operation::Crop,
            Outcome::AlreadySquare,
            &image,
            endpoints,
            in_place,
            (image.width, image.height),
        ));
    };
    debug!(
        source = %source.display(),
        anchor = %options.anchor,
        offset_x = plan.offset_x,
        offset_y = plan.offset_y,
        side = plan.side,
        "planned square crop"
    );

    render(
        codec,
        &image,
        CopyRegion::for_crop(&plan),
        &endpoints.target,
        &params,
    )?;
    apply_file_mode(&endpoints.target, options.file_mode);

    info!(
        source = %source.display(),
        destination = %endpoints.target.display(),
        side = plan.side,
        "cropped to square"
    );
    Ok(OperationResult::new(
        Operation::Crop,
        Outcome::Success,
        &image,
        endpoints,
        in_place,
        (plan.side, plan.side),
    ))
}

/// Shrink an image to fit within `max_width × max_height`, keeping its aspect ratio.
///
/// Without `dest` the source is overwritten. A `dest` that is an existing
/// directory receives a file with the source's name. Sources that already fit
/// are never enlarged or re-encoded.
pub fn resize_to_fit(
    codec: &impl RasterCodec,
    source: &Path,
    dest: Option<&Path>,
    options: &ResizeOptions,
) -> Result<OperationResult> {
    if options.max_width == 0 || options.max_height == 0 {
        return Err(ImagingError::Validation(format!(
            "Resize bounds must be positive, got {}x{}",
            options.max_width, options.max_height
        )));
    }

    let mut endpoints = Endpoints::resolve(source, dest)?;
    if let (true, Some(name)) = (endpoints.target.is_dir(), source.file_name()) {
        endpoints.target = endpoints.target.join(name);
    }
    let image = codec.probe(&endpoints.source)?;
    let params = encode_params(&image, &endpoints.target, options.quality)?;
    let in_place = endpoints.in_place();

    let Some(plan) = plan_resize(
        image.width,
        image.height,
        options.max_width,
        options.max_height,
    ) else {
        debug!(
            source = %source.display(),
            width = image.width,
            height = image.height,
            "within bounds"
        );
        copy_unless_in_place(&endpoints, in_place)?;
        return Ok(OperationResult::new(
            Operation::Resize,
            Outcome::WithinBounds,
            &image,
            endpoints,
            in_place,
            (image.width, image.height),
        ));
    };
    debug!(
        source = %source.display(),
        from_width = image.width,
        from_height = image.height,
        to_width = plan.width,
        to_height = plan.height,
        "planned resize"
    );

    render(
        codec,
        &image,
        CopyRegion::for_resize(image.width, image.height, &plan),
        &endpoints.target,
        &params,
    )?;
    apply_file_mode(&endpoints.target, options.file_mode);

    info!(
        source = %source.display(),
        destination = %endpoints.target.display(),
        width = plan.width,
        height = plan.height,
        "resized"
    );
    Ok(OperationResult::new(
        Operation::Resize,
        Outcome::Success,
        &image,
        endpoints,
        in_place,
        (plan.width, plan.height),
    ))
}

/// [`crop_to_square`] with the built-in [`RustCodec`].
pub fn crop_to_square_file(
    source: &Path,
    dest: Option<&Path>,
    options: &CropOptions,
) -> Result<OperationResult> {
    crop_to_square(&RustCodec::new(), source, dest, options)
}

/// [`resize_to_fit`] with the built-in [`RustCodec`].
pub fn resize_file(
    source: &Path,
    dest: Option<&Path>,
    options: &ResizeOptions,
) -> Result<OperationResult> {
    resize_to_fit(&RustCodec::new(), source, dest, options)
}

/// Encoder settings for `target`. Rejects unsupported destination extensions.
///
/// Formats without a lossy encoder always carry the default quality.
fn encode_params(image: &ImageRef, target: &Path, quality: Quality) -> Result<EncodeParams> {
    let format = RasterFormat::from_path(target)?.unwrap_or(image.format);
    Ok(EncodeParams {
        format,
        quality: if format.supports_quality() {
            quality
        } else {
            Quality::default()
        },
        progressive: image.progressive && format == RasterFormat::Jpeg,
    })
}

fn render<C: RasterCodec>(
    codec: &C,
    image: &ImageRef,
    region: CopyRegion,
    target: &Path,
    params: &EncodeParams,
) -> Result<()> {
    let src = codec.decode(image)?;
    let mut dst = codec.allocate(region.dst_width, region.dst_height)?;
    codec.resampled_copy(&mut dst, &src, &region)?;
    codec.encode(&dst, target, params)
}

fn copy_unless_in_place(endpoints: &Endpoints, in_place: bool) -> Result<()> {
    if !in_place {
        fs::copy(&endpoints.source, &endpoints.target)?;
    }
    Ok(())
}

/// Apply `mode` to a freshly written file. Failures are logged, never returned.
fn apply_file_mode(path: &Path, mode: Option<u32>) {
    let Some(mode) = mode else { return };
    if let Err(err) = set_mode(path, mode) {
        warn!(error = %err, "leaving file permissions unchanged");
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|source| {
        ImagingError::Permission {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::CropAnchor;
    use crate::imaging::backend::tests::{MockCodec, RecordedOp};
    use tempfile::TempDir;

    /// A placeholder source file; the mock codec supplies its dimensions.
    fn source_file(tmp: &TempDir, name: &str) -> PathBuf {
        let path = tmp.path().join(name);
        fs::write(&path, b"not really pixels").unwrap();
        path
    }

    fn crop_with(anchor: CropAnchor) -> CropOptions {
        CropOptions {
            anchor,
            ..CropOptions::default()
        }
    }

    fn copied_region(ops: &[RecordedOp]) -> CopyRegion {
        ops.iter()
            .find_map(|op| match op {
                RecordedOp::Copy(region) => Some(*region),
                _ => None,
            })
            .expect("no copy recorded")
    }

    // =========================================================================
    // crop_to_square
    // =========================================================================

    #[test]
    fn crop_center_landscape() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "wide.jpg");
        let codec = MockCodec::with_image(100, 60, RasterFormat::Jpeg);

        let result = crop_to_square(&codec, &source, None, &crop_with(CropAnchor::Center)).unwrap();

        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!((result.output_width, result.output_height), (60, 60));
        let region = copied_region(&codec.get_operations());
        assert_eq!((region.src_x, region.src_y), (20, 0));
        assert_eq!((region.src_width, region.dst_width), (60, 60));
        assert!(!region.is_scaling());
    }

    #[test]
    fn crop_left_and_right_offsets() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "wide.jpg");

        let codec = MockCodec::with_image(100, 60, RasterFormat::Jpeg);
        crop_to_square(&codec, &source, None, &crop_with(CropAnchor::Left)).unwrap();
        assert_eq!(copied_region(&codec.get_operations()).src_x, 0);

        let codec = MockCodec::with_image(100, 60, RasterFormat::Jpeg);
        crop_to_square(&codec, &source, None, &crop_with(CropAnchor::Right)).unwrap();
        assert_eq!(copied_region(&codec.get_operations()).src_x, 40);
    }

    #[test]
    fn crop_portrait_moves_along_y() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "tall.png");
        let codec = MockCodec::with_image(60, 101, RasterFormat::Png);

        crop_to_square(&codec, &source, None, &CropOptions::default()).unwrap();

        let region = copied_region(&codec.get_operations());
        assert_eq!((region.src_x, region.src_y), (0, 21));
        assert_eq!(region.dst_height, 60);
    }

    #[test]
    fn crop_runs_decode_allocate_copy_encode_in_order() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "wide.jpg");
        let codec = MockCodec::with_image(100, 60, RasterFormat::Jpeg);

        crop_to_square(&codec, &source, None, &CropOptions::default()).unwrap();

        let ops = codec.get_operations();
        assert_eq!(ops.len(), 5);
        assert!(matches!(ops[0], RecordedOp::Probe(_)));
        assert!(matches!(ops[1], RecordedOp::Decode(_)));
        assert_eq!(
            ops[2],
            RecordedOp::Allocate {
                width: 60,
                height: 60
            }
        );
        assert!(matches!(ops[3], RecordedOp::Copy(_)));
        assert!(matches!(
            &ops[4],
            RecordedOp::Encode { width: 60, height: 60, format: RasterFormat::Jpeg, quality: 100, .. }
        ));
    }

    #[test]
    fn crop_square_source_is_no_op_in_place() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "square.jpg");
        let codec = MockCodec::with_image(80, 80, RasterFormat::Jpeg);

        let result = crop_to_square(&codec, &source, None, &CropOptions::default()).unwrap();

        assert_eq!(result.outcome, Outcome::AlreadySquare);
        assert_eq!((result.output_width, result.output_height), (80, 80));
        assert_eq!(codec.get_operations().len(), 1);
        assert_eq!(fs::read(&source).unwrap(), b"not really pixels");
    }

    #[test]
    fn crop_square_source_is_copied_to_distinct_destination() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "square.jpg");
        let dest = tmp.path().join("copy.jpg");
        let codec = MockCodec::with_image(80, 80, RasterFormat::Jpeg);

        let result = crop_to_square(&codec, &source, Some(&dest), &CropOptions::default()).unwrap();

        assert_eq!(result.outcome, Outcome::AlreadySquare);
        assert_eq!(result.destination, dest);
        assert_eq!(fs::read(&dest).unwrap(), b"not really pixels");
    }

    #[test]
    fn crop_encodes_by_destination_extension() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "wide.jpg");
        let dest = tmp.path().join("out.png");
        let codec = MockCodec::with_image(100, 60, RasterFormat::Jpeg);

        crop_to_square(&codec, &source, Some(&dest), &CropOptions::default()).unwrap();

        let ops = codec.get_operations();
        assert!(matches!(
            ops.last(),
            Some(RecordedOp::Encode { format: RasterFormat::Png, output, .. }) if output.ends_with("out.png")
        ));
    }

    #[test]
    fn crop_without_extension_keeps_source_format() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "wide.gif");
        let dest = tmp.path().join("out");
        let codec = MockCodec::with_image(100, 60, RasterFormat::Gif);

        crop_to_square(&codec, &source, Some(&dest), &CropOptions::default()).unwrap();

        assert!(matches!(
            codec.get_operations().last(),
            Some(RecordedOp::Encode { format: RasterFormat::Gif, .. })
        ));
    }

    #[test]
    fn crop_unknown_destination_extension_is_unsupported() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "wide.jpg");
        let dest = tmp.path().join("out.tiff");
        let codec = MockCodec::with_image(100, 60, RasterFormat::Jpeg);

        let err = crop_to_square(&codec, &source, Some(&dest), &CropOptions::default()).unwrap_err();

        assert!(matches!(err, ImagingError::UnsupportedFormat(msg) if msg.contains("tiff")));
        assert_eq!(codec.get_operations().len(), 1);
    }

    #[test]
    fn crop_square_source_with_unknown_extension_is_unsupported() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "square.png");
        let dest = tmp.path().join("out.webp");
        let codec = MockCodec::with_image(80, 80, RasterFormat::Png);

        let err = crop_to_square(&codec, &source, Some(&dest), &CropOptions::default()).unwrap_err();

        assert!(matches!(err, ImagingError::UnsupportedFormat(_)));
        assert!(!dest.exists());
    }

    #[test]
    fn crop_reports_in_place_for_equivalent_destination() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "square.jpg");
        let dotted = tmp.path().join(".").join("square.jpg");
        let codec = MockCodec::with_image(80, 80, RasterFormat::Jpeg);

        let result = crop_to_square(&codec, &source, Some(&dotted), &CropOptions::default()).unwrap();

        assert!(result.in_place);
        assert_eq!(result.operation, Operation::Crop);
        assert_eq!(fs::read(&source).unwrap(), b"not really pixels");
    }

    #[test]
    fn crop_progressive_jpeg_requests_progressive_encode() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "wide.jpg");
        let codec = MockCodec::progressive_jpeg(100, 60);

        crop_to_square(&codec, &source, None, &CropOptions::default()).unwrap();

        assert!(matches!(
            codec.get_operations().last(),
            Some(RecordedOp::Encode { format: RasterFormat::Jpeg, progressive: true, .. })
        ));
    }

    #[test]
    fn crop_progressive_jpeg_to_png_drops_progressive() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "wide.jpg");
        let dest = tmp.path().join("out.png");
        let codec = MockCodec::progressive_jpeg(100, 60);

        crop_to_square(&codec, &source, Some(&dest), &CropOptions::default()).unwrap();

        assert!(matches!(
            codec.get_operations().last(),
            Some(RecordedOp::Encode { format: RasterFormat::Png, progressive: false, .. })
        ));
    }

    #[test]
    fn crop_into_directory_derives_file_name() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "Holiday Photo.JPG");
        let out = tmp.path().join("out");
        fs::create_dir(&out).unwrap();
        let codec = MockCodec::with_image(100, 60, RasterFormat::Jpeg);

        let result = crop_to_square(&codec, &source, Some(&out), &crop_with(CropAnchor::Right)).unwrap();

        assert_eq!(result.destination, out.join("holiday_photo_square_right.jpg"));
    }

    #[test]
    fn crop_passes_quality_through() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "wide.jpg");
        let codec = MockCodec::with_image(100, 60, RasterFormat::Jpeg);
        let options = CropOptions {
            quality: Quality::new(70),
            ..CropOptions::default()
        };

        crop_to_square(&codec, &source, None, &options).unwrap();

        assert!(matches!(
            codec.get_operations().last(),
            Some(RecordedOp::Encode { quality: 70, .. })
        ));
    }

    #[test]
    fn crop_encode_failure_is_returned() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "wide.jpg");
        let codec = MockCodec::failing_encode(100, 60, RasterFormat::Jpeg);

        let err = crop_to_square(&codec, &source, None, &CropOptions::default()).unwrap_err();

        assert!(matches!(err, ImagingError::Encode { .. }));
        assert_eq!(fs::read(&source).unwrap(), b"not really pixels");
    }

    #[test]
    fn crop_missing_source_fails_validation_before_probe() {
        let tmp = TempDir::new().unwrap();
        let codec = MockCodec::with_image(100, 60, RasterFormat::Jpeg);

        let err = crop_to_square(
            &codec,
            &tmp.path().join("absent.jpg"),
            None,
            &CropOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, ImagingError::Validation(_)));
        assert!(codec.get_operations().is_empty());
    }

    // =========================================================================
    // resize_to_fit
    // =========================================================================

    #[test]
    fn resize_landscape_clamps_width() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "big.jpg");
        let codec = MockCodec::with_image(2000, 1000, RasterFormat::Jpeg);

        let result = resize_to_fit(&codec, &source, None, &ResizeOptions::default()).unwrap();

        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!((result.output_width, result.output_height), (1000, 500));
        let region = copied_region(&codec.get_operations());
        assert_eq!((region.src_width, region.src_height), (2000, 1000));
        assert_eq!((region.dst_width, region.dst_height), (1000, 500));
    }

    #[test]
    fn resize_portrait_needs_second_clamp() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "tall.jpg");
        let codec = MockCodec::with_image(1000, 3000, RasterFormat::Jpeg);

        let result = resize_to_fit(&codec, &source, None, &ResizeOptions::default()).unwrap();

        assert_eq!((result.output_width, result.output_height), (333, 1000));
    }

    #[test]
    fn resize_within_bounds_is_no_op() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "small.png");
        let codec = MockCodec::with_image(640, 480, RasterFormat::Png);

        let result = resize_to_fit(&codec, &source, None, &ResizeOptions::default()).unwrap();

        assert_eq!(result.outcome, Outcome::WithinBounds);
        assert_eq!((result.source_width, result.source_height), (640, 480));
        assert_eq!((result.output_width, result.output_height), (640, 480));
        assert_eq!(codec.get_operations().len(), 1);
    }

    #[test]
    fn resize_within_bounds_copies_to_destination() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "small.png");
        let dest = tmp.path().join("copy.png");
        let codec = MockCodec::with_image(640, 480, RasterFormat::Png);

        let result = resize_to_fit(&codec, &source, Some(&dest), &ResizeOptions::default()).unwrap();

        assert!(!result.in_place);
        assert_eq!(fs::read(&dest).unwrap(), b"not really pixels");
    }

    #[test]
    fn resize_into_directory_keeps_source_name() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "big.jpg");
        let out = tmp.path().join("out");
        fs::create_dir(&out).unwrap();
        let codec = MockCodec::with_image(2000, 1000, RasterFormat::Jpeg);

        let result = resize_to_fit(&codec, &source, Some(&out), &ResizeOptions::default()).unwrap();

        assert_eq!(result.destination, out.join("big.jpg"));
    }

    #[test]
    fn resize_square_result_is_labelled_resize() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "big.png");
        let codec = MockCodec::with_image(2000, 2000, RasterFormat::Png);

        let result = resize_to_fit(&codec, &source, None, &ResizeOptions::default()).unwrap();

        assert_eq!(result.operation, Operation::Resize);
        assert_eq!((result.output_width, result.output_height), (1000, 1000));
        assert!(result.in_place);
    }

    #[test]
    fn resize_within_bounds_with_unknown_extension_is_unsupported() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "small.png");
        let dest = tmp.path().join("small.tiff");
        let codec = MockCodec::with_image(640, 480, RasterFormat::Png);

        let err = resize_to_fit(&codec, &source, Some(&dest), &ResizeOptions::default()).unwrap_err();

        assert!(matches!(err, ImagingError::UnsupportedFormat(_)));
        assert!(!dest.exists());
    }

    #[test]
    fn resize_lossless_target_ignores_quality() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "big.png");
        let codec = MockCodec::with_image(3000, 1500, RasterFormat::Png);
        let options = ResizeOptions {
            quality: Quality::new(40),
            ..ResizeOptions::default()
        };

        resize_to_fit(&codec, &source, None, &options).unwrap();

        assert!(matches!(
            codec.get_operations().last(),
            Some(RecordedOp::Encode { format: RasterFormat::Png, quality: 100, .. })
        ));
    }

    #[test]
    fn resize_zero_bounds_rejected() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "big.jpg");
        let codec = MockCodec::with_image(2000, 1000, RasterFormat::Jpeg);
        let options = ResizeOptions {
            max_height: 0,
            ..ResizeOptions::default()
        };

        let err = resize_to_fit(&codec, &source, None, &options).unwrap_err();

        assert!(matches!(err, ImagingError::Validation(_)));
        assert!(codec.get_operations().is_empty());
    }

    #[test]
    fn resize_png_to_png_keeps_format() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp, "big.png");
        let codec = MockCodec::with_image(3000, 1500, RasterFormat::Png);

        resize_to_fit(&codec, &source, None, &ResizeOptions::default()).unwrap();

        assert!(matches!(
            codec.get_operations().last(),
            Some(RecordedOp::Encode { format: RasterFormat::Png, progressive: false, .. })
        ));
    }

    // =========================================================================
    // Result shaping
    // =========================================================================

    #[test]
    fn outcome_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Outcome::AlreadySquare).unwrap(),
            "\"already_square\""
        );
        assert_eq!(
            serde_json::to_string(&Outcome::WithinBounds).unwrap(),
            "\"within_bounds\""
        );
        assert_eq!(serde_json::to_string(&Operation::Resize).unwrap(), "\"resize\"");
        assert!(Outcome::WithinBounds.is_no_op());
        assert!(!Outcome::Success.is_no_op());
    }

    #[test]
    fn encode_params_only_progressive_for_jpeg() {
        let image = ImageRef {
            path: PathBuf::from("/in.jpg"),
            width: 10,
            height: 5,
            format: RasterFormat::Jpeg,
            progressive: true,
        };
        let jpeg = encode_params(&image, Path::new("/out.jpg"), Quality::default()).unwrap();
        assert!(jpeg.progressive);
        let png = encode_params(&image, Path::new("/out.png"), Quality::default()).unwrap();
        assert!(!png.progressive);
        assert_eq!(png.format, RasterFormat::Png);
    }

    #[cfg(unix)]
    #[test]
    fn file_mode_applied_to_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = source_file(&tmp, "out.jpg");
        apply_file_mode(&path, Some(0o640));
        assert_eq!(crate::test_helpers::file_mode(&path), 0o640);
    }

    #[test]
    fn file_mode_failure_is_swallowed() {
        let tmp = TempDir::new().unwrap();
        apply_file_mode(&tmp.path().join("never-written.jpg"), Some(0o644));
    }
}
