//! Image-to-texture-payload pipeline
//!
//! Turns a source image and a target sidecar into a `_texture.dat` payload
//! plus an updated sidecar, driving an external [`BlockCompressor`] for the
//! actual BC1/BC3/BC7 encoding. Structured as a two-step builder
//! (`TexturePipeline::prepare` then `TextureJob::run`) so a caller can
//! inspect the chosen format and normalized dimensions before the
//! compressor actually runs — in particular, before confirming a
//! non-power-of-two resample.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

use decal_formats::raster::{self, BlockFormat};
use decal_formats::sidecar::{self, SidecarFormat};

use crate::alpha_mask::is_alpha_mask;
use crate::compressor::{BlockCompressor, CompressedFormat};
use crate::error::{TextureError, TextureResult};
use crate::scratch::ScratchFile;

/// Power-of-two sizes the core accepts as final texture dimensions
const VALID_SIZES: [u32; 6] = [128, 256, 512, 1024, 2048, 4096];

fn is_valid_size(n: u32) -> bool {
    VALID_SIZES.contains(&n)
}

fn nearest_power_of_two(n: u32) -> u32 {
    VALID_SIZES
        .iter()
        .copied()
        .min_by_key(|&size| size.abs_diff(n))
        .unwrap_or(VALID_SIZES[0])
}

fn round_up_to_multiple_of_four(n: u32) -> u32 {
    n.div_ceil(4) * 4
}

/// What, if anything, a source image's dimensions require before conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionPlan {
    /// Already a valid power-of-two size on both axes; used as-is
    NoChange,
    /// Power-of-two-adjacent but not a multiple of 4; padded with zeros
    PaddedToMultipleOfFour {
        /// Width after padding
        width: u32,
        /// Height after padding
        height: u32,
    },
    /// Not power-of-two; a resample is needed and must be confirmed by the
    /// caller before [`TextureJob::run`] will proceed
    NeedsPowerOfTwoConfirmation {
        /// Width the pipeline would resample to if confirmed
        suggested_width: u32,
        /// Height the pipeline would resample to if confirmed
        suggested_height: u32,
    },
}

fn plan_dimensions(width: u32, height: u32) -> DimensionPlan {
    if is_valid_size(width) && is_valid_size(height) {
        return DimensionPlan::NoChange;
    }
    if width % 4 != 0 || height % 4 != 0 {
        let padded_width = round_up_to_multiple_of_four(width);
        let padded_height = round_up_to_multiple_of_four(height);
        if is_valid_size(padded_width) && is_valid_size(padded_height) {
            return DimensionPlan::PaddedToMultipleOfFour {
                width: padded_width,
                height: padded_height,
            };
        }
    }
    DimensionPlan::NeedsPowerOfTwoConfirmation {
        suggested_width: nearest_power_of_two(width),
        suggested_height: nearest_power_of_two(height),
    }
}

fn pad_to_size(image: &RgbaImage, width: u32, height: u32, has_alpha: bool) -> RgbaImage {
    let background = if has_alpha {
        Rgba([0, 0, 0, 0])
    } else {
        Rgba([0, 0, 0, 255])
    };
    let mut padded = RgbaImage::from_pixel(width, height, background);
    image::imageops::replace(&mut padded, image, 0, 0);
    padded
}

fn adopted_format_from_fourcc(fourcc: [u8; 4]) -> Option<CompressedFormat> {
    match BlockFormat::from_fourcc(fourcc).ok()? {
        BlockFormat::Bc1 => Some(CompressedFormat::Bc1),
        BlockFormat::Bc3 => Some(CompressedFormat::Bc3),
        BlockFormat::Bc7 => Some(CompressedFormat::Bc7),
        // BC2 is a recognized source format but never a selection target.
        BlockFormat::Bc2 => None,
    }
}

fn sidecar_format_to_compressed(format: SidecarFormat) -> CompressedFormat {
    match format {
        SidecarFormat::Dxt1 => CompressedFormat::Bc1,
        SidecarFormat::Dxt5 => CompressedFormat::Bc3,
        SidecarFormat::Bc7 => CompressedFormat::Bc7,
    }
}

fn sibling_raster_path(source_path: &Path) -> Option<PathBuf> {
    let stem = source_path.file_stem()?;
    let candidate = source_path.with_file_name(stem).with_extension("dds");
    candidate.exists().then_some(candidate)
}

/// An already-decided, already-compressed source: its FOURCC is simply
/// adopted and its payload copied through without re-encoding.
struct AdoptedPayload {
    format: CompressedFormat,
    bytes: Vec<u8>,
}

enum SourceKind {
    /// Copy bytes straight through; never invokes the compressor.
    AlreadyCompressed(AdoptedPayload),
    /// Needs decoding, normalization, and compression.
    Raw(DynamicImage, CompressedFormat),
}

/// Entry point for a texture conversion, holding the compressor to drive.
pub struct TexturePipeline<'a> {
    compressor: &'a dyn BlockCompressor,
}

impl<'a> TexturePipeline<'a> {
    /// Create a pipeline that will drive `compressor` for any job it prepares.
    pub fn new(compressor: &'a dyn BlockCompressor) -> Self {
        Self { compressor }
    }

    /// Decode the source image, select its target format (§4.C priority
    /// order), and compute its dimension plan, without invoking the
    /// compressor.
    pub fn prepare(
        &self,
        source_image_path: impl Into<PathBuf>,
        sidecar_path: impl Into<PathBuf>,
    ) -> TextureResult<TextureJob<'a>> {
        let source_image_path = source_image_path.into();
        let sidecar_path = sidecar_path.into();
        let source_bytes = std::fs::read(&source_image_path)?;

        // Priority 1: source is already a block-compressed raster.
        if let Ok((fourcc, payload)) = raster::read_payload(&source_bytes) {
            if let Some(format) = adopted_format_from_fourcc(fourcc) {
                return Ok(TextureJob {
                    compressor: self.compressor,
                    source_image_path,
                    sidecar_path,
                    kind: SourceKind::AlreadyCompressed(AdoptedPayload {
                        format,
                        bytes: payload.to_vec(),
                    }),
                    dimension_plan: DimensionPlan::NoChange,
                });
            }
        }

        let image = image::load_from_memory(&source_bytes)?;
        let (width, height) = image.dimensions();

        // Priority 2: a sibling block-compressed file with the same base name.
        let format = if let Some(sibling) = sibling_raster_path(&source_image_path) {
            let sibling_bytes = std::fs::read(&sibling)?;
            let (fourcc, _) = raster::read_payload(&sibling_bytes)?;
            adopted_format_from_fourcc(fourcc)
        } else {
            None
        };

        // Priority 3: the target sidecar's existing format byte.
        let format = match format {
            Some(format) => Some(format),
            None => match std::fs::read(&sidecar_path) {
                Ok(sidecar_bytes) => sidecar::read_sidecar(&sidecar_bytes)
                    .ok()
                    .map(|info| sidecar_format_to_compressed(info.format)),
                Err(_) => None,
            },
        };

        // Priority 4: auto-detect from the decoded pixels.
        let format = format.unwrap_or_else(|| {
            let rgba = image.to_rgba8();
            if is_alpha_mask(&rgba) || image.color().has_alpha() {
                CompressedFormat::Bc3
            } else {
                CompressedFormat::Bc1
            }
        });

        let dimension_plan = plan_dimensions(width, height);

        Ok(TextureJob {
            compressor: self.compressor,
            source_image_path,
            sidecar_path,
            kind: SourceKind::Raw(image, format),
            dimension_plan,
        })
    }
}

/// A prepared conversion: format and dimension plan are already decided;
/// only the compressor invocation (and any confirmed resample) remains.
pub struct TextureJob<'a> {
    compressor: &'a dyn BlockCompressor,
    source_image_path: PathBuf,
    sidecar_path: PathBuf,
    kind: SourceKind,
    dimension_plan: DimensionPlan,
}

/// Result of a completed conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureOutcome {
    /// Path of the written `_texture.dat` payload file
    pub payload_path: PathBuf,
    /// Selected compressed format
    pub format: CompressedFormat,
    /// Final width, after any normalization
    pub width: u32,
    /// Final height, after any normalization
    pub height: u32,
}

impl<'a> TextureJob<'a> {
    /// The format this job selected
    pub fn format(&self) -> CompressedFormat {
        match &self.kind {
            SourceKind::AlreadyCompressed(adopted) => adopted.format,
            SourceKind::Raw(_, format) => *format,
        }
    }

    /// The dimension plan this job computed
    pub fn dimension_plan(&self) -> DimensionPlan {
        self.dimension_plan
    }

    /// Run the conversion.
    ///
    /// `confirm_resample` must be `true` for a job whose plan is
    /// [`DimensionPlan::NeedsPowerOfTwoConfirmation`], otherwise this returns
    /// [`TextureError::NonPowerOfTwoDimensions`] without touching the
    /// filesystem beyond what [`TexturePipeline::prepare`] already read.
    pub fn run(self, confirm_resample: bool) -> TextureResult<TextureOutcome> {
        let texture_dat_path = texture_dat_path(&self.sidecar_path);
        tracing::debug!(
            "Converting {} -> {}",
            self.source_image_path.display(),
            texture_dat_path.display()
        );

        match self.kind {
            SourceKind::AlreadyCompressed(adopted) => {
                tracing::debug!("Source already block-compressed, adopting its FOURCC as-is");
                if let Some(parent) = texture_dat_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&texture_dat_path, &adopted.bytes)?;
                rewrite_sidecar_format(&self.sidecar_path, adopted.format)?;

                tracing::info!("Wrote {} ({} bytes)", texture_dat_path.display(), adopted.bytes.len());
                Ok(TextureOutcome {
                    payload_path: texture_dat_path,
                    format: adopted.format,
                    width: 0,
                    height: 0,
                })
            }
            SourceKind::Raw(image, format) => {
                let (width, height) = image.dimensions();
                let (final_width, final_height, normalized) = match self.dimension_plan {
                    DimensionPlan::NoChange => (width, height, image.to_rgba8()),
                    DimensionPlan::PaddedToMultipleOfFour {
                        width: padded_width,
                        height: padded_height,
                    } => {
                        let has_alpha = image.color().has_alpha();
                        let rgba = image.to_rgba8();
                        (
                            padded_width,
                            padded_height,
                            pad_to_size(&rgba, padded_width, padded_height, has_alpha),
                        )
                    }
                    DimensionPlan::NeedsPowerOfTwoConfirmation {
                        suggested_width,
                        suggested_height,
                    } => {
                        if !confirm_resample {
                            tracing::warn!(
                                "{}x{} is not power-of-two; resample to {}x{} not confirmed",
                                width,
                                height,
                                suggested_width,
                                suggested_height
                            );
                            return Err(TextureError::NonPowerOfTwoDimensions {
                                width,
                                height,
                                suggested_width,
                                suggested_height,
                            });
                        }
                        tracing::debug!(
                            "Resampling {}x{} -> {}x{} (LANCZOS)",
                            width,
                            height,
                            suggested_width,
                            suggested_height
                        );
                        let resampled = image.resize_exact(
                            suggested_width,
                            suggested_height,
                            image::imageops::FilterType::Lanczos3,
                        );
                        (suggested_width, suggested_height, resampled.to_rgba8())
                    }
                };

                let scratch_dir = self
                    .source_image_path
                    .parent()
                    .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
                let stem = self
                    .source_image_path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "texture".to_string());

                let png_path = scratch_dir.join(format!("{stem}_normalized.png"));
                let png_scratch = ScratchFile::new(&png_path);

                if format.needs_alpha_channel() {
                    normalized.save(png_scratch.path())?;
                } else {
                    DynamicImage::ImageRgba8(normalized)
                        .to_rgb8()
                        .save(png_scratch.path())?;
                }

                let produced_path =
                    self.compressor
                        .compress_block(png_scratch.path(), &scratch_dir, format)?;
                let produced_scratch = ScratchFile::new(&produced_path);

                let produced_bytes = std::fs::read(produced_scratch.path())?;
                let (_, payload) = raster::read_payload(&produced_bytes)?;

                let expected = raster::expected_payload_size(
                    final_width,
                    final_height,
                    format.to_block_format(),
                );
                if raster::is_suspiciously_small(payload.len(), expected) {
                    tracing::warn!(
                        "Compressor output too small: expected >= {} bytes, got {}",
                        (expected * 9) / 10,
                        payload.len()
                    );
                    return Err(TextureError::CompressorOutputTooSmall {
                        expected,
                        actual: payload.len(),
                    });
                }

                if let Some(parent) = texture_dat_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&texture_dat_path, payload)?;

                rewrite_sidecar_format(&self.sidecar_path, format)?;
                if !matches!(self.dimension_plan, DimensionPlan::NoChange) {
                    rewrite_sidecar_dimensions(&self.sidecar_path, final_width, final_height)?;
                }

                tracing::info!(
                    "Wrote {} ({}x{}, {} bytes)",
                    texture_dat_path.display(),
                    final_width,
                    final_height,
                    payload.len()
                );
                Ok(TextureOutcome {
                    payload_path: texture_dat_path,
                    format,
                    width: final_width,
                    height: final_height,
                })
            }
        }
    }
}

/// `<sidecar_dir>/<base>_texture.dat`, the sidecar's name with `.dat`
/// replaced by `_texture.dat`.
fn texture_dat_path(sidecar_path: &Path) -> PathBuf {
    let stem = sidecar_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    sidecar_path.with_file_name(format!("{stem}_texture.dat"))
}

fn rewrite_sidecar_format(sidecar_path: &Path, format: CompressedFormat) -> TextureResult<()> {
    let mut bytes = std::fs::read(sidecar_path)?;
    sidecar::write_sidecar_format(&mut bytes, format.to_sidecar_format())?;
    std::fs::write(sidecar_path, bytes)?;
    Ok(())
}

fn rewrite_sidecar_dimensions(sidecar_path: &Path, width: u32, height: u32) -> TextureResult<()> {
    let mut bytes = std::fs::read(sidecar_path)?;
    #[allow(clippy::cast_possible_truncation)]
    sidecar::write_sidecar_dimensions(&mut bytes, width as u16, height as u16)?;
    std::fs::write(sidecar_path, bytes)?;
    Ok(())
}
