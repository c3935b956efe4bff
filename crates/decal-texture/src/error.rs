//! Error types for the texture payload pipeline

use std::path::PathBuf;

use thiserror::Error;

/// Result type for texture pipeline operations
pub type TextureResult<T> = Result<T, TextureError>;

/// Errors raised while converting a source image into a texture payload
#[derive(Debug, Error)]
pub enum TextureError {
    /// The configured block-compressor binary does not exist on disk
    #[error("block compressor not found at {0}")]
    ToolNotFound(PathBuf),

    /// The block compressor exited with a non-zero status
    #[error("block compressor failed: {stderr}")]
    ToolFailed {
        /// Captured standard error output
        stderr: String,
    },

    /// The compressor's output file was smaller than 90% of the expected
    /// block-compressed size for the target dimensions and format
    #[error("compressor output too small: expected at least {expected} bytes, got {actual}")]
    CompressorOutputTooSmall {
        /// Expected payload size per `decal_formats::raster::expected_payload_size`
        expected: usize,
        /// Actual size of the payload the compressor produced
        actual: usize,
    },

    /// The source image could not be decoded
    #[error("could not decode source image: {0}")]
    ImageDecodeFailed(#[from] image::ImageError),

    /// Bundle format codec error (sidecar/raster parsing)
    #[error(transparent)]
    Format(#[from] decal_formats::FormatError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source dimensions are not a power of two and the caller has not
    /// confirmed a resample to the suggested size. Non-fatal in spirit — the
    /// collaborator layer decides whether to retry with confirmation.
    #[error(
        "{width}x{height} is not a power of two; confirm resampling to {suggested_width}x{suggested_height}"
    )]
    NonPowerOfTwoDimensions {
        /// Source width in pixels
        width: u32,
        /// Source height in pixels
        height: u32,
        /// Nearest power-of-two width the pipeline would resample to
        suggested_width: u32,
        /// Nearest power-of-two height the pipeline would resample to
        suggested_height: u32,
    },
}
