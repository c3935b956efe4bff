//! Error types for bundle, sidecar, and raster codec operations

use thiserror::Error;

/// Result type for format codec operations
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors raised while decoding or encoding archive, sidecar, or raster data
#[derive(Debug, Error)]
pub enum FormatError {
    /// Archive magic bytes did not match `"bnd2"`
    #[error("bad archive magic: expected \"bnd2\", got {0:?}")]
    BadMagic([u8; 4]),

    /// Archive platform field was not 1 (PC)
    #[error("unsupported platform: {0} (only platform 1 / PC is supported)")]
    UnsupportedPlatform(u32),

    /// A read ran past the end of the input buffer
    #[error("truncated input: needed {needed} bytes at offset {offset}, had {available}")]
    TruncatedInput {
        /// Offset the read started at
        offset: usize,
        /// Bytes requested
        needed: usize,
        /// Bytes actually available
        available: usize,
    },

    /// Sidecar's leading bytes matched neither known dialect prefix
    #[error("unknown sidecar dialect: first bytes matched neither the original nor remastered prefix")]
    UnknownSidecarDialect,

    /// Raster FOURCC was not a recognized block-compressed format
    #[error("unrecognized raster FOURCC: {0:?}")]
    UnknownFourCc([u8; 4]),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A `binrw` codec failure not covered by a more specific variant above
    #[error("binary parsing error: {0}")]
    BinaryParse(String),
}

impl From<binrw::Error> for FormatError {
    fn from(err: binrw::Error) -> Self {
        match err {
            binrw::Error::Io(io_err) => Self::Io(io_err),
            other => Self::BinaryParse(other.to_string()),
        }
    }
}
