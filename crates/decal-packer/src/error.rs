//! Error types for bundle packing

use std::path::PathBuf;

use thiserror::Error;

/// Result type for packer operations
pub type PackResult<T> = Result<T, PackError>;

/// Errors raised while parsing a source archive's identity skeleton or
/// repacking it from a directory of payload files
#[derive(Debug, Error)]
pub enum PackError {
    /// A resource's expected `.dat` (or `_texture.dat`) payload file is
    /// absent from the bundle directory
    #[error("missing resource payload: {0}")]
    MissingResourcePayload(PathBuf),

    /// Bundle archive format codec error (header/entry parsing)
    #[error(transparent)]
    Format(#[from] decal_formats::FormatError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
