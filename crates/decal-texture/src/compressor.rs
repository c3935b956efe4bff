//! External block-compressor collaborator boundary
//!
//! The actual block-compression algorithm (BC1/BC3/BC7 encoding) is not
//! implemented here; it's delegated to an external tool invoked as a
//! subprocess. [`BlockCompressor`] is the seam: a production implementation
//! shells out to the real tool, and tests substitute [`FakeBlockCompressor`]
//! so the rest of the pipeline can be exercised without one installed.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{TextureError, TextureResult};

/// A compressed texture format the pipeline can select and ask the
/// compressor to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressedFormat {
    /// BC1 / DXT1, no alpha, 8 bytes per 4x4 block
    Bc1,
    /// BC3 / DXT5, interpolated alpha, 16 bytes per 4x4 block
    Bc3,
    /// BC7, 16 bytes per 4x4 block
    Bc7,
}

impl CompressedFormat {
    /// The `-f` argument value the external compressor expects
    pub fn tool_format_arg(self) -> &'static str {
        match self {
            Self::Bc1 => "BC1_UNORM",
            Self::Bc3 => "BC3_UNORM",
            Self::Bc7 => "BC7_UNORM",
        }
    }

    /// The equivalent [`decal_formats::raster::BlockFormat`], for expected-size
    /// arithmetic
    pub fn to_block_format(self) -> decal_formats::raster::BlockFormat {
        match self {
            Self::Bc1 => decal_formats::raster::BlockFormat::Bc1,
            Self::Bc3 => decal_formats::raster::BlockFormat::Bc3,
            Self::Bc7 => decal_formats::raster::BlockFormat::Bc7,
        }
    }

    /// The equivalent [`decal_formats::sidecar::SidecarFormat`], for rewriting
    /// the sidecar's format byte after conversion
    pub fn to_sidecar_format(self) -> decal_formats::sidecar::SidecarFormat {
        match self {
            Self::Bc1 => decal_formats::sidecar::SidecarFormat::Dxt1,
            Self::Bc3 => decal_formats::sidecar::SidecarFormat::Dxt5,
            Self::Bc7 => decal_formats::sidecar::SidecarFormat::Bc7,
        }
    }

    /// Whether RGBA (vs RGB) should be written to the scratch PNG for this
    /// format
    pub fn needs_alpha_channel(self) -> bool {
        matches!(self, Self::Bc3 | Self::Bc7)
    }
}

/// Abstraction over the external block-compressor tool.
///
/// Implementations turn a raster image on disk into a block-compressed
/// container on disk at `out_dir`, returning the produced file's path.
pub trait BlockCompressor {
    /// Compress `raster_path` (a PNG) to `format`, writing the result under
    /// `out_dir`, and return the produced file's path.
    fn compress_block(
        &self,
        raster_path: &Path,
        out_dir: &Path,
        format: CompressedFormat,
    ) -> TextureResult<PathBuf>;
}

/// Production [`BlockCompressor`] that shells out to a real tool binary.
///
/// Invokes `<tool> -f <format> -m 1 -o <dir> -y <input>` (mipmaps disabled)
/// and expects the tool to write `<dir>/<input_stem>.dds` on success.
pub struct ProcessBlockCompressor {
    tool_path: PathBuf,
}

impl ProcessBlockCompressor {
    /// Create a compressor that invokes the binary at `tool_path`.
    pub fn new(tool_path: impl Into<PathBuf>) -> Self {
        Self {
            tool_path: tool_path.into(),
        }
    }
}

impl BlockCompressor for ProcessBlockCompressor {
    fn compress_block(
        &self,
        raster_path: &Path,
        out_dir: &Path,
        format: CompressedFormat,
    ) -> TextureResult<PathBuf> {
        if !self.tool_path.is_file() {
            return Err(TextureError::ToolNotFound(self.tool_path.clone()));
        }

        let output = Command::new(&self.tool_path)
            .arg("-f")
            .arg(format.tool_format_arg())
            .arg("-m")
            .arg("1")
            .arg("-o")
            .arg(out_dir)
            .arg("-y")
            .arg(raster_path)
            .output()?;

        if !output.status.success() {
            return Err(TextureError::ToolFailed {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let stem = raster_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(out_dir.join(format!("{stem}.dds")))
    }
}

/// Test fake that writes a canned block-compressed file instead of invoking
/// a real tool, so pipeline behavior can be exercised without a compressor
/// binary on disk.
#[derive(Debug, Clone)]
pub struct FakeBlockCompressor {
    /// Bytes written to the produced `.dds` file, in full (header + payload)
    pub output_bytes: Vec<u8>,
}

impl FakeBlockCompressor {
    /// Create a fake that always writes `output_bytes` as the produced file.
    pub fn new(output_bytes: Vec<u8>) -> Self {
        Self { output_bytes }
    }
}

impl BlockCompressor for FakeBlockCompressor {
    fn compress_block(
        &self,
        raster_path: &Path,
        out_dir: &Path,
        _format: CompressedFormat,
    ) -> TextureResult<PathBuf> {
        let stem = raster_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let out_path = out_dir.join(format!("{stem}.dds"));
        std::fs::write(&out_path, &self.output_bytes)?;
        Ok(out_path)
    }
}
