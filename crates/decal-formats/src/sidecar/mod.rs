//! Resource metadata sidecar records
//!
//! A sidecar is a small fixed-layout binary file carrying a texture's pixel
//! format and dimensions. It exists in two on-disk dialects, distinguished by
//! an exact-match prefix rather than any version field:
//!
//! - **Remastered**: twelve zero bytes followed by `0x07` or `0x09`. Format
//!   byte at `0x2C`, width (u16 LE) at `0x34`, height (u16 LE) at `0x36`.
//! - **Original**: eight zero bytes followed by `0x01`. Format as 4-byte
//!   ASCII at `0xC`, width (u16 LE) at `0x10`, height (u16 LE) at `0x12`.
//!
//! Writes touch only the format and dimension bytes for the detected
//! dialect; every other byte is preserved untouched.

use crate::error::{FormatError, FormatResult};

/// Which on-disk layout a sidecar follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidecarDialect {
    /// Twelve zero bytes then `0x07`/`0x09`; format/dimensions near the start
    /// of the second half of the record
    Remastered,
    /// Eight zero bytes then `0x01`; format as ASCII, dimensions just after
    Original,
}

/// A sidecar's compressed pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidecarFormat {
    /// DXT1 / BC1, 8 bytes per 4x4 block, no alpha
    Dxt1,
    /// DXT5 / BC3, 16 bytes per 4x4 block, interpolated alpha
    Dxt5,
    /// BC7, 16 bytes per 4x4 block; remastered dialect only
    Bc7,
}

impl SidecarDialect {
    fn detect(bytes: &[u8]) -> FormatResult<Self> {
        if bytes.len() >= 13 && bytes[0..12] == [0u8; 12] && matches!(bytes[12], 0x07 | 0x09) {
            return Ok(Self::Remastered);
        }
        if bytes.len() >= 9 && bytes[0..8] == [0u8; 8] && bytes[8] == 0x01 {
            return Ok(Self::Original);
        }
        Err(FormatError::UnknownSidecarDialect)
    }

    fn format_byte_offset(self) -> usize {
        match self {
            Self::Remastered => 0x2C,
            Self::Original => 0xC,
        }
    }

    fn format_field_len(self) -> usize {
        match self {
            Self::Remastered => 1,
            Self::Original => 4,
        }
    }

    fn width_offset(self) -> usize {
        match self {
            Self::Remastered => 0x34,
            Self::Original => 0x10,
        }
    }

    fn height_offset(self) -> usize {
        match self {
            Self::Remastered => 0x36,
            Self::Original => 0x12,
        }
    }
}

fn require_len(bytes: &[u8], offset: usize, needed: usize) -> FormatResult<()> {
    if bytes.len() < offset + needed {
        return Err(FormatError::TruncatedInput {
            offset,
            needed,
            available: bytes.len().saturating_sub(offset),
        });
    }
    Ok(())
}

fn decode_format(dialect: SidecarDialect, bytes: &[u8]) -> FormatResult<SidecarFormat> {
    let offset = dialect.format_byte_offset();
    let len = dialect.format_field_len();
    require_len(bytes, offset, len)?;

    match dialect {
        SidecarDialect::Remastered => match bytes[offset] {
            0x47 => Ok(SidecarFormat::Dxt1),
            0x4D => Ok(SidecarFormat::Dxt5),
            0x62 => Ok(SidecarFormat::Bc7),
            other => Err(FormatError::UnknownFourCc([other, 0, 0, 0])),
        },
        SidecarDialect::Original => {
            let field = &bytes[offset..offset + len];
            match field {
                b"DXT1" => Ok(SidecarFormat::Dxt1),
                b"DXT5" => Ok(SidecarFormat::Dxt5),
                _ => {
                    let mut fourcc = [0u8; 4];
                    fourcc.copy_from_slice(field);
                    Err(FormatError::UnknownFourCc(fourcc))
                }
            }
        }
    }
}

fn encode_format(dialect: SidecarDialect, format: SidecarFormat, out: &mut [u8]) {
    let offset = dialect.format_byte_offset();
    match dialect {
        SidecarDialect::Remastered => {
            out[offset] = match format {
                SidecarFormat::Dxt1 => 0x47,
                SidecarFormat::Dxt5 => 0x4D,
                SidecarFormat::Bc7 => 0x62,
            };
        }
        SidecarDialect::Original => {
            let ascii: &[u8; 4] = match format {
                SidecarFormat::Dxt1 => b"DXT1",
                SidecarFormat::Dxt5 => b"DXT5",
                SidecarFormat::Bc7 => b"DXT5", // original dialect has no BC7 tag; closest alpha-bearing format
            };
            out[offset..offset + 4].copy_from_slice(ascii);
        }
    }
}

/// Decoded sidecar contents: dialect, pixel format, and dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidecarInfo {
    /// On-disk layout this sidecar follows
    pub dialect: SidecarDialect,
    /// Pixel format
    pub format: SidecarFormat,
    /// Texture width in pixels
    pub width: u16,
    /// Texture height in pixels
    pub height: u16,
}

/// Detect the dialect of `bytes` and decode its format and dimensions.
pub fn read_sidecar(bytes: &[u8]) -> FormatResult<SidecarInfo> {
    let dialect = SidecarDialect::detect(bytes)?;
    let format = decode_format(dialect, bytes)?;

    let width_offset = dialect.width_offset();
    let height_offset = dialect.height_offset();
    require_len(bytes, width_offset, 2)?;
    require_len(bytes, height_offset, 2)?;

    let width = u16::from_le_bytes([bytes[width_offset], bytes[width_offset + 1]]);
    let height = u16::from_le_bytes([bytes[height_offset], bytes[height_offset + 1]]);

    Ok(SidecarInfo {
        dialect,
        format,
        width,
        height,
    })
}

/// Rewrite only the format field for the detected dialect, leaving every
/// other byte untouched.
pub fn write_sidecar_format(bytes: &mut [u8], format: SidecarFormat) -> FormatResult<()> {
    let dialect = SidecarDialect::detect(bytes)?;
    let offset = dialect.format_byte_offset();
    let len = dialect.format_field_len();
    require_len(bytes, offset, len)?;
    encode_format(dialect, format, bytes);
    Ok(())
}

/// Rewrite only the width/height fields for the detected dialect, leaving
/// every other byte untouched.
pub fn write_sidecar_dimensions(bytes: &mut [u8], width: u16, height: u16) -> FormatResult<()> {
    let dialect = SidecarDialect::detect(bytes)?;
    let width_offset = dialect.width_offset();
    let height_offset = dialect.height_offset();
    require_len(bytes, width_offset, 2)?;
    require_len(bytes, height_offset, 2)?;

    bytes[width_offset..width_offset + 2].copy_from_slice(&width.to_le_bytes());
    bytes[height_offset..height_offset + 2].copy_from_slice(&height.to_le_bytes());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn remastered_fixture() -> Vec<u8> {
        let mut bytes = vec![0u8; 0x40];
        bytes[12] = 0x07;
        bytes[0x2C] = 0x47; // DXT1
        bytes[0x34..0x36].copy_from_slice(&512u16.to_le_bytes());
        bytes[0x36..0x38].copy_from_slice(&256u16.to_le_bytes());
        bytes
    }

    fn original_fixture() -> Vec<u8> {
        let mut bytes = vec![0u8; 0x20];
        bytes[8] = 0x01;
        bytes[0xC..0x10].copy_from_slice(b"DXT1");
        bytes[0x10..0x12].copy_from_slice(&512u16.to_le_bytes());
        bytes[0x12..0x14].copy_from_slice(&256u16.to_le_bytes());
        bytes
    }

    #[test]
    fn detects_remastered_dialect() {
        let info = read_sidecar(&remastered_fixture()).unwrap();
        assert_eq!(info.dialect, SidecarDialect::Remastered);
        assert_eq!(info.format, SidecarFormat::Dxt1);
        assert_eq!(info.width, 512);
        assert_eq!(info.height, 256);
    }

    #[test]
    fn detects_original_dialect() {
        let info = read_sidecar(&original_fixture()).unwrap();
        assert_eq!(info.dialect, SidecarDialect::Original);
        assert_eq!(info.format, SidecarFormat::Dxt1);
        assert_eq!(info.width, 512);
        assert_eq!(info.height, 256);
    }

    #[test]
    fn unrecognized_prefix_is_an_error() {
        let bytes = vec![0xFFu8; 0x40];
        let err = read_sidecar(&bytes).unwrap_err();
        assert!(matches!(err, FormatError::UnknownSidecarDialect));
    }

    #[test]
    fn write_format_remastered_touches_only_its_byte() {
        let mut bytes = remastered_fixture();
        let before = bytes.clone();
        write_sidecar_format(&mut bytes, SidecarFormat::Dxt5).unwrap();
        assert_eq!(bytes[0x2C], 0x4D);
        for i in 0..bytes.len() {
            if i != 0x2C {
                assert_eq!(bytes[i], before[i], "byte {i} changed unexpectedly");
            }
        }
    }

    #[test]
    fn write_format_original_touches_only_its_field() {
        let mut bytes = original_fixture();
        let before = bytes.clone();
        write_sidecar_format(&mut bytes, SidecarFormat::Dxt5).unwrap();
        assert_eq!(&bytes[0xC..0x10], b"DXT5");
        for i in 0..bytes.len() {
            if !(0xC..0x10).contains(&i) {
                assert_eq!(bytes[i], before[i], "byte {i} changed unexpectedly");
            }
        }
    }

    #[test]
    fn write_dimensions_touches_only_width_height() {
        let mut bytes = remastered_fixture();
        let before = bytes.clone();
        write_sidecar_dimensions(&mut bytes, 1024, 1024).unwrap();
        let info = read_sidecar(&bytes).unwrap();
        assert_eq!(info.width, 1024);
        assert_eq!(info.height, 1024);
        for i in 0..bytes.len() {
            if !(0x34..0x38).contains(&i) {
                assert_eq!(bytes[i], before[i], "byte {i} changed unexpectedly");
            }
        }
    }
}
