//! Block-compressed raster container (DDS-style)
//!
//! A fixed 128-byte header, a 4-byte ASCII FOURCC at offset `0x54`, and raw
//! block-compressed pixel bytes from `0x80` to end of file. Only the FOURCC
//! and the payload length are semantically significant here; the rest of the
//! header is opaque to this crate.

use crate::error::{FormatError, FormatResult};

/// Offset of the 4-byte FOURCC tag
const FOURCC_OFFSET: usize = 0x54;

/// Offset where the raw block-compressed payload begins
const PAYLOAD_OFFSET: usize = 0x80;

/// A recognized block-compressed pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockFormat {
    /// BC1 / DXT1: 8 bytes per 4x4 block, no alpha
    Bc1,
    /// BC2 / DXT3: 16 bytes per 4x4 block, explicit 4-bit alpha; read-only,
    /// never produced by this pipeline
    Bc2,
    /// BC3 / DXT5: 16 bytes per 4x4 block, interpolated alpha
    Bc3,
    /// BC7: 16 bytes per 4x4 block
    Bc7,
}

impl BlockFormat {
    /// Bytes occupied by one 4x4 block under this format
    pub fn bytes_per_block(self) -> usize {
        match self {
            Self::Bc1 => 8,
            Self::Bc2 | Self::Bc3 | Self::Bc7 => 16,
        }
    }

    /// Decode a raster container's FOURCC tag
    pub fn from_fourcc(fourcc: [u8; 4]) -> FormatResult<Self> {
        match &fourcc {
            b"DXT1" => Ok(Self::Bc1),
            b"DXT3" => Ok(Self::Bc2),
            b"DXT5" => Ok(Self::Bc3),
            b"BC7\0" | b"DX10" => Ok(Self::Bc7),
            _ => Err(FormatError::UnknownFourCc(fourcc)),
        }
    }

    /// Encode this format back to its canonical FOURCC tag
    pub fn to_fourcc(self) -> [u8; 4] {
        match self {
            Self::Bc1 => *b"DXT1",
            Self::Bc2 => *b"DXT3",
            Self::Bc3 => *b"DXT5",
            Self::Bc7 => *b"BC7\0",
        }
    }
}

/// Read a raster container's FOURCC and raw payload bytes.
///
/// `bytes` is the whole file contents; the payload is everything from
/// `0x80` to the end, returned without further parsing.
pub fn read_payload(bytes: &[u8]) -> FormatResult<([u8; 4], &[u8])> {
    if bytes.len() < FOURCC_OFFSET + 4 {
        return Err(FormatError::TruncatedInput {
            offset: FOURCC_OFFSET,
            needed: 4,
            available: bytes.len().saturating_sub(FOURCC_OFFSET),
        });
    }
    let mut fourcc = [0u8; 4];
    fourcc.copy_from_slice(&bytes[FOURCC_OFFSET..FOURCC_OFFSET + 4]);

    if bytes.len() < PAYLOAD_OFFSET {
        return Err(FormatError::TruncatedInput {
            offset: PAYLOAD_OFFSET,
            needed: 0,
            available: 0,
        });
    }

    Ok((fourcc, &bytes[PAYLOAD_OFFSET..]))
}

/// Expected byte length of a block-compressed payload at `width` x `height`.
///
/// Integer arithmetic only: `ceil(W/4) * ceil(H/4) * bytes_per_block`.
pub fn expected_payload_size(width: u32, height: u32, format: BlockFormat) -> usize {
    let blocks_wide = width.div_ceil(4) as usize;
    let blocks_high = height.div_ceil(4) as usize;
    blocks_wide * blocks_high * format.bytes_per_block()
}

/// Fraction of `expected` below which a payload is considered a likely
/// silent failure of the external compressor (non-fatal; callers decide).
const VALIDATION_THRESHOLD_NUM: usize = 9;
const VALIDATION_THRESHOLD_DEN: usize = 10;

/// Whether `actual_len` is suspiciously small relative to `expected_len`
/// (less than 90%). Does not itself fail an operation.
pub fn is_suspiciously_small(actual_len: usize, expected_len: usize) -> bool {
    actual_len * VALIDATION_THRESHOLD_DEN < expected_len * VALIDATION_THRESHOLD_NUM
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fixture(fourcc: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0u8; PAYLOAD_OFFSET];
        bytes[FOURCC_OFFSET..FOURCC_OFFSET + 4].copy_from_slice(fourcc);
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn reads_fourcc_and_payload() {
        let bytes = fixture(b"DXT5", &[1, 2, 3, 4]);
        let (fourcc, payload) = read_payload(&bytes).unwrap();
        assert_eq!(&fourcc, b"DXT5");
        assert_eq!(payload, &[1, 2, 3, 4]);
    }

    #[test]
    fn truncated_header_is_an_error() {
        let bytes = vec![0u8; 0x50];
        let err = read_payload(&bytes).unwrap_err();
        assert!(matches!(err, FormatError::TruncatedInput { .. }));
    }

    #[test]
    fn bc_size_law_bc1_is_half_area() {
        assert_eq!(expected_payload_size(512, 512, BlockFormat::Bc1), 512 * 512 / 2);
        assert_eq!(expected_payload_size(128, 128, BlockFormat::Bc1), 128 * 128 / 2);
    }

    #[test]
    fn bc_size_law_bc3_and_bc7_are_full_area() {
        assert_eq!(expected_payload_size(512, 512, BlockFormat::Bc3), 512 * 512);
        assert_eq!(expected_payload_size(256, 1024, BlockFormat::Bc7), 256 * 1024);
    }

    #[test]
    fn non_multiple_of_four_rounds_up_to_next_block() {
        // 5 pixels wide needs 2 blocks (ceil(5/4)=2), not 1.
        assert_eq!(expected_payload_size(5, 4, BlockFormat::Bc1), 2 * 1 * 8);
    }

    #[test]
    fn undersized_payload_is_flagged() {
        let expected = expected_payload_size(512, 512, BlockFormat::Bc3);
        assert_eq!(expected, 262_144);
        assert!(is_suspiciously_small(200_000, expected));
        assert!(!is_suspiciously_small(240_000, expected));
    }

    #[test]
    fn fourcc_round_trips() {
        for format in [BlockFormat::Bc1, BlockFormat::Bc2, BlockFormat::Bc3] {
            let fourcc = format.to_fourcc();
            assert_eq!(BlockFormat::from_fourcc(fourcc).unwrap(), format);
        }
    }

    #[test]
    fn unknown_fourcc_is_an_error() {
        let err = BlockFormat::from_fourcc(*b"ZZZZ").unwrap_err();
        assert!(matches!(err, FormatError::UnknownFourCc(_)));
    }
}
