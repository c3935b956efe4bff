//! Bundle archive header
//!
//! ```text
//! offset  size  field
//! 0x00    4     magic = "bnd2"
//! 0x04    4     version (u32)
//! 0x08    4     platform (u32, must be 1)
//! 0x0C    4     debug_data_offset (u32)
//! 0x10    4     resource_entries_count (u32)
//! 0x14    4     resource_entries_offset (u32)
//! 0x18    16    data_block_offset[0..3] (4 x u32)
//! 0x28    4     flags (u32)
//! 0x2C    4     pad (u32)
//! ```

use std::io::{Read, Seek, Write};

use binrw::{BinRead, BinWrite};

use crate::error::{FormatError, FormatResult};

/// Bundle archive magic bytes
pub const BUNDLE_MAGIC: [u8; 4] = *b"bnd2";

/// Size of the fixed header, in bytes. Notes data begins immediately after.
pub const HEADER_SIZE: usize = 0x30;

/// Platform byte required for both read and write; any other value is a
/// non-PC archive and is rejected.
const PLATFORM_PC: u32 = 1;

/// Bundle archive header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleHeader {
    /// Format version, preserved as-is across repack
    pub version: u32,
    /// Platform tag; must be 1 (PC)
    pub platform: u32,
    /// Offset where the debug byte region begins (and the notes region ends)
    pub debug_data_offset: u32,
    /// Number of resource entries in the entry table
    pub resource_entries_count: u32,
    /// Offset where the resource entry table begins
    pub resource_entries_offset: u32,
    /// Offsets of the four data blocks
    pub data_block_offset: [u32; 4],
    /// Flag bits; bit 3 controls debug region presence, certain values
    /// select zlib compression of streams
    pub flags: u32,
    /// Reserved trailing word, preserved as-is
    pub pad: u32,
}

impl BundleHeader {
    /// Whether flag bit 3 (debug info present) is set
    pub fn has_debug_region(&self) -> bool {
        (self.flags >> 3) & 1 != 0
    }

    /// Whether this header's flag value selects zlib compression of streams
    pub fn compresses_streams(&self) -> bool {
        matches!(
            self.flags,
            0x1 | 0x7 | 0x9 | 0xF | 0x11 | 0x19 | 0x21 | 0x27 | 0x29 | 0x2F
        )
    }
}

/// Raw on-disk layout, decoded/encoded with a derived `binrw` impl and no
/// semantic validation. [`read_header`] / [`write_header`] apply the magic
/// and platform checks on top of this, in plain Rust, rather than threading
/// a custom error type through `binrw`'s generic error path.
#[derive(Debug, Clone, Copy, BinRead, BinWrite)]
struct RawHeader {
    magic: [u8; 4],
    version: u32,
    platform: u32,
    debug_data_offset: u32,
    resource_entries_count: u32,
    resource_entries_offset: u32,
    data_block_offset: [u32; 4],
    flags: u32,
    pad: u32,
}

/// Read a bundle header from the start of `reader`.
///
/// Validates the magic bytes and the platform tag; a mismatch on either is
/// surfaced as [`FormatError::BadMagic`] / [`FormatError::UnsupportedPlatform`]
/// rather than silently accepted.
pub fn read_header<R: Read + Seek>(reader: &mut R) -> FormatResult<BundleHeader> {
    let raw = RawHeader::read_le(reader)?;

    if raw.magic != BUNDLE_MAGIC {
        return Err(FormatError::BadMagic(raw.magic));
    }
    if raw.platform != PLATFORM_PC {
        return Err(FormatError::UnsupportedPlatform(raw.platform));
    }

    Ok(BundleHeader {
        version: raw.version,
        platform: raw.platform,
        debug_data_offset: raw.debug_data_offset,
        resource_entries_count: raw.resource_entries_count,
        resource_entries_offset: raw.resource_entries_offset,
        data_block_offset: raw.data_block_offset,
        flags: raw.flags,
        pad: raw.pad,
    })
}

/// Write a bundle header. Rejects a non-PC `platform` the same way
/// [`read_header`] does, rather than silently emitting an invalid archive.
pub fn write_header<W: Write + Seek>(writer: &mut W, header: &BundleHeader) -> FormatResult<()> {
    if header.platform != PLATFORM_PC {
        return Err(FormatError::UnsupportedPlatform(header.platform));
    }

    let raw = RawHeader {
        magic: BUNDLE_MAGIC,
        version: header.version,
        platform: header.platform,
        debug_data_offset: header.debug_data_offset,
        resource_entries_count: header.resource_entries_count,
        resource_entries_offset: header.resource_entries_offset,
        data_block_offset: header.data_block_offset,
        flags: header.flags,
        pad: header.pad,
    };
    raw.write_le(writer)?;
    Ok(())
}
