//! Resource entry records and the per-type alignment nibble table
//!
//! ```text
//! offset  size  field
//! 0x00    4     identity
//! 0x04    1     count_block
//! 0x05    1     reserved (zero)
//! 0x06    1     count
//! 0x07    1     is_id_integer
//! 0x08    8     reserved hashes (2 x u32)
//! 0x10    16    uncompressed_size[0..3] (nibble-packed, 4 x u32)
//! 0x20    16    compressed_size[0..3] (4 x u32)
//! 0x30    16    offset[0..3] (4 x u32)
//! 0x40    4     reserved import offset
//! 0x44    4     type_id
//! 0x48    2     import_count
//! 0x4A    1     reserved
//! 0x4B    1     stream_index
//! 0x4C    4     reserved trailing word
//! ```

use std::io::{Read, Seek, Write};

use binrw::{BinRead, BinResult, BinWrite};

use crate::error::FormatResult;

/// The kind of asset a resource record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    /// Texture; uses stream 0 (sidecar) and stream 1 (pixel payload)
    Texture,
    /// Material; stream 0 only
    Material,
    /// Vertex descriptor; stream 0 only
    VertexDescriptor,
    /// Vertex program state; stream 0 only
    VertexProgramState,
    /// Renderable; stream 0 only
    Renderable,
    /// Material state; stream 0 only
    MaterialState,
    /// Sampler state; stream 0 only
    SamplerState,
    /// Shader program buffer; stream 0 only
    ShaderProgramBuffer,
    /// Any `type_id` not in the known enumeration; treated as opaque
    Unknown(u32),
}

impl ResourceType {
    /// Map a raw `type_id` to its resource type
    pub fn from_type_id(type_id: u32) -> Self {
        match type_id {
            1 => Self::Texture,
            2 => Self::Material,
            3 => Self::VertexDescriptor,
            4 => Self::VertexProgramState,
            5 => Self::Renderable,
            6 => Self::MaterialState,
            7 => Self::SamplerState,
            8 => Self::ShaderProgramBuffer,
            other => Self::Unknown(other),
        }
    }

    /// Map back to the raw `type_id` stored on disk
    pub fn to_type_id(self) -> u32 {
        match self {
            Self::Texture => 1,
            Self::Material => 2,
            Self::VertexDescriptor => 3,
            Self::VertexProgramState => 4,
            Self::Renderable => 5,
            Self::MaterialState => 6,
            Self::SamplerState => 7,
            Self::ShaderProgramBuffer => 8,
            Self::Unknown(id) => id,
        }
    }

    /// Whether this type uses stream 1 (pixel payload) in addition to stream 0
    pub fn uses_second_stream(self) -> bool {
        matches!(self, Self::Texture)
    }
}

/// The per-type high-nibble table OR'd into each `uncompressed_size` field.
///
/// Bit-exact, reproduced verbatim from the format's observed behavior; never
/// derive these values from anything else.
pub fn nibble_table_for(type_id: u32) -> [u8; 4] {
    match type_id {
        1 => [0x3, 0x4, 0, 0],
        2 => [0, 0, 0, 0],
        3 => [0x3, 0, 0, 0],
        4 => [0x3, 0, 0, 0],
        5 => [0x4, 0x4, 0, 0],
        6 => [0, 0, 0, 0],
        7 => [0x3, 0, 0, 0],
        8 => [0x4, 0x2, 0, 0],
        _ => [0x4, 0, 0, 0],
    }
}

/// Mask isolating the low 28 bits (the actual size) of a nibble-packed field
const SIZE_MASK: u32 = 0x0FFF_FFFF;

/// A single resource record from the entry table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceEntry {
    /// Resource identity, as four raw bytes (`AA BB CC DD`)
    pub identity: [u8; 4],
    /// Count-block byte; part of the on-disk filename convention
    pub count_block: u8,
    /// Count byte; part of the on-disk filename convention
    pub count: u8,
    /// Whether the identity should be treated as an integer
    pub is_id_integer: bool,
    /// Per-stream uncompressed (pre-compression) sizes, low 28 bits only
    pub uncompressed_size: [u32; 4],
    /// Per-stream on-disk (possibly compressed) sizes
    pub compressed_size: [u32; 4],
    /// Per-stream byte offsets into their data block
    pub offset: [u32; 4],
    /// Raw `type_id`, preserved verbatim alongside the decoded [`ResourceType`]
    pub type_id: u32,
    /// Import count, preserved as-is
    pub import_count: u16,
    /// Stream index, preserved as-is
    pub stream_index: u8,
}

impl ResourceEntry {
    /// Decode this entry's `type_id` into a [`ResourceType`]
    pub fn resource_type(&self) -> ResourceType {
        ResourceType::from_type_id(self.type_id)
    }
}

impl BinRead for ResourceEntry {
    type Args<'a> = ();

    /// Splits each `uncompressed_size` field into its top-nibble tag
    /// (discarded) and low-28-bit size; reserved fields are read and
    /// dropped.
    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let identity = <[u8; 4]>::read_options(reader, endian, ())?;

        let count_block = u8::read_options(reader, endian, ())?;
        let _reserved_byte = u8::read_options(reader, endian, ())?;
        let count = u8::read_options(reader, endian, ())?;
        let is_id_integer = u8::read_options(reader, endian, ())? != 0;

        let _reserved_hash_0 = u32::read_options(reader, endian, ())?;
        let _reserved_hash_1 = u32::read_options(reader, endian, ())?;

        let uncompressed_size_raw = <[u32; 4]>::read_options(reader, endian, ())?;
        let uncompressed_size = uncompressed_size_raw.map(|raw| raw & SIZE_MASK);

        let compressed_size = <[u32; 4]>::read_options(reader, endian, ())?;
        let offset = <[u32; 4]>::read_options(reader, endian, ())?;

        let _reserved_import_offset = u32::read_options(reader, endian, ())?;
        let type_id = u32::read_options(reader, endian, ())?;
        let import_count = u16::read_options(reader, endian, ())?;
        let _reserved_byte_2 = u8::read_options(reader, endian, ())?;
        let stream_index = u8::read_options(reader, endian, ())?;
        let _reserved_trailing = u32::read_options(reader, endian, ())?;

        Ok(Self {
            identity,
            count_block,
            count,
            is_id_integer,
            uncompressed_size,
            compressed_size,
            offset,
            type_id,
            import_count,
            stream_index,
        })
    }
}

impl BinWrite for ResourceEntry {
    type Args<'a> = ();

    /// Re-OR's the per-type nibble table onto each `uncompressed_size`
    /// field; all reserved fields are written as zero, matching the
    /// format's observed behavior on repack.
    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        self.identity.write_options(writer, endian, ())?;
        [self.count_block, 0, self.count, u8::from(self.is_id_integer)]
            .write_options(writer, endian, ())?;
        0u32.write_options(writer, endian, ())?;
        0u32.write_options(writer, endian, ())?;

        let nibbles = nibble_table_for(self.type_id);
        let mut packed = [0u32; 4];
        for (slot, (size, nibble)) in packed.iter_mut().zip(self.uncompressed_size.iter().zip(nibbles)) {
            *slot = (size & SIZE_MASK) | (u32::from(nibble) << 28);
        }
        packed.write_options(writer, endian, ())?;

        self.compressed_size.write_options(writer, endian, ())?;
        self.offset.write_options(writer, endian, ())?;

        0u32.write_options(writer, endian, ())?;
        self.type_id.write_options(writer, endian, ())?;
        self.import_count.write_options(writer, endian, ())?;
        [0u8, self.stream_index].write_options(writer, endian, ())?;
        0u32.write_options(writer, endian, ())?;

        Ok(())
    }
}

/// Read and decode one resource entry.
pub fn read_entry<R: Read + Seek>(reader: &mut R) -> FormatResult<ResourceEntry> {
    Ok(ResourceEntry::read_le(reader)?)
}

/// Encode and write one resource entry.
pub fn write_entry<W: Write + Seek>(writer: &mut W, entry: &ResourceEntry) -> FormatResult<()> {
    entry.write_le(writer)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_entry() -> ResourceEntry {
        ResourceEntry {
            identity: [0xAA, 0xBB, 0xCC, 0xDD],
            count_block: 0,
            count: 0,
            is_id_integer: true,
            uncompressed_size: [1024, 2048, 0, 0],
            compressed_size: [1024, 2048, 0, 0],
            offset: [0, 0x400, 0, 0],
            type_id: 1,
            import_count: 0,
            stream_index: 0,
        }
    }

    #[test]
    fn round_trips_preserving_semantic_fields() {
        let entry = sample_entry();
        let mut buf = Cursor::new(Vec::new());
        write_entry(&mut buf, &entry).unwrap();
        let buf = buf.into_inner();
        assert_eq!(buf.len(), super::super::ENTRY_SIZE);

        let read_back = read_entry(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(read_back, entry);
    }

    #[test]
    fn packs_and_strips_the_nibble_tag() {
        let mut entry = sample_entry();
        entry.type_id = 5; // nibble table [0x4, 0x4, 0, 0]
        entry.uncompressed_size = [100, 200, 0, 0];

        let mut buf = Cursor::new(Vec::new());
        write_entry(&mut buf, &entry).unwrap();
        let buf = buf.into_inner();

        let raw_field = u32::from_le_bytes(buf[0x10..0x14].try_into().unwrap());
        assert_eq!(raw_field >> 28, 0x4);
        assert_eq!(raw_field & SIZE_MASK, 100);

        let read_back = read_entry(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(read_back.uncompressed_size[0], 100);
    }

    #[test]
    fn nibble_table_matches_spec_verbatim() {
        assert_eq!(nibble_table_for(1), [0x3, 0x4, 0, 0]);
        assert_eq!(nibble_table_for(2), [0, 0, 0, 0]);
        assert_eq!(nibble_table_for(3), [0x3, 0, 0, 0]);
        assert_eq!(nibble_table_for(4), [0x3, 0, 0, 0]);
        assert_eq!(nibble_table_for(5), [0x4, 0x4, 0, 0]);
        assert_eq!(nibble_table_for(6), [0, 0, 0, 0]);
        assert_eq!(nibble_table_for(7), [0x3, 0, 0, 0]);
        assert_eq!(nibble_table_for(8), [0x4, 0x2, 0, 0]);
        assert_eq!(nibble_table_for(42), [0x4, 0, 0, 0]);
    }

    #[test]
    fn resource_type_round_trips_through_type_id() {
        for (id, expected) in [
            (1, ResourceType::Texture),
            (2, ResourceType::Material),
            (3, ResourceType::VertexDescriptor),
            (4, ResourceType::VertexProgramState),
            (5, ResourceType::Renderable),
            (6, ResourceType::MaterialState),
            (7, ResourceType::SamplerState),
            (8, ResourceType::ShaderProgramBuffer),
        ] {
            assert_eq!(ResourceType::from_type_id(id), expected);
            assert_eq!(expected.to_type_id(), id);
        }
        assert_eq!(ResourceType::from_type_id(99), ResourceType::Unknown(99));
    }

    #[test]
    fn only_textures_use_the_second_stream() {
        assert!(ResourceType::Texture.uses_second_stream());
        assert!(!ResourceType::Material.uses_second_stream());
        assert!(!ResourceType::Unknown(0).uses_second_stream());
    }
}
