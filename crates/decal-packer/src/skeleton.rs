//! Read-only parse of a source archive's identity skeleton
//!
//! The skeleton is the header, the entry table, and the notes/debug byte
//! regions — everything except the data blocks. It is a structural
//! template the packer mutates only in size/offset fields; the original
//! entry records are kept as opaque structs in [`BundleSkeleton::entries`]
//! and written back unchanged apart from the fields §4.D of the format
//! enumerates.

use std::io::Cursor;

use decal_formats::bundle::{read_entry, read_header, BundleHeader, ENTRY_SIZE, HEADER_SIZE};

use crate::error::PackResult;

/// A parsed source archive, without its data block contents
#[derive(Debug, Clone)]
pub struct BundleSkeleton {
    /// The original header, preserved for fields the packer keeps as-is
    /// (`version`, `platform`, `debug_data_offset`, `resource_entries_offset`,
    /// `flags`, trailing `pad`)
    pub header: BundleHeader,
    /// The entry table, in source archive order
    pub entries: Vec<decal_formats::bundle::ResourceEntry>,
    /// Raw bytes between the header and the debug region, preserved
    /// verbatim — the notes region is never moved or resized by the packer
    pub notes: Vec<u8>,
    /// Debug region bytes, with trailing zero bytes trimmed; forced empty
    /// if the header's debug-region flag bit is clear
    pub debug: Vec<u8>,
}

fn trim_trailing_zeros(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |pos| pos + 1);
    &bytes[..end]
}

impl BundleSkeleton {
    /// Parse a source archive's header, entry table, notes, and debug
    /// regions from its full byte contents.
    pub fn parse(bytes: &[u8]) -> PackResult<Self> {
        let header = read_header(&mut Cursor::new(bytes))?;

        // `debug_data_offset` can be >= `resource_entries_offset` in the wild
        // even with the debug-region flag bit set, leaving no room for a
        // debug region; treat the whole gap as notes and the debug region as
        // empty in that case, rather than trusting the flag bit alone.
        let notes_start = HEADER_SIZE;
        let (notes_end, debug) = if header.debug_data_offset < header.resource_entries_offset {
            let notes_end = header.debug_data_offset as usize;
            let debug_start = notes_end;
            let debug_end = header.resource_entries_offset as usize;
            let debug = if header.has_debug_region() {
                trim_trailing_zeros(&bytes[debug_start..debug_end]).to_vec()
            } else {
                Vec::new()
            };
            (notes_end, debug)
        } else {
            (header.resource_entries_offset as usize, Vec::new())
        };
        let notes = bytes[notes_start..notes_end].to_vec();

        let mut entries = Vec::with_capacity(header.resource_entries_count as usize);
        let mut cursor = Cursor::new(bytes);
        cursor.set_position(header.resource_entries_offset as u64);
        for _ in 0..header.resource_entries_count {
            entries.push(read_entry(&mut cursor)?);
        }
        debug_assert_eq!(
            cursor.position() as usize,
            header.resource_entries_offset as usize + entries.len() * ENTRY_SIZE
        );

        Ok(Self {
            header,
            entries,
            notes,
            debug,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use decal_formats::bundle::{write_entry, write_header, ResourceEntry};

    fn build_fixture_archive(flags: u32) -> Vec<u8> {
        let entry = ResourceEntry {
            identity: [0xAA, 0xBB, 0xCC, 0xDD],
            count_block: 0,
            count: 0,
            is_id_integer: true,
            uncompressed_size: [10, 0, 0, 0],
            compressed_size: [10, 0, 0, 0],
            offset: [0, 0, 0, 0],
            type_id: 2,
            import_count: 0,
            stream_index: 0,
        };

        let notes = b"some notes".to_vec();
        let debug_data_offset = (HEADER_SIZE + notes.len()) as u32;
        let resource_entries_offset = debug_data_offset; // no debug region
        let header = decal_formats::bundle::BundleHeader {
            version: 1,
            platform: 1,
            debug_data_offset,
            resource_entries_count: 1,
            resource_entries_offset,
            data_block_offset: [0, 0, 0, 0],
            flags,
            pad: 0,
        };

        let mut cursor = std::io::Cursor::new(Vec::new());
        write_header(&mut cursor, &header).unwrap();
        std::io::Write::write_all(&mut cursor, &notes).unwrap();
        write_entry(&mut cursor, &entry).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn parses_header_notes_and_entries() {
        let bytes = build_fixture_archive(0);
        let skeleton = BundleSkeleton::parse(&bytes).unwrap();
        assert_eq!(skeleton.notes, b"some notes");
        assert!(skeleton.debug.is_empty());
        assert_eq!(skeleton.entries.len(), 1);
        assert_eq!(skeleton.entries[0].identity, [0xAA, 0xBB, 0xCC, 0xDD]);
    }

    #[test]
    fn debug_region_forced_empty_when_flag_clear() {
        let bytes = build_fixture_archive(0x1); // bit 3 clear
        let skeleton = BundleSkeleton::parse(&bytes).unwrap();
        assert!(skeleton.debug.is_empty());
    }

    #[test]
    fn debug_data_offset_past_entries_offset_falls_back_to_notes_only() {
        // debug-region flag bit (0x8) set, but debug_data_offset >=
        // resource_entries_offset leaves no room for a debug region; must
        // not panic on slice indexing and must treat the whole gap as notes.
        let entry = ResourceEntry {
            identity: [0x11, 0x22, 0x33, 0x44],
            count_block: 0,
            count: 0,
            is_id_integer: true,
            uncompressed_size: [0, 0, 0, 0],
            compressed_size: [0, 0, 0, 0],
            offset: [0, 0, 0, 0],
            type_id: 2,
            import_count: 0,
            stream_index: 0,
        };

        let notes = b"notes only, no room left for debug".to_vec();
        let resource_entries_offset = (HEADER_SIZE + notes.len()) as u32;
        let debug_data_offset = resource_entries_offset + 0x10; // past the entries offset
        let header = decal_formats::bundle::BundleHeader {
            version: 1,
            platform: 1,
            debug_data_offset,
            resource_entries_count: 1,
            resource_entries_offset,
            data_block_offset: [0, 0, 0, 0],
            flags: 0x8, // debug-region bit set
            pad: 0,
        };

        let mut cursor = std::io::Cursor::new(Vec::new());
        write_header(&mut cursor, &header).unwrap();
        std::io::Write::write_all(&mut cursor, &notes).unwrap();
        write_entry(&mut cursor, &entry).unwrap();
        let bytes = cursor.into_inner();

        let skeleton = BundleSkeleton::parse(&bytes).unwrap();
        assert_eq!(skeleton.notes, notes);
        assert!(skeleton.debug.is_empty());
    }
}
