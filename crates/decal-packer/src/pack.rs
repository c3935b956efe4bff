//! Re-emitting a bundle archive from a directory of per-resource payload files

use std::io::Write as _;
use std::path::{Path, PathBuf};

use flate2::write::ZlibEncoder;
use flate2::Compression;

use decal_formats::bundle::{padding, write_entry, write_header, ResourceEntry, ResourceType, HEADER_SIZE};

use crate::error::{PackError, PackResult};
use crate::skeleton::BundleSkeleton;

/// Block 0 (main payload stream) alignment, in bytes
const BLOCK0_ALIGNMENT: usize = 0x10;
/// Block 1 (texture pixel stream) alignment, in bytes, and the alignment
/// each data block's start offset is rounded up to
const BLOCK1_ALIGNMENT: usize = 0x80;

/// Per-type subdirectory name a resource's payload files live under.
/// A static lookup, the same "never derive from other data" shape the
/// nibble table uses.
fn resource_type_dir_name(resource_type: ResourceType) -> &'static str {
    match resource_type {
        ResourceType::Texture => "Texture",
        ResourceType::Material => "Material",
        ResourceType::VertexDescriptor => "VertexDescriptor",
        ResourceType::VertexProgramState => "VertexProgramState",
        ResourceType::Renderable => "Renderable",
        ResourceType::MaterialState => "MaterialState",
        ResourceType::SamplerState => "SamplerState",
        ResourceType::ShaderProgramBuffer => "ShaderProgramBuffer",
        ResourceType::Unknown(_) => "Unknown",
    }
}

/// On-disk filename stem for a resource, per the `count_block`/`count`
/// convention: `_<count_block>[_<count>]`, except when `count_block == 0`
/// and `count != 0`, which appends the literal `_0_<count>`.
fn resource_filename_stem(entry: &ResourceEntry) -> String {
    let hex = entry
        .identity
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect::<Vec<_>>()
        .join("_");

    if entry.count_block != 0 {
        let mut stem = format!("{hex}_{}", entry.count_block);
        if entry.count != 0 {
            stem.push_str(&format!("_{}", entry.count));
        }
        stem
    } else if entry.count != 0 {
        // count_block == 0 here; the literal `_0_<count>` suffix.
        format!("{hex}_{}_{}", entry.count_block, entry.count)
    } else {
        hex
    }
}

fn read_payload_file(path: &Path) -> PackResult<Vec<u8>> {
    std::fs::read(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            PackError::MissingResourcePayload(path.to_path_buf())
        } else {
            PackError::Io(err)
        }
    })
}

fn maybe_compress(bytes: &[u8], should_compress: bool) -> PackResult<Vec<u8>> {
    if !should_compress {
        return Ok(bytes.to_vec());
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(9));
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// A stream's contribution to a data block: its on-disk bytes plus the
/// pre-compression length the entry must record.
struct StreamWrite {
    on_disk: Vec<u8>,
    uncompressed_len: usize,
}

fn align_up(value: usize, alignment: usize) -> usize {
    value + padding(value, alignment)
}

impl BundleSkeleton {
    /// Read the per-resource payload files for `entries` from `bundle_dir`,
    /// recompute offsets/sizes, optionally zlib-compress per stream, and
    /// write a new archive to `output_path`.
    pub fn repack(&self, bundle_dir: &Path, output_path: &Path) -> PackResult<()> {
        tracing::info!(
            "Repacking {} entries from {}",
            self.entries.len(),
            bundle_dir.display()
        );
        let should_compress = self.header.compresses_streams();

        let mut block0 = Vec::new();
        let mut block1 = Vec::new();
        let mut rewritten_entries = Vec::with_capacity(self.entries.len());

        for (index, entry) in self.entries.iter().enumerate() {
            let resource_type = entry.resource_type();
            let dir = resource_type_dir_name(resource_type);
            let stem = resource_filename_stem(entry);

            tracing::debug!(
                "[{}/{}] packing {dir}/{stem} (type_id={})",
                index + 1,
                self.entries.len(),
                entry.type_id
            );

            let stream0_path: PathBuf = bundle_dir.join(dir).join(format!("{stem}.dat"));
            let stream0_raw = read_payload_file(&stream0_path)?;
            let stream0_on_disk = maybe_compress(&stream0_raw, should_compress)?;

            let stream0_offset = block0.len();
            block0.extend_from_slice(&stream0_on_disk);
            block0.resize(block0.len() + padding(block0.len(), BLOCK0_ALIGNMENT), 0);

            let stream0 = StreamWrite {
                on_disk: stream0_on_disk,
                uncompressed_len: stream0_raw.len(),
            };

            let stream1 = if resource_type.uses_second_stream() {
                let stream1_path: PathBuf = bundle_dir.join(dir).join(format!("{stem}_texture.dat"));
                let stream1_raw = read_payload_file(&stream1_path)?;
                tracing::debug!("{dir}/{stem}: +texture data ({} bytes)", stream1_raw.len());
                let stream1_on_disk = maybe_compress(&stream1_raw, should_compress)?;
                Some(StreamWrite {
                    on_disk: stream1_on_disk,
                    uncompressed_len: stream1_raw.len(),
                })
            } else {
                None
            };

            let stream1_offset = stream1.as_ref().map(|_| block1.len());
            if let Some(stream1) = &stream1 {
                block1.extend_from_slice(&stream1.on_disk);
                block1.resize(block1.len() + padding(block1.len(), BLOCK1_ALIGNMENT), 0);
            }

            let mut uncompressed_size = [0u32; 4];
            let mut compressed_size = [0u32; 4];
            let mut offset = [0u32; 4];

            uncompressed_size[0] = stream0.uncompressed_len as u32;
            compressed_size[0] = stream0.on_disk.len() as u32;
            offset[0] = stream0_offset as u32;

            if let (Some(stream1), Some(stream1_offset)) = (&stream1, stream1_offset) {
                uncompressed_size[1] = stream1.uncompressed_len as u32;
                compressed_size[1] = stream1.on_disk.len() as u32;
                offset[1] = stream1_offset as u32;
            }

            rewritten_entries.push(ResourceEntry {
                identity: entry.identity,
                count_block: entry.count_block,
                count: entry.count,
                is_id_integer: entry.is_id_integer,
                uncompressed_size,
                compressed_size,
                offset,
                type_id: entry.type_id,
                import_count: entry.import_count,
                stream_index: entry.stream_index,
            });
        }

        let entry_table_start = HEADER_SIZE + self.notes.len() + {
            let padded_debug_len = self.debug.len() + padding(self.debug.len(), BLOCK0_ALIGNMENT);
            if self.header.has_debug_region() {
                padded_debug_len
            } else {
                0
            }
        };
        let entry_table_end = entry_table_start + rewritten_entries.len() * decal_formats::bundle::ENTRY_SIZE;

        let data_block_offset_0 = entry_table_end;
        let data_block_offset_1 = align_up(data_block_offset_0 + block0.len(), BLOCK1_ALIGNMENT);
        let data_block_offset_2 = align_up(data_block_offset_1 + block1.len(), BLOCK1_ALIGNMENT);
        let data_block_offset_3 = data_block_offset_2;

        let header = decal_formats::bundle::BundleHeader {
            version: self.header.version,
            platform: self.header.platform,
            debug_data_offset: self.header.debug_data_offset,
            resource_entries_count: rewritten_entries.len() as u32,
            resource_entries_offset: entry_table_start as u32,
            data_block_offset: [
                data_block_offset_0 as u32,
                data_block_offset_1 as u32,
                data_block_offset_2 as u32,
                data_block_offset_3 as u32,
            ],
            flags: self.header.flags,
            pad: self.header.pad,
        };

        let mut out = std::io::Cursor::new(Vec::with_capacity(data_block_offset_3));
        write_header(&mut out, &header)?;
        out.write_all(&self.notes)?;

        if self.header.has_debug_region() {
            out.write_all(&self.debug)?;
            let pad_len = padding(self.debug.len(), BLOCK0_ALIGNMENT);
            out.write_all(&vec![0u8; pad_len])?;
        }

        for entry in &rewritten_entries {
            write_entry(&mut out, entry)?;
        }

        debug_assert_eq!(out.position() as usize, data_block_offset_0);
        out.write_all(&block0)?;
        out.write_all(&vec![0u8; data_block_offset_1 - out.position() as usize])?;
        out.write_all(&block1)?;
        out.write_all(&vec![0u8; data_block_offset_3 - out.position() as usize])?;

        let total_size = data_block_offset_3;
        std::fs::write(output_path, out.into_inner())?;
        tracing::info!(
            "Wrote {} ({} bytes, block0={} block1={})",
            output_path.display(),
            total_size,
            block0.len(),
            block1.len()
        );
        Ok(())
    }
}
