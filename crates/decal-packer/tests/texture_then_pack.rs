//! End-to-end scenario spanning both the texture pipeline and the packer:
//! convert a source image into a texture payload, then pack a bundle
//! directory containing it.

use decal_formats::bundle::{read_header, BundleHeader, ResourceEntry};
use decal_formats::raster;
use decal_packer::BundleSkeleton;
use decal_texture::{CompressedFormat, FakeBlockCompressor, TexturePipeline};

fn write_remastered_sidecar(path: &std::path::Path, format_byte: u8, width: u16, height: u16) {
    let mut bytes = vec![0u8; 0x40];
    bytes[12] = 0x07;
    bytes[0x2C] = format_byte;
    bytes[0x34..0x36].copy_from_slice(&width.to_le_bytes());
    bytes[0x36..0x38].copy_from_slice(&height.to_le_bytes());
    std::fs::write(path, bytes).unwrap();
}

fn write_opaque_png(path: &std::path::Path, width: u32, height: u32) {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([180, 90, 40, 255]));
    image.save(path).unwrap();
}

#[test]
fn texture_payload_produced_by_the_pipeline_packs_successfully() {
    let bundle_dir = tempfile::tempdir().unwrap();
    let texture_dir = bundle_dir.path().join("Texture");
    std::fs::create_dir_all(&texture_dir).unwrap();

    let source_png = bundle_dir.path().join("skin_source.png");
    write_opaque_png(&source_png, 256, 256);

    let sidecar_path = texture_dir.join("AA_BB_CC_DD.dat");
    write_remastered_sidecar(&sidecar_path, 0x47, 256, 256); // DXT1 -> BC1

    let expected_len = raster::expected_payload_size(256, 256, raster::BlockFormat::Bc1);
    let compressor = FakeBlockCompressor::new({
        let mut bytes = vec![0u8; 0x80];
        bytes[0x54..0x58].copy_from_slice(b"DXT1");
        bytes.extend(vec![0x42; expected_len]);
        bytes
    });

    let pipeline = TexturePipeline::new(&compressor);
    let job = pipeline.prepare(&source_png, &sidecar_path).unwrap();
    assert_eq!(job.format(), CompressedFormat::Bc1);
    let outcome = job.run(false).unwrap();
    assert_eq!(outcome.payload_path, texture_dir.join("AA_BB_CC_DD_texture.dat"));

    let sidecar_bytes = std::fs::read(&sidecar_path).unwrap();

    let entry = ResourceEntry {
        identity: [0xAA, 0xBB, 0xCC, 0xDD],
        count_block: 0,
        count: 0,
        is_id_integer: true,
        uncompressed_size: [0; 4],
        compressed_size: [0; 4],
        offset: [0; 4],
        type_id: 1, // Texture
        import_count: 0,
        stream_index: 0,
    };

    let skeleton = BundleSkeleton {
        header: BundleHeader {
            version: 1,
            platform: 1,
            debug_data_offset: 0x30,
            resource_entries_count: 1,
            resource_entries_offset: 0x30,
            data_block_offset: [0, 0, 0, 0],
            flags: 0x0,
            pad: 0,
        },
        entries: vec![entry],
        notes: Vec::new(),
        debug: Vec::new(),
    };

    let output_path = bundle_dir.path().join("out.BIN");
    skeleton.repack(bundle_dir.path(), &output_path).unwrap();

    let archive_bytes = std::fs::read(&output_path).unwrap();
    let header = read_header(&mut std::io::Cursor::new(&archive_bytes)).unwrap();
    assert_eq!(header.platform, 1);

    let rehydrated = BundleSkeleton::parse(&archive_bytes).unwrap();
    let packed_entry = &rehydrated.entries[0];
    assert_eq!(packed_entry.uncompressed_size[0] as usize, sidecar_bytes.len());
    assert_eq!(packed_entry.uncompressed_size[1] as usize, expected_len);
}
