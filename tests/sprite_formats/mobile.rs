use std::io::Write;

use isospr_rs::file::spr::mobile::RAW_MARKER;
use isospr_rs::prelude::*;

const PALETTE: [u16; 4] = [0x0000, 0xF800, 0x07E0, 0x001F];

/// None of the palette colors is reserved, so the first one wins.
const MASK_FOR_PALETTE: u16 = 0xF81F;

/// One frame per direction, all placing block 0 at the grid origin. Block 0
/// holds palette indices 1, 2, 3 at columns 2..5 of row 0.
fn container(direction_byte: u8, directions: usize) -> Vec<u8> {
	let mut out = vec![RAW_MARKER, PALETTE.len() as u8];
	out.extend(PALETTE.iter().flat_map(|c| c.to_le_bytes()));
	out.push(direction_byte);
	for direction in 0..directions {
		out.extend_from_slice(&1u16.to_le_bytes());
		for value in [2i16, 0, 4, 0] {
			out.extend_from_slice(&value.to_le_bytes());
		}
		out.extend_from_slice(&[0; 4]);
		out.extend_from_slice(&1u16.to_le_bytes());
		out.extend_from_slice(&[0, 0, direction as u8]);
		out.extend_from_slice(&0u16.to_le_bytes());
	}
	out.extend_from_slice(&1u16.to_le_bytes());
	out.extend_from_slice(&2u16.to_le_bytes());
	out.extend_from_slice(&(3u16 * 32 + 2).to_le_bytes());
	out.extend_from_slice(&[1, 2, 3]);
	out
}

fn compress(bytes: &[u8]) -> Vec<u8> {
	let mut out = Vec::new();
	{
		let mut writer = brotli::CompressorWriter::new(&mut out, 4096, 5, 22);
		writer.write_all(bytes).unwrap();
	}
	out
}

#[test_log::test]
fn test_eight_directions_share_blocks() {
	let raw = container(255, 8);
	let set = decode_mobile(&raw).unwrap();
	assert_eq!(set.direction_indices(), (0..8).collect::<Vec<u8>>());
	assert_eq!(set.frame_count(), 8);
	assert_eq!(set.mask_color(), MASK_FOR_PALETTE);
	assert_eq!(set.blocks().len(), 1);

	for (direction, sprite) in set.iter() {
		assert!(std::ptr::eq(sprite.blocks(), set.blocks()));
		assert_eq!(sprite.frames()[0].kind(), direction);
		let pixels = sprite.render(0).unwrap();
		assert_eq!(pixels.bounds(), Bounds::from_origin(2, 0, 3, 1));
		assert_eq!(pixels.pixels(), &[0xF800, 0x07E0, 0x001F]);
	}
}

#[test]
fn test_brotli_and_raw_decode_alike() {
	let raw = container(15, 4);
	let from_raw = decode_mobile(&raw).unwrap();
	let from_brotli = decode_mobile(&compress(&raw)).unwrap();

	assert_eq!(from_raw.direction_indices(), from_brotli.direction_indices());
	for ((_, a), (_, b)) in from_raw.iter().zip(from_brotli.iter()) {
		assert_eq!(a.render_all(), b.render_all());
	}
}

#[test]
fn test_sparse_direction_set() {
	let set = decode_mobile(&container(85, 4)).unwrap();
	assert_eq!(set.direction_indices(), vec![0, 2, 4, 6]);
	assert!(set.direction(1).is_none());
	assert_eq!(set.direction(6).unwrap().frames()[0].kind(), 3);
}

#[test]
fn test_cut_brotli_stream_is_rejected() {
	let compressed = compress(&container(255, 8));
	let err = decode_mobile(&compressed[..compressed.len() / 2]).unwrap_err();
	// Depending on where the cut lands the decoder fails or the body ends early
	assert!(
		matches!(
			err,
			SprError::DecompressionFailure { .. }
				| SprError::TruncatedData { .. }
				| SprError::MalformedHeader { .. }
		),
		"{err}"
	);
	assert_eq!(err.variant(), Variant::Mobile);
}

#[test]
fn test_raw_prefixes_are_truncations() {
	let raw = container(15, 4);
	for len in 0..raw.len() {
		let err = decode_mobile(&raw[..len]).unwrap_err();
		assert!(
			matches!(err, SprError::TruncatedData { .. } | SprError::MalformedHeader { .. }),
			"prefix {len}: {err}"
		);
	}
}

#[test]
fn test_direction_converts_to_classic() {
	let set = decode_mobile(&container(15, 4)).unwrap();
	let bytes = convert_to_classic(set.direction(3).unwrap().clone(), 1.0);

	let classic = decode_classic(&bytes).unwrap();
	assert_eq!(classic.frames()[0].kind(), 3);
	let pixels = classic.render(0).unwrap();
	assert_eq!(pixels.bounds(), Bounds::from_origin(2, 0, 3, 1));
	assert_eq!(pixels.pixels(), &[0x7C00, 0x03E0, 0x001F]);
}
