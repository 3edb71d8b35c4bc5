//! Benchmark helper utilities for isospr-rs
//!
//! This module generates synthetic sprite containers for the benchmark suite.
//! No game assets are needed: classic containers come from the crate's own
//! writer, mobile ones from a small generator that mirrors the mobile layout.

use std::io::Write;

use isospr_types::file::spr::{grid, mobile::RAW_MARKER};
use isospr_types::file::{FramePixels, encode_classic};

/// Mask color of the generated frames.
pub const MASK: u16 = 0xF81F;

/// Generates `count` frames of `width × height` pixels with a diagonal
/// pattern and a transparent border.
pub fn generate_frames(count: usize, width: u32, height: u32) -> Vec<FramePixels> {
	(0..count)
		.map(|i| {
			let top = -(height as i32) / 2;
			let mut frame = FramePixels::new(i as i32 * 4, top, width, height, MASK);
			for y in 1..height.saturating_sub(1) {
				for x in 1..width.saturating_sub(1) {
					let color = ((x * 3 + y * 5 + i as u32) & 0x3FFF) as u16 | 0x0400;
					frame.set(x, y, color);
				}
			}
			frame
		})
		.collect()
}

/// Generates a classic container holding `count` frames.
pub fn generate_classic_sprite(count: usize, width: u32, height: u32) -> Vec<u8> {
	let frames = generate_frames(count, width, height);
	encode_classic(&frames, &[])
}

/// One diamond-shaped mobile block: RLE entries and its palette indices.
fn mobile_block(seed: usize) -> (Vec<u8>, Vec<u8>) {
	let mut entries = Vec::new();
	let mut pixels = Vec::new();
	for y in 0..24usize {
		let inset = (y as i32 - 12).unsigned_abs() as usize / 2;
		let count = 24 - 2 * inset;
		let value = (count * 32 + inset) as u16;
		entries.extend_from_slice(&value.to_le_bytes());
		pixels.extend((0..count).map(|x| ((x + y + seed) % 16) as u8));
	}
	(entries, pixels)
}

/// Generates an uncompressed mobile container with eight directions of
/// `frames_per_direction` frames, all drawing from `block_count` blocks.
pub fn generate_mobile_sprite(frames_per_direction: usize, block_count: usize) -> Vec<u8> {
	let block_count = block_count.clamp(1, u16::MAX as usize);
	let mut out = vec![RAW_MARKER, 16];
	for i in 0..16u16 {
		out.extend_from_slice(&(i * 0x0841).to_le_bytes());
	}
	// All eight directions
	out.push(255);

	for direction in 0..8usize {
		out.extend_from_slice(&(frames_per_direction as u16).to_le_bytes());
		for frame in 0..frames_per_direction {
			out.extend_from_slice(&[0; 12]);
			let cells: Vec<(i32, i32)> =
				(0..2).flat_map(|gy| (0..3).map(move |gx| (gx, gy))).collect();
			out.extend_from_slice(&(cells.len() as u16).to_le_bytes());
			let stored: Vec<(i32, i32)> =
				cells.iter().map(|&(gx, gy)| grid::grid_to_stored(gx, gy)).collect();
			out.extend(stored.iter().map(|&(a, _)| a as i8 as u8));
			out.extend(stored.iter().map(|&(_, b)| b as i8 as u8));
			out.extend(std::iter::repeat_n(direction as u8, cells.len()));
			let mut previous: Option<u16> = None;
			for k in 0..cells.len() {
				let block = ((direction * 7 + frame * 3 + k) % block_count) as u16;
				let delta = match previous {
					None => block,
					Some(prev) => block.wrapping_sub(prev).wrapping_sub(1),
				};
				out.extend_from_slice(&delta.to_le_bytes());
				previous = Some(block);
			}
		}
	}

	let blocks: Vec<_> = (0..block_count).map(mobile_block).collect();
	out.extend_from_slice(&(block_count as u16).to_le_bytes());
	for (entries, _) in &blocks {
		out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
		out.extend_from_slice(entries);
	}
	for (_, pixels) in &blocks {
		out.extend_from_slice(pixels);
	}
	out
}

/// Wraps a container in the Brotli layer the mobile client ships.
pub fn brotli_compress(raw: &[u8]) -> Vec<u8> {
	let mut out = Vec::new();
	{
		let mut writer = brotli::CompressorWriter::new(&mut out, 4096, 9, 22);
		// Writing into a Vec cannot fail
		let _ = writer.write_all(raw);
	}
	out
}

/// Common benchmark sizes for synthetic sprites: `(frames, width, height)`
pub mod sizes {
	/// A handful of small frames
	pub const SMALL: (usize, u32, u32) = (8, 48, 64);
	/// A typical character animation
	pub const MEDIUM: (usize, u32, u32) = (64, 96, 128);
	/// A large effect sheet
	pub const LARGE: (usize, u32, u32) = (200, 192, 192);
}

#[cfg(test)]
mod tests {
	use super::*;
	use isospr_types::file::{decode_classic, decode_mobile};

	#[test]
	fn test_generated_classic_decodes() {
		let (count, width, height) = sizes::SMALL;
		let bytes = generate_classic_sprite(count, width, height);
		let sprite = decode_classic(&bytes).unwrap();
		assert_eq!(sprite.frame_count(), count);
		assert!(sprite.render_all().iter().all(Result::is_ok));
	}

	#[test]
	fn test_generated_mobile_decodes_raw_and_compressed() {
		let raw = generate_mobile_sprite(4, 10);
		let set = decode_mobile(&raw).unwrap();
		assert_eq!(set.len(), 8);
		assert_eq!(set.frame_count(), 32);
		assert_eq!(set.blocks().len(), 10);

		let compressed = decode_mobile(&brotli_compress(&raw)).unwrap();
		assert_eq!(compressed.frame_count(), 32);
	}
}
