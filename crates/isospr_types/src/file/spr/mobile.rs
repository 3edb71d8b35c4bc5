//! Mobile container reader.
//!
//! A mobile container is a Brotli stream unless its first byte is
//! [`RAW_MARKER`]; the decompressed stream must itself start with the marker.
//!
//! # Layout
//!
//! ```text
//! u8  marker                       0x4D
//! u8  palette_len (0 = 256), palette_len × u16 RGB565 color
//! u8  direction set                15: 0..4, 85: 0, 2, 4, 6, 255: 0..8
//! per direction {
//!     u16 frame_count
//!     frame_count × {
//!         i16 left, i16 top, i16 right, i16 bottom
//!         u16 unknown_1, u16 unknown_2
//!         u16 placement_count (n)
//!         n × i8 a, n × i8 b, n × u8 type
//!         n × u16 block id         first absolute, then previous + value + 1
//!     }
//! }
//! u16 block_count
//! block_count × { u16 payload_len, payload_len bytes of u16 RLE entries }
//! palette-index stream             consumed by the blocks in order
//! ```
//!
//! Every direction shares the palette and the block table.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

use log::{debug, trace, warn};

use crate::file::SprError;

use super::assemble;
use super::block::{BlockTable, Slot};
use super::frame::{Placement, RawFrame};
use super::mask::MaskSelector;
use super::palette::{ColorFormat, Palette};
use super::reader::ByteReader;
use super::rle::{self, BlockContext};
use super::sprite::{DirectionalSpriteSet, SpriteSet};
use super::{DecodeOptions, Variant};

/// First byte of an uncompressed mobile container.
pub const RAW_MARKER: u8 = 0x4D;

/// Upper bound on the decompressed size of a mobile container.
pub const MAX_DECOMPRESSED_SIZE: usize = 64 << 20;

const BROTLI_BUFFER_SIZE: usize = 4096;

/// Size of a frame header before its placement columns, in bytes.
const FRAME_HEADER_SIZE: usize = 14;

/// Decodes a mobile container in strict mode.
pub fn decode_mobile(bytes: &[u8]) -> Result<DirectionalSpriteSet, SprError> {
	decode_mobile_with(bytes, &DecodeOptions::default())
}

/// Decodes a mobile container.
pub fn decode_mobile_with(
	bytes: &[u8],
	options: &DecodeOptions,
) -> Result<DirectionalSpriteSet, SprError> {
	let body = unwrap_outer(bytes)?;
	read_body(&body, options)
}

/// Returns the marker-prefixed body, decompressing it if needed.
fn unwrap_outer(bytes: &[u8]) -> Result<Cow<'_, [u8]>, SprError> {
	match bytes.first() {
		None => Err(SprError::truncated(Variant::Mobile, 0, 1, 0)),
		Some(&RAW_MARKER) => Ok(Cow::Borrowed(bytes)),
		Some(_) => {
			let mut body = Vec::new();
			brotli::Decompressor::new(bytes, BROTLI_BUFFER_SIZE)
				.take(MAX_DECOMPRESSED_SIZE as u64 + 1)
				.read_to_end(&mut body)
				.map_err(|e| SprError::DecompressionFailure {
					variant: Variant::Mobile,
					message: e.to_string(),
				})?;
			if body.len() > MAX_DECOMPRESSED_SIZE {
				return Err(SprError::DecompressionFailure {
					variant: Variant::Mobile,
					message: format!("output exceeds {MAX_DECOMPRESSED_SIZE} bytes"),
				});
			}
			debug!("Decompressed mobile sprite: {} -> {} bytes", bytes.len(), body.len());
			match body.first() {
				Some(&RAW_MARKER) => Ok(Cow::Owned(body)),
				Some(&marker) => Err(SprError::UnsupportedVariant {
					variant: Variant::Mobile,
					marker,
				}),
				None => Err(SprError::DecompressionFailure {
					variant: Variant::Mobile,
					message: "stream decompressed to nothing".to_string(),
				}),
			}
		}
	}
}

/// Maps the direction byte to the direction indices it announces.
fn direction_indices(marker: u8) -> Result<&'static [u8], SprError> {
	match marker {
		15 => Ok(&[0, 1, 2, 3]),
		85 => Ok(&[0, 2, 4, 6]),
		255 => Ok(&[0, 1, 2, 3, 4, 5, 6, 7]),
		other => Err(SprError::UnsupportedVariant {
			variant: Variant::Mobile,
			marker: other,
		}),
	}
}

fn read_body(body: &[u8], options: &DecodeOptions) -> Result<DirectionalSpriteSet, SprError> {
	let mut reader = ByteReader::new(body, Variant::Mobile);
	let _marker = reader.u8()?;

	let palette = Palette::read(&mut reader, ColorFormat::Rgb565)?;
	let mut selector = MaskSelector::new();
	selector.observe_all(palette.colors().iter().copied());

	let indices = direction_indices(reader.u8()?)?;
	let mut per_direction = Vec::with_capacity(indices.len());
	for &direction in indices {
		let frame_count = reader.u16()? as usize;
		reader.require(frame_count, FRAME_HEADER_SIZE, "frame headers")?;
		let frames = (0..frame_count)
			.map(|_| read_frame(&mut reader))
			.collect::<Result<Vec<_>, _>>()?;
		trace!("Direction {direction}: {frame_count} frames");
		per_direction.push((direction, frames));
	}

	let block_count = reader.u16()? as usize;
	reader.require(block_count, 2, "block payloads")?;
	let mut payloads = Vec::with_capacity(block_count);
	for _ in 0..block_count {
		let len = reader.u16()? as usize;
		payloads.push(reader.take(len)?);
	}
	let pixel_base = reader.position();
	let pixels = reader.rest();

	let ctx = BlockContext {
		variant: Variant::Mobile,
		edge: Variant::Mobile.tile_edge(),
		palette: Some(&palette),
	};
	let mut slots = Vec::with_capacity(block_count);
	let mut cursor = 0usize;
	// Each block's pixels start where the previous block's end, so the
	// first bad block leaves every later one without a start position.
	let mut broken: Option<SprError> = None;
	for (id, payload) in payloads.into_iter().enumerate() {
		if let Some(err) = &broken {
			slots.push(Slot::Defective(SprError::corrupt(
				Variant::Mobile,
				id,
				format!("pixel stream position lost after an earlier block: {err}"),
			)));
			continue;
		}
		let scanned = rle::scan_mobile(payload, &pixels[cursor..], &ctx, id)
			.map_err(|err| rebase_truncation(err, pixel_base + cursor));
		match scanned {
			Ok(summary) => {
				let used = &pixels[cursor..cursor + summary.pixel_count];
				cursor += summary.pixel_count;
				slots.push(Slot::encoded(payload.to_vec(), used.to_vec(), summary));
			}
			Err(err) if options.is_best_effort() => {
				warn!("Skipping block #{id} and every block after it: {err}");
				slots.push(Slot::Defective(err.clone()));
				broken = Some(err);
			}
			Err(err) => return Err(err),
		}
	}
	if broken.is_none() && cursor < pixels.len() {
		debug!("{} trailing pixel indices left unused", pixels.len() - cursor);
	}

	let mask = selector.select();
	debug!(
		"Decoded mobile sprite: {} directions, {block_count} blocks, {} colors, mask 0x{mask:04X}",
		per_direction.len(),
		palette.len()
	);

	let blocks = Arc::new(BlockTable::new(Variant::Mobile, mask, Some(palette), slots));
	let mut directions = BTreeMap::new();
	for (direction, raw_frames) in per_direction {
		let frames = assemble::assemble_frames(raw_frames, &blocks, options)?;
		directions.insert(direction, SpriteSet::new(Variant::Mobile, frames, Arc::clone(&blocks)));
	}
	Ok(DirectionalSpriteSet::new(directions, blocks))
}

/// Moves the offset of a pixel-stream truncation from block-relative to
/// container-relative.
fn rebase_truncation(err: SprError, base: usize) -> SprError {
	match err {
		SprError::TruncatedData {
			variant,
			offset,
			needed,
			available,
		} => SprError::truncated(variant, base + offset, needed, available),
		other => other,
	}
}

fn read_frame(reader: &mut ByteReader<'_>) -> Result<RawFrame, SprError> {
	let left = reader.i16()?;
	let top = reader.i16()?;
	let right = reader.i16()?;
	let bottom = reader.i16()?;
	let extra = [reader.u16()?, reader.u16()?];

	let count = reader.u16()? as usize;
	reader.require(count, 5, "placement columns")?;
	let a = reader.take(count)?;
	let b = reader.take(count)?;
	let kinds = reader.take(count)?;

	let mut placements = Vec::with_capacity(count);
	let mut previous: Option<u16> = None;
	for i in 0..count {
		let stored = reader.u16()?;
		let block = match previous {
			None => stored,
			Some(prev) => prev.wrapping_add(stored).wrapping_add(1),
		};
		previous = Some(block);
		placements.push(Placement::new(a[i] as i8, b[i] as i8, kinds[i], u32::from(block)));
	}

	Ok(RawFrame {
		left,
		top,
		right,
		bottom,
		extra,
		placements,
	})
}
