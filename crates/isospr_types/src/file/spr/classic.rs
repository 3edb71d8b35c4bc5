//! Classic and remastered container readers.
//!
//! Both variants share one layout (see the [module documentation](super));
//! the remastered one doubles the tile edge and widens the placement count and
//! block id fields to 32 bits.

use std::sync::Arc;

use log::{debug, trace, warn};

use crate::file::SprError;

use super::assemble;
use super::block::{BlockTable, Slot};
use super::frame::{Placement, RawFrame};
use super::mask::MaskSelector;
use super::palette::Palette;
use super::reader::ByteReader;
use super::rle::{self, BlockContext};
use super::sprite::SpriteSet;
use super::{DecodeOptions, Variant};

/// Leading frame-count value that announces a palette.
pub(crate) const PALETTE_SENTINEL: u8 = 0xFF;

/// Size of a frame header before its placements, in bytes.
const FRAME_HEADER_SIZE: usize = 12;

/// Decodes a classic container in strict mode.
pub fn decode_classic(bytes: &[u8]) -> Result<SpriteSet, SprError> {
	decode_classic_with(bytes, &DecodeOptions::default())
}

/// Decodes a classic container.
pub fn decode_classic_with(bytes: &[u8], options: &DecodeOptions) -> Result<SpriteSet, SprError> {
	read_container(bytes, Variant::Classic, options)
}

/// Decodes a remastered container in strict mode.
pub fn decode_remastered(bytes: &[u8]) -> Result<SpriteSet, SprError> {
	decode_remastered_with(bytes, &DecodeOptions::default())
}

/// Decodes a remastered container.
pub fn decode_remastered_with(
	bytes: &[u8],
	options: &DecodeOptions,
) -> Result<SpriteSet, SprError> {
	read_container(bytes, Variant::Remastered, options)
}

fn read_container(
	bytes: &[u8],
	variant: Variant,
	options: &DecodeOptions,
) -> Result<SpriteSet, SprError> {
	let mut reader = ByteReader::new(bytes, variant);
	let mut selector = MaskSelector::new();

	let mut frame_count = reader.u8()?;
	let palette = if frame_count == PALETTE_SENTINEL {
		let palette = Palette::read(&mut reader, variant.color_format())?;
		selector.observe_all(palette.colors().iter().copied());
		frame_count = reader.u8()?;
		Some(palette)
	} else {
		None
	};

	reader.require(frame_count as usize, FRAME_HEADER_SIZE, "frame headers")?;
	let raw_frames = (0..frame_count)
		.map(|_| read_frame(&mut reader, variant))
		.collect::<Result<Vec<_>, _>>()?;

	let block_count = reader.u32()? as usize;
	reader.require(block_count.saturating_add(1), 4, "block offsets")?;
	let offsets = (0..=block_count).map(|_| reader.u32()).collect::<Result<Vec<_>, _>>()?;

	let data_start = reader.position();
	let data = reader.rest();
	let end = offsets[block_count] as usize;
	if end > data.len() {
		return Err(SprError::truncated(variant, data_start, end, data.len()));
	}

	let ctx = BlockContext {
		variant,
		edge: variant.tile_edge(),
		palette: palette.as_ref(),
	};
	let mut slots = Vec::with_capacity(block_count);
	for id in 0..block_count {
		let (start, stop) = (offsets[id] as usize, offsets[id + 1] as usize);
		let scanned = if start > stop || stop > end {
			Err(SprError::corrupt(
				variant,
				id,
				format!("offset range {start}..{stop} outside the block data (end {end})"),
			))
		} else {
			let payload = &data[start..stop];
			rle::scan_classic(payload, &ctx, id, &mut selector)
				.map(|summary| Slot::encoded(payload.to_vec(), Vec::new(), summary))
		};

		match scanned {
			Ok(slot) => {
				trace!("Block #{id}: {} bytes at {start}", stop - start);
				slots.push(slot);
			}
			Err(err) if options.is_best_effort() => {
				warn!("Skipping block #{id}: {err}");
				slots.push(Slot::Defective(err));
			}
			Err(err) => return Err(err),
		}
	}

	let mask = selector.select();
	let palette_len = palette.as_ref().map_or(0, Palette::len);
	debug!(
		"Decoded {variant} sprite: {frame_count} frames, {block_count} blocks, \
		 palette: {palette_len}, mask 0x{mask:04X}"
	);

	let blocks = Arc::new(BlockTable::new(variant, mask, palette, slots));
	let frames = assemble::assemble_frames(raw_frames, &blocks, options)?;
	Ok(SpriteSet::new(variant, frames, blocks))
}

fn read_frame(reader: &mut ByteReader<'_>, variant: Variant) -> Result<RawFrame, SprError> {
	let left = reader.i16()?;
	let top = reader.i16()?;
	let right = reader.i16()?;
	let bottom = reader.i16()?;
	let extra = [reader.u16()?, reader.u16()?];

	let wide = variant == Variant::Remastered;
	let count = if wide {
		reader.u32()? as usize
	} else {
		reader.u16()? as usize
	};
	reader.require(
		count,
		if wide {
			7
		} else {
			5
		},
		"placements",
	)?;

	let mut placements = Vec::with_capacity(count);
	for _ in 0..count {
		let a = reader.i8()?;
		let b = reader.i8()?;
		let kind = reader.u8()?;
		let block = if wide {
			reader.u32()?
		} else {
			u32::from(reader.u16()?)
		};
		placements.push(Placement::new(a, b, kind, block));
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
