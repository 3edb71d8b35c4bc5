//! Scanline RLE tile codec.
//!
//! ## Classic / remastered blocks
//!
//! ```text
//! u8 start_x, u8 start_y, u8 reserved, u8 line_count
//! line_count × {
//!     u8 segment_count
//!     segment_count × { u8 skip_in_bytes, u8 pixel_count, pixel_count × pixel }
//! }
//! ```
//!
//! Every line starts with the cursor at `start_x`. A segment first advances the
//! cursor by `skip_in_bytes / 2` pixels, then writes its pixels left to right.
//! A pixel is one palette-index byte when the sprite has a palette and one
//! little-endian 16-bit color otherwise.
//!
//! ## Mobile blocks
//!
//! The payload is a run of little-endian `u16` entries and holds no pixels;
//! those come from a separate stream of palette indices shared by all blocks.
//! Starting at row 0, each entry `v` is one of:
//!
//! - `v > 2048`: skip `v / 1024 - 1` fully blank rows
//! - `v < 32`: count prefix, the next `v` entries are the segments of one row
//! - otherwise: a one-segment row; consecutive ones chain into a group of rows
//!   without count prefixes
//!
//! A segment entry packs `x = v % 32` (absolute column) and `count = v / 32`.

use crate::file::SprError;

use super::Variant;
use super::mask::MaskSelector;
use super::palette::Palette;
use super::reader::ByteReader;
use super::tile::{Bounds, Tile};

/// Mobile entries above this value encode runs of blank rows.
pub(crate) const BLANK_ROW_THRESHOLD: u16 = 2048;

/// Mobile entries below this value are count prefixes.
const COUNT_PREFIX_LIMIT: u16 = 32;

/// Size of the classic block header in bytes.
pub(crate) const BLOCK_HEADER_SIZE: usize = 4;

/// Pixel storage of a classic-family block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PixelEncoding {
	/// One palette-index byte per pixel
	Indexed,
	/// One raw 16-bit color per pixel
	Direct,
}

impl PixelEncoding {
	#[inline]
	fn bytes_per_pixel(self) -> usize {
		match self {
			PixelEncoding::Indexed => 1,
			PixelEncoding::Direct => 2,
		}
	}
}

/// What a validation pass learned about one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct BlockSummary {
	/// Tight box around the written pixels, tile-local
	pub content: Option<Bounds>,
	/// Number of pixels written
	pub pixel_count: usize,
}

impl BlockSummary {
	fn record(&mut self, x: usize, y: usize, count: usize) {
		if count == 0 {
			return;
		}
		let run = Bounds {
			left: x as i32,
			top: y as i32,
			right: (x + count) as i32,
			bottom: y as i32 + 1,
		};
		self.content = Some(self.content.map_or(run, |b| b.union(&run)));
		self.pixel_count += count;
	}
}

/// Context shared by every block of one sprite.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockContext<'p> {
	pub variant: Variant,
	pub edge: usize,
	pub palette: Option<&'p Palette>,
}

impl BlockContext<'_> {
	fn encoding(&self) -> PixelEncoding {
		if self.palette.is_some() {
			PixelEncoding::Indexed
		} else {
			PixelEncoding::Direct
		}
	}

	fn lookup(&self, block: usize, index: u8) -> Result<u16, SprError> {
		self.palette.and_then(|p| p.get(index)).ok_or_else(|| {
			SprError::corrupt(
				self.variant,
				block,
				format!(
					"palette index {index} out of range ({} colors)",
					self.palette.map_or(0, Palette::len)
				),
			)
		})
	}
}

fn payload_error(variant: Variant, block: usize, err: SprError) -> SprError {
	match err {
		SprError::TruncatedData {
			offset,
			needed,
			available,
			..
		} => SprError::corrupt(
			variant,
			block,
			format!("payload ends early: need {needed} bytes at {offset}, {available} left"),
		),
		other => other,
	}
}

/// Walks a classic-family block, handing each segment's raw pixel bytes to
/// `visit` together with its destination `(x, y)`.
fn walk_classic<'a>(
	data: &'a [u8],
	ctx: &BlockContext<'_>,
	block: usize,
	mut visit: impl FnMut(usize, usize, &'a [u8]) -> Result<(), SprError>,
) -> Result<(), SprError> {
	let bpp = ctx.encoding().bytes_per_pixel();
	let mut reader = ByteReader::new(data, ctx.variant);

	let mut walk = || -> Result<(), SprError> {
		let start_x = reader.u8()? as usize;
		let start_y = reader.u8()? as usize;
		let _reserved = reader.u8()?;
		let line_count = reader.u8()? as usize;
		if start_y + line_count > ctx.edge {
			return Err(SprError::corrupt(
				ctx.variant,
				block,
				format!("lines {start_y}..{} exceed edge {}", start_y + line_count, ctx.edge),
			));
		}

		for y in start_y..start_y + line_count {
			let segments = reader.u8()?;
			let mut x = start_x;
			for _ in 0..segments {
				let skip = reader.u8()? as usize;
				let count = reader.u8()? as usize;
				x += skip / 2;
				if x + count > ctx.edge {
					return Err(SprError::corrupt(
						ctx.variant,
						block,
						format!("row {y}: run {x}..{} exceeds edge {}", x + count, ctx.edge),
					));
				}
				let bytes = reader.take(count * bpp)?;
				visit(x, y, bytes)?;
				x += count;
			}
		}
		Ok(())
	};

	walk().map_err(|e| payload_error(ctx.variant, block, e))
}

/// Validates a classic-family block without decoding it.
///
/// Raw colors are fed to `selector`; palette indices are range-checked.
pub(crate) fn scan_classic(
	data: &[u8],
	ctx: &BlockContext<'_>,
	block: usize,
	selector: &mut MaskSelector,
) -> Result<BlockSummary, SprError> {
	let mut summary = BlockSummary::default();
	let encoding = ctx.encoding();
	walk_classic(data, ctx, block, |x, y, bytes| {
		match encoding {
			PixelEncoding::Indexed => {
				for &index in bytes {
					ctx.lookup(block, index)?;
				}
			}
			PixelEncoding::Direct => {
				selector.observe_all(
					bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])),
				);
			}
		}
		summary.record(x, y, bytes.len() / encoding.bytes_per_pixel());
		Ok(())
	})?;
	Ok(summary)
}

/// Decodes a classic-family block into a tile filled with `mask`.
pub(crate) fn decode_classic(
	data: &[u8],
	ctx: &BlockContext<'_>,
	block: usize,
	mask: u16,
) -> Result<Tile, SprError> {
	let mut tile = Tile::blank(ctx.edge, mask);
	match ctx.encoding() {
		PixelEncoding::Indexed => walk_classic(data, ctx, block, |x, y, bytes| {
			for (i, &index) in bytes.iter().enumerate() {
				tile.set(x + i, y, ctx.lookup(block, index)?);
			}
			Ok(())
		})?,
		PixelEncoding::Direct => walk_classic(data, ctx, block, |x, y, bytes| {
			for (i, c) in bytes.chunks_exact(2).enumerate() {
				tile.set(x + i, y, u16::from_le_bytes([c[0], c[1]]));
			}
			Ok(())
		})?,
	}
	Ok(tile)
}

/// Encodes a tile as a direct-color classic block.
///
/// The line range and start column are restricted to the tile's content box,
/// and blank rows inside that range become zero-segment lines. A blank tile
/// encodes as a bare header with no lines.
pub(crate) fn encode_classic(tile: &Tile, mask: u16) -> Vec<u8> {
	let Some(bounds) = tile.content_bounds(mask) else {
		return vec![0; BLOCK_HEADER_SIZE];
	};

	let start_x = bounds.left as usize;
	let mut out = Vec::with_capacity(BLOCK_HEADER_SIZE + tile.pixels().len() * 2);
	out.push(start_x as u8);
	out.push(bounds.top as u8);
	out.push(0);
	out.push(bounds.height() as u8);

	let mut runs = Vec::new();
	for y in bounds.top as usize..bounds.bottom as usize {
		let row = tile.row(y);

		runs.clear();
		let mut x = start_x;
		while x < row.len() {
			if row[x] == mask {
				x += 1;
				continue;
			}
			let run_start = x;
			while x < row.len() && row[x] != mask {
				x += 1;
			}
			runs.push(run_start..x);
		}

		out.push(runs.len() as u8);
		let mut cursor = start_x;
		for run in &runs {
			out.push(((run.start - cursor) * 2) as u8);
			out.push(run.len() as u8);
			for &color in &row[run.clone()] {
				out.extend_from_slice(&color.to_le_bytes());
			}
			cursor = run.end;
		}
	}
	out
}

/// Walks a mobile block, pulling pixel indices from `pixels` in parse order.
///
/// Returns the number of indices consumed. Running out of indices is reported
/// as [`SprError::TruncatedData`] with an offset relative to `pixels`.
fn walk_mobile<'a>(
	payload: &[u8],
	pixels: &'a [u8],
	ctx: &BlockContext<'_>,
	block: usize,
	mut visit: impl FnMut(usize, usize, &'a [u8]) -> Result<(), SprError>,
) -> Result<usize, SprError> {
	if payload.len() % 2 != 0 {
		return Err(SprError::corrupt(
			ctx.variant,
			block,
			format!("payload length {} is not a whole number of entries", payload.len()),
		));
	}

	let mut entries = payload.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]]));
	let mut consumed = 0usize;
	let mut y = 0usize;

	let mut segment = |value: u16, y: usize, consumed: &mut usize| -> Result<(), SprError> {
		let x = (value % 32) as usize;
		let count = (value / 32) as usize;
		if count == 0 {
			return Ok(());
		}
		if y >= ctx.edge || x + count > ctx.edge {
			return Err(SprError::corrupt(
				ctx.variant,
				block,
				format!("row {y}: run {x}..{} outside {1}×{1} tile", x + count, ctx.edge),
			));
		}
		let Some(run) = pixels.get(*consumed..*consumed + count) else {
			return Err(SprError::truncated(
				ctx.variant,
				*consumed,
				count,
				pixels.len() - *consumed,
			));
		};
		*consumed += count;
		visit(x, y, run)
	};

	while let Some(value) = entries.next() {
		if value > BLANK_ROW_THRESHOLD {
			y += (value / 1024 - 1) as usize;
		} else if value < COUNT_PREFIX_LIMIT {
			for _ in 0..value {
				let Some(entry) = entries.next() else {
					return Err(SprError::corrupt(
						ctx.variant,
						block,
						format!("row {y}: count prefix {value} runs past the payload"),
					));
				};
				segment(entry, y, &mut consumed)?;
			}
			y += 1;
		} else {
			segment(value, y, &mut consumed)?;
			y += 1;
		}
	}

	Ok(consumed)
}

/// Validates a mobile block and returns how much of `pixels` it uses.
pub(crate) fn scan_mobile(
	payload: &[u8],
	pixels: &[u8],
	ctx: &BlockContext<'_>,
	block: usize,
) -> Result<BlockSummary, SprError> {
	let mut summary = BlockSummary::default();
	walk_mobile(payload, pixels, ctx, block, |x, y, run| {
		for &index in run {
			ctx.lookup(block, index)?;
		}
		summary.record(x, y, run.len());
		Ok(())
	})?;
	Ok(summary)
}

/// Decodes a mobile block whose pixel indices start at `pixels[0]`.
pub(crate) fn decode_mobile(
	payload: &[u8],
	pixels: &[u8],
	ctx: &BlockContext<'_>,
	block: usize,
	mask: u16,
) -> Result<Tile, SprError> {
	let mut tile = Tile::blank(ctx.edge, mask);
	walk_mobile(payload, pixels, ctx, block, |x, y, run| {
		for (i, &index) in run.iter().enumerate() {
			tile.set(x + i, y, ctx.lookup(block, index)?);
		}
		Ok(())
	})?;
	Ok(tile)
}
