//! Classic container writer and cross-format converter.
//!
//! Frames are cut into `24 × 24` cells on the absolute pixel grid. Fully
//! transparent cells are dropped, cells with identical opaque pixels are stored
//! once (keyed by the MD5 digest of their encoded payload, confirmed by comparing
//! the payload bytes), and every frame header lists its cells as `(A, B)`
//! placements computed with [`grid_to_stored`](super::grid::grid_to_stored).
//!
//! The placements are written for the corrected tile origin. Reading the
//! output back with [`decode_classic`](super::decode_classic), which omits the
//! negative-`A` correction, shifts cells with odd negative `A` by half a tile.

use std::collections::HashMap;

use log::{debug, warn};
use md5::{Digest, Md5};

use super::frame::{FramePixels, MAX_FRAME_PIXELS};
use super::mask::MaskSelector;
use super::palette::ColorFormat;
use super::rle;
use super::sprite::SpriteSet;
use super::tile::{Bounds, Tile};
use super::{Variant, grid};

/// Largest frame count a classic container can hold; `0xFF` would read back as
/// the palette sentinel.
pub const MAX_CLASSIC_FRAMES: usize = 254;

/// Largest block count addressable by a 16-bit block id.
pub const MAX_CLASSIC_BLOCKS: usize = u16::MAX as usize + 1;

/// Horizontal pixel extent reachable by classic placements, as `±` this value.
///
/// Covers every cell whose `(A, B)` fits in a signed byte.
const CLASSIC_EXTENT_X: i64 = 192 * 24;

/// Vertical pixel extent reachable by classic placements, as `±` this value.
const CLASSIC_EXTENT_Y: i64 = 96 * 24;

/// One placement as the writer emits it.
#[derive(Debug, Clone, Copy)]
struct CellPlacement {
	a: i8,
	b: i8,
	kind: u8,
	block: u16,
}

/// Frame header as the writer emits it.
#[derive(Debug, Clone, Default)]
struct FrameRecord {
	bounds: Option<Bounds>,
	extra: [u16; 2],
	placements: Vec<CellPlacement>,
}

/// Deduplicating store of encoded tiles.
///
/// The payload only describes opaque pixels, so two tiles painted under
/// different mask colors still share an entry.
#[derive(Debug, Default)]
struct TileStore {
	index: HashMap<[u8; 16], Vec<u16>>,
	payloads: Vec<Vec<u8>>,
}

impl TileStore {
	/// Returns the id of a stored tile with the same opaque pixels, or stores
	/// this one.
	///
	/// Returns `None` once the 16-bit id space is exhausted.
	fn intern(&mut self, tile: &Tile, mask: u16) -> Option<u16> {
		let payload = rle::encode_classic(tile, mask);
		let digest: [u8; 16] = Md5::digest(&payload).into();
		let stored = self.index.get(&digest).and_then(|ids| {
			ids.iter().find(|&&id| self.payloads[id as usize] == payload)
		});
		if let Some(&id) = stored {
			return Some(id);
		}
		if self.payloads.len() >= MAX_CLASSIC_BLOCKS {
			return None;
		}
		let id = self.payloads.len() as u16;
		self.payloads.push(payload);
		self.index.entry(digest).or_default().push(id);
		Some(id)
	}

	fn len(&self) -> usize {
		self.payloads.len()
	}
}

fn clamp_i16(value: i32) -> i16 {
	value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Encodes assembled frames as a classic container.
///
/// `type_per_frame[i]` becomes the type byte of every placement of frame `i`
/// (0 when missing). Frames beyond [`MAX_CLASSIC_FRAMES`], cells whose `(A, B)`
/// does not fit in a byte, and cells beyond the 16-bit block id space are
/// dropped with a warning. A frame with no opaque cell becomes a one-pixel
/// placeholder. The two opaque header words are written as zero.
pub fn encode_classic(frames: &[FramePixels], type_per_frame: &[u8]) -> Vec<u8> {
	encode_classic_with_extra(frames, type_per_frame, &[])
}

/// Encodes assembled frames as a classic container, writing
/// `extra_per_frame[i]` into the opaque header words of frame `i`.
///
/// Missing entries are written as zero. Otherwise behaves like
/// [`encode_classic`].
pub fn encode_classic_with_extra(
	frames: &[FramePixels],
	type_per_frame: &[u8],
	extra_per_frame: &[[u16; 2]],
) -> Vec<u8> {
	let edge = Variant::Classic.tile_edge();
	if frames.len() > MAX_CLASSIC_FRAMES {
		warn!(
			"Dropping {} frames beyond the classic limit of {MAX_CLASSIC_FRAMES}",
			frames.len() - MAX_CLASSIC_FRAMES
		);
	}

	let mut store = TileStore::default();
	let mut records = Vec::with_capacity(frames.len().min(MAX_CLASSIC_FRAMES));
	for (index, frame) in frames.iter().take(MAX_CLASSIC_FRAMES).enumerate() {
		let kind = type_per_frame.get(index).copied().unwrap_or(0);
		let mut record = tile_frame(index, frame, kind, edge, &mut store);
		record.extra = extra_per_frame.get(index).copied().unwrap_or_default();
		records.push(record);
	}

	debug!("Encoded {} frames into {} unique blocks", records.len(), store.len());
	serialize(&records, &store)
}

/// Cuts one frame into cells and registers them.
fn tile_frame(
	index: usize,
	frame: &FramePixels,
	kind: u8,
	edge: usize,
	store: &mut TileStore,
) -> FrameRecord {
	let mut record = FrameRecord::default();
	if frame.width() == 0 || frame.height() == 0 {
		return record;
	}

	let e = edge as i32;
	let area = frame.bounds();
	let mask = frame.mask_color();
	for gy in area.top.div_euclid(e)..=(area.bottom - 1).div_euclid(e) {
		for gx in area.left.div_euclid(e)..=(area.right - 1).div_euclid(e) {
			let (ox, oy) = (gx * e, gy * e);
			let mut tile = Tile::blank(edge, mask);
			for ty in 0..edge {
				for tx in 0..edge {
					if let Some(color) = frame.get_absolute(ox + tx as i32, oy + ty as i32) {
						tile.set(tx, ty, color);
					}
				}
			}
			if tile.is_blank(mask) {
				continue;
			}

			let (a, b) = grid::grid_to_stored(gx, gy);
			let (Ok(a), Ok(b)) = (i8::try_from(a), i8::try_from(b)) else {
				warn!("Frame #{index}: dropping cell ({gx}, {gy}), ({a}, {b}) is out of range");
				continue;
			};
			let Some(block) = store.intern(&tile, mask) else {
				warn!("Frame #{index}: dropping cell ({gx}, {gy}), block table is full");
				continue;
			};

			let cell = Bounds::from_origin(ox, oy, edge as u32, edge as u32);
			record.bounds = Some(record.bounds.map_or(cell, |b| b.union(&cell)));
			record.placements.push(CellPlacement {
				a,
				b,
				kind,
				block,
			});
		}
	}
	record
}

fn serialize(records: &[FrameRecord], store: &TileStore) -> Vec<u8> {
	let data_len: usize = store.payloads.iter().map(Vec::len).sum();
	let header_len = 1 + records.len() * 32 + store.len() * 4 + 8;
	let mut out = Vec::with_capacity(header_len + data_len);

	out.push(records.len() as u8);
	for record in records {
		// Placeholder frames keep an all-zero header
		let (left, top, right, bottom) = record.bounds.map_or((0, 0, 0, 0), |b| {
			(clamp_i16(b.left), clamp_i16(b.top), clamp_i16(b.right - 1), clamp_i16(b.bottom - 1))
		});
		for value in [left, top, right, bottom] {
			out.extend_from_slice(&value.to_le_bytes());
		}
		for value in record.extra {
			out.extend_from_slice(&value.to_le_bytes());
		}
		out.extend_from_slice(&(record.placements.len() as u16).to_le_bytes());
		for placement in &record.placements {
			out.push(placement.a as u8);
			out.push(placement.b as u8);
			out.push(placement.kind);
			out.extend_from_slice(&placement.block.to_le_bytes());
		}
	}

	out.extend_from_slice(&(store.payloads.len() as u32).to_le_bytes());
	let mut offset = 0u32;
	for payload in &store.payloads {
		out.extend_from_slice(&offset.to_le_bytes());
		offset += payload.len() as u32;
	}
	out.extend_from_slice(&offset.to_le_bytes());
	for payload in &store.payloads {
		out.extend_from_slice(payload);
	}
	out
}

/// Re-encodes any decoded sprite set as a classic container.
///
/// Colors are converted to RGB555 and frames are scaled by `scale` with
/// nearest-neighbour sampling. One mask color, chosen from the colors the
/// converted frames actually use, covers the whole output so that identical
/// tiles in different frames share a block. Scaled frames are cropped to the
/// area classic placements can address and to [`MAX_FRAME_PIXELS`]. Frames
/// that fail to render become blank placeholders. A non-finite or
/// non-positive `scale` is treated as 1.0. The opaque header words of every
/// frame are carried over.
pub fn convert_to_classic(source: SpriteSet, scale: f64) -> Vec<u8> {
	let scale = if scale.is_finite() && scale > 0.0 {
		scale
	} else {
		warn!("Invalid scale {scale}, using 1.0");
		1.0
	};
	let format = source.color_format();

	let mut selector = MaskSelector::new();
	let mut scaled = Vec::with_capacity(source.frame_count());
	let mut kinds = Vec::with_capacity(source.frame_count());
	let mut extras = Vec::with_capacity(source.frame_count());
	for (index, rendered) in source.render_all().into_iter().enumerate() {
		let frame = &source.frames()[index];
		kinds.push(frame.kind());
		extras.push(frame.extra());
		match rendered {
			Ok(pixels) => scaled.push(rescale(index, &pixels, format, scale, &mut selector)),
			Err(err) => {
				warn!("Frame #{index} cannot be rendered, writing a placeholder: {err}");
				scaled.push(ScaledFrame::placeholder());
			}
		}
	}

	let mask = selector.select();
	debug!(
		"Converting {} {} frames at scale {scale}, mask 0x{mask:04X}",
		scaled.len(),
		source.variant()
	);
	let frames: Vec<_> = scaled.into_iter().map(|frame| frame.into_pixels(mask)).collect();
	encode_classic_with_extra(&frames, &kinds, &extras)
}

/// A resampled frame whose transparent pixels are still unassigned.
#[derive(Debug)]
struct ScaledFrame {
	left: i32,
	top: i32,
	width: u32,
	height: u32,
	pixels: Vec<Option<u16>>,
}

impl ScaledFrame {
	fn placeholder() -> Self {
		Self {
			left: 0,
			top: 0,
			width: 1,
			height: 1,
			pixels: vec![None],
		}
	}

	fn into_pixels(self, mask: u16) -> FramePixels {
		let pixels = self.pixels.into_iter().map(|p| p.unwrap_or(mask)).collect();
		FramePixels::from_pixels(self.left, self.top, self.width, self.height, pixels, mask)
	}
}

/// Converts colors to RGB555 and resamples one frame, recording the colors it
/// uses in `selector`.
///
/// The scaled rectangle is cropped to the classic addressable area, then rows
/// are cut from the bottom until it fits in [`MAX_FRAME_PIXELS`].
fn rescale(
	index: usize,
	source: &FramePixels,
	format: ColorFormat,
	scale: f64,
	selector: &mut MaskSelector,
) -> ScaledFrame {
	// Float to integer casts saturate, so huge scales stay finite here
	let scaled = |v: f64| (v * scale).round() as i64;
	let left = scaled(f64::from(source.left()));
	let top = scaled(f64::from(source.top()));
	let right = left.saturating_add(scaled(f64::from(source.width())).max(1));
	let bottom = top.saturating_add(scaled(f64::from(source.height())).max(1));

	let x0 = left.max(-CLASSIC_EXTENT_X);
	let x1 = right.min(CLASSIC_EXTENT_X);
	let y0 = top.max(-CLASSIC_EXTENT_Y);
	let mut y1 = bottom.min(CLASSIC_EXTENT_Y);
	if x0 >= x1 || y0 >= y1 {
		warn!("Frame #{index} lies outside the classic addressable area after scaling");
		return ScaledFrame::placeholder();
	}
	let width = (x1 - x0) as u64;
	let max_rows = (MAX_FRAME_PIXELS as u64 / width).max(1);
	if ((y1 - y0) as u64) > max_rows {
		warn!("Frame #{index}: cropping scaled frame to {width} x {max_rows} pixels");
		y1 = y0 + max_rows as i64;
	}
	if (x0, x1, y0, y1) != (left, right, top, bottom) {
		debug!("Frame #{index}: scaled area cropped to ({x0}, {y0})..({x1}, {y1})");
	}

	let src_mask = source.mask_color();
	let sample = |offset: i64, limit: u32| {
		let v = ((offset as f64 + 0.5) / scale) as u32;
		v.min(limit.saturating_sub(1))
	};
	let mut pixels = Vec::with_capacity(width as usize * (y1 - y0) as usize);
	for y in y0..y1 {
		let sy = sample(y - top, source.height());
		for x in x0..x1 {
			let sx = sample(x - left, source.width());
			let color = source.get(sx, sy).unwrap_or(src_mask);
			let converted = (color != src_mask).then(|| format.convert(color, ColorFormat::Rgb555));
			if let Some(c) = converted {
				selector.observe(c);
			}
			pixels.push(converted);
		}
	}

	ScaledFrame {
		left: x0 as i32,
		top: y0 as i32,
		width: width as u32,
		height: (y1 - y0) as u32,
		pixels,
	}
}
