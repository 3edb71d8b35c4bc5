//! Frame assembly: footprint bounds and tile compositing.

use log::warn;

use crate::file::SprError;

use super::block::BlockTable;
use super::frame::{Frame, FramePixels, MAX_FRAME_PIXELS, Placement, RawFrame};
use super::grid;
use super::tile::Bounds;
use super::{DecodeOptions, Variant};

/// Returns the pixel-space origin of a placement's tile.
pub(crate) fn placement_origin(variant: Variant, placement: &Placement) -> (i32, i32) {
	let edge = variant.tile_edge() as i32;
	let (a, b) = (i32::from(placement.a), i32::from(placement.b));
	if variant.corrects_negative_a() {
		grid::tile_origin(a, b, edge)
	} else {
		grid::classic_tile_origin(a, b, edge)
	}
}

/// Unions the opaque footprints of `placements`.
///
/// Returns `None` when every placed tile is blank.
pub(crate) fn footprint(
	frame: usize,
	placements: &[Placement],
	blocks: &BlockTable,
) -> Result<Option<Bounds>, SprError> {
	let mut bounds: Option<Bounds> = None;
	for placement in placements {
		if !blocks.contains(placement.block) {
			return Err(SprError::InvalidBlockReference {
				variant: blocks.variant(),
				frame,
				block: placement.block,
				count: blocks.len(),
			});
		}
		let Some(content) = blocks.content_bounds(placement.block)? else {
			continue;
		};
		let (x, y) = placement_origin(blocks.variant(), placement);
		let placed = content.translate(x, y);
		bounds = Some(bounds.map_or(placed, |b| b.union(&placed)));
	}
	Ok(bounds)
}

/// Rejects footprints larger than [`MAX_FRAME_PIXELS`].
fn check_canvas(variant: Variant, frame: usize, bounds: Bounds) -> Result<Bounds, SprError> {
	let area = u64::from(bounds.width()) * u64::from(bounds.height());
	if area > MAX_FRAME_PIXELS as u64 {
		let (width, height) = (bounds.width(), bounds.height());
		return Err(SprError::malformed(
			variant,
			format!("frame {frame} spans {width} x {height} pixels, above {MAX_FRAME_PIXELS}"),
		));
	}
	Ok(bounds)
}

/// Resolves every raw frame against the block table.
///
/// In strict mode the first bad reference, defective block or oversized
/// footprint fails the call; in best-effort mode it is stored on the frame
/// instead.
pub(crate) fn assemble_frames(
	raw_frames: Vec<RawFrame>,
	blocks: &BlockTable,
	options: &DecodeOptions,
) -> Result<Vec<Frame>, SprError> {
	let mut frames = Vec::with_capacity(raw_frames.len());
	for (index, raw) in raw_frames.into_iter().enumerate() {
		let declared = raw.declared_bounds();
		let checked = footprint(index, &raw.placements, blocks).and_then(|bounds| {
			bounds
				.map(|b| check_canvas(blocks.variant(), index, b))
				.transpose()
		});
		match checked {
			Ok(Some(bounds)) => frames.push(Frame::new(raw, bounds, None)),
			Ok(None) => {
				let bounds = Bounds::from_origin(declared.left, declared.top, 1, 1);
				frames.push(Frame::new(raw, bounds, None));
			}
			Err(err) if options.is_best_effort() => {
				warn!("Frame #{index} cannot be assembled: {err}");
				frames.push(Frame::new(raw, declared, Some(err)));
			}
			Err(err) => return Err(err),
		}
	}
	Ok(frames)
}

/// Paints a frame's tiles onto a mask-filled canvas in placement order.
///
/// Mask pixels never overwrite; among opaque pixels the last placement wins.
pub(crate) fn compose(frame: &Frame, blocks: &BlockTable) -> Result<FramePixels, SprError> {
	if let Some(err) = frame.defect() {
		return Err(err.clone());
	}

	let mask = blocks.mask_color();
	let (left, top) = (frame.left(), frame.top());
	let mut canvas = FramePixels::new(left, top, frame.width(), frame.height(), mask);
	let (width, height) = (i64::from(frame.width()), i64::from(frame.height()));

	for placement in frame.placements() {
		let tile = blocks.tile(placement.block)?;
		let (ox, oy) = placement_origin(blocks.variant(), placement);
		let dx = i64::from(ox) - i64::from(frame.left());
		let dy = i64::from(oy) - i64::from(frame.top());

		for ty in 0..tile.edge() {
			let y = dy + ty as i64;
			if y < 0 || y >= height {
				continue;
			}
			for (tx, &color) in tile.row(ty).iter().enumerate() {
				let x = dx + tx as i64;
				if color == mask || x < 0 || x >= width {
					continue;
				}
				canvas.set(x as u32, y as u32, color);
			}
		}
	}
	Ok(canvas)
}
