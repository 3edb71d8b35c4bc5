//! Decoded sprite sets.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::file::SprError;

use super::Variant;
use super::assemble;
use super::block::{BlockId, BlockTable};
use super::frame::{Frame, FramePixels};
use super::palette::{ColorFormat, Palette};
use super::tile::Tile;

/// Result of decoding one sprite container (or one direction of a mobile
/// container).
///
/// Immutable once built. Cloning is cheap: the block table is shared.
#[derive(Debug, Clone)]
pub struct SpriteSet {
	variant: Variant,
	frames: Vec<Frame>,
	blocks: Arc<BlockTable>,
}

impl SpriteSet {
	pub(crate) fn new(variant: Variant, frames: Vec<Frame>, blocks: Arc<BlockTable>) -> Self {
		Self {
			variant,
			frames,
			blocks,
		}
	}

	/// Returns the variant this set was decoded from.
	#[inline]
	pub fn variant(&self) -> Variant {
		self.variant
	}

	/// Returns the palette, if the container carried one.
	#[inline]
	pub fn palette(&self) -> Option<&Palette> {
		self.blocks.palette()
	}

	/// Returns the transparency color shared by every tile and frame.
	#[inline]
	pub fn mask_color(&self) -> u16 {
		self.blocks.mask_color()
	}

	/// Returns the layout of the rendered pixels.
	#[inline]
	pub fn color_format(&self) -> ColorFormat {
		self.variant.color_format()
	}

	/// Returns all frames.
	#[inline]
	pub fn frames(&self) -> &[Frame] {
		&self.frames
	}

	/// Returns the frame at `index`.
	#[inline]
	pub fn frame(&self, index: usize) -> Option<&Frame> {
		self.frames.get(index)
	}

	/// Returns the number of frames.
	#[inline]
	pub fn frame_count(&self) -> usize {
		self.frames.len()
	}

	/// Returns the shared block table.
	#[inline]
	pub fn blocks(&self) -> &BlockTable {
		&self.blocks
	}

	/// Returns the decoded tile for block `id`.
	pub fn tile(&self, id: BlockId) -> Result<&Tile, SprError> {
		self.blocks.tile(id)
	}

	/// Assembles frame `index` into a pixel canvas.
	///
	/// Frames marked defective by a best-effort decode return their stored
	/// error.
	///
	/// # Panics
	///
	/// Panics if `index` is not less than [`SpriteSet::frame_count`].
	pub fn render(&self, index: usize) -> Result<FramePixels, SprError> {
		assemble::compose(&self.frames[index], &self.blocks)
	}

	/// Assembles every frame.
	pub fn render_all(&self) -> Vec<Result<FramePixels, SprError>> {
		self.frames.iter().map(|frame| assemble::compose(frame, &self.blocks)).collect()
	}

	/// Returns the number of frames that cannot be rendered.
	pub fn defective_frames(&self) -> usize {
		self.frames.iter().filter(|f| !f.is_intact()).count()
	}
}

impl fmt::Display for SpriteSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} sprite, {} frames, {}", self.variant, self.frames.len(), self.blocks)?;
		if let Some(palette) = self.palette() {
			write!(f, ", {palette}")?;
		}
		Ok(())
	}
}

/// Result of decoding a mobile container: one [`SpriteSet`] per direction.
///
/// Every direction shares the same palette, mask color and block table.
#[derive(Debug, Clone)]
pub struct DirectionalSpriteSet {
	directions: BTreeMap<u8, SpriteSet>,
	blocks: Arc<BlockTable>,
}

impl DirectionalSpriteSet {
	pub(crate) fn new(directions: BTreeMap<u8, SpriteSet>, blocks: Arc<BlockTable>) -> Self {
		Self {
			directions,
			blocks,
		}
	}

	/// Returns the sprite set for `direction`.
	#[inline]
	pub fn direction(&self, direction: u8) -> Option<&SpriteSet> {
		self.directions.get(&direction)
	}

	/// Iterates over `(direction, set)` pairs in ascending direction order.
	pub fn iter(&self) -> impl Iterator<Item = (u8, &SpriteSet)> {
		self.directions.iter().map(|(&d, set)| (d, set))
	}

	/// Returns the direction indices present.
	pub fn direction_indices(&self) -> Vec<u8> {
		self.directions.keys().copied().collect()
	}

	/// Returns the number of directions.
	#[inline]
	pub fn len(&self) -> usize {
		self.directions.len()
	}

	/// Returns `true` if there are no directions.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.directions.is_empty()
	}

	/// Returns the total number of frames across all directions.
	pub fn frame_count(&self) -> usize {
		self.directions.values().map(SpriteSet::frame_count).sum()
	}

	/// Returns the shared palette.
	#[inline]
	pub fn palette(&self) -> Option<&Palette> {
		self.blocks.palette()
	}

	/// Returns the shared transparency color.
	#[inline]
	pub fn mask_color(&self) -> u16 {
		self.blocks.mask_color()
	}

	/// Returns the shared block table.
	#[inline]
	pub fn blocks(&self) -> &BlockTable {
		&self.blocks
	}

	/// Consumes the set and returns the per-direction map.
	pub fn into_directions(self) -> BTreeMap<u8, SpriteSet> {
		self.directions
	}
}

impl fmt::Display for DirectionalSpriteSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"mobile sprite, {} directions, {} frames, {}",
			self.directions.len(),
			self.frame_count(),
			self.blocks
		)
	}
}
