//! Shared block table with lazy tile decoding.

use std::fmt;
use std::sync::OnceLock;

use crate::file::SprError;

use super::Variant;
use super::palette::Palette;
use super::rle::{self, BlockContext, BlockSummary};
use super::tile::{Bounds, Tile};

/// Index of a tile in a [`BlockTable`].
pub type BlockId = u32;

/// One entry of the block table.
#[derive(Debug)]
pub(crate) enum Slot {
	/// Already decoded pixels
	Decoded(Tile),

	/// Validated but still encoded; decoded on first access
	Encoded {
		payload: Vec<u8>,
		/// Palette indices of a mobile block, empty otherwise
		pixels: Vec<u8>,
		summary: BlockSummary,
		cache: OnceLock<Tile>,
	},

	/// Failed validation during a best-effort decode
	Defective(SprError),
}

impl Slot {
	pub(crate) fn encoded(payload: Vec<u8>, pixels: Vec<u8>, summary: BlockSummary) -> Self {
		Slot::Encoded {
			payload,
			pixels,
			summary,
			cache: OnceLock::new(),
		}
	}
}

/// Unique tiles of a sprite, shared by every frame (and every direction of a
/// mobile sprite) that places them.
///
/// The table is never mutated after construction. Encoded entries are decoded
/// the first time [`BlockTable::tile`] asks for them and cached; the cache is
/// filled at most once, so a table can be shared across threads.
#[derive(Debug)]
pub struct BlockTable {
	variant: Variant,
	edge: usize,
	mask: u16,
	palette: Option<Palette>,
	slots: Vec<Slot>,
}

impl BlockTable {
	pub(crate) fn new(
		variant: Variant,
		mask: u16,
		palette: Option<Palette>,
		slots: Vec<Slot>,
	) -> Self {
		Self {
			variant,
			edge: variant.tile_edge(),
			mask,
			palette,
			slots,
		}
	}

	/// Builds a table from already-decoded tiles.
	///
	/// # Panics
	///
	/// Panics if a tile's edge differs from the variant's tile edge.
	pub fn from_tiles(
		variant: Variant,
		mask: u16,
		palette: Option<Palette>,
		tiles: Vec<Tile>,
	) -> Self {
		let edge = variant.tile_edge();
		assert!(tiles.iter().all(|t| t.edge() == edge), "Tile edge does not match the variant");
		Self::new(variant, mask, palette, tiles.into_iter().map(Slot::Decoded).collect())
	}

	/// Returns the variant the blocks were read from.
	#[inline]
	pub fn variant(&self) -> Variant {
		self.variant
	}

	/// Returns the tile edge length in pixels.
	#[inline]
	pub fn edge(&self) -> usize {
		self.edge
	}

	/// Returns the color that marks transparent tile pixels.
	#[inline]
	pub fn mask_color(&self) -> u16 {
		self.mask
	}

	/// Returns the palette indexed blocks resolve through, if any.
	#[inline]
	pub fn palette(&self) -> Option<&Palette> {
		self.palette.as_ref()
	}

	/// Returns the number of blocks.
	#[inline]
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Returns `true` if the table holds no blocks.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Returns `true` if block `id` exists.
	#[inline]
	pub fn contains(&self, id: BlockId) -> bool {
		(id as usize) < self.slots.len()
	}

	/// Returns the error that made block `id` unusable, if it is defective.
	pub fn defect(&self, id: BlockId) -> Option<&SprError> {
		match self.slots.get(id as usize) {
			Some(Slot::Defective(err)) => Some(err),
			_ => None,
		}
	}

	/// Returns the number of defective blocks.
	pub fn defect_count(&self) -> usize {
		self.slots.iter().filter(|s| matches!(s, Slot::Defective(_))).count()
	}

	/// Returns the decoded tile for block `id`, decoding it on first use.
	pub fn tile(&self, id: BlockId) -> Result<&Tile, SprError> {
		let index = id as usize;
		let Some(slot) = self.slots.get(index) else {
			return Err(self.missing(index));
		};
		match slot {
			Slot::Decoded(tile) => Ok(tile),
			Slot::Defective(err) => Err(err.clone()),
			Slot::Encoded {
				payload,
				pixels,
				cache,
				..
			} => {
				if let Some(tile) = cache.get() {
					return Ok(tile);
				}
				let ctx = BlockContext {
					variant: self.variant,
					edge: self.edge,
					palette: self.palette.as_ref(),
				};
				let tile = match self.variant {
					Variant::Mobile => rle::decode_mobile(payload, pixels, &ctx, index, self.mask)?,
					Variant::Classic | Variant::Remastered => {
						rle::decode_classic(payload, &ctx, index, self.mask)?
					}
				};
				log::trace!("Decoded {} block #{index}", self.variant);
				Ok(cache.get_or_init(|| tile))
			}
		}
	}

	/// Returns the tile-local box around the opaque pixels of block `id`, or
	/// `None` for a blank tile.
	///
	/// Encoded blocks answer from their validation summary without decoding.
	pub fn content_bounds(&self, id: BlockId) -> Result<Option<Bounds>, SprError> {
		let index = id as usize;
		match self.slots.get(index) {
			None => Err(self.missing(index)),
			Some(Slot::Decoded(tile)) => Ok(tile.content_bounds(self.mask)),
			Some(Slot::Encoded {
				summary,
				..
			}) => Ok(summary.content),
			Some(Slot::Defective(err)) => Err(err.clone()),
		}
	}

	/// Returns the MD5 digest of block `id`'s decoded pixels.
	pub fn digest(&self, id: BlockId) -> Result<[u8; 16], SprError> {
		self.tile(id).map(Tile::digest)
	}

	fn missing(&self, index: usize) -> SprError {
		SprError::corrupt(
			self.variant,
			index,
			format!("no such block, the table holds {}", self.slots.len()),
		)
	}
}

impl fmt::Display for BlockTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} blocks of {}×{} (mask 0x{:04X})",
			self.slots.len(),
			self.edge,
			self.edge,
			self.mask
		)
	}
}
