//! Tile-sprite container support for `isospr-rs`.
//!
//! This module decodes and encodes the three sprite container variants of the
//! legacy isometric client. All of them describe an animation frame as a sparse
//! isometric grid of square tiles ("blocks"), each compressed with a scanline
//! RLE scheme, and all of them decode into the same model: a [`SpriteSet`]
//! with an optional [`Palette`], a mask color, a list of [`Frame`]s and a
//! shared [`BlockTable`].
//!
//! # Variants
//!
//! | Variant      | Tile edge | Color                   | Outer layer | Directions |
//! |--------------|-----------|-------------------------|-------------|------------|
//! | `Classic`    | 24        | RGB555, optional palette| none        | 1          |
//! | `Remastered` | 48        | RGB555, optional palette| none        | 1          |
//! | `Mobile`     | 24        | RGB565 palette          | Brotli      | 4 or 8     |
//!
//! # Classic Layout
//!
//! ```text
//! u8  frame_count                  0xFF means a palette follows:
//!     [u8 palette_len (0 = 256), palette_len × u16 color, u8 frame_count]
//! frame_count × {
//!     i16 left, i16 top, i16 right, i16 bottom
//!     u16 unknown_1, u16 unknown_2
//!     u16 placement_count          (u32 in the remastered variant)
//!     placement_count × { i8 a, i8 b, u8 type, u16 block_id }
//!                                  (block_id is u32 in the remastered variant)
//! }
//! u32 block_count
//! block_count × u32 offset        relative to the block data region
//! u32 end_offset
//! block data region
//! ```
//!
//! Each block starts with `u8 start_x, u8 start_y, u8 reserved, u8 line_count`
//! followed by per-line segment lists. The mobile layout is described in
//! [`mobile`] and the placement math in [`grid`].
//!
//! # Usage Examples
//!
//! ## Decoding and rendering
//!
//! ```no_run
//! use isospr_types::file::spr::decode_classic;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("0-12.spr")?;
//! let sprite = decode_classic(&bytes)?;
//!
//! for (index, frame) in sprite.frames().iter().enumerate() {
//!     let pixels = sprite.render(index)?;
//!     println!("Frame #{index}: {frame}, {} pixels", pixels.pixels().len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Converting a remastered sprite back to classic
//!
//! ```no_run
//! use isospr_types::file::spr::{convert_to_classic, decode_remastered};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("0-12.spr")?;
//! let sprite = decode_remastered(&bytes)?;
//! let classic = convert_to_classic(sprite, 0.5);
//! std::fs::write("0-12.classic.spr", classic)?;
//! # Ok(())
//! # }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

mod assemble;
mod block;
mod classic;
mod frame;
pub mod grid;
mod mask;
pub mod mobile;
mod palette;
mod reader;
mod rle;
mod sprite;
mod tile;
mod writer;

#[cfg(test)]
mod fixtures;

pub use block::{BlockId, BlockTable};
pub use classic::{decode_classic, decode_classic_with, decode_remastered, decode_remastered_with};
pub use frame::{Frame, FramePixels, MAX_FRAME_PIXELS, Placement};
pub use mask::{FALLBACK_MASK_COLOR, MaskSelector, RESERVED_COLORS};
pub use mobile::{decode_mobile, decode_mobile_with};
pub use palette::{ColorFormat, Palette};
pub use sprite::{DirectionalSpriteSet, SpriteSet};
pub use tile::{Bounds, Tile};
pub use writer::{
	MAX_CLASSIC_BLOCKS, MAX_CLASSIC_FRAMES, convert_to_classic, encode_classic,
	encode_classic_with_extra,
};

/// Sprite container variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
	/// 24×24 tiles, direct RGB555 color or an optional palette
	Classic,
	/// 48×48 tiles, wider placement and block id fields
	Remastered,
	/// 24×24 tiles, RGB565 palette, Brotli outer layer, several directions
	Mobile,
}

impl Variant {
	/// Returns the tile edge length in pixels.
	#[inline]
	pub fn tile_edge(self) -> usize {
		match self {
			Variant::Classic | Variant::Mobile => 24,
			Variant::Remastered => 48,
		}
	}

	/// Returns the color layout of palettes and raw pixels.
	#[inline]
	pub fn color_format(self) -> ColorFormat {
		match self {
			Variant::Classic | Variant::Remastered => ColorFormat::Rgb555,
			Variant::Mobile => ColorFormat::Rgb565,
		}
	}

	/// Returns `true` if frame assembly applies the negative-`A` rounding
	/// correction of [`grid::tile_origin`].
	#[inline]
	pub fn corrects_negative_a(self) -> bool {
		!matches!(self, Variant::Classic)
	}
}

impl fmt::Display for Variant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Variant::Classic => write!(f, "classic"),
			Variant::Remastered => write!(f, "remastered"),
			Variant::Mobile => write!(f, "mobile"),
		}
	}
}

/// How a reader reacts to a bad block or block reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeMode {
	/// Any bad block or reference fails the whole decode
	#[default]
	Strict,
	/// Bad blocks only fail the frames that use them
	BestEffort,
}

/// Options accepted by the `decode_*_with` readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
	/// Error isolation mode
	pub mode: DecodeMode,
}

impl DecodeOptions {
	/// Options for best-effort decoding.
	pub fn best_effort() -> Self {
		Self {
			mode: DecodeMode::BestEffort,
		}
	}

	/// Returns `true` in best-effort mode.
	#[inline]
	pub fn is_best_effort(&self) -> bool {
		self.mode == DecodeMode::BestEffort
	}
}
