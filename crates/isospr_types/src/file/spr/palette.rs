//! 16-bit palettes and color layouts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::file::SprError;

use super::reader::ByteReader;

/// Channel layout of a packed 16-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorFormat {
	/// `0RRRRRGG GGGBBBBB`, used by the classic and remastered variants
	Rgb555,
	/// `RRRRRGGG GGGBBBBB`, used by the mobile variant
	Rgb565,
}

impl ColorFormat {
	/// Expands a packed color to 8-bit RGB channels.
	pub fn to_rgb8(self, color: u16) -> [u8; 3] {
		// Replicate high bits into the low ones so full intensity maps to 0xFF
		let expand5 = |v: u16| ((v << 3) | (v >> 2)) as u8;
		let expand6 = |v: u16| ((v << 2) | (v >> 4)) as u8;
		match self {
			ColorFormat::Rgb555 => [
				expand5((color >> 10) & 0x1F),
				expand5((color >> 5) & 0x1F),
				expand5(color & 0x1F),
			],
			ColorFormat::Rgb565 => [
				expand5((color >> 11) & 0x1F),
				expand6((color >> 5) & 0x3F),
				expand5(color & 0x1F),
			],
		}
	}

	/// Packs 8-bit RGB channels, dropping the low bits.
	pub fn from_rgb8(self, [r, g, b]: [u8; 3]) -> u16 {
		let (r, g, b) = (u16::from(r), u16::from(g), u16::from(b));
		match self {
			ColorFormat::Rgb555 => ((r >> 3) << 10) | ((g >> 3) << 5) | (b >> 3),
			ColorFormat::Rgb565 => ((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3),
		}
	}

	/// Re-packs `color` from this layout into `target`.
	pub fn convert(self, color: u16, target: ColorFormat) -> u16 {
		match (self, target) {
			(ColorFormat::Rgb565, ColorFormat::Rgb555) => {
				((color >> 1) & 0x7FE0) | (color & 0x001F)
			}
			(ColorFormat::Rgb555, ColorFormat::Rgb565) => {
				((color & 0x7FE0) << 1) | ((color >> 4) & 0x0020) | (color & 0x001F)
			}
			_ => color,
		}
	}
}

impl fmt::Display for ColorFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ColorFormat::Rgb555 => write!(f, "RGB555"),
			ColorFormat::Rgb565 => write!(f, "RGB565"),
		}
	}
}

/// Sprite palette of up to 256 packed colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
	format: ColorFormat,
	colors: Vec<u16>,
}

impl Palette {
	/// Largest number of colors a palette can hold
	pub const MAX_COLORS: usize = 256;

	/// Creates a palette from packed colors.
	///
	/// # Panics
	///
	/// Panics if more than [`Palette::MAX_COLORS`] colors are given.
	pub fn new(format: ColorFormat, colors: Vec<u16>) -> Self {
		assert!(colors.len() <= Self::MAX_COLORS, "Palette holds at most 256 colors");
		Self {
			format,
			colors,
		}
	}

	/// Reads a length-prefixed palette: one length byte (0 meaning 256)
	/// followed by that many little-endian colors.
	pub(crate) fn read(reader: &mut ByteReader<'_>, format: ColorFormat) -> Result<Self, SprError> {
		let count = match reader.u8()? {
			0 => Self::MAX_COLORS,
			n => n as usize,
		};
		reader.require(count, 2, "palette")?;
		let colors = (0..count).map(|_| reader.u16()).collect::<Result<Vec<_>, _>>()?;
		Ok(Self {
			format,
			colors,
		})
	}

	/// Returns the color layout.
	#[inline]
	pub fn format(&self) -> ColorFormat {
		self.format
	}

	/// Returns the number of colors.
	#[inline]
	pub fn len(&self) -> usize {
		self.colors.len()
	}

	/// Returns `true` if the palette holds no colors.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}

	/// Returns the color at `index`, if the palette is long enough.
	#[inline]
	pub fn get(&self, index: u8) -> Option<u16> {
		self.colors.get(index as usize).copied()
	}

	/// Returns all colors.
	pub fn colors(&self) -> &[u16] {
		&self.colors
	}

	/// Expands every color to 8-bit RGB.
	pub fn to_rgb8(&self) -> Vec<[u8; 3]> {
		self.colors.iter().map(|&c| self.format.to_rgb8(c)).collect()
	}
}

impl fmt::Display for Palette {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} palette, {} colors", self.format, self.colors.len())
	}
}
