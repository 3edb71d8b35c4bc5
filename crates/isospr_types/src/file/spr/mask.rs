//! Reserved-color search for the transparency sentinel.
//!
//! Non-paletted tiles store raw 16-bit colors, so "transparent" has to be
//! expressed as a color the sprite never uses. The decoder keeps an ordered
//! list of seven reserved candidates and strikes out every one it sees in the
//! palette or in the pixel data. The first survivor becomes the mask color.

/// Candidate mask colors, in the order they are tried.
pub const RESERVED_COLORS: [u16; 7] = [0xF81F, 0x7C1F, 0xFFE0, 0x7FE0, 0x07FF, 0x03FF, 0x0821];

/// Mask color used when every reserved candidate is in use.
pub const FALLBACK_MASK_COLOR: u16 = 0x0001;

/// Tracks which reserved colors are still unused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskSelector {
	candidates: [Option<u16>; RESERVED_COLORS.len()],
}

impl MaskSelector {
	/// Creates a selector with every reserved color still available.
	pub fn new() -> Self {
		Self {
			candidates: RESERVED_COLORS.map(Some),
		}
	}

	/// Records that `color` appears in the sprite.
	#[inline]
	pub fn observe(&mut self, color: u16) {
		for slot in &mut self.candidates {
			if *slot == Some(color) {
				*slot = None;
			}
		}
	}

	/// Records every color yielded by `colors`.
	pub fn observe_all(&mut self, colors: impl IntoIterator<Item = u16>) {
		for color in colors {
			self.observe(color);
		}
	}

	/// Returns the number of candidates not yet struck out.
	pub fn available(&self) -> usize {
		self.candidates.iter().flatten().count()
	}

	/// Returns the first unused reserved color, or [`FALLBACK_MASK_COLOR`].
	pub fn select(&self) -> u16 {
		self.candidates.iter().flatten().copied().next().unwrap_or(FALLBACK_MASK_COLOR)
	}
}

impl Default for MaskSelector {
	fn default() -> Self {
		Self::new()
	}
}
