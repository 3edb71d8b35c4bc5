//! Square tile pixel buffers and pixel-space rectangles.

use std::fmt;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

/// Half-open pixel-space rectangle `[left, right) × [top, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
	/// Leftmost column (inclusive)
	pub left: i32,
	/// Topmost row (inclusive)
	pub top: i32,
	/// Rightmost column (exclusive)
	pub right: i32,
	/// Bottom row (exclusive)
	pub bottom: i32,
}

impl Bounds {
	/// Creates a rectangle from its origin and size.
	pub fn from_origin(left: i32, top: i32, width: u32, height: u32) -> Self {
		Self {
			left,
			top,
			right: left + width as i32,
			bottom: top + height as i32,
		}
	}

	/// Returns the width in pixels.
	#[inline]
	pub fn width(&self) -> u32 {
		(self.right - self.left).max(0) as u32
	}

	/// Returns the height in pixels.
	#[inline]
	pub fn height(&self) -> u32 {
		(self.bottom - self.top).max(0) as u32
	}

	/// Returns this rectangle moved by `(dx, dy)`.
	pub fn translate(&self, dx: i32, dy: i32) -> Self {
		Self {
			left: self.left + dx,
			top: self.top + dy,
			right: self.right + dx,
			bottom: self.bottom + dy,
		}
	}

	/// Returns the smallest rectangle containing both.
	pub fn union(&self, other: &Bounds) -> Self {
		Self {
			left: self.left.min(other.left),
			top: self.top.min(other.top),
			right: self.right.max(other.right),
			bottom: self.bottom.max(other.bottom),
		}
	}

	/// Returns `true` if `(x, y)` lies inside.
	#[inline]
	pub fn contains(&self, x: i32, y: i32) -> bool {
		x >= self.left && x < self.right && y >= self.top && y < self.bottom
	}
}

impl fmt::Display for Bounds {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}×{} at ({}, {})", self.width(), self.height(), self.left, self.top)
	}
}

/// One `edge × edge` block of packed 16-bit pixels.
///
/// Transparent pixels hold the owning sprite's mask color; a tile does not
/// know which value that is, so callers pass it in where it matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tile {
	edge: usize,
	pixels: Vec<u16>,
}

impl Tile {
	/// Creates a tile filled with `mask`.
	pub fn blank(edge: usize, mask: u16) -> Self {
		Self {
			edge,
			pixels: vec![mask; edge * edge],
		}
	}

	/// Wraps existing pixels, returning `None` unless there are exactly
	/// `edge * edge` of them.
	pub fn from_pixels(edge: usize, pixels: Vec<u16>) -> Option<Self> {
		(pixels.len() == edge * edge).then_some(Self {
			edge,
			pixels,
		})
	}

	/// Returns the edge length in pixels.
	#[inline]
	pub fn edge(&self) -> usize {
		self.edge
	}

	/// Returns the pixels in row-major order.
	#[inline]
	pub fn pixels(&self) -> &[u16] {
		&self.pixels
	}

	/// Returns one row of pixels.
	#[inline]
	pub fn row(&self, y: usize) -> &[u16] {
		&self.pixels[y * self.edge..(y + 1) * self.edge]
	}

	/// Returns the pixel at `(x, y)`, or `None` outside the tile.
	#[inline]
	pub fn get(&self, x: usize, y: usize) -> Option<u16> {
		if x >= self.edge || y >= self.edge {
			return None;
		}
		Some(self.pixels[y * self.edge + x])
	}

	/// Sets the pixel at `(x, y)`; returns `false` outside the tile.
	#[inline]
	pub fn set(&mut self, x: usize, y: usize, color: u16) -> bool {
		if x >= self.edge || y >= self.edge {
			return false;
		}
		self.pixels[y * self.edge + x] = color;
		true
	}

	/// Returns `true` if every pixel equals `mask`.
	pub fn is_blank(&self, mask: u16) -> bool {
		self.pixels.iter().all(|&p| p == mask)
	}

	/// Returns the tight box around the pixels that differ from `mask`, in
	/// tile-local coordinates.
	pub fn content_bounds(&self, mask: u16) -> Option<Bounds> {
		let mut bounds: Option<Bounds> = None;
		for y in 0..self.edge {
			let row = self.row(y);
			let Some(first) = row.iter().position(|&p| p != mask) else {
				continue;
			};
			let last = row.iter().rposition(|&p| p != mask).unwrap_or(first);
			let line = Bounds {
				left: first as i32,
				top: y as i32,
				right: last as i32 + 1,
				bottom: y as i32 + 1,
			};
			bounds = Some(bounds.map_or(line, |b| b.union(&line)));
		}
		bounds
	}

	/// Returns the MD5 digest of the pixel buffer.
	///
	/// Mask pixels are hashed as stored, so the same artwork under two mask
	/// colors yields two digests.
	pub fn digest(&self) -> [u8; 16] {
		let mut hasher = Md5::new();
		hasher.update((self.edge as u32).to_le_bytes());
		for pixel in &self.pixels {
			hasher.update(pixel.to_le_bytes());
		}
		hasher.finalize().into()
	}
}

impl fmt::Display for Tile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{0}×{0} tile", self.edge)
	}
}
