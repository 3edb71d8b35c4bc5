//! Frame geometry, tile placements and assembled frame pixels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::file::SprError;

use super::block::BlockId;
use super::palette::ColorFormat;
use super::tile::Bounds;

/// One tile placed on a frame's isometric grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
	/// Stored grid coordinate `A`
	pub a: i8,

	/// Stored grid coordinate `B`
	pub b: i8,

	/// Opaque type byte
	pub kind: u8,

	/// Index into the block table
	pub block: BlockId,
}

impl Placement {
	/// Creates a new placement.
	pub fn new(a: i8, b: i8, kind: u8, block: BlockId) -> Self {
		Self {
			a,
			b,
			kind,
			block,
		}
	}
}

/// Frame header as stored in the file, before assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawFrame {
	pub left: i16,
	pub top: i16,
	pub right: i16,
	pub bottom: i16,
	pub extra: [u16; 2],
	pub placements: Vec<Placement>,
}

impl RawFrame {
	/// Rectangle the header declares; `right` and `bottom` are inclusive in the
	/// file.
	pub(crate) fn declared_bounds(&self) -> Bounds {
		let left = i32::from(self.left);
		let top = i32::from(self.top);
		Bounds {
			left,
			top,
			right: (i32::from(self.right) + 1).max(left + 1),
			bottom: (i32::from(self.bottom) + 1).max(top + 1),
		}
	}
}

/// A decoded animation frame.
///
/// The geometry is recomputed from the placements' opaque footprints rather
/// than trusted from the header; the header rectangle stays available through
/// [`Frame::declared_bounds`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
	/// Assembled canvas rectangle
	bounds: Bounds,

	/// Rectangle read from the frame header
	declared: Bounds,

	/// Type byte of the first placement
	kind: u8,

	/// The two opaque header fields
	extra: [u16; 2],

	placements: Vec<Placement>,

	/// Set when a best-effort decode could not assemble this frame
	defect: Option<SprError>,
}

impl Frame {
	pub(crate) fn new(raw: RawFrame, bounds: Bounds, defect: Option<SprError>) -> Self {
		let declared = raw.declared_bounds();
		Self {
			bounds,
			declared,
			kind: raw.placements.first().map_or(0, |p| p.kind),
			extra: raw.extra,
			placements: raw.placements,
			defect,
		}
	}

	/// Returns the X offset of the frame's top-left corner.
	#[inline]
	pub fn left(&self) -> i32 {
		self.bounds.left
	}

	/// Returns the Y offset of the frame's top-left corner.
	#[inline]
	pub fn top(&self) -> i32 {
		self.bounds.top
	}

	/// Returns the frame width in pixels.
	#[inline]
	pub fn width(&self) -> u32 {
		self.bounds.width()
	}

	/// Returns the frame height in pixels.
	#[inline]
	pub fn height(&self) -> u32 {
		self.bounds.height()
	}

	/// Returns the assembled rectangle.
	#[inline]
	pub fn bounds(&self) -> Bounds {
		self.bounds
	}

	/// Returns the rectangle stored in the frame header.
	#[inline]
	pub fn declared_bounds(&self) -> Bounds {
		self.declared
	}

	/// Returns the frame's type byte.
	#[inline]
	pub fn kind(&self) -> u8 {
		self.kind
	}

	/// Returns the two opaque 16-bit header fields.
	///
	/// Write them back with [`encode_classic_with_extra`](super::encode_classic_with_extra).
	#[inline]
	pub fn extra(&self) -> [u16; 2] {
		self.extra
	}

	/// Returns the tile placements in paint order.
	#[inline]
	pub fn placements(&self) -> &[Placement] {
		&self.placements
	}

	/// Returns the error that prevents this frame from rendering, if any.
	#[inline]
	pub fn defect(&self) -> Option<&SprError> {
		self.defect.as_ref()
	}

	/// Returns `true` if the frame can be rendered.
	#[inline]
	pub fn is_intact(&self) -> bool {
		self.defect.is_none()
	}
}

impl fmt::Display for Frame {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}, {} placements, type {}", self.bounds, self.placements.len(), self.kind)?;
		if self.defect.is_some() {
			write!(f, " (defective)")?;
		}
		Ok(())
	}
}

/// Largest canvas, in pixels, the decoders assemble or the converter produces.
///
/// Placement geometry alone can describe canvases far larger than any real
/// sprite; frames beyond this are reported as a malformed header.
pub const MAX_FRAME_PIXELS: usize = 1 << 24;

/// An assembled frame: a row-major canvas of packed 16-bit pixels.
///
/// Pixels equal to the mask color are transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePixels {
	left: i32,
	top: i32,
	width: u32,
	height: u32,
	pixels: Vec<u16>,
	mask: u16,
}

impl FramePixels {
	/// Creates a fully transparent canvas.
	pub fn new(left: i32, top: i32, width: u32, height: u32, mask: u16) -> Self {
		Self {
			left,
			top,
			width,
			height,
			pixels: vec![mask; width as usize * height as usize],
			mask,
		}
	}

	/// Wraps existing pixels.
	///
	/// # Panics
	///
	/// Panics if `pixels` does not hold exactly `width * height` values.
	pub fn from_pixels(
		left: i32,
		top: i32,
		width: u32,
		height: u32,
		pixels: Vec<u16>,
		mask: u16,
	) -> Self {
		assert_eq!(
			pixels.len(),
			width as usize * height as usize,
			"Frame pixel data size mismatch"
		);
		Self {
			left,
			top,
			width,
			height,
			pixels,
			mask,
		}
	}

	/// Returns the X offset of the canvas.
	#[inline]
	pub fn left(&self) -> i32 {
		self.left
	}

	/// Returns the Y offset of the canvas.
	#[inline]
	pub fn top(&self) -> i32 {
		self.top
	}

	/// Returns the canvas width.
	#[inline]
	pub fn width(&self) -> u32 {
		self.width
	}

	/// Returns the canvas height.
	#[inline]
	pub fn height(&self) -> u32 {
		self.height
	}

	/// Returns the canvas rectangle in sprite space.
	pub fn bounds(&self) -> Bounds {
		Bounds::from_origin(self.left, self.top, self.width, self.height)
	}

	/// Returns the transparency color.
	#[inline]
	pub fn mask_color(&self) -> u16 {
		self.mask
	}

	/// Returns the pixels in row-major order.
	#[inline]
	pub fn pixels(&self) -> &[u16] {
		&self.pixels
	}

	/// Returns a mutable reference to the pixels.
	#[inline]
	pub fn pixels_mut(&mut self) -> &mut [u16] {
		&mut self.pixels
	}

	/// Returns one row of pixels.
	pub fn row(&self, y: u32) -> &[u16] {
		let start = y as usize * self.width as usize;
		&self.pixels[start..start + self.width as usize]
	}

	/// Returns the pixel at canvas-local `(x, y)`.
	#[inline]
	pub fn get(&self, x: u32, y: u32) -> Option<u16> {
		if x >= self.width || y >= self.height {
			return None;
		}
		Some(self.pixels[y as usize * self.width as usize + x as usize])
	}

	/// Sets the pixel at canvas-local `(x, y)`; returns `false` outside.
	#[inline]
	pub fn set(&mut self, x: u32, y: u32, color: u16) -> bool {
		if x >= self.width || y >= self.height {
			return false;
		}
		self.pixels[y as usize * self.width as usize + x as usize] = color;
		true
	}

	/// Returns the pixel at sprite-space `(x, y)`, or `None` outside the canvas.
	pub fn get_absolute(&self, x: i32, y: i32) -> Option<u16> {
		if !self.bounds().contains(x, y) {
			return None;
		}
		self.get((x - self.left) as u32, (y - self.top) as u32)
	}

	/// Returns the number of non-transparent pixels.
	pub fn opaque_count(&self) -> usize {
		self.pixels.iter().filter(|&&p| p != self.mask).count()
	}

	/// Returns `true` if every pixel is transparent.
	pub fn is_blank(&self) -> bool {
		self.pixels.iter().all(|&p| p == self.mask)
	}

	/// Expands the canvas to 8-bit RGBA, with transparent pixels at alpha 0.
	pub fn to_rgba8(&self, format: ColorFormat) -> Vec<u8> {
		let mut out = Vec::with_capacity(self.pixels.len() * 4);
		for &pixel in &self.pixels {
			if pixel == self.mask {
				out.extend_from_slice(&[0, 0, 0, 0]);
			} else {
				let [r, g, b] = format.to_rgb8(pixel);
				out.extend_from_slice(&[r, g, b, 0xFF]);
			}
		}
		out
	}
}

impl fmt::Display for FramePixels {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}×{} at ({}, {})", self.width, self.height, self.left, self.top)
	}
}
