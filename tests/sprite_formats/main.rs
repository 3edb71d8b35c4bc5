//! End-to-end tests for the `isospr-rs` sprite codecs.

mod classic;
mod mobile;

use isospr_rs::prelude::*;

/// Transparency color every hand-built frame uses.
pub(crate) const MASK: u16 = 0xF81F;

/// A frame whose pixels are all distinct and none of them reserved.
pub(crate) fn gradient_frame(left: i32, top: i32, width: u32, height: u32) -> FramePixels {
	let pixels = (0..width * height).map(|i| 0x0400 + i as u16).collect();
	FramePixels::from_pixels(left, top, width, height, pixels, MASK)
}

/// Re-packs an RGBA buffer as RGB555, mapping alpha 0 to `mask`.
pub(crate) fn from_rgba8(rgba: &[u8], mask: u16) -> Vec<u16> {
	rgba.chunks_exact(4)
		.map(|p| {
			if p[3] == 0 {
				mask
			} else {
				ColorFormat::Rgb555.from_rgb8([p[0], p[1], p[2]])
			}
		})
		.collect()
}
