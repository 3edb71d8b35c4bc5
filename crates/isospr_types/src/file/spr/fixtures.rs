//! Hand-built containers for unit tests.

use super::Variant;
use super::mobile::RAW_MARKER;

/// Frame header plus `(A, B, type, block)` placements.
#[derive(Debug, Clone)]
pub(crate) struct FrameSpec {
	pub left: i16,
	pub top: i16,
	pub right: i16,
	pub bottom: i16,
	pub placements: Vec<(i8, i8, u8, u32)>,
}

impl FrameSpec {
	pub(crate) fn new(placements: Vec<(i8, i8, u8, u32)>) -> Self {
		Self {
			left: 0,
			top: 0,
			right: 0,
			bottom: 0,
			placements,
		}
	}
}

/// Serializes `u16` entries little-endian.
pub(crate) fn entries(values: &[u16]) -> Vec<u8> {
	values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Direct-color classic block holding a `w × h` rectangle of `color` at `(x, y)`.
pub(crate) fn solid_block(x: u8, y: u8, w: u8, h: u8, color: u16) -> Vec<u8> {
	let mut out = vec![x, y, 0, h];
	for _ in 0..h {
		out.extend_from_slice(&[1, 0, w]);
		for _ in 0..w {
			out.extend_from_slice(&color.to_le_bytes());
		}
	}
	out
}

/// Classic or remastered container.
pub(crate) fn classic_bytes(
	variant: Variant,
	palette: Option<&[u16]>,
	frames: &[FrameSpec],
	blocks: &[Vec<u8>],
) -> Vec<u8> {
	let wide = variant == Variant::Remastered;
	let mut out = Vec::new();
	if let Some(colors) = palette {
		out.push(0xFF);
		out.push(colors.len() as u8);
		out.extend(entries(colors));
	}
	out.push(frames.len() as u8);
	for frame in frames {
		for v in [frame.left, frame.top, frame.right, frame.bottom] {
			out.extend_from_slice(&v.to_le_bytes());
		}
		out.extend_from_slice(&[0, 0, 0, 0]);
		if wide {
			out.extend_from_slice(&(frame.placements.len() as u32).to_le_bytes());
		} else {
			out.extend_from_slice(&(frame.placements.len() as u16).to_le_bytes());
		}
		for &(a, b, kind, block) in &frame.placements {
			out.push(a as u8);
			out.push(b as u8);
			out.push(kind);
			if wide {
				out.extend_from_slice(&block.to_le_bytes());
			} else {
				out.extend_from_slice(&(block as u16).to_le_bytes());
			}
		}
	}
	out.extend_from_slice(&(blocks.len() as u32).to_le_bytes());
	let mut offset = 0u32;
	for block in blocks {
		out.extend_from_slice(&offset.to_le_bytes());
		offset += block.len() as u32;
	}
	out.extend_from_slice(&offset.to_le_bytes());
	for block in blocks {
		out.extend_from_slice(block);
	}
	out
}

/// Mobile block payload and pixel indices for a tile of optional indices.
pub(crate) fn mobile_block(indices: &[Option<u8>], edge: usize) -> (Vec<u8>, Vec<u8>) {
	let mut values = Vec::new();
	let mut pixels = Vec::new();
	let mut blank = 0u16;

	let flush_blank = |values: &mut Vec<u16>, blank: &mut u16| {
		match *blank {
			0 => {}
			1 => values.push(0),
			n => values.push((n + 1) * 1024),
		}
		*blank = 0;
	};

	for row in indices.chunks(edge) {
		let mut runs = Vec::new();
		let mut x = 0;
		while x < row.len() {
			if row[x].is_none() {
				x += 1;
				continue;
			}
			let start = x;
			while x < row.len() && row[x].is_some() {
				pixels.push(row[x].unwrap_or_default());
				x += 1;
			}
			runs.push(((x - start) * 32 + start) as u16);
		}
		if runs.is_empty() {
			blank += 1;
			continue;
		}
		flush_blank(&mut values, &mut blank);
		if runs.len() > 1 {
			values.push(runs.len() as u16);
		}
		values.extend(runs);
	}
	(entries(&values), pixels)
}

/// Uncompressed mobile container, starting with the raw marker.
pub(crate) fn mobile_bytes(
	palette: &[u16],
	direction_byte: u8,
	directions: &[Vec<FrameSpec>],
	blocks: &[(Vec<u8>, Vec<u8>)],
) -> Vec<u8> {
	let mut out = vec![RAW_MARKER, palette.len() as u8];
	out.extend(entries(palette));
	out.push(direction_byte);
	for frames in directions {
		out.extend_from_slice(&(frames.len() as u16).to_le_bytes());
		for frame in frames {
			for v in [frame.left, frame.top, frame.right, frame.bottom] {
				out.extend_from_slice(&v.to_le_bytes());
			}
			out.extend_from_slice(&[0, 0, 0, 0]);
			out.extend_from_slice(&(frame.placements.len() as u16).to_le_bytes());
			out.extend(frame.placements.iter().map(|p| p.0 as u8));
			out.extend(frame.placements.iter().map(|p| p.1 as u8));
			out.extend(frame.placements.iter().map(|p| p.2));
			let mut previous: Option<u16> = None;
			for &(_, _, _, block) in &frame.placements {
				let block = block as u16;
				let stored = match previous {
					None => block,
					Some(prev) => block.wrapping_sub(prev).wrapping_sub(1),
				};
				out.extend_from_slice(&stored.to_le_bytes());
				previous = Some(block);
			}
		}
	}
	out.extend_from_slice(&(blocks.len() as u16).to_le_bytes());
	for (payload, _) in blocks {
		out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
		out.extend_from_slice(payload);
	}
	for (_, pixels) in blocks {
		out.extend_from_slice(pixels);
	}
	out
}
