//! Prelude module for `isospr_types`.
//!
//! This module provides a convenient way to import commonly used types and
//! functions.
//!
//! # Examples
//!
//! ```no_run
//! use isospr_types::prelude::*;
//!
//! let frames = [FramePixels::new(0, 0, 24, 24, RESERVED_COLORS[0])];
//! let bytes = encode_classic(&frames, &[0]);
//! ```

// File module types
#[doc(inline)]
pub use crate::file::{
	BlockId,
	BlockTable,
	Bounds,
	ColorFormat,
	// Options
	DecodeMode,
	DecodeOptions,
	// Sprite types
	DirectionalSpriteSet,
	Frame,
	FramePixels,
	// Limits
	MAX_CLASSIC_BLOCKS,
	MAX_CLASSIC_FRAMES,
	MAX_FRAME_PIXELS,
	Palette,
	Placement,
	SprError,
	SpriteSet,
	Tile,
	Variant,
	// Codec entry points
	convert_to_classic,
	decode_classic,
	decode_classic_with,
	decode_mobile,
	decode_mobile_with,
	decode_remastered,
	decode_remastered_with,
	encode_classic,
	encode_classic_with_extra,
};

// Mask color selection
#[doc(inline)]
pub use crate::file::spr::{FALLBACK_MASK_COLOR, MaskSelector, RESERVED_COLORS};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
