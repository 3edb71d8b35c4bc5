//! File type support for `isospr-rs` project.

mod error;

pub mod spr;

// Re-export unified error type
pub use error::SprError;

// Re-export main sprite types
pub use spr::{
	BlockId, BlockTable, Bounds, ColorFormat, DecodeMode, DecodeOptions, DirectionalSpriteSet,
	Frame, FramePixels, MAX_CLASSIC_BLOCKS, MAX_CLASSIC_FRAMES, MAX_FRAME_PIXELS, Palette,
	Placement, SpriteSet, Tile, Variant, convert_to_classic, decode_classic, decode_classic_with,
	decode_mobile, decode_mobile_with, decode_remastered, decode_remastered_with, encode_classic,
	encode_classic_with_extra,
};
