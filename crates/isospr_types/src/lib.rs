//! This crate provides the sprite container codecs for the `isospr-rs` project.
//!
//! # File Formats
//!
//! - **Classic**: 24×24 tiles, direct RGB555 color or an optional palette
//! - **Remastered**: 48×48 tiles with wider placement and block id fields
//! - **Mobile**: Brotli-wrapped, RGB565 palette, 4 or 8 animation directions
//!
//! All three decode into one model: a [`SpriteSet`](file::SpriteSet) of frames
//! assembled from a shared table of run-length encoded tiles.
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```no_run
//! use isospr_types::prelude::*;
//!
//! # fn main() -> Result<(), SprError> {
//! let bytes = std::fs::read("0-12.spr").unwrap_or_default();
//! let sprite = decode_classic(&bytes)?;
//! let frame = sprite.render(0)?;
//! let rgba = frame.to_rgba8(sprite.color_format());
//! # Ok(())
//! # }
//! ```
//!
//! Or use explicit paths:
//!
//! ```no_run
//! use isospr_types::file::{DecodeOptions, decode_mobile_with};
//!
//! # fn main() -> Result<(), isospr_types::file::SprError> {
//! let bytes = std::fs::read("0-12.spr").unwrap_or_default();
//! let set = decode_mobile_with(&bytes, &DecodeOptions::best_effort())?;
//! for (direction, sprite) in set.iter() {
//!     println!("direction {direction}: {sprite}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod file;

/// `use isospr_types::prelude::*;` to import commonly used items.
pub mod prelude;
