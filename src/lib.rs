#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `isospr-rs` decodes and re-encodes the tile-sprite containers of a legacy
//! isometric client in their classic, remastered and mobile variants.

pub use isospr_types::*;
