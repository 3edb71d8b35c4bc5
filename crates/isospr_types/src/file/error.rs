//! Error types for sprite container parsing.

use thiserror::Error;

use crate::file::spr::Variant;

/// Errors that can occur when decoding a sprite container.
///
/// Every error carries the [`Variant`] whose reader produced it, so a caller
/// feeding the same archive through several readers can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SprError {
	/// Declared counts are inconsistent with the bytes that follow them
	#[error("{variant}: malformed header: {message}")]
	MalformedHeader {
		/// Container variant
		variant: Variant,
		/// Description of the inconsistency
		message: String,
	},

	/// A read would run past the end of the buffer
	#[error(
		"{variant}: truncated data: need {needed} bytes at offset {offset}, only {available} available"
	)]
	TruncatedData {
		/// Container variant
		variant: Variant,
		/// Offset of the failed read
		offset: usize,
		/// Number of bytes the read needed
		needed: usize,
		/// Number of bytes left at `offset`
		available: usize,
	},

	/// The leading marker byte is not one this reader understands
	#[error("{variant}: unsupported variant marker 0x{marker:02X}")]
	UnsupportedVariant {
		/// Container variant
		variant: Variant,
		/// Marker byte found in the data
		marker: u8,
	},

	/// The outer Brotli stream could not be decompressed
	#[error("{variant}: decompression failed: {message}")]
	DecompressionFailure {
		/// Container variant
		variant: Variant,
		/// Underlying decompressor message
		message: String,
	},

	/// A placement references a block outside the block table
	#[error("{variant}: frame {frame} references block {block}, but the table holds {count} blocks")]
	InvalidBlockReference {
		/// Container variant
		variant: Variant,
		/// Index of the frame holding the placement
		frame: usize,
		/// Referenced block id
		block: u32,
		/// Number of blocks in the table
		count: usize,
	},

	/// Block payload is structurally invalid
	#[error("{variant}: block {block} is corrupt: {message}")]
	CorruptBlock {
		/// Container variant
		variant: Variant,
		/// Index of the block in the block table
		block: usize,
		/// Description of the problem
		message: String,
	},
}

impl SprError {
	/// Creates a new `MalformedHeader` error.
	pub fn malformed(variant: Variant, message: impl Into<String>) -> Self {
		Self::MalformedHeader {
			variant,
			message: message.into(),
		}
	}

	/// Creates a new `TruncatedData` error.
	pub fn truncated(variant: Variant, offset: usize, needed: usize, available: usize) -> Self {
		Self::TruncatedData {
			variant,
			offset,
			needed,
			available,
		}
	}

	/// Creates a new `CorruptBlock` error.
	pub fn corrupt(variant: Variant, block: usize, message: impl Into<String>) -> Self {
		Self::CorruptBlock {
			variant,
			block,
			message: message.into(),
		}
	}

	/// Returns the container variant that produced this error.
	pub fn variant(&self) -> Variant {
		match self {
			Self::MalformedHeader {
				variant,
				..
			}
			| Self::TruncatedData {
				variant,
				..
			}
			| Self::UnsupportedVariant {
				variant,
				..
			}
			| Self::DecompressionFailure {
				variant,
				..
			}
			| Self::InvalidBlockReference {
				variant,
				..
			}
			| Self::CorruptBlock {
				variant,
				..
			} => *variant,
		}
	}

	/// Returns `true` if the error stems from running out of input.
	pub fn is_truncation(&self) -> bool {
		matches!(self, Self::TruncatedData { .. } | Self::MalformedHeader { .. })
	}
}
