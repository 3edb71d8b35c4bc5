//! Bounds-checked little-endian cursor over an in-memory buffer.

use crate::file::SprError;

use super::Variant;

/// Cursor that never reads past the end of its slice.
#[derive(Debug, Clone)]
pub(crate) struct ByteReader<'a> {
	data: &'a [u8],
	pos: usize,
	variant: Variant,
}

impl<'a> ByteReader<'a> {
	pub(crate) fn new(data: &'a [u8], variant: Variant) -> Self {
		Self {
			data,
			pos: 0,
			variant,
		}
	}

	pub(crate) fn position(&self) -> usize {
		self.pos
	}

	pub(crate) fn remaining(&self) -> usize {
		self.data.len() - self.pos
	}

	/// Checks that `count` records of `record_size` bytes fit in what is left,
	/// before anything count-sized gets allocated.
	pub(crate) fn require(
		&self,
		count: usize,
		record_size: usize,
		what: &str,
	) -> Result<(), SprError> {
		let needed = count.checked_mul(record_size).ok_or_else(|| {
			SprError::malformed(self.variant, format!("{what}: count {count} overflows"))
		})?;
		if needed > self.remaining() {
			return Err(SprError::malformed(
				self.variant,
				format!(
					"{what}: {count} entries need {needed} bytes at offset {}, only {} remain",
					self.pos,
					self.remaining()
				),
			));
		}
		Ok(())
	}

	pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8], SprError> {
		if len > self.remaining() {
			return Err(SprError::truncated(self.variant, self.pos, len, self.remaining()));
		}
		let slice = &self.data[self.pos..self.pos + len];
		self.pos += len;
		Ok(slice)
	}

	fn array<const N: usize>(&mut self) -> Result<[u8; N], SprError> {
		let mut bytes = [0u8; N];
		bytes.copy_from_slice(self.take(N)?);
		Ok(bytes)
	}

	pub(crate) fn u8(&mut self) -> Result<u8, SprError> {
		Ok(self.array::<1>()?[0])
	}

	pub(crate) fn i8(&mut self) -> Result<i8, SprError> {
		Ok(i8::from_le_bytes(self.array()?))
	}

	pub(crate) fn u16(&mut self) -> Result<u16, SprError> {
		Ok(u16::from_le_bytes(self.array()?))
	}

	pub(crate) fn i16(&mut self) -> Result<i16, SprError> {
		Ok(i16::from_le_bytes(self.array()?))
	}

	pub(crate) fn u32(&mut self) -> Result<u32, SprError> {
		Ok(u32::from_le_bytes(self.array()?))
	}

	/// Consumes and returns everything that is left.
	pub(crate) fn rest(&mut self) -> &'a [u8] {
		let slice = &self.data[self.pos..];
		self.pos = self.data.len();
		slice
	}
}
