//! Schema-driven BCS codec.
//!
//! The typed wire structs in [`crate::transaction`] serialize through
//! serde and `bcs`. This module offers the same encoding driven by a
//! runtime schema instead: a [`Registry`] of named [`BcsType`] shapes that
//! encodes and decodes dynamic [`Value`]s. It backs pure argument encoding
//! from Move type strings, and lets callers inspect transaction bytes
//! without knowing their type at compile time.
//!
//! Encoding rules:
//! - integers are little-endian with their declared width
//! - sequences, byte vectors and strings carry a ULEB128 length prefix
//! - structs and tuples are their fields in order, without names
//! - enums are a ULEB128 variant index followed by the variant payload
//! - options are an enum with `None = 0` and `Some = 1`

mod registry;
mod schema;
mod value;

pub use registry::{CustomCodec, Registry, registry};
pub use schema::{BcsType, Field, Variant};
pub use value::Value;

use crate::error::{SuiError, SuiResult};

/// Largest length or variant index accepted on the wire.
pub const MAX_SEQUENCE_LENGTH: u64 = (1 << 31) - 1;

/// Appends `value` as ULEB128.
pub fn write_uleb128(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Cursor over a byte slice that fails instead of reading past the end.
#[derive(Debug)]
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub(crate) fn take(&mut self, n: usize) -> SuiResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(SuiError::malformed(format!(
                "unexpected end of input: need {} bytes at offset {}, {} left",
                n,
                self.pos,
                self.remaining()
            )));
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub(crate) fn byte(&mut self) -> SuiResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn array<const N: usize>(&mut self) -> SuiResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Reads a canonical ULEB128 value that fits in 32 bits.
    pub(crate) fn uleb128(&mut self) -> SuiResult<u64> {
        let mut value: u64 = 0;
        for shift in (0..32).step_by(7) {
            let byte = self.byte()?;
            let digit = byte & 0x7f;
            value |= u64::from(digit) << shift;
            if digit == byte {
                if shift > 0 && digit == 0 {
                    return Err(SuiError::malformed("non-canonical ULEB128 encoding"));
                }
                if value > u64::from(u32::MAX) {
                    break;
                }
                return Ok(value);
            }
        }
        Err(SuiError::malformed("ULEB128 value overflows u32"))
    }

    /// Reads a length prefix and checks it against the bytes left.
    pub(crate) fn length(&mut self) -> SuiResult<usize> {
        let len = self.uleb128()?;
        if len > MAX_SEQUENCE_LENGTH || len as usize > self.remaining() {
            return Err(SuiError::malformed(format!(
                "declared length {} exceeds the {} bytes left",
                len,
                self.remaining()
            )));
        }
        Ok(len as usize)
    }

    pub(crate) fn finish(self) -> SuiResult<()> {
        if self.remaining() != 0 {
            return Err(SuiError::malformed(format!(
                "{} trailing bytes after value",
                self.remaining()
            )));
        }
        Ok(())
    }
}
