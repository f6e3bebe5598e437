//! Bounds-checked cursor over a pack buffer.

use crate::error::PackError;
use crate::varint::decode_varint;

/// Sequential reader over `&[u8]` with explicit position tracking.
///
/// Every read either returns a value and advances the cursor or fails with
/// [`PackError::UnexpectedEof`] carrying the offending offset.
pub(crate) struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, PackError> {
        let byte = *self
            .buf
            .get(self.pos)
            .ok_or(PackError::UnexpectedEof(self.pos))?;
        self.pos += 1;
        Ok(byte)
    }

    pub(crate) fn read_f32(&mut self) -> Result<f32, PackError> {
        let end = self.pos + 4;
        let bytes = self
            .buf
            .get(self.pos..end)
            .ok_or(PackError::UnexpectedEof(self.pos))?;
        self.pos = end;
        // Slice is exactly 4 bytes by construction.
        Ok(f32::from_le_bytes(bytes.try_into().unwrap()))
    }

    pub(crate) fn read_f32x3(&mut self) -> Result<[f32; 3], PackError> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    pub(crate) fn read_f32x4(&mut self) -> Result<[f32; 4], PackError> {
        Ok([
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ])
    }

    pub(crate) fn read_varint(&mut self) -> Result<u64, PackError> {
        decode_varint(self.buf, &mut self.pos)
    }

    pub(crate) fn read_magic(&mut self, expected: &[u8; 4]) -> Result<(), PackError> {
        let end = self.pos + 4;
        let bytes = self
            .buf
            .get(self.pos..end)
            .ok_or(PackError::UnexpectedEof(self.pos))?;
        if bytes != expected {
            return Err(PackError::InvalidMagic);
        }
        self.pos = end;
        Ok(())
    }
}
