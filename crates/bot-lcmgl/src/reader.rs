//! Bounds-checked big-endian cursor over an LCMGL buffer.

use crate::error::DecodeError;

/// Sequential reader over a borrowed command stream.
///
/// Every read either consumes exactly the requested width or fails with
/// [`DecodeError::TruncatedStream`] without advancing.
#[derive(Debug, Clone)]
pub struct StreamReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> StreamReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Byte offset of the next read from the start of the buffer.
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(DecodeError::TruncatedStream {
                offset: self.pos,
                needed: len,
                remaining,
            });
        }
        let out = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, DecodeError> {
        Ok(f64::from_bits(u64::from_be_bytes(self.read_array()?)))
    }

    pub fn read_f32x3(&mut self) -> Result<[f32; 3], DecodeError> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    pub fn read_f32x4(&mut self) -> Result<[f32; 4], DecodeError> {
        Ok([
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ])
    }

    pub fn read_f64x3(&mut self) -> Result<[f64; 3], DecodeError> {
        Ok([self.read_f64()?, self.read_f64()?, self.read_f64()?])
    }

    /// Reads a `u32` element count followed by `count * elem_size` bytes.
    ///
    /// The payload length is checked against the remaining bytes before it is sliced, so a
    /// corrupt count never causes an allocation.
    pub fn read_counted(
        &mut self,
        elem_size: usize,
        max_count: usize,
    ) -> Result<(usize, &'a [u8]), LengthError> {
        let count = self.read_u32().map_err(LengthError::Decode)? as usize;
        if count > max_count {
            return Err(LengthError::TooLong {
                len: count,
                max: max_count,
            });
        }
        // `count <= max_count` keeps this from overflowing for any sane limit; saturate anyway so
        // the bounds check below still reports truncation.
        let len = count.saturating_mul(elem_size);
        let bytes = self.read_bytes(len).map_err(LengthError::Decode)?;
        Ok((count, bytes))
    }
}

/// Failure of a length-prefixed read.
#[derive(Debug, Clone, PartialEq)]
pub enum LengthError {
    Decode(DecodeError),
    TooLong { len: usize, max: usize },
}
