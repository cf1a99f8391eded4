use byteorder::{BigEndian, ByteOrder};

use super::error::FrameError;
use super::layout;

/// Big-endian reader over a window of an immutable buffer.
///
/// Offsets are absolute positions in the underlying buffer, so sub-views
/// created with [`ByteCursor::with_range`] report the same offsets the
/// walker does. A failed read leaves the position unchanged.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            end: data.len(),
        }
    }

    /// Cursor limited to `start..end`; `end` is clamped to the buffer.
    pub fn with_range(data: &'a [u8], start: usize, end: usize) -> Self {
        let end = end.min(data.len());
        Self {
            data,
            pos: start.min(end),
            end,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn remaining(&self) -> usize {
        self.end.saturating_sub(self.pos)
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.end
    }

    pub fn peek(&self, len: usize) -> Option<&'a [u8]> {
        if self.remaining() < len {
            return None;
        }
        self.data.get(self.pos..self.pos + len)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], FrameError> {
        let bytes = self.peek(len).ok_or(FrameError::TooShort {
            offset: self.pos,
            needed: len,
            available: self.remaining(),
        })?;
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, FrameError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, FrameError> {
        self.read_bytes(layout::U32_LEN).map(BigEndian::read_u32)
    }

    pub fn read_f32(&mut self) -> Result<f32, FrameError> {
        self.read_bytes(layout::F32_LEN).map(BigEndian::read_f32)
    }

    /// Read a u32 code-unit count followed by that many UTF-16BE units,
    /// returning the undecoded bytes.
    pub fn read_wide_bytes(&mut self) -> Result<&'a [u8], FrameError> {
        let start = self.pos;
        let count = self.read_u32()? as usize;
        let needed = count
            .checked_mul(layout::WIDE_UNIT_LEN)
            .ok_or(FrameError::TooShort {
                offset: self.pos,
                needed: usize::MAX,
                available: self.remaining(),
            });
        match needed.and_then(|needed| self.read_bytes(needed)) {
            Ok(bytes) => Ok(bytes),
            Err(err) => {
                self.pos = start;
                Err(err)
            }
        }
    }

    pub fn read_wide_text(&mut self) -> Result<String, FrameError> {
        self.read_wide_bytes().map(decode_wide)
    }
}

/// Decode UTF-16BE bytes; unpaired surrogates become U+FFFD and a trailing
/// odd byte is dropped.
pub fn decode_wide(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(layout::WIDE_UNIT_LEN)
        .map(BigEndian::read_u16)
        .collect();
    String::from_utf16_lossy(&units)
}

/// Lowercase hex rendering used for raw diagnostics.
pub fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
