use std::fmt;

use super::error::FrameError;
use super::layout;
use super::reader::ByteCursor;

/// Four-byte frame tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameTag(pub [u8; layout::TAG_LEN]);

impl FrameTag {
    pub const fn new(bytes: &[u8; layout::TAG_LEN]) -> Self {
        Self(*bytes)
    }

    pub fn as_bytes(&self) -> &[u8; layout::TAG_LEN] {
        &self.0
    }
}

impl fmt::Display for FrameTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() { b as char } else { '?' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for FrameTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameTag({self})")
    }
}

/// A validated frame header: the payload range lies inside the cursor's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub tag: FrameTag,
    /// Offset of the tag's first byte.
    pub offset: usize,
    pub payload_start: usize,
    /// Exclusive.
    pub payload_end: usize,
}

impl FrameHeader {
    pub fn payload_len(&self) -> usize {
        self.payload_end - self.payload_start
    }
}

/// Read a tag and payload length at the cursor position.
///
/// The declared length excludes the 8-byte header. On success the cursor sits
/// at the payload start; on failure it is left where it was.
///
/// # Errors
/// `TooShort` when fewer than 8 bytes remain, `PayloadOverrun` when the
/// payload would extend past the cursor's end.
pub fn read_frame_header(cursor: &mut ByteCursor<'_>) -> Result<FrameHeader, FrameError> {
    let offset = cursor.position();
    let head = cursor.peek(layout::HEADER_LEN).ok_or(FrameError::TooShort {
        offset,
        needed: layout::HEADER_LEN,
        available: cursor.remaining(),
    })?;

    let mut tag = [0u8; layout::TAG_LEN];
    tag.copy_from_slice(&head[..layout::TAG_LEN]);
    let tag = FrameTag(tag);
    let declared = u32::from_be_bytes([
        head[layout::LENGTH_RANGE.start],
        head[layout::LENGTH_RANGE.start + 1],
        head[layout::LENGTH_RANGE.start + 2],
        head[layout::LENGTH_RANGE.start + 3],
    ]);

    let payload_start = offset + layout::HEADER_LEN;
    let available = cursor.end().saturating_sub(payload_start);
    if declared as usize > available {
        return Err(FrameError::PayloadOverrun {
            tag: tag.to_string(),
            offset,
            declared,
            available,
        });
    }

    cursor.seek(payload_start);
    Ok(FrameHeader {
        tag,
        offset,
        payload_start,
        payload_end: payload_start + declared as usize,
    })
}
