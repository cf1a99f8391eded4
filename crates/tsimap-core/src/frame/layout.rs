/// Tag bytes followed by a big-endian u32 payload length.
pub const HEADER_LEN: usize = 8;
pub const TAG_LEN: usize = 4;
pub const LENGTH_RANGE: std::ops::Range<usize> = 4..8;

pub const U32_LEN: usize = 4;
pub const F32_LEN: usize = 4;
/// One UTF-16 code unit.
pub const WIDE_UNIT_LEN: usize = 2;

/// Tag bytes are restricted to `[0-9A-Za-z_]`.
pub fn is_tag_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

pub fn looks_like_tag(bytes: &[u8]) -> bool {
    bytes.len() == TAG_LEN && bytes.iter().copied().all(is_tag_byte)
}
