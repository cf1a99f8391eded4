use thiserror::Error;

/// Errors returned by frame reading.
///
/// These never escape a full decode: the walker turns them into a resync and
/// the mapping decoder turns them into absent fields or skipped entries.
///
/// # Examples
/// ```
/// use tsimap_core::FrameError;
///
/// let err = FrameError::TooShort { offset: 12, needed: 4, available: 2 };
/// assert!(err.to_string().contains("read past end"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("read past end at offset {offset}: need {needed} bytes, {available} available")]
    TooShort {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("frame {tag:?} at offset {offset} declares {declared} payload bytes, {available} available")]
    PayloadOverrun {
        tag: String,
        offset: usize,
        declared: u32,
        available: usize,
    },
}
