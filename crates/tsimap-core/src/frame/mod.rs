//! Tagged-frame primitives.
//!
//! A frame is a 4-byte ASCII tag, a big-endian u32 payload length (header
//! excluded) and the payload. Layering follows the rest of the crate:
//! - `layout`: sizes and the tag alphabet
//! - `reader`: bounds-checked big-endian cursor
//! - `header`: frame header validation
//! - `walker`: resynchronizing depth-first discovery
//! - `error`: explicit read faults

pub mod error;
pub mod header;
pub mod layout;
pub mod reader;
pub mod walker;

pub use error::FrameError;
pub use header::{FrameHeader, FrameTag, read_frame_header};
pub use reader::ByteCursor;
pub use walker::{FrameNode, FrameWalker, Frames, WalkEvent, walk, walk_events};
