use tracing::{debug, trace};

use super::error::FrameError;
use super::header::{FrameTag, read_frame_header};
use super::layout;
use super::reader::ByteCursor;

/// A frame discovered by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameNode {
    pub tag: FrameTag,
    /// Offset of the tag (header start).
    pub start: usize,
    /// Exclusive end of the payload.
    pub end: usize,
    /// Immediate children found by a shallow sequential scan of the payload.
    pub children: usize,
    /// Nesting depth, 0 for frames found directly in the walked range.
    pub depth: usize,
}

impl FrameNode {
    pub fn payload_start(&self) -> usize {
        self.start + layout::HEADER_LEN
    }
}

/// Walker output: frames plus the regions stepped over while resyncing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEvent {
    Frame(FrameNode),
    Skipped {
        start: usize,
        end: usize,
        /// Headers in this region that looked valid but overran their parent.
        bounds_faults: usize,
    },
}

#[derive(Debug)]
struct SkipRun {
    start: usize,
    bounds_faults: usize,
}

#[derive(Debug)]
struct Span {
    cursor: usize,
    end: usize,
    depth: usize,
    skip: Option<SkipRun>,
}

/// Depth-first (pre-order) frame scanner with one-byte resynchronization.
///
/// Bytes that do not start a valid header are stepped over one at a time, so
/// frames are found anywhere in the range regardless of surrounding junk.
/// Nested payloads are scanned with an explicit stack; each frame is yielded
/// before its descendants and siblings come out in byte order.
///
/// # Examples
/// ```
/// use tsimap_core::walk;
///
/// let mut data = b"DDAT".to_vec();
/// data.extend_from_slice(&8u32.to_be_bytes());
/// data.extend_from_slice(b"DDIF");
/// data.extend_from_slice(&0u32.to_be_bytes());
///
/// let tags: Vec<String> = walk(&data).map(|node| node.tag.to_string()).collect();
/// assert_eq!(tags, ["DDAT", "DDIF"]);
/// ```
#[derive(Debug)]
pub struct FrameWalker<'a> {
    data: &'a [u8],
    stack: Vec<Span>,
    pending: Option<FrameNode>,
}

impl<'a> FrameWalker<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::over_range(data, 0, data.len())
    }

    pub fn over_range(data: &'a [u8], start: usize, end: usize) -> Self {
        let end = end.min(data.len());
        Self {
            data,
            stack: vec![Span {
                cursor: start.min(end),
                end,
                depth: 0,
                skip: None,
            }],
            pending: None,
        }
    }

    /// Only the frames, without skip diagnostics.
    pub fn frames(self) -> Frames<'a> {
        Frames { inner: self }
    }
}

impl Iterator for FrameWalker<'_> {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<WalkEvent> {
        if let Some(node) = self.pending.take() {
            return Some(WalkEvent::Frame(node));
        }

        loop {
            let span = self.stack.last_mut()?;
            if span.end - span.cursor < layout::HEADER_LEN {
                let span = self.stack.pop()?;
                // The run absorbs the tail too short to hold a header.
                if let Some(run) = span.skip {
                    trace!(start = run.start, end = span.end, "skipped non-frame bytes");
                    return Some(WalkEvent::Skipped {
                        start: run.start,
                        end: span.end,
                        bounds_faults: run.bounds_faults,
                    });
                }
                continue;
            }

            let at = span.cursor;
            let looks_like_tag = self
                .data
                .get(at..at + layout::TAG_LEN)
                .is_some_and(layout::looks_like_tag);
            let header = if looks_like_tag {
                let mut cursor = ByteCursor::with_range(self.data, at, span.end);
                Some(read_frame_header(&mut cursor))
            } else {
                None
            };

            match header {
                Some(Ok(header)) => {
                    let depth = span.depth;
                    let run = span.skip.take();
                    span.cursor = header.payload_end;
                    let node = FrameNode {
                        tag: header.tag,
                        start: header.offset,
                        end: header.payload_end,
                        children: count_children(
                            self.data,
                            header.payload_start,
                            header.payload_end,
                        ),
                        depth,
                    };
                    self.stack.push(Span {
                        cursor: header.payload_start,
                        end: header.payload_end,
                        depth: depth + 1,
                        skip: None,
                    });

                    return Some(match run {
                        Some(run) => {
                            trace!(start = run.start, end = at, "skipped non-frame bytes");
                            self.pending = Some(node);
                            WalkEvent::Skipped {
                                start: run.start,
                                end: at,
                                bounds_faults: run.bounds_faults,
                            }
                        }
                        None => WalkEvent::Frame(node),
                    });
                }
                Some(Err(err)) => {
                    if matches!(err, FrameError::PayloadOverrun { .. }) {
                        debug!(%err, "header bounds fault, resyncing");
                    }
                    let run = span.skip.get_or_insert(SkipRun {
                        start: at,
                        bounds_faults: 0,
                    });
                    run.bounds_faults += 1;
                    span.cursor += 1;
                }
                None => {
                    span.skip.get_or_insert(SkipRun {
                        start: at,
                        bounds_faults: 0,
                    });
                    span.cursor += 1;
                }
            }
        }
    }
}

/// Frame-only view of a [`FrameWalker`].
#[derive(Debug)]
pub struct Frames<'a> {
    inner: FrameWalker<'a>,
}

impl Iterator for Frames<'_> {
    type Item = FrameNode;

    fn next(&mut self) -> Option<FrameNode> {
        self.inner.by_ref().find_map(|event| match event {
            WalkEvent::Frame(node) => Some(node),
            WalkEvent::Skipped { .. } => None,
        })
    }
}

/// Enumerate every frame in `data`, pre-order.
pub fn walk(data: &[u8]) -> Frames<'_> {
    FrameWalker::new(data).frames()
}

/// Like [`walk`], but also reports skipped regions.
pub fn walk_events(data: &[u8]) -> FrameWalker<'_> {
    FrameWalker::new(data)
}

/// Count immediate children by sequential header reads; stops at the first
/// byte run that is not a valid frame.
fn count_children(data: &[u8], start: usize, end: usize) -> usize {
    let mut cursor = ByteCursor::with_range(data, start, end);
    let mut count = 0;
    while cursor.remaining() >= layout::HEADER_LEN {
        if !cursor
            .peek(layout::TAG_LEN)
            .is_some_and(layout::looks_like_tag)
        {
            break;
        }
        match read_frame_header(&mut cursor) {
            Ok(header) => {
                count += 1;
                cursor.seek(header.payload_end);
            }
            Err(_) => break,
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::{FrameNode, WalkEvent, walk, walk_events};
    use crate::frame::header::FrameTag;
    use crate::frame::testutil::{be32, frame};

    fn tags(data: &[u8]) -> Vec<String> {
        walk(data).map(|node| node.tag.to_string()).collect()
    }

    #[test]
    fn walks_nested_frames_in_pre_order() {
        let leaf_a = frame(b"DDIF", &be32(1));
        let leaf_b = frame(b"DDCB", &[]);
        let inner = frame(b"DDAT", &[leaf_a, leaf_b].concat());
        let sibling = frame(b"DEVX", &[]);
        let data = [frame(b"DEVI", &inner), sibling].concat();

        assert_eq!(tags(&data), ["DEVI", "DDAT", "DDIF", "DDCB", "DEVX"]);
    }

    #[test]
    fn reports_offsets_depth_and_child_counts() {
        let inner = frame(b"DDAT", &[frame(b"DDIF", &be32(1)), frame(b"DDCB", &[])].concat());
        let data = frame(b"DEVI", &inner);
        let nodes: Vec<FrameNode> = walk(&data).collect();

        assert_eq!(
            nodes[0],
            FrameNode {
                tag: FrameTag::new(b"DEVI"),
                start: 0,
                end: data.len(),
                children: 1,
                depth: 0,
            }
        );
        assert_eq!(nodes[1].children, 2);
        assert_eq!(nodes[1].depth, 1);
        assert_eq!(nodes[1].payload_start(), 16);
        assert_eq!(nodes[2].start, 16);
        assert_eq!(nodes[2].end, 28);
        assert_eq!(nodes[2].children, 0);
        assert_eq!(nodes[3].depth, 2);
    }

    #[test]
    fn resyncs_over_junk_between_siblings() {
        let data = [
            frame(b"AAAA", &be32(7)),
            vec![0x00, 0xff, b' ', 0x01, 0x02],
            frame(b"BBBB", &[]),
        ]
        .concat();

        assert_eq!(tags(&data), ["AAAA", "BBBB"]);
    }

    #[test]
    fn overrunning_header_is_skipped() {
        let mut bad = b"BADF".to_vec();
        bad.extend_from_slice(&0xffffu32.to_be_bytes());
        let data = [frame(b"GOOD", &[]), bad].concat();

        assert_eq!(tags(&data), ["GOOD"]);
    }

    #[test]
    fn skipped_regions_are_coalesced() {
        let data = [
            vec![0x00, 0x01, 0x02],
            frame(b"AAAA", &[]),
            vec![0xee; 9],
        ]
        .concat();
        let events: Vec<WalkEvent> = walk_events(&data).collect();

        assert_eq!(
            events[0],
            WalkEvent::Skipped {
                start: 0,
                end: 3,
                bounds_faults: 0,
            }
        );
        assert!(matches!(&events[1], WalkEvent::Frame(node) if node.start == 3));
        assert_eq!(
            events[2],
            WalkEvent::Skipped {
                start: 11,
                end: 20,
                bounds_faults: 0,
            }
        );
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn trailing_run_reaches_the_parent_end() {
        let payload = [frame(b"CHLD", &[]), vec![0xee; 10]].concat();
        let data = [frame(b"PRNT", &payload), frame(b"SIBL", &[])].concat();
        let events: Vec<WalkEvent> = walk_events(&data).collect();

        assert_eq!(events.len(), 4);
        assert_eq!(
            events[2],
            WalkEvent::Skipped {
                start: 16,
                end: 26,
                bounds_faults: 0,
            }
        );
        assert!(matches!(&events[3], WalkEvent::Frame(node) if node.start == 26));
    }

    #[test]
    fn bounds_faults_are_counted() {
        let mut data = b"BADF".to_vec();
        data.extend_from_slice(&0x100u32.to_be_bytes());
        data.extend_from_slice(&[0u8; 4]);
        let events: Vec<WalkEvent> = walk_events(&data).collect();

        assert_eq!(
            events,
            [WalkEvent::Skipped {
                start: 0,
                end: 16,
                bounds_faults: 1,
            }]
        );
    }

    #[test]
    fn child_count_stops_at_junk() {
        let payload = [frame(b"CHLD", &[]), vec![0x00; 8], frame(b"CHLD", &[])].concat();
        let data = frame(b"PRNT", &payload);
        let nodes: Vec<FrameNode> = walk(&data).collect();

        assert_eq!(nodes[0].children, 1);
        assert_eq!(nodes.len(), 3);
    }

    #[test]
    fn empty_and_tiny_buffers_yield_nothing() {
        assert_eq!(walk(&[]).count(), 0);
        assert_eq!(walk(b"DEVI").count(), 0);
    }
}
