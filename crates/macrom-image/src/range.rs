use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero for reversed ranges.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Range<usize>> for ByteRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// Collapse a write-tracking mask into maximal runs of written bytes, in ascending order.
pub(crate) fn runs_of_written(mask: &[bool]) -> Vec<ByteRange> {
    let mut out = Vec::new();
    let mut run_start: Option<usize> = None;

    for (idx, &written) in mask.iter().enumerate() {
        match (written, run_start) {
            (true, None) => run_start = Some(idx),
            (false, Some(start)) => {
                out.push(ByteRange::from(start..idx));
                run_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = run_start {
        out.push(ByteRange::from(start..mask.len()));
    }

    out
}
