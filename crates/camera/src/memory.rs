//! Byte sources the scanner reads from.
//!
//! A [`MemorySource`] exposes its bytes together with a region map so the
//! scanner can check liveness before every read. Reads never cross a region
//! boundary and never touch an unreadable region.

use framelens_common::{FramelensError, FramelensResult};

/// A contiguous span `[start, end)` with uniform readability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: usize,
    pub end: usize,
    pub readable: bool,
}

impl Region {
    pub fn readable(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            readable: true,
        }
    }

    pub fn unreadable(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            readable: false,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// Raw bytes plus the liveness information needed to read them safely.
pub trait MemorySource {
    /// Total addressable length in bytes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The region containing `offset`, or `None` past the end.
    fn region_at(&self, offset: usize) -> Option<Region>;

    /// Borrow `len` bytes at `offset`, or `None` if any byte is unreadable
    /// or the span crosses a region boundary.
    fn read(&self, offset: usize, len: usize) -> Option<&[u8]>;
}

/// A fully readable byte slice.
#[derive(Debug, Clone, Copy)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
}

impl<'a> SliceSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl MemorySource for SliceSource<'_> {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn region_at(&self, offset: usize) -> Option<Region> {
        (offset < self.bytes.len()).then(|| Region::readable(0, self.bytes.len()))
    }

    fn read(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        self.bytes.get(offset..end)
    }
}

/// A byte slice with an explicit region map.
///
/// Gaps between listed regions are treated as unreadable.
#[derive(Debug, Clone)]
pub struct SegmentedSource<'a> {
    bytes: &'a [u8],
    regions: Vec<Region>,
}

impl<'a> SegmentedSource<'a> {
    /// Build a source from a region map.
    ///
    /// Regions must be non-empty, inside `bytes`, and must not overlap.
    pub fn new(bytes: &'a [u8], mut regions: Vec<Region>) -> FramelensResult<Self> {
        regions.sort_by_key(|r| r.start);

        for region in &regions {
            if region.is_empty() || region.start > region.end {
                return Err(FramelensError::memory(format!(
                    "empty region [{:#x}, {:#x})",
                    region.start, region.end
                )));
            }
            if region.end > bytes.len() {
                return Err(FramelensError::memory(format!(
                    "region [{:#x}, {:#x}) exceeds source length {:#x}",
                    region.start,
                    region.end,
                    bytes.len()
                )));
            }
        }
        for pair in regions.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(FramelensError::memory(format!(
                    "regions [{:#x}, {:#x}) and [{:#x}, {:#x}) overlap",
                    pair[0].start, pair[0].end, pair[1].start, pair[1].end
                )));
            }
        }

        Ok(Self { bytes, regions })
    }

    /// Build a source that is readable everywhere except the given byte ranges.
    pub fn with_unreadable(bytes: &'a [u8], unreadable: &[(usize, usize)]) -> FramelensResult<Self> {
        let mut holes: Vec<(usize, usize)> = unreadable.to_vec();
        holes.sort_unstable();

        let mut regions = Vec::with_capacity(holes.len() * 2 + 1);
        let mut cursor = 0;
        for (start, end) in holes {
            if start < cursor {
                return Err(FramelensError::memory(format!(
                    "unreadable range [{start:#x}, {end:#x}) overlaps a previous range"
                )));
            }
            if start > cursor {
                regions.push(Region::readable(cursor, start));
            }
            regions.push(Region::unreadable(start, end));
            cursor = end;
        }
        if cursor < bytes.len() {
            regions.push(Region::readable(cursor, bytes.len()));
        }

        Self::new(bytes, regions)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }
}

impl MemorySource for SegmentedSource<'_> {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn region_at(&self, offset: usize) -> Option<Region> {
        if offset >= self.bytes.len() {
            return None;
        }
        // First region ending after `offset`.
        let idx = self.regions.partition_point(|r| r.end <= offset);
        match self.regions.get(idx) {
            Some(region) if region.contains(offset) => Some(*region),
            Some(next) => Some(Region::unreadable(offset, next.start)),
            None => Some(Region::unreadable(offset, self.bytes.len())),
        }
    }

    fn read(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        let region = self.region_at(offset)?;
        if !region.readable || end > region.end {
            return None;
        }
        self.bytes.get(offset..end)
    }
}
