//! Occupied text ranges for one detection pass

use super::types::Position;

/// Ranges already claimed by accepted indicators, kept sorted by start.
///
/// Accepted ranges never overlap, so sorting by start also sorts by end and
/// only the last range starting before a candidate's end can overlap it.
#[derive(Debug, Default)]
pub(crate) struct OccupiedRanges {
    ranges: Vec<Position>,
}

impl OccupiedRanges {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// True when `pos` overlaps any claimed range
    pub(crate) fn overlaps(&self, pos: &Position) -> bool {
        let idx = self.ranges.partition_point(|r| r.start < pos.end);
        idx > 0 && self.ranges[idx - 1].overlaps(pos)
    }

    /// Claim `pos`. Callers check `overlaps` first.
    pub(crate) fn insert(&mut self, pos: Position) {
        let idx = self.ranges.partition_point(|r| r.start < pos.start);
        self.ranges.insert(idx, pos);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.ranges.len()
    }
}
