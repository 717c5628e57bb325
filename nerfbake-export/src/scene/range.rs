//! Inclusive scene frame ranges

/// An inclusive range of scene frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub start: i32,
    pub end: i32,
}

impl FrameRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// `count` consecutive frames beginning at `start`: `[start, start + count - 1]`.
    ///
    /// The end saturates at `i32::MAX`; use [`FrameRange::checked_from_count`] to reject ranges
    /// that do not fit.
    pub fn from_count(start: i32, count: i32) -> Self {
        Self::new(start, start.saturating_add(count.saturating_sub(1)))
    }

    /// Like [`FrameRange::from_count`], but `None` if the last frame is past `i32::MAX`.
    pub fn checked_from_count(start: i32, count: i32) -> Option<Self> {
        let end = start.checked_add(count.checked_sub(1)?)?;
        Some(Self::new(start, end))
    }

    pub fn contains(&self, frame: i32) -> bool {
        frame >= self.start && frame <= self.end
    }

    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (i64::from(self.end) - i64::from(self.start)) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn frames(&self) -> std::ops::RangeInclusive<i32> {
        self.start..=self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_count_is_inclusive() {
        let range = FrameRange::from_count(1, 3);
        assert_eq!(range, FrameRange::new(1, 3));
        assert_eq!(range.len(), 3);
        assert_eq!(range.frames().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_zero_count_is_empty() {
        let range = FrameRange::from_count(10, 0);
        assert!(range.is_empty());
        assert!(!range.contains(10));
    }

    #[test]
    fn test_count_past_last_frame() {
        assert_eq!(FrameRange::checked_from_count(10, i32::MAX), None);
        assert_eq!(
            FrameRange::checked_from_count(1, i32::MAX),
            Some(FrameRange::new(1, i32::MAX))
        );

        let range = FrameRange::from_count(10, i32::MAX);
        assert_eq!(range.end, i32::MAX);
        assert_eq!(range.len(), (i32::MAX - 9) as usize);
    }

    #[test]
    fn test_len_spans_full_domain() {
        assert_eq!(FrameRange::new(i32::MIN, i32::MAX).len(), 1 << 32);
    }
}
