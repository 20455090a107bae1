//! Byte locations in a raw input

use std::ops::Range;

/// Location in a raw input
///
/// The offsets are zero-indexed byte offsets from the beginning of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    pub(crate) fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span ends before it starts");
        Self { start, end }
    }

    /// Empty span at a position
    pub(crate) fn pos(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// End (exclusive) offset of the span
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span containing both
    pub(crate) fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Same location counted in chars instead of bytes
    ///
    /// Reports count columns in chars, so `µ` is one column wide.
    pub(crate) fn char_range(&self, input: &str) -> Range<usize> {
        let start = input[..self.start].chars().count();
        let len = input[self.range()].chars().count();
        start..start + len
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<Range<usize>> for Span {
    fn from(value: Range<usize>) -> Self {
        Self::new(value.start, value.end)
    }
}

impl From<Span> for Range<usize> {
    fn from(value: Span) -> Self {
        value.range()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join() {
        let a = Span::new(2, 4);
        assert_eq!(a.to(Span::new(6, 9)), Span::new(2, 9));
        assert_eq!(Span::new(6, 9).to(a), Span::new(2, 9));
        assert_eq!(a.to(Span::pos(3)), a);
    }

    #[test]
    fn chars() {
        let input = "5 µm/s";
        // `µ` is 2 bytes
        let unit = Span::new(2, 5);
        assert_eq!(&input[unit.range()], "µm");
        assert_eq!(unit.char_range(input), 2..4);
        assert_eq!(Span::new(5, 6).char_range(input), 4..5);
    }
}
