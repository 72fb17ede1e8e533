use std::{cell::OnceCell, fmt};

/// Represents a byte span within a source file (end is exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: SourceSpan) -> SourceSpan {
        SourceSpan {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn start_position<'src>(&self, source: &'src str) -> TextPosition<'src> {
        TextPosition::new(source, self.start)
    }
}

/// A byte offset into a particular source text.
///
/// Line and column (both 1-based, column counted in characters) are only
/// computed the first time they are asked for.
#[derive(Clone)]
pub struct TextPosition<'src> {
    source: &'src str,
    offset: usize,
    line_col: OnceCell<(usize, usize)>,
}

impl<'src> TextPosition<'src> {
    pub fn new(source: &'src str, offset: usize) -> Self {
        Self {
            source,
            offset: offset.min(source.len()),
            line_col: OnceCell::new(),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn line(&self) -> usize {
        self.line_col().0
    }

    pub fn column(&self) -> usize {
        self.line_col().1
    }

    pub fn line_col(&self) -> (usize, usize) {
        *self.line_col.get_or_init(|| {
            let before = &self.source[..floor_char_boundary(self.source, self.offset)];
            let line = before.matches('\n').count() + 1;
            let line_start = before.rfind('\n').map(|idx| idx + 1).unwrap_or(0);
            let column = before[line_start..].chars().count() + 1;
            (line, column)
        })
    }

    /// Byte offset of the first character on this position's line.
    pub fn line_start(&self) -> usize {
        let before = &self.source[..floor_char_boundary(self.source, self.offset)];
        before.rfind('\n').map(|idx| idx + 1).unwrap_or(0)
    }
}

impl PartialEq for TextPosition<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
    }
}

impl Eq for TextPosition<'_> {}

impl fmt::Debug for TextPosition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, column) = self.line_col();
        f.debug_struct("TextPosition")
            .field("offset", &self.offset)
            .field("line", &line)
            .field("column", &column)
            .finish()
    }
}

fn floor_char_boundary(source: &str, mut offset: usize) -> usize {
    while offset > 0 && !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// A resolved statement address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coordinate {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Coordinate {
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}:{}]", self.x, self.y, self.z)
    }
}
