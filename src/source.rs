//! Source files and text spans
//!
//! Every token and AST node points back into the text it came from through a
//! [`Span`]. Spans name their file by [`FileId`]; the [`SourceMap`] owns the
//! file names and contents so diagnostics can quote the offending line.

/// Index of a file registered in a [`SourceMap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileId(pub u32);

/// Region of source text
///
/// Offsets are byte offsets, lines and columns are 1-based. The end offset and
/// end column are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub file: FileId,
    pub start: usize,
    pub end: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub start_column: usize,
    pub end_column: usize,
}

impl Span {
    pub fn new(
        file: FileId,
        start: usize,
        end: usize,
        start_line: usize,
        start_column: usize,
        end_line: usize,
        end_column: usize,
    ) -> Self {
        Self {
            file,
            start,
            end: end.max(start),
            start_line,
            end_line,
            start_column,
            end_column,
        }
    }

    /// Zero-width span at a single position
    pub fn point(file: FileId, offset: usize, line: usize, column: usize) -> Self {
        Self::new(file, offset, offset, line, column, line, column)
    }

    /// Smallest span covering both `self` and `other`
    pub fn to(self, other: Span) -> Span {
        let first = if other.start < self.start { other } else { self };
        let last = if other.end > self.end { other } else { self };

        Span {
            file: first.file,
            start: first.start,
            end: last.end,
            start_line: first.start_line,
            end_line: last.end_line,
            start_column: first.start_column,
            end_column: last.end_column,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `other` lies entirely inside `self`
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A single registered file
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

impl SourceFile {
    /// Text of a 1-based line, without its terminator
    pub fn line(&self, line: usize) -> Option<&str> {
        self.text
            .lines()
            .nth(line.checked_sub(1)?)
            .map(|l| l.trim_end_matches('\r'))
    }
}

/// Registry of every file taking part in a compilation
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, text: impl Into<String>) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceFile {
            name: name.into(),
            text: text.into(),
        });
        id
    }

    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }

    pub fn name(&self, id: FileId) -> &str {
        self.get(id).map(|f| f.name.as_str()).unwrap_or("<unknown>")
    }
}
