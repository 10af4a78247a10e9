/// A 1-based (line, column) location inside a text buffer.
///
/// Columns count characters, so column 1 sits before the first character of
/// the line and `line_max_column` sits after the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A range between two positions, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start: Position::new(start_line, start_column),
            end: Position::new(end_line, end_column),
        }
    }

    pub fn from_positions(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }
}

/// A character-granularity changed region nested inside a [`LineChange`].
///
/// A side that has no text uses `0` for its end coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharChange {
    pub original_start_line: u32,
    pub original_start_column: u32,
    pub original_end_line: u32,
    pub original_end_column: u32,
    pub modified_start_line: u32,
    pub modified_start_column: u32,
    pub modified_end_line: u32,
    pub modified_end_column: u32,
}

impl CharChange {
    pub fn original_start(&self) -> Position {
        Position::new(self.original_start_line, self.original_start_column)
    }

    pub fn modified_start(&self) -> Position {
        Position::new(self.modified_start_line, self.modified_start_column)
    }
}

/// One contiguous block of difference between the original and modified
/// buffers. Line numbers are inclusive; an end of `0` means the side has no
/// lines (pure insertion or pure deletion).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChange {
    pub original_start_line: u32,
    pub original_end_line: u32,
    pub modified_start_line: u32,
    pub modified_end_line: u32,
    pub char_changes: Option<Vec<CharChange>>,
}

impl LineChange {
    /// Char changes, if any were computed and the list is not empty.
    pub fn char_changes(&self) -> Option<&[CharChange]> {
        self.char_changes
            .as_deref()
            .filter(|changes| !changes.is_empty())
    }

    pub fn original_lines(&self) -> impl Iterator<Item = u32> {
        (self.original_start_line..=self.original_end_line).filter(|line| *line > 0)
    }

    pub fn modified_lines(&self) -> impl Iterator<Item = u32> {
        (self.modified_start_line..=self.modified_end_line).filter(|line| *line > 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Common,
    Removed,
    Added,
}

/// A tagged piece of a character-level refinement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffFragment {
    pub kind: FragmentKind,
    pub value: String,
}

impl DiffFragment {
    pub fn new(kind: FragmentKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Length in characters, the unit offsets are measured in.
    pub fn char_len(&self) -> usize {
        self.value.chars().count()
    }
}

/// Visual class attached to a decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationClass {
    LineDelete,
    LineInsert,
    EmptyLineDelete,
    EmptyLineInsert,
    CharDelete,
    CharInsert,
}

impl DecorationClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecorationClass::LineDelete => "line-delete",
            DecorationClass::LineInsert => "line-insert",
            DecorationClass::EmptyLineDelete => "empty-line-delete",
            DecorationClass::EmptyLineInsert => "empty-line-insert",
            DecorationClass::CharDelete => "char-delete",
            DecorationClass::CharInsert => "char-insert",
        }
    }

    pub fn is_char_level(&self) -> bool {
        matches!(self, DecorationClass::CharDelete | DecorationClass::CharInsert)
    }
}

/// How a decoration reacts to typing at its edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stickiness {
    #[default]
    NeverGrowsWhenTypingAtEdges,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub span: Span,
    pub class: DecorationClass,
    pub is_whole_line: bool,
    pub stickiness: Stickiness,
}

impl Decoration {
    pub fn inline(span: Span, class: DecorationClass) -> Self {
        Self {
            span,
            class,
            is_whole_line: false,
            stickiness: Stickiness::default(),
        }
    }

    pub fn whole_line(line: u32, class: DecorationClass) -> Self {
        Self {
            span: Span::new(line, 1, line, 1),
            class,
            is_whole_line: true,
            stickiness: Stickiness::default(),
        }
    }
}

/// Which buffer of the comparison something belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Original,
    Modified,
}

/// Opaque token for one installed decoration set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecorationHandle(u64);

impl DecorationHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}
