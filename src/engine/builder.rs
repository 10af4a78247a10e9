//! Turns line and char changes into per-side decoration lists.

use super::buffer::TextBuffer;
use super::range::{get_text_in_span, split_into_single_line_spans};
use super::refine::refine;
use super::types::{
    CharChange, Decoration, DecorationClass, DiffFragment, FragmentKind, LineChange, Span,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltDecorations {
    pub original: Vec<Decoration>,
    pub modified: Vec<Decoration>,
}

impl BuiltDecorations {
    pub fn is_empty(&self) -> bool {
        self.original.is_empty() && self.modified.is_empty()
    }
}

/// Absolute character ranges of the `Removed` and `Added` fragments, relative
/// to the start of the refined region on each side.
///
/// `Common` fragments advance both counters, `Removed` only the original one
/// and `Added` only the modified one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentRanges {
    pub removed: Vec<(usize, usize)>,
    pub added: Vec<(usize, usize)>,
}

pub fn fragment_ranges(fragments: &[DiffFragment]) -> FragmentRanges {
    let mut ranges = FragmentRanges::default();
    let mut original_offset = 0usize;
    let mut modified_offset = 0usize;

    for fragment in fragments {
        let length = fragment.char_len();
        match fragment.kind {
            FragmentKind::Common => {
                original_offset += length;
                modified_offset += length;
            }
            FragmentKind::Removed => {
                ranges.removed.push((original_offset, original_offset + length));
                original_offset += length;
            }
            FragmentKind::Added => {
                ranges.added.push((modified_offset, modified_offset + length));
                modified_offset += length;
            }
        }
    }

    ranges
}

/// Compute decorations for both sides.
///
/// Returns empty lists when either buffer is unavailable.
pub fn build(
    line_changes: &[LineChange],
    original: Option<&dyn TextBuffer>,
    modified: Option<&dyn TextBuffer>,
) -> BuiltDecorations {
    let (Some(original), Some(modified)) = (original, modified) else {
        tracing::debug!("Skipping decoration build: buffer unavailable");
        return BuiltDecorations::default();
    };

    let mut built = BuiltDecorations::default();

    for line_change in line_changes {
        match line_change.char_changes() {
            None => {
                for line in line_change.original_lines() {
                    built.original.push(line_decoration(
                        original,
                        line,
                        DecorationClass::LineDelete,
                        DecorationClass::EmptyLineDelete,
                    ));
                }
                for line in line_change.modified_lines() {
                    built.modified.push(line_decoration(
                        modified,
                        line,
                        DecorationClass::LineInsert,
                        DecorationClass::EmptyLineInsert,
                    ));
                }
            }
            Some(char_changes) => {
                for char_change in char_changes {
                    push_char_decorations(&mut built, char_change, original, modified);
                }
            }
        }
    }

    tracing::trace!(
        "Built {} original and {} modified decorations",
        built.original.len(),
        built.modified.len()
    );
    built
}

fn line_decoration(
    buffer: &dyn TextBuffer,
    line: u32,
    class: DecorationClass,
    empty_class: DecorationClass,
) -> Decoration {
    let max_column = buffer.line_max_column(line);
    if max_column == 1 {
        Decoration::whole_line(line, empty_class)
    } else {
        // Inline full-row span rather than a whole-line background.
        Decoration::inline(Span::new(line, 1, line, max_column), class)
    }
}

/// Refined text for both sides of one char change.
pub fn char_change_texts(
    char_change: &CharChange,
    original: Option<&dyn TextBuffer>,
    modified: Option<&dyn TextBuffer>,
) -> (String, String) {
    let original_text = get_text_in_span(
        original,
        char_change.original_start_line,
        char_change.original_start_column,
        char_change.original_end_line,
        char_change.original_end_column,
    );
    let modified_text = get_text_in_span(
        modified,
        char_change.modified_start_line,
        char_change.modified_start_column,
        char_change.modified_end_line,
        char_change.modified_end_column,
    );
    (original_text, modified_text)
}

fn push_char_decorations(
    built: &mut BuiltDecorations,
    char_change: &CharChange,
    original: &dyn TextBuffer,
    modified: &dyn TextBuffer,
) {
    let (original_text, modified_text) =
        char_change_texts(char_change, Some(original), Some(modified));
    let fragments = refine(&original_text, &modified_text);
    let ranges = fragment_ranges(&fragments);

    if !ranges.removed.is_empty() {
        let base = original.offset_at(char_change.original_start());
        push_ranges(
            &mut built.original,
            original,
            base,
            &ranges.removed,
            DecorationClass::CharDelete,
        );
    }
    if !ranges.added.is_empty() {
        let base = modified.offset_at(char_change.modified_start());
        push_ranges(
            &mut built.modified,
            modified,
            base,
            &ranges.added,
            DecorationClass::CharInsert,
        );
    }
}

fn push_ranges(
    decorations: &mut Vec<Decoration>,
    buffer: &dyn TextBuffer,
    base: usize,
    ranges: &[(usize, usize)],
    class: DecorationClass,
) {
    for (start, end) in ranges {
        let span = Span::from_positions(
            buffer.position_at(base + start),
            buffer.position_at(base + end),
        );
        decorations.extend(
            split_into_single_line_spans(buffer, span).map(|piece| Decoration::inline(piece, class)),
        );
    }
}
