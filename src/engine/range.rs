//! Span helpers shared by the decoration builder and the reconciler.

use super::buffer::TextBuffer;
use super::types::Span;

/// Text covered by the given 1-based span.
///
/// Diff providers emit `0` coordinates for the empty side of a pure insertion
/// or deletion; any such span yields `""` without reading the buffer.
pub fn get_text_in_span(
    buffer: Option<&dyn TextBuffer>,
    start_line: u32,
    start_column: u32,
    end_line: u32,
    end_column: u32,
) -> String {
    let Some(buffer) = buffer else {
        return String::new();
    };
    if start_line == 0 || start_column == 0 || end_line == 0 || end_column == 0 {
        return String::new();
    }
    buffer.text_in_range(&Span::new(start_line, start_column, end_line, end_column))
}

/// Split `span` into per-line spans, in line order.
///
/// Lines whose contribution would be zero-width are skipped. The returned
/// iterator is lazy and can be cloned to restart it.
pub fn split_into_single_line_spans<'a, B>(buffer: &'a B, span: Span) -> SingleLineSpans<'a, B>
where
    B: TextBuffer + ?Sized,
{
    SingleLineSpans {
        buffer,
        span,
        next_line: span.start.line,
    }
}

pub struct SingleLineSpans<'a, B: ?Sized> {
    buffer: &'a B,
    span: Span,
    next_line: u32,
}

impl<B: ?Sized> Clone for SingleLineSpans<'_, B> {
    fn clone(&self) -> Self {
        Self {
            buffer: self.buffer,
            span: self.span,
            next_line: self.next_line,
        }
    }
}

impl<B> Iterator for SingleLineSpans<'_, B>
where
    B: TextBuffer + ?Sized,
{
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        let span = self.span;

        if span.is_single_line() {
            if self.next_line != span.start.line {
                return None;
            }
            self.next_line += 1;
            if span.start.column == span.end.column {
                return None;
            }
            return Some(span);
        }

        while self.next_line <= span.end.line {
            let line = self.next_line;
            self.next_line += 1;

            let start_column = if line == span.start.line {
                span.start.column
            } else {
                1
            };
            let end_column = if line == span.end.line {
                span.end.column
            } else {
                self.buffer.line_max_column(line)
            };

            if start_column != end_column {
                return Some(Span::new(line, start_column, line, end_column));
            }
        }

        None
    }
}
