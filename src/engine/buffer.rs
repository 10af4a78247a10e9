//! Read-only text buffer capability used by the decoration engine.

use super::types::{Position, Span};

/// What the engine needs from a text document.
///
/// Positions are 1-based; offsets are 0-based and count characters, with a
/// line break counting as one character.
pub trait TextBuffer {
    fn line_count(&self) -> u32;

    /// Length of `line` in characters plus one. Returns `1` for lines out of range.
    fn line_max_column(&self, line: u32) -> u32;

    fn offset_at(&self, position: Position) -> usize;

    fn position_at(&self, offset: usize) -> Position;

    fn text_in_range(&self, span: &Span) -> String;
}

/// In-memory text document with a line index.
///
/// Line endings are normalised to `\n` on construction.
#[derive(Debug, Clone, Default)]
pub struct TextModel {
    text: String,
    /// Character offset where each line starts.
    line_starts: Vec<usize>,
    /// Byte offset where each line starts.
    line_byte_starts: Vec<usize>,
    /// Character count of each line, line break excluded.
    line_lengths: Vec<usize>,
}

impl TextModel {
    pub fn new(text: &str) -> Self {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");

        let mut line_starts = vec![0];
        let mut line_byte_starts = vec![0];
        let mut line_lengths = Vec::new();
        let mut current = 0usize;
        let mut offset = 0usize;
        for (byte, ch) in text.char_indices() {
            offset += 1;
            if ch == '\n' {
                line_lengths.push(current);
                line_starts.push(offset);
                line_byte_starts.push(byte + 1);
                current = 0;
            } else {
                current += 1;
            }
        }
        line_lengths.push(current);

        Self {
            text,
            line_starts,
            line_byte_starts,
            line_lengths,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Content of `line` without its line break, or `None` if out of range.
    pub fn line_content(&self, line: u32) -> Option<&str> {
        let index = (line as usize).checked_sub(1)?;
        let length = *self.line_lengths.get(index)?;
        let start = self.line_byte_starts[index];
        let end = self.byte_in_line(index, length);
        Some(&self.text[start..end])
    }

    fn total_chars(&self) -> usize {
        self.line_starts[self.line_starts.len() - 1] + self.line_lengths[self.line_lengths.len() - 1]
    }

    fn line_index_of(&self, char_offset: usize) -> usize {
        match self.line_starts.binary_search(&char_offset) {
            Ok(index) => index,
            Err(insert_at) => insert_at - 1,
        }
    }

    /// Byte offset of the `column`-th character (0-based) of line `index`.
    /// Only the line itself is scanned.
    fn byte_in_line(&self, index: usize, column: usize) -> usize {
        let start = self.line_byte_starts[index];
        let line_end = self
            .line_byte_starts
            .get(index + 1)
            .copied()
            .unwrap_or(self.text.len());
        self.text[start..line_end]
            .char_indices()
            .nth(column)
            .map(|(byte, _)| start + byte)
            .unwrap_or(line_end)
    }

    fn byte_at(&self, char_offset: usize) -> usize {
        let char_offset = char_offset.min(self.total_chars());
        let index = self.line_index_of(char_offset);
        self.byte_in_line(index, char_offset - self.line_starts[index])
    }

    fn slice_chars(&self, start: usize, end: usize) -> &str {
        let start_byte = self.byte_at(start);
        let end_byte = self.byte_at(end.max(start));
        &self.text[start_byte..end_byte]
    }

    fn clamp(&self, position: Position) -> Position {
        let line_count = self.line_count();
        let line = position.line.clamp(1, line_count);
        let column = position.column.clamp(1, self.line_max_column(line));
        Position::new(line, column)
    }
}

impl TextBuffer for TextModel {
    fn line_count(&self) -> u32 {
        self.line_lengths.len() as u32
    }

    fn line_max_column(&self, line: u32) -> u32 {
        (line as usize)
            .checked_sub(1)
            .and_then(|index| self.line_lengths.get(index))
            .map(|length| *length as u32 + 1)
            .unwrap_or(1)
    }

    fn offset_at(&self, position: Position) -> usize {
        let position = self.clamp(position);
        self.line_starts[position.line as usize - 1] + position.column as usize - 1
    }

    fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.total_chars());
        let index = self.line_index_of(offset);
        Position::new(
            index as u32 + 1,
            (offset - self.line_starts[index]) as u32 + 1,
        )
    }

    fn text_in_range(&self, span: &Span) -> String {
        let start = self.offset_at(span.start);
        let end = self.offset_at(span.end);
        if end <= start {
            return String::new();
        }
        self.slice_chars(start, end).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index() {
        let model = TextModel::new("hello\n\nworld!");
        assert_eq!(model.line_count(), 3);
        assert_eq!(model.line_max_column(1), 6);
        assert_eq!(model.line_max_column(2), 1);
        assert_eq!(model.line_max_column(3), 7);
        assert_eq!(model.line_max_column(4), 1);
        assert_eq!(model.line_content(3), Some("world!"));
        assert_eq!(model.line_content(0), None);
    }

    #[test]
    fn test_offset_position_conversion() {
        let model = TextModel::new("ab\ncd\n");
        assert_eq!(model.offset_at(Position::new(1, 1)), 0);
        assert_eq!(model.offset_at(Position::new(2, 2)), 4);
        assert_eq!(model.position_at(2), Position::new(1, 3));
        assert_eq!(model.position_at(3), Position::new(2, 1));
        assert_eq!(model.position_at(6), Position::new(3, 1));
        // Clamped past the end of the document.
        assert_eq!(model.position_at(100), Position::new(3, 1));

        for offset in 0..=6 {
            assert_eq!(model.offset_at(model.position_at(offset)), offset);
        }
    }

    #[test]
    fn test_text_in_range_multiline() {
        let model = TextModel::new("first\nsecond\nthird");
        assert_eq!(model.text_in_range(&Span::new(1, 3, 3, 3)), "rst\nsecond\nth");
        assert_eq!(model.text_in_range(&Span::new(2, 1, 2, 7)), "second");
        assert_eq!(model.text_in_range(&Span::new(2, 4, 2, 4)), "");
    }

    #[test]
    fn test_crlf_normalised() {
        let model = TextModel::new("a\r\nb\rc");
        assert_eq!(model.text(), "a\nb\nc");
        assert_eq!(model.line_count(), 3);
    }

    #[test]
    fn test_multibyte_columns() {
        let model = TextModel::new("我爱你\nok");
        assert_eq!(model.line_max_column(1), 4);
        assert_eq!(model.text_in_range(&Span::new(1, 2, 1, 4)), "爱你");
        assert_eq!(model.offset_at(Position::new(2, 1)), 4);
        assert_eq!(model.line_content(2), Some("ok"));
        assert_eq!(model.text_in_range(&Span::new(1, 3, 2, 2)), "你\no");
    }

    #[test]
    fn test_line_slicing_uses_byte_index() {
        let text: String = (0..3000)
            .map(|i| format!("línea {} · ü\n", i))
            .collect();
        let model = TextModel::new(&text);
        assert_eq!(model.line_count(), 3001);
        assert_eq!(model.line_content(2500), Some("línea 2499 · ü"));
        assert_eq!(model.line_content(3001), Some(""));
        assert_eq!(
            model.text_in_range(&Span::new(2999, 7, 3000, 5)),
            "2998 · ü\nlíne"
        );
        let offset = model.offset_at(Position::new(1500, 3));
        assert_eq!(model.position_at(offset), Position::new(1500, 3));
    }
}
