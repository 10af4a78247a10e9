use crate::backend::diff_backend::DiffSession;
use crate::engine::{Decoration, DecorationClass, LineChange, Side, TextModel};
use crate::style::{ADDED_LINE_BG, GUTTER_TEXT_COLOR, REMOVED_LINE_BG, decoration_background};
use egui::{Color32, FontId, TextFormat, Ui, text::LayoutJob};
use std::collections::{HashMap, HashSet};

/// One visual row of the side-by-side view: a line on each side, or a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignedRow {
    pub original: Option<u32>,
    pub modified: Option<u32>,
}

/// First line of a change on one side, and how many lines it covers there.
pub(crate) fn side_extent(start: u32, end: u32) -> (u32, u32) {
    if end == 0 {
        (start + 1, 0)
    } else {
        (start, end + 1 - start)
    }
}

/// Pair up lines of both sides so unchanged lines sit on the same row.
pub fn aligned_rows(
    line_changes: &[LineChange],
    original_lines: u32,
    modified_lines: u32,
) -> Vec<AlignedRow> {
    let mut rows = Vec::new();
    let mut original = 1u32;
    let mut modified = 1u32;

    for change in line_changes {
        let (original_start, original_len) =
            side_extent(change.original_start_line, change.original_end_line);
        let (modified_start, modified_len) =
            side_extent(change.modified_start_line, change.modified_end_line);

        while original < original_start && modified < modified_start {
            rows.push(AlignedRow {
                original: Some(original),
                modified: Some(modified),
            });
            original += 1;
            modified += 1;
        }

        for i in 0..original_len.max(modified_len) {
            rows.push(AlignedRow {
                original: (i < original_len).then_some(original_start + i),
                modified: (i < modified_len).then_some(modified_start + i),
            });
        }

        original = original_start + original_len;
        modified = modified_start + modified_len;
    }

    while original <= original_lines || modified <= modified_lines {
        rows.push(AlignedRow {
            original: (original <= original_lines).then_some(original),
            modified: (modified <= modified_lines).then_some(modified),
        });
        original += 1;
        modified += 1;
    }

    rows
}

/// Text of `line` between two 1-based columns, end exclusive.
pub(crate) fn slice_columns(text: &str, start_column: u32, end_column: u32) -> &str {
    let byte_at = |column: u32| {
        text.char_indices()
            .nth(column.saturating_sub(1) as usize)
            .map(|(byte, _)| byte)
            .unwrap_or(text.len())
    };
    let start = byte_at(start_column);
    let end = byte_at(end_column).max(start);
    &text[start..end]
}

/// How a single line should be painted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePaint {
    pub whole_line: Option<DecorationClass>,
    pub segments: Vec<(String, Option<DecorationClass>)>,
}

/// Resolve overlapping decorations on one line into styled runs.
///
/// Char-level classes win over full-row classes where both cover a column.
pub fn paint_line(text: &str, line: u32, decorations: &[&Decoration]) -> LinePaint {
    let chars: Vec<char> = text.chars().collect();
    let mut classes: Vec<Option<DecorationClass>> = vec![None; chars.len()];
    let mut whole_line = None;

    for decoration in decorations
        .iter()
        .filter(|d| d.span.start.line == line && d.span.end.line == line)
    {
        if decoration.is_whole_line {
            whole_line = Some(decoration.class);
            continue;
        }
        let start = decoration.span.start.column.saturating_sub(1) as usize;
        let end = (decoration.span.end.column.saturating_sub(1) as usize).min(chars.len());
        for slot in classes.iter_mut().take(end).skip(start) {
            let keep = matches!(slot, Some(existing) if existing.is_char_level());
            if !keep {
                *slot = Some(decoration.class);
            }
        }
    }

    let mut segments: Vec<(String, Option<DecorationClass>)> = Vec::new();
    for (ch, class) in chars.into_iter().zip(classes) {
        match segments.last_mut() {
            Some((text, last)) if *last == class => text.push(ch),
            _ => segments.push((ch.to_string(), class)),
        }
    }

    LinePaint {
        whole_line,
        segments,
    }
}

fn decorations_by_line(session: &DiffSession, side: Side) -> HashMap<u32, Vec<&Decoration>> {
    let mut by_line: HashMap<u32, Vec<&Decoration>> = HashMap::new();
    for decoration in session.decorations(side) {
        by_line
            .entry(decoration.span.start.line)
            .or_default()
            .push(decoration);
    }
    by_line
}

fn changed_lines(line_changes: &[LineChange], side: Side) -> HashSet<u32> {
    line_changes
        .iter()
        .flat_map(|change| {
            let (start, end) = match side {
                Side::Original => (change.original_start_line, change.original_end_line),
                Side::Modified => (change.modified_start_line, change.modified_end_line),
            };
            (start..=end).filter(|line| *line > 0)
        })
        .collect()
}

/// Line highlighting for one pane.
pub(crate) enum PaneHighlight<'a> {
    /// Compact mode: installed decorations, by line.
    Decorations(HashMap<u32, Vec<&'a Decoration>>),
    /// Host default: whole changed lines.
    ChangedLines(HashSet<u32>),
}

impl<'a> PaneHighlight<'a> {
    pub(crate) fn for_side(session: &'a DiffSession, side: Side, compact: bool) -> Self {
        if compact {
            PaneHighlight::Decorations(decorations_by_line(session, side))
        } else {
            PaneHighlight::ChangedLines(changed_lines(session.current_line_changes(), side))
        }
    }

    /// Row fill and styled runs for `line`.
    pub(crate) fn paint(&self, side: Side, text: &str, line: u32) -> (Color32, LinePaint) {
        match self {
            PaneHighlight::Decorations(by_line) => {
                let decorations = by_line.get(&line).map(Vec::as_slice).unwrap_or_default();
                let paint = paint_line(text, line, decorations);
                let fill = paint
                    .whole_line
                    .map(decoration_background)
                    .unwrap_or(Color32::TRANSPARENT);
                (fill, paint)
            }
            PaneHighlight::ChangedLines(lines) => {
                let fill = match (lines.contains(&line), side) {
                    (false, _) => Color32::TRANSPARENT,
                    (true, Side::Original) => REMOVED_LINE_BG,
                    (true, Side::Modified) => ADDED_LINE_BG,
                };
                let paint = LinePaint {
                    whole_line: None,
                    segments: vec![(text.to_string(), None)],
                };
                (fill, paint)
            }
        }
    }
}

/// Layout job for one line: gutter, marker and decorated text.
pub(crate) fn line_job(
    ui: &Ui,
    number: Option<u32>,
    marker: &str,
    paint: &LinePaint,
    font_id: &FontId,
) -> LayoutJob {
    let mut job = LayoutJob::default();
    let base_text_color = ui.visuals().text_color();

    let gutter = number.map(|n| format!("{:>5} ", n)).unwrap_or_else(|| " ".repeat(6));
    job.append(
        &format!("{}{}", gutter, marker),
        0.0,
        TextFormat {
            font_id: font_id.clone(),
            color: GUTTER_TEXT_COLOR,
            ..Default::default()
        },
    );

    for (text, class) in &paint.segments {
        job.append(
            text,
            0.0,
            TextFormat {
                font_id: font_id.clone(),
                color: base_text_color,
                background: class
                    .map(decoration_background)
                    .unwrap_or(Color32::TRANSPARENT),
                ..Default::default()
            },
        );
    }

    job
}

fn show_cell(
    ui: &mut Ui,
    model: Option<&TextModel>,
    line: Option<u32>,
    side: Side,
    highlight: &PaneHighlight<'_>,
    font_id: &FontId,
    width: f32,
) {
    let text = line
        .and_then(|l| model.and_then(|m| m.line_content(l)))
        .unwrap_or_default();
    let (fill, paint) = match line {
        Some(l) => highlight.paint(side, text, l),
        None => (
            Color32::from_gray(245),
            LinePaint {
                whole_line: None,
                segments: Vec::new(),
            },
        ),
    };

    egui::Frame::default()
        .fill(fill)
        .inner_margin(egui::Margin::same(2))
        .show(ui, |ui| {
            ui.set_min_width(width);
            let job = line_job(ui, line, " ", &paint, font_id);
            ui.add(egui::Label::new(job).extend());
        });
}

/// Render both buffers in two aligned columns.
pub fn show(ui: &mut Ui, session: &DiffSession, compact: bool, font_size: f32) {
    let (Some(original), Some(modified)) = (
        session.text_model(Side::Original),
        session.text_model(Side::Modified),
    ) else {
        ui.vertical_centered(|ui| {
            ui.add_space(100.0);
            ui.heading("Open two files to compare");
        });
        return;
    };

    let rows = aligned_rows(
        session.current_line_changes(),
        crate::engine::TextBuffer::line_count(original),
        crate::engine::TextBuffer::line_count(modified),
    );
    let original_highlight = PaneHighlight::for_side(session, Side::Original, compact);
    let modified_highlight = PaneHighlight::for_side(session, Side::Modified, compact);

    let font_id = FontId::monospace(font_size);
    // Approximate: monospace rows are about 1.25 em tall, plus the frame margin
    let row_height = font_size * 1.25 + 4.0;
    let col_w = (ui.available_width() / 2.0 - 12.0).max(100.0);

    ui.style_mut().spacing.item_spacing.y = 0.0;
    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show_rows(ui, row_height, rows.len(), |ui, range| {
            egui::Grid::new("side_by_side_grid")
                .num_columns(2)
                .min_col_width(0.0)
                .spacing(egui::Vec2::new(4.0, 0.0))
                .start_row(range.start)
                .show(ui, |ui| {
                    for row in &rows[range] {
                        show_cell(
                            ui,
                            Some(original),
                            row.original,
                            Side::Original,
                            &original_highlight,
                            &font_id,
                            col_w,
                        );
                        show_cell(
                            ui,
                            Some(modified),
                            row.modified,
                            Side::Modified,
                            &modified_highlight,
                            &font_id,
                            col_w,
                        );
                        ui.end_row();
                    }
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Span;

    fn change(os: u32, oe: u32, ms: u32, me: u32) -> LineChange {
        LineChange {
            original_start_line: os,
            original_end_line: oe,
            modified_start_line: ms,
            modified_end_line: me,
            char_changes: None,
        }
    }

    fn row(original: Option<u32>, modified: Option<u32>) -> AlignedRow {
        AlignedRow { original, modified }
    }

    #[test]
    fn test_aligned_rows_with_insertion_and_deletion() {
        // original: a b c d     modified: a X b d
        let changes = vec![change(1, 0, 2, 2), change(3, 3, 3, 0)];
        let rows = aligned_rows(&changes, 4, 4);
        assert_eq!(
            rows,
            vec![
                row(Some(1), Some(1)),
                row(None, Some(2)),
                row(Some(2), Some(3)),
                row(Some(3), None),
                row(Some(4), Some(4)),
            ]
        );
    }

    #[test]
    fn test_aligned_rows_uneven_replace() {
        let changes = vec![change(2, 2, 2, 4)];
        let rows = aligned_rows(&changes, 3, 5);
        assert_eq!(
            rows,
            vec![
                row(Some(1), Some(1)),
                row(Some(2), Some(2)),
                row(None, Some(3)),
                row(None, Some(4)),
                row(Some(3), Some(5)),
            ]
        );
    }

    #[test]
    fn test_slice_columns() {
        assert_eq!(slice_columns("hello", 2, 4), "el");
        assert_eq!(slice_columns("我爱你", 2, 4), "爱你");
        assert_eq!(slice_columns("abc", 3, 10), "c");
        assert_eq!(slice_columns("abc", 3, 2), "");
    }

    #[test]
    fn test_paint_line_char_over_row() {
        let row_decoration = Decoration::inline(Span::new(1, 1, 1, 7), DecorationClass::LineDelete);
        let char_decoration = Decoration::inline(Span::new(1, 3, 1, 5), DecorationClass::CharDelete);
        let paint = paint_line("abcdef", 1, &[&char_decoration, &row_decoration]);
        assert_eq!(
            paint.segments,
            vec![
                ("ab".to_string(), Some(DecorationClass::LineDelete)),
                ("cd".to_string(), Some(DecorationClass::CharDelete)),
                ("ef".to_string(), Some(DecorationClass::LineDelete)),
            ]
        );
        assert_eq!(paint.whole_line, None);
    }

    #[test]
    fn test_paint_line_whole_line() {
        let decoration = Decoration::whole_line(4, DecorationClass::EmptyLineInsert);
        let paint = paint_line("", 4, &[&decoration]);
        assert_eq!(paint.whole_line, Some(DecorationClass::EmptyLineInsert));
        assert!(paint.segments.is_empty());
    }
}
