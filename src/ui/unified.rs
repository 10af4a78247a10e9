//! Unified (single-pane) rendering.
//!
//! Deleted lines are emitted into a retained [`InlineView`] with each changed
//! run as one coarse `char-delete` span. The decoration engine later splits
//! those spans in place; painting only ever reads the view.

use super::side_by_side::{LinePaint, PaneHighlight, line_job, side_extent, slice_columns};
use crate::backend::diff_backend::DiffSession;
use crate::engine::{
    BlockKind, CharChange, DecorationClass, InlineView, LineChange, Side, TextBuffer, TextModel,
    ViewBlock, ViewSpan,
};
use crate::style::{ADDED_LINE_BG, REMOVED_LINE_BG, span_background};
use egui::{Color32, FontId, Ui};

/// Column range `[start, end)` a char change covers on original line `line`.
fn covered_columns(change: &CharChange, line: u32, max_column: u32) -> Option<(u32, u32)> {
    if change.original_end_line == 0
        || line < change.original_start_line
        || line > change.original_end_line
    {
        return None;
    }
    let start = if line == change.original_start_line {
        change.original_start_column
    } else {
        1
    };
    let end = if line == change.original_end_line {
        change.original_end_column
    } else {
        max_column
    };
    (start < end).then_some((start, end))
}

/// Spans for one deleted line: plain gaps, coarse `char-delete` runs.
fn deleted_line_spans(model: &TextModel, line: u32, change: &LineChange) -> Vec<ViewSpan> {
    let text = model.line_content(line).unwrap_or_default();
    let Some(char_changes) = change.char_changes() else {
        if text.is_empty() {
            return Vec::new();
        }
        return vec![ViewSpan::with_class(text, DecorationClass::CharDelete)];
    };

    let max_column = model.line_max_column(line);
    let mut ranges: Vec<(u32, u32)> = char_changes
        .iter()
        .filter_map(|cc| covered_columns(cc, line, max_column))
        .collect();
    ranges.sort_unstable();

    let mut spans = Vec::new();
    let mut column = 1;
    for (start, end) in ranges {
        let start = start.max(column);
        if start >= end {
            continue;
        }
        if start > column {
            spans.push(ViewSpan::plain(slice_columns(text, column, start)));
        }
        spans.push(ViewSpan::with_class(
            slice_columns(text, start, end),
            DecorationClass::CharDelete,
        ));
        column = end;
    }
    if column < max_column {
        spans.push(ViewSpan::plain(slice_columns(text, column, max_column)));
    }
    spans
}

fn plain_block(kind: BlockKind, model: &TextModel, line: u32) -> ViewBlock {
    let text = model.line_content(line).unwrap_or_default();
    ViewBlock {
        kind,
        line_number: line,
        spans: vec![ViewSpan::plain(text)],
    }
}

/// Render the session's diff into a fresh, unreconciled inline view.
pub fn build_view(session: &DiffSession) -> InlineView {
    let (Some(original), Some(modified)) = (
        session.text_model(Side::Original),
        session.text_model(Side::Modified),
    ) else {
        return InlineView::default();
    };

    let mut blocks = Vec::new();
    let mut line = 1;
    for change in session.current_line_changes() {
        let (modified_start, modified_len) =
            side_extent(change.modified_start_line, change.modified_end_line);

        while line < modified_start {
            blocks.push(plain_block(BlockKind::Context, modified, line));
            line += 1;
        }
        for original_line in change.original_lines() {
            blocks.push(ViewBlock {
                kind: BlockKind::Deleted,
                line_number: original_line,
                spans: deleted_line_spans(original, original_line, change),
            });
        }
        for inserted in change.modified_lines() {
            blocks.push(plain_block(BlockKind::Inserted, modified, inserted));
        }
        line = modified_start + modified_len;
    }
    while line <= modified.line_count() {
        blocks.push(plain_block(BlockKind::Context, modified, line));
        line += 1;
    }

    InlineView { blocks }
}

fn deleted_paint(block: &ViewBlock) -> LinePaint {
    LinePaint {
        whole_line: None,
        segments: block
            .spans
            .iter()
            .map(|span| {
                let class = span_background(&span.classes).map(|_| {
                    if span.has_class(DecorationClass::CharInsert) {
                        DecorationClass::CharInsert
                    } else {
                        DecorationClass::CharDelete
                    }
                });
                (span.text.clone(), class)
            })
            .collect(),
    }
}

/// Paint the session's inline view.
pub fn show(ui: &mut Ui, session: &DiffSession, compact: bool, font_size: f32) {
    let Some(view) = session.view() else {
        ui.vertical_centered(|ui| {
            ui.add_space(100.0);
            ui.heading("Open two files to compare");
        });
        return;
    };

    let modified_highlight = PaneHighlight::for_side(session, Side::Modified, compact);
    let modified = session.text_model(Side::Modified);
    let font_id = FontId::monospace(font_size);
    let row_height = font_size * 1.25 + 4.0;

    ui.style_mut().spacing.item_spacing.y = 0.0;
    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show_rows(ui, row_height, view.blocks.len(), |ui, range| {
            for block in &view.blocks[range] {
                let (fill, marker, paint) = match block.kind {
                    BlockKind::Deleted => {
                        let fill = if compact {
                            Color32::TRANSPARENT
                        } else {
                            REMOVED_LINE_BG
                        };
                        (fill, "-", deleted_paint(block))
                    }
                    BlockKind::Inserted | BlockKind::Context => {
                        let text = modified
                            .and_then(|m| m.line_content(block.line_number))
                            .unwrap_or_default();
                        let (fill, paint) =
                            modified_highlight.paint(Side::Modified, text, block.line_number);
                        let fill = match (block.kind, compact) {
                            (BlockKind::Inserted, false) => ADDED_LINE_BG,
                            _ => fill,
                        };
                        let marker = if block.kind == BlockKind::Inserted {
                            "+"
                        } else {
                            " "
                        };
                        (fill, marker, paint)
                    }
                };

                egui::Frame::default()
                    .fill(fill)
                    .inner_margin(egui::Margin::same(2))
                    .show(ui, |ui| {
                        ui.set_min_width(ui.available_width());
                        let job = line_job(ui, Some(block.line_number), marker, &paint, &font_id);
                        ui.add(egui::Label::new(job).extend());
                    });
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DiffHost;
    use crate::engine::reconcile::reconcile;

    fn session(original: &str, modified: &str) -> DiffSession {
        let mut session = DiffSession::new();
        session.set_text(Side::Original, original, None);
        session.set_text(Side::Modified, modified, None);
        session.recompute();
        session
    }

    fn texts(block: &ViewBlock) -> Vec<(&str, bool)> {
        block
            .spans
            .iter()
            .map(|s| (s.text.as_str(), s.has_class(DecorationClass::CharDelete)))
            .collect()
    }

    #[test]
    fn test_build_view_orders_blocks() {
        let session = session("a\nold\nc\n", "a\nnew\nc\n");
        let view = build_view(&session);
        let kinds: Vec<(BlockKind, u32)> =
            view.blocks.iter().map(|b| (b.kind, b.line_number)).collect();
        assert_eq!(
            kinds,
            vec![
                (BlockKind::Context, 1),
                (BlockKind::Deleted, 2),
                (BlockKind::Inserted, 2),
                (BlockKind::Context, 3),
                (BlockKind::Context, 4),
            ]
        );
    }

    #[test]
    fn test_build_view_pure_deletion() {
        let session = session("a\nb\nc", "a\nc");
        let view = build_view(&session);
        let kinds: Vec<(BlockKind, u32)> =
            view.blocks.iter().map(|b| (b.kind, b.line_number)).collect();
        assert_eq!(
            kinds,
            vec![
                (BlockKind::Context, 1),
                (BlockKind::Deleted, 2),
                (BlockKind::Context, 2),
            ]
        );
        assert_eq!(texts(&view.blocks[1]), vec![("b", true)]);
    }

    #[test]
    fn test_deleted_line_has_coarse_runs() {
        let session = session("let value = test;", "let value = text;");
        let view = build_view(&session);
        let deleted = view
            .blocks
            .iter()
            .find(|b| b.kind == BlockKind::Deleted)
            .unwrap();
        let joined: String = deleted.spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, "let value = test;");
        assert!(deleted.spans.iter().any(|s| s.has_class(DecorationClass::CharDelete)));
        assert!(deleted.spans.iter().any(|s| !s.has_class(DecorationClass::CharDelete)));
    }

    #[test]
    fn test_reconcile_splits_built_view() {
        let mut session = session("hello test world", "hello text world");
        session.set_view(build_view(&session));

        let original = session.model(Side::Original);
        let modified = session.model(Side::Modified);
        let line_changes = session.current_line_changes().to_vec();
        let mut view = session.view().cloned().unwrap();
        let replaced = reconcile(&mut view, &line_changes, original, modified);
        assert!(replaced > 0);

        let deleted = view
            .blocks
            .iter()
            .find(|b| b.kind == BlockKind::Deleted)
            .unwrap();
        let joined: String = deleted.spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, "hello test world");
        let highlighted: String = deleted
            .spans
            .iter()
            .filter(|s| s.has_class(DecorationClass::CharDelete))
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(highlighted, "s");

        assert_eq!(reconcile(&mut view, &line_changes, original, modified), 0);
    }

    #[test]
    fn test_build_view_without_models() {
        let session = DiffSession::new();
        assert!(build_view(&session).blocks.is_empty());
    }
}
