use crate::engine::{
    CharChange, Decoration, DecorationHandle, DiffHost, DiffUpdated, InlineView, LineChange,
    Position, Side, Span, TextBuffer, TextModel,
};
use similar::{Algorithm, DiffOp, DiffTag, capture_diff_slices};
use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info};
use xxhash_rust::xxh64::xxh64;

/// Blocks larger than this (in characters, both sides together) get no char changes.
pub const MAX_CHAR_DIFF_CHARS: usize = 20_000;

/// Char changes separated by fewer matching characters than this are merged.
pub const MIN_MATCHING_CHARS: usize = 3;

/// Computes line changes, with nested char changes, between two models.
#[derive(Debug, Clone)]
pub struct DiffComputer {
    pub compute_char_changes: bool,
    pub max_char_diff_chars: usize,
}

impl Default for DiffComputer {
    fn default() -> Self {
        Self {
            compute_char_changes: true,
            max_char_diff_chars: MAX_CHAR_DIFF_CHARS,
        }
    }
}

/// A contiguous non-equal run of line ops, as 0-based line index ranges.
struct Block {
    old: Range<usize>,
    new: Range<usize>,
}

impl DiffComputer {
    pub fn compute(&self, original: &TextModel, modified: &TextModel) -> Vec<LineChange> {
        let old_lines = lines_of(original);
        let new_lines = lines_of(modified);
        let ops = capture_diff_slices(Algorithm::Myers, &old_lines, &new_lines);

        group_blocks(&ops)
            .into_iter()
            .map(|block| self.line_change(&block, original, modified))
            .collect()
    }

    fn line_change(&self, block: &Block, original: &TextModel, modified: &TextModel) -> LineChange {
        let (original_start_line, original_end_line) = line_bounds(&block.old);
        let (modified_start_line, modified_end_line) = line_bounds(&block.new);

        let char_changes = if self.compute_char_changes
            && !block.old.is_empty()
            && !block.new.is_empty()
        {
            self.char_changes(block, original, modified)
        } else {
            None
        };

        LineChange {
            original_start_line,
            original_end_line,
            modified_start_line,
            modified_end_line,
            char_changes,
        }
    }

    fn char_changes(
        &self,
        block: &Block,
        original: &TextModel,
        modified: &TextModel,
    ) -> Option<Vec<CharChange>> {
        let original_span = block_span(original, &block.old);
        let modified_span = block_span(modified, &block.new);
        let original_text = original.text_in_range(&original_span);
        let modified_text = modified.text_in_range(&modified_span);

        if original_text.chars().count() + modified_text.chars().count() > self.max_char_diff_chars
        {
            debug!(
                "Skipping char changes for lines {:?}: block too large",
                block.old
            );
            return None;
        }

        let original_chars: Vec<char> = original_text.chars().collect();
        let modified_chars: Vec<char> = modified_text.chars().collect();
        let ops = capture_diff_slices(Algorithm::Myers, &original_chars, &modified_chars);

        let original_base = original.offset_at(original_span.start);
        let modified_base = modified.offset_at(modified_span.start);

        let changes = merge_close_blocks(group_blocks(&ops))
            .into_iter()
            .map(|run| {
                let (original_start, original_end) = char_bounds(original, original_base, &run.old);
                let (modified_start, modified_end) = char_bounds(modified, modified_base, &run.new);
                CharChange {
                    original_start_line: original_start.line,
                    original_start_column: original_start.column,
                    original_end_line: original_end.line,
                    original_end_column: original_end.column,
                    modified_start_line: modified_start.line,
                    modified_start_column: modified_start.column,
                    modified_end_line: modified_end.line,
                    modified_end_column: modified_end.column,
                }
            })
            .collect();

        Some(changes)
    }
}

fn lines_of(model: &TextModel) -> Vec<&str> {
    (1..=model.line_count())
        .map(|line| model.line_content(line).unwrap_or_default())
        .collect()
}

/// Inclusive 1-based line bounds. An empty side reports the line before the
/// block as its start and `0` as its end.
fn line_bounds(range: &Range<usize>) -> (u32, u32) {
    if range.is_empty() {
        (range.start as u32, 0)
    } else {
        (range.start as u32 + 1, range.end as u32)
    }
}

fn block_span(model: &TextModel, lines: &Range<usize>) -> Span {
    let start_line = lines.start as u32 + 1;
    let end_line = lines.end as u32;
    Span::new(start_line, 1, end_line, model.line_max_column(end_line))
}

/// Start and end positions of a local char range. An empty range keeps its
/// start position and reports `(0, 0)` as its end.
fn char_bounds(
    model: &TextModel,
    base: usize,
    range: &Range<usize>,
) -> (Position, Position) {
    let start = model.position_at(base + range.start);
    if range.is_empty() {
        (start, Position::new(0, 0))
    } else {
        (start, model.position_at(base + range.end))
    }
}

fn group_blocks(ops: &[DiffOp]) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut current: Option<Block> = None;

    for op in ops {
        let (tag, old, new) = op.as_tag_tuple();
        if tag == DiffTag::Equal {
            blocks.extend(current.take());
            continue;
        }
        match current.as_mut() {
            Some(block) => {
                block.old.end = old.end;
                block.new.end = new.end;
            }
            None => current = Some(Block { old, new }),
        }
    }
    blocks.extend(current);
    blocks
}

fn merge_close_blocks(blocks: Vec<Block>) -> Vec<Block> {
    let mut merged: Vec<Block> = Vec::with_capacity(blocks.len());
    for block in blocks {
        match merged.last_mut() {
            Some(last)
                if block.old.start - last.old.end < MIN_MATCHING_CHARS
                    && block.new.start - last.new.end < MIN_MATCHING_CHARS =>
            {
                last.old.end = block.old.end;
                last.new.end = block.new.end;
            }
            _ => merged.push(block),
        }
    }
    merged
}

/// The host diff editor: both models, the current diff, installed
/// decorations and the rendered single-pane view.
#[derive(Default)]
pub struct DiffSession {
    original: Option<TextModel>,
    modified: Option<TextModel>,
    original_path: Option<PathBuf>,
    modified_path: Option<PathBuf>,
    computer: DiffComputer,
    line_changes: Option<Vec<LineChange>>,
    content_hash: Option<(u64, u64)>,
    decorations: HashMap<DecorationHandle, (Side, Vec<Decoration>)>,
    next_handle: u64,
    view: Option<InlineView>,
    listeners: Vec<Sender<DiffUpdated>>,
}

impl DiffSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, side: Side, text: &str, path: Option<PathBuf>) {
        let model = TextModel::new(text);
        match side {
            Side::Original => {
                self.original = Some(model);
                self.original_path = path;
            }
            Side::Modified => {
                self.modified = Some(model);
                self.modified_path = path;
            }
        }
    }

    pub fn text_model(&self, side: Side) -> Option<&TextModel> {
        match side {
            Side::Original => self.original.as_ref(),
            Side::Modified => self.modified.as_ref(),
        }
    }

    pub fn path(&self, side: Side) -> Option<&Path> {
        match side {
            Side::Original => self.original_path.as_deref(),
            Side::Modified => self.modified_path.as_deref(),
        }
    }

    pub fn swap_sides(&mut self) {
        std::mem::swap(&mut self.original, &mut self.modified);
        std::mem::swap(&mut self.original_path, &mut self.modified_path);
    }

    /// Recompute the diff if either side's content changed since the last
    /// run, then notify listeners. Returns `true` if a new diff was computed.
    pub fn recompute(&mut self) -> bool {
        let (Some(original), Some(modified)) = (&self.original, &self.modified) else {
            return false;
        };

        let hash = (
            xxh64(original.text().as_bytes(), 0),
            xxh64(modified.text().as_bytes(), 0),
        );
        if self.content_hash == Some(hash) {
            return false;
        }

        let line_changes = self.computer.compute(original, modified);
        info!("Diff recomputed: {} line changes", line_changes.len());
        self.line_changes = Some(line_changes);
        self.content_hash = Some(hash);
        self.notify();
        true
    }

    fn notify(&mut self) {
        self.listeners
            .retain(|listener| listener.send(DiffUpdated).is_ok());
    }

    pub fn current_line_changes(&self) -> &[LineChange] {
        self.line_changes.as_deref().unwrap_or_default()
    }

    /// Every installed decoration for `side`, across all sets.
    pub fn decorations(&self, side: Side) -> impl Iterator<Item = &Decoration> {
        self.decorations
            .values()
            .filter(move |(s, _)| *s == side)
            .flat_map(|(_, decorations)| decorations.iter())
    }

    pub fn set_view(&mut self, view: InlineView) {
        self.view = Some(view);
    }

    pub fn view(&self) -> Option<&InlineView> {
        self.view.as_ref()
    }
}

impl DiffHost for DiffSession {
    fn line_changes(&self) -> Option<&[LineChange]> {
        self.line_changes.as_deref()
    }

    fn model(&self, side: Side) -> Option<&dyn TextBuffer> {
        self.text_model(side).map(|model| model as &dyn TextBuffer)
    }

    fn install_decorations(&mut self, side: Side, decorations: Vec<Decoration>) -> DecorationHandle {
        self.next_handle += 1;
        let handle = DecorationHandle::new(self.next_handle);
        self.decorations.insert(handle, (side, decorations));
        handle
    }

    fn clear_decorations(&mut self, _side: Side, handle: DecorationHandle) {
        self.decorations.remove(&handle);
    }

    fn subscribe(&mut self) -> Receiver<DiffUpdated> {
        let (sender, receiver) = mpsc::channel();
        self.listeners.push(sender);
        receiver
    }

    fn rendered_view(&mut self) -> Option<&mut InlineView> {
        self.view.as_mut()
    }
}
