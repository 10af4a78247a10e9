//! Single-pane fix-up for deleted-line blocks.
//!
//! The unified view renders each deleted run as one coarse `char-delete` span.
//! A reconciliation pass re-splits those spans along the character-level diff
//! so unchanged text inside a deleted run is shown without delete styling.
//! Matching is by exact text; a span that does not match is left alone.

use super::buffer::TextBuffer;
use super::builder::char_change_texts;
use super::refine::refine;
use super::types::{DecorationClass, DiffFragment, FragmentKind, LineChange};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSpan {
    pub text: String,
    pub classes: Vec<String>,
    /// Set on spans produced by a reconciliation pass.
    pub refined: bool,
}

impl ViewSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            classes: Vec::new(),
            refined: false,
        }
    }

    pub fn with_class(text: impl Into<String>, class: DecorationClass) -> Self {
        Self {
            text: text.into(),
            classes: vec![class.as_str().to_string()],
            refined: false,
        }
    }

    pub fn has_class(&self, class: DecorationClass) -> bool {
        self.classes.iter().any(|c| c == class.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Context,
    Deleted,
    Inserted,
}

/// One rendered row of the unified view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewBlock {
    pub kind: BlockKind,
    /// Line number on the side the block was rendered from.
    pub line_number: u32,
    pub spans: Vec<ViewSpan>,
}

/// Retained render tree of the single-pane view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineView {
    pub blocks: Vec<ViewBlock>,
}

/// Character-level refinement of one char change's original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refinement {
    pub original_text: String,
    pub fragments: Vec<DiffFragment>,
}

impl Refinement {
    /// Spans standing in for `template` once its text has matched.
    fn replacement(&self, template: &ViewSpan, strip_newlines: bool) -> Vec<ViewSpan> {
        let delete_class = DecorationClass::CharDelete.as_str();
        self.fragments
            .iter()
            .filter(|fragment| fragment.kind != FragmentKind::Added)
            .filter_map(|fragment| {
                let text = if strip_newlines {
                    fragment.value.replace('\n', "")
                } else {
                    fragment.value.clone()
                };
                if text.is_empty() {
                    return None;
                }
                let classes = match fragment.kind {
                    FragmentKind::Removed => template.classes.clone(),
                    _ => template
                        .classes
                        .iter()
                        .filter(|class| class.as_str() != delete_class)
                        .cloned()
                        .collect(),
                };
                Some(ViewSpan {
                    text,
                    classes,
                    refined: true,
                })
            })
            .collect()
    }
}

/// Refine every char change the same way the decoration builder does.
pub fn plan_refinements(
    line_changes: &[LineChange],
    original: Option<&dyn TextBuffer>,
    modified: Option<&dyn TextBuffer>,
) -> Vec<Refinement> {
    line_changes
        .iter()
        .filter_map(LineChange::char_changes)
        .flatten()
        .filter_map(|char_change| {
            let (original_text, modified_text) = char_change_texts(char_change, original, modified);
            if original_text.is_empty() {
                return None;
            }
            let fragments = refine(&original_text, &modified_text);
            Some(Refinement {
                original_text,
                fragments,
            })
        })
        .collect()
}

/// Replace matching coarse spans in deleted blocks. Returns the number of
/// spans replaced.
pub fn apply_refinements(view: &mut InlineView, refinements: &[Refinement]) -> usize {
    let mut replaced = 0;

    for block in view
        .blocks
        .iter_mut()
        .filter(|block| block.kind == BlockKind::Deleted)
    {
        let mut index = 0;
        while index < block.spans.len() {
            let span = &block.spans[index];
            if span.refined || !span.has_class(DecorationClass::CharDelete) {
                index += 1;
                continue;
            }

            let Some(replacement) = find_replacement(span, refinements) else {
                tracing::trace!("No refinement matches deleted span {:?}", span.text);
                index += 1;
                continue;
            };

            let inserted = replacement.len();
            block.spans.splice(index..=index, replacement);
            index += inserted;
            replaced += 1;
        }
    }

    replaced
}

fn find_replacement(span: &ViewSpan, refinements: &[Refinement]) -> Option<Vec<ViewSpan>> {
    refinements.iter().find_map(|refinement| {
        if refinement.original_text == span.text {
            Some(refinement.replacement(span, false))
        } else if refinement.original_text.contains('\n')
            && refinement.original_text.replace('\n', "") == span.text
        {
            Some(refinement.replacement(span, true))
        } else {
            None
        }
    })
}

/// One full reconciliation pass over `view`.
#[cfg(test)]
pub(crate) fn reconcile(
    view: &mut InlineView,
    line_changes: &[LineChange],
    original: Option<&dyn TextBuffer>,
    modified: Option<&dyn TextBuffer>,
) -> usize {
    let refinements = plan_refinements(line_changes, original, modified);
    apply_refinements(view, &refinements)
}

/// Queue of deferred reconciliation passes.
///
/// Passes are never cancelled: each scheduled pass runs once its delay has
/// elapsed, even if a newer one was scheduled in the meantime. Passes fall
/// due in deadline order, not scheduling order.
#[derive(Debug, Clone)]
pub struct ReconcileScheduler {
    delay: Duration,
    pending: BinaryHeap<Reverse<Instant>>,
}

impl ReconcileScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: BinaryHeap::new(),
        }
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    pub fn schedule(&mut self, now: Instant) {
        self.pending.push(Reverse(now + self.delay));
    }

    /// Remove and count the passes due at `now`.
    pub fn take_due(&mut self, now: Instant) -> usize {
        let mut due = 0;
        while self.pending.peek().is_some_and(|Reverse(at)| *at <= now) {
            self.pending.pop();
            due += 1;
        }
        due
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.peek().map(|Reverse(at)| *at)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::buffer::TextModel;
    use crate::engine::types::CharChange;

    fn deleted_block(line: u32, spans: Vec<ViewSpan>) -> ViewBlock {
        ViewBlock {
            kind: BlockKind::Deleted,
            line_number: line,
            spans,
        }
    }

    fn single_char_change() -> (TextModel, TextModel, Vec<LineChange>) {
        let original = TextModel::new("let value = compute();");
        let modified = TextModel::new("let values = compute_all();");
        let change = LineChange {
            original_start_line: 1,
            original_end_line: 1,
            modified_start_line: 1,
            modified_end_line: 1,
            char_changes: Some(vec![CharChange {
                original_start_line: 1,
                original_start_column: 5,
                original_end_line: 1,
                original_end_column: 20,
                modified_start_line: 1,
                modified_start_column: 5,
                modified_end_line: 1,
                modified_end_column: 25,
            }]),
        };
        (original, modified, vec![change])
    }

    #[test]
    fn test_coarse_span_is_split() {
        let (original, modified, changes) = single_char_change();
        let original_text = "value = compute";
        let mut view = InlineView {
            blocks: vec![deleted_block(
                1,
                vec![
                    ViewSpan::plain("let "),
                    ViewSpan::with_class(original_text, DecorationClass::CharDelete),
                    ViewSpan::plain("();"),
                ],
            )],
        };

        let replaced = reconcile(&mut view, &changes, Some(&original), Some(&modified));
        assert_eq!(replaced, 1);

        let spans = &view.blocks[0].spans;
        let rebuilt: String = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(rebuilt, "let value = compute();");
        // Nothing was removed from the original text, so no span keeps the
        // delete class.
        assert!(spans.iter().all(|s| !s.has_class(DecorationClass::CharDelete)));
        assert!(spans[1..spans.len() - 1].iter().all(|s| s.refined));
    }

    #[test]
    fn test_removed_fragments_keep_delete_class() {
        let original = TextModel::new("old test");
        let modified = TextModel::new("old text");
        let changes = vec![LineChange {
            original_start_line: 1,
            original_end_line: 1,
            modified_start_line: 1,
            modified_end_line: 1,
            char_changes: Some(vec![CharChange {
                original_start_line: 1,
                original_start_column: 5,
                original_end_line: 1,
                original_end_column: 9,
                modified_start_line: 1,
                modified_start_column: 5,
                modified_end_line: 1,
                modified_end_column: 9,
            }]),
        }];
        let mut view = InlineView {
            blocks: vec![deleted_block(
                1,
                vec![
                    ViewSpan::plain("old "),
                    ViewSpan::with_class("test", DecorationClass::CharDelete),
                ],
            )],
        };

        reconcile(&mut view, &changes, Some(&original), Some(&modified));

        let spans = &view.blocks[0].spans;
        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["old ", "te", "s", "t"]);
        assert!(!spans[1].has_class(DecorationClass::CharDelete));
        assert!(spans[2].has_class(DecorationClass::CharDelete));
        assert!(!spans[3].has_class(DecorationClass::CharDelete));
    }

    #[test]
    fn test_second_pass_is_noop() {
        let (original, modified, changes) = single_char_change();
        let mut view = InlineView {
            blocks: vec![deleted_block(
                1,
                vec![ViewSpan::with_class("value = compute", DecorationClass::CharDelete)],
            )],
        };

        assert_eq!(reconcile(&mut view, &changes, Some(&original), Some(&modified)), 1);
        let after_first = view.clone();
        assert_eq!(reconcile(&mut view, &changes, Some(&original), Some(&modified)), 0);
        assert_eq!(view, after_first);
    }

    #[test]
    fn test_unmatched_text_left_alone() {
        let (original, modified, changes) = single_char_change();
        let block = deleted_block(
            1,
            vec![ViewSpan::with_class("value = comp", DecorationClass::CharDelete)],
        );
        let mut view = InlineView {
            blocks: vec![block.clone()],
        };

        assert_eq!(reconcile(&mut view, &changes, Some(&original), Some(&modified)), 0);
        assert_eq!(view.blocks[0], block);
    }

    #[test]
    fn test_only_deleted_blocks_are_touched() {
        let (original, modified, changes) = single_char_change();
        let block = ViewBlock {
            kind: BlockKind::Inserted,
            line_number: 1,
            spans: vec![ViewSpan::with_class("value = compute", DecorationClass::CharDelete)],
        };
        let mut view = InlineView {
            blocks: vec![block.clone()],
        };

        assert_eq!(reconcile(&mut view, &changes, Some(&original), Some(&modified)), 0);
        assert_eq!(view.blocks[0], block);
    }

    #[test]
    fn test_match_without_newlines() {
        let refinement = Refinement {
            original_text: "ab\ncd".to_string(),
            fragments: vec![
                DiffFragment::new(FragmentKind::Common, "ab"),
                DiffFragment::new(FragmentKind::Removed, "\ncd"),
                DiffFragment::new(FragmentKind::Added, "CD"),
            ],
        };
        let mut view = InlineView {
            blocks: vec![deleted_block(
                1,
                vec![ViewSpan::with_class("abcd", DecorationClass::CharDelete)],
            )],
        };

        assert_eq!(apply_refinements(&mut view, &[refinement]), 1);
        let texts: Vec<&str> = view.blocks[0].spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["ab", "cd"]);
    }

    #[test]
    fn test_missing_buffers_plan_nothing() {
        let (_, _, changes) = single_char_change();
        assert!(plan_refinements(&changes, None, None).is_empty());
    }

    #[test]
    fn test_scheduler_runs_every_pass() {
        let start = Instant::now();
        let mut scheduler = ReconcileScheduler::new(Duration::from_millis(100));
        scheduler.schedule(start);
        scheduler.schedule(start + Duration::from_millis(30));

        assert_eq!(scheduler.take_due(start + Duration::from_millis(50)), 0);
        assert_eq!(scheduler.next_due(), Some(start + Duration::from_millis(100)));
        assert_eq!(scheduler.take_due(start + Duration::from_millis(100)), 1);
        assert_eq!(scheduler.take_due(start + Duration::from_millis(200)), 1);
        assert_eq!(scheduler.next_due(), None);
    }

    #[test]
    fn test_shorter_delay_runs_later_pass_first() {
        let start = Instant::now();
        let mut scheduler = ReconcileScheduler::new(Duration::from_millis(100));
        scheduler.schedule(start);
        scheduler.set_delay(Duration::from_millis(10));
        scheduler.schedule(start + Duration::from_millis(1));

        assert_eq!(scheduler.next_due(), Some(start + Duration::from_millis(11)));
        assert_eq!(scheduler.take_due(start + Duration::from_millis(11)), 1);
        assert_eq!(scheduler.next_due(), Some(start + Duration::from_millis(100)));
        assert_eq!(scheduler.take_due(start + Duration::from_millis(100)), 1);
    }
}
