//! Compact-mode diff decoration engine.
//!
//! Given line and char changes between two buffers, computes decorations that
//! mark only the characters that changed, and keeps them installed on the
//! host as the diff is recomputed.

pub mod buffer;
pub mod builder;
pub mod lifecycle;
pub mod range;
pub mod reconcile;
pub mod refine;
pub mod types;

// Re-export public types
pub use buffer::{TextBuffer, TextModel};
pub use builder::{BuiltDecorations, build};
pub use lifecycle::{
    Activation, CompactDiffOptions, DecorationManager, DiffHost, DiffUpdated, RenderMode, activate,
};
pub use range::{get_text_in_span, split_into_single_line_spans};
pub use reconcile::{BlockKind, InlineView, ReconcileScheduler, ViewBlock, ViewSpan};
pub use refine::refine;
pub use types::{
    CharChange, Decoration, DecorationClass, DecorationHandle, DiffFragment, FragmentKind,
    LineChange, Position, Side, Span, Stickiness,
};
