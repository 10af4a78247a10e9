//! Keeps the installed decoration sets in step with the host's diff.

use super::buffer::TextBuffer;
use super::builder::build;
use super::reconcile::{InlineView, ReconcileScheduler, apply_refinements, plan_refinements};
use super::types::{Decoration, DecorationHandle, LineChange, Side};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

pub const DEFAULT_RECONCILE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    #[default]
    TwoPane,
    SinglePane,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactDiffOptions {
    pub enabled: bool,
    pub render_mode: RenderMode,
    pub reconcile_delay: Duration,
}

impl Default for CompactDiffOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            render_mode: RenderMode::TwoPane,
            reconcile_delay: DEFAULT_RECONCILE_DELAY,
        }
    }
}

/// Fired by the host every time it recomputes its line changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffUpdated;

/// The diff editor the engine decorates.
pub trait DiffHost {
    /// Current line changes, or `None` while no diff has been computed.
    fn line_changes(&self) -> Option<&[LineChange]>;

    /// Buffer shown on `side`, or `None` if that editor has no model.
    fn model(&self, side: Side) -> Option<&dyn TextBuffer>;

    fn install_decorations(&mut self, side: Side, decorations: Vec<Decoration>) -> DecorationHandle;

    fn clear_decorations(&mut self, side: Side, handle: DecorationHandle);

    /// Register a listener for [`DiffUpdated`]. Dropping the receiver detaches it.
    fn subscribe(&mut self) -> Receiver<DiffUpdated>;

    /// Rendered single-pane view, if one currently exists.
    fn rendered_view(&mut self) -> Option<&mut InlineView>;
}

/// Owns the installed decoration handles for one original/modified pair.
#[derive(Debug)]
pub struct DecorationManager {
    options: CompactDiffOptions,
    original: Option<DecorationHandle>,
    modified: Option<DecorationHandle>,
    scheduler: ReconcileScheduler,
}

impl DecorationManager {
    pub fn new(options: CompactDiffOptions) -> Self {
        Self {
            options,
            original: None,
            modified: None,
            scheduler: ReconcileScheduler::new(options.reconcile_delay),
        }
    }

    pub fn options(&self) -> CompactDiffOptions {
        self.options
    }

    pub fn set_options(&mut self, options: CompactDiffOptions) {
        self.options = options;
        self.scheduler.set_delay(options.reconcile_delay);
    }

    pub fn is_installed(&self) -> bool {
        self.original.is_some() || self.modified.is_some()
    }

    pub fn handles(&self) -> (Option<DecorationHandle>, Option<DecorationHandle>) {
        (self.original, self.modified)
    }

    /// Rebuild from the host's current state and swap the installed sets.
    pub fn refresh(&mut self, host: &mut dyn DiffHost, now: Instant) {
        let built = if self.options.enabled {
            match (
                host.line_changes(),
                host.model(Side::Original),
                host.model(Side::Modified),
            ) {
                (Some(line_changes), Some(original), Some(modified)) => {
                    Some(build(line_changes, Some(original), Some(modified)))
                }
                _ => None,
            }
        } else {
            None
        };

        self.clear(host);

        let Some(built) = built else {
            debug!(
                "Compact decorations cleared (enabled: {})",
                self.options.enabled
            );
            return;
        };

        debug!(
            "Installing {} original and {} modified decorations",
            built.original.len(),
            built.modified.len()
        );
        self.original = Some(host.install_decorations(Side::Original, built.original));
        self.modified = Some(host.install_decorations(Side::Modified, built.modified));

        if self.options.render_mode == RenderMode::SinglePane {
            self.scheduler.schedule(now);
        }
    }

    /// Clear both installed sets, if any.
    pub fn clear(&mut self, host: &mut dyn DiffHost) {
        if let Some(handle) = self.original.take() {
            host.clear_decorations(Side::Original, handle);
        }
        if let Some(handle) = self.modified.take() {
            host.clear_decorations(Side::Modified, handle);
        }
    }

    /// Run every reconciliation pass whose delay has elapsed.
    pub fn run_due_reconciliations(&mut self, host: &mut dyn DiffHost, now: Instant) -> usize {
        let due = self.scheduler.take_due(now);
        for _ in 0..due {
            self.reconcile_once(host);
        }
        due
    }

    pub fn next_reconcile_due(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    fn reconcile_once(&self, host: &mut dyn DiffHost) {
        if !self.options.enabled || self.options.render_mode != RenderMode::SinglePane {
            return;
        }

        let refinements = match (
            host.line_changes(),
            host.model(Side::Original),
            host.model(Side::Modified),
        ) {
            (Some(line_changes), Some(original), Some(modified)) => {
                plan_refinements(line_changes, Some(original), Some(modified))
            }
            _ => return,
        };

        if let Some(view) = host.rendered_view() {
            let replaced = apply_refinements(view, &refinements);
            trace!("Reconciled {} deleted spans", replaced);
        }
    }

    pub fn teardown(&mut self, host: &mut dyn DiffHost) {
        self.clear(host);
        self.scheduler.clear();
    }
}

/// A live activation: the manager plus its diff-update subscription.
#[derive(Debug)]
pub struct Activation {
    manager: DecorationManager,
    updates: Receiver<DiffUpdated>,
}

/// Start decorating `host` and install the first decoration sets.
pub fn activate(options: CompactDiffOptions, host: &mut dyn DiffHost) -> Activation {
    let updates = host.subscribe();
    let mut manager = DecorationManager::new(options);
    manager.refresh(host, Instant::now());
    Activation { manager, updates }
}

impl Activation {
    pub fn manager(&self) -> &DecorationManager {
        &self.manager
    }

    /// Handle pending diff updates and due reconciliation passes.
    ///
    /// Returns `true` if the decoration sets were rebuilt.
    pub fn pump(&mut self, host: &mut dyn DiffHost, now: Instant) -> bool {
        let updated = self.updates.try_iter().count() > 0;
        if updated {
            self.manager.refresh(host, now);
        }
        self.manager.run_due_reconciliations(host, now);
        updated
    }

    pub fn set_options(
        &mut self,
        options: CompactDiffOptions,
        host: &mut dyn DiffHost,
        now: Instant,
    ) {
        if self.manager.options() == options {
            return;
        }
        self.manager.set_options(options);
        self.manager.refresh(host, now);
    }

    pub fn next_reconcile_due(&self) -> Option<Instant> {
        self.manager.next_reconcile_due()
    }

    /// Clear all decorations and detach from the host's diff updates.
    pub fn teardown(mut self, host: &mut dyn DiffHost) {
        self.manager.teardown(host);
        debug!("Compact diff activation torn down");
    }
}
