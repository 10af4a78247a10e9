use crate::backend::diff_backend::DiffSession;
use crate::backend::loader::{LoadRequest, LoadResponse, spawn_loader};
use crate::config::{Config, RecentComparison};
use crate::engine::{Activation, RenderMode, Side, activate};
use crate::style::configure_style;
use crate::ui::title_bar::{TitleBar, TitleBarAction, TitleBarState};
use crate::ui::{side_by_side, unified};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};
use tracing::{error, info};

const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct DiffViewerApp {
    config: Config,
    session: DiffSession,
    activation: Option<Activation>,
    loader_sender: Sender<LoadRequest>,
    loader_receiver: Receiver<LoadResponse>,
    pending_loads: usize,
    view_dirty: bool,
    status: Option<String>,
}

impl DiffViewerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        original: Option<PathBuf>,
        modified: Option<PathBuf>,
    ) -> Self {
        configure_style(&cc.egui_ctx);

        let config = Config::default();
        let mut session = DiffSession::new();
        let activation = Some(activate(config.settings.compact_options(), &mut session));
        let (loader_sender, loader_receiver) = spawn_loader();

        let mut app = Self {
            config,
            session,
            activation,
            loader_sender,
            loader_receiver,
            pending_loads: 0,
            view_dirty: true,
            status: None,
        };
        if let Some(path) = original {
            app.request_load(Side::Original, path);
        }
        if let Some(path) = modified {
            app.request_load(Side::Modified, path);
        }
        app
    }

    fn request_load(&mut self, side: Side, path: PathBuf) {
        match self.loader_sender.send(LoadRequest::Open { side, path }) {
            Ok(()) => self.pending_loads += 1,
            Err(e) => error!("Failed to send load request: {}", e),
        }
    }

    fn pick_file(&mut self, side: Side) {
        let directory = self
            .session
            .path(side)
            .and_then(|p| p.parent())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| self.config.data_dir());
        if let Some(path) = rfd::FileDialog::new().set_directory(&directory).pick_file() {
            self.request_load(side, path);
        }
    }

    fn handle_load_responses(&mut self) {
        let mut loaded = false;
        while let Ok(response) = self.loader_receiver.try_recv() {
            self.pending_loads = self.pending_loads.saturating_sub(1);
            match response {
                LoadResponse::Loaded {
                    side,
                    path,
                    content,
                } => {
                    self.session.set_text(side, &content, Some(path));
                    self.status = None;
                    loaded = true;
                }
                LoadResponse::Failed { side, error } => {
                    self.status = Some(format!("Could not open {:?} file: {}", side, error));
                }
            }
        }

        if loaded
            && let (Some(original), Some(modified)) = (
                self.session.path(Side::Original),
                self.session.path(Side::Modified),
            )
        {
            let comparison = RecentComparison {
                original: original.to_path_buf(),
                modified: modified.to_path_buf(),
            };
            self.config.add_recent_comparison(comparison);
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        match dropped.as_slice() {
            [] => {}
            [single] => {
                let side = if self.session.path(Side::Original).is_none() {
                    Side::Original
                } else {
                    Side::Modified
                };
                self.request_load(side, single.clone());
            }
            [first, second, ..] => {
                self.request_load(Side::Original, first.clone());
                self.request_load(Side::Modified, second.clone());
            }
        }
    }

    fn apply_options(&mut self) {
        let options = self.config.settings.compact_options();
        if let Some(activation) = self.activation.as_mut() {
            activation.set_options(options, &mut self.session, Instant::now());
        }
        self.view_dirty = true;
        self.config.save_in_background();
    }

    fn handle_action(&mut self, action: TitleBarAction) {
        match action {
            TitleBarAction::OpenOriginal => self.pick_file(Side::Original),
            TitleBarAction::OpenModified => self.pick_file(Side::Modified),
            TitleBarAction::OpenRecent(comparison) => {
                self.request_load(Side::Original, comparison.original);
                self.request_load(Side::Modified, comparison.modified);
            }
            TitleBarAction::SwapSides => {
                self.session.swap_sides();
                info!("Swapped original and modified sides");
            }
            TitleBarAction::ToggleCompactMode => {
                self.config.settings.compact_mode = !self.config.settings.compact_mode;
                self.apply_options();
            }
            TitleBarAction::SetRenderMode(mode) => {
                if self.config.settings.render_mode != mode {
                    self.config.settings.render_mode = mode;
                    self.apply_options();
                }
            }
        }
    }
}

impl eframe::App for DiffViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_load_responses();
        self.handle_dropped_files(ctx);

        let recomputed = self.session.recompute();
        let single_pane = self.config.settings.render_mode == RenderMode::SinglePane;
        if single_pane && (recomputed || self.view_dirty) {
            let view = unified::build_view(&self.session);
            self.session.set_view(view);
            self.view_dirty = false;
        }

        let now = Instant::now();
        if let Some(activation) = self.activation.as_mut() {
            activation.pump(&mut self.session, now);
            if let Some(due) = activation.next_reconcile_due() {
                ctx.request_repaint_after(due.saturating_duration_since(now));
            }
        }
        if self.pending_loads > 0 {
            ctx.request_repaint_after(LOAD_POLL_INTERVAL);
        }

        let mut action = None;
        egui::TopBottomPanel::top("title_bar_panel").show(ctx, |ui| {
            let settings = &self.config.settings;
            action = TitleBar::show(
                ui,
                TitleBarState {
                    original: self.session.path(Side::Original),
                    modified: self.session.path(Side::Modified),
                    change_count: self.session.current_line_changes().len(),
                    compact_mode: settings.compact_mode,
                    render_mode: settings.render_mode,
                    recent_comparisons: &settings.recent_comparisons,
                    status: self.status.as_deref(),
                },
            );
        });
        if let Some(action) = action {
            self.handle_action(action);
        }

        let settings = &self.config.settings;
        egui::CentralPanel::default().show(ctx, |ui| match settings.render_mode {
            RenderMode::TwoPane => {
                side_by_side::show(ui, &self.session, settings.compact_mode, settings.font_size)
            }
            RenderMode::SinglePane => {
                unified::show(ui, &self.session, settings.compact_mode, settings.font_size)
            }
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(activation) = self.activation.take() {
            activation.teardown(&mut self.session);
        }
        if let Err(e) = self.config.save() {
            error!("Failed to save settings on exit: {}", e);
        }
    }
}
