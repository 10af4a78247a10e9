use crate::config::RecentComparison;
use crate::engine::RenderMode;
use egui::{Align, Layout, Ui};
use std::path::Path;

pub enum TitleBarAction {
    OpenOriginal,
    OpenModified,
    OpenRecent(RecentComparison),
    SwapSides,
    ToggleCompactMode,
    SetRenderMode(RenderMode),
}

pub struct TitleBar;

pub struct TitleBarState<'a> {
    pub original: Option<&'a Path>,
    pub modified: Option<&'a Path>,
    pub change_count: usize,
    pub compact_mode: bool,
    pub render_mode: RenderMode,
    pub recent_comparisons: &'a [RecentComparison],
    pub status: Option<&'a str>,
}

fn file_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("Unknown")
}

impl TitleBar {
    pub fn show(ui: &mut Ui, state: TitleBarState<'_>) -> Option<TitleBarAction> {
        let TitleBarState {
            original,
            modified,
            change_count,
            compact_mode,
            render_mode,
            recent_comparisons,
            status,
        } = state;

        let mut action = None;
        let title_bar_rect = ui.available_rect_before_wrap();

        // Registered before the widgets so they can steal input
        let interact = ui.interact(
            title_bar_rect,
            ui.id().with("title_bar_drag"),
            egui::Sense::click_and_drag(),
        );
        if interact.dragged() {
            ui.ctx().send_viewport_cmd(egui::ViewportCommand::StartDrag);
        }
        if interact.double_clicked() {
            let is_fullscreen = ui.input(|i| i.viewport().fullscreen.unwrap_or(false));
            ui.ctx()
                .send_viewport_cmd(egui::ViewportCommand::Fullscreen(!is_fullscreen));
        }

        ui.horizontal(|ui| {
            ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
                ui.menu_button("📂", |ui| {
                    for comparison in recent_comparisons {
                        let label = format!(
                            "{} ↔ {}",
                            file_name(&comparison.original),
                            file_name(&comparison.modified)
                        );
                        let hover = format!(
                            "{}\n{}",
                            comparison.original.display(),
                            comparison.modified.display()
                        );
                        if ui.button(label).on_hover_text(hover).clicked() {
                            action = Some(TitleBarAction::OpenRecent(comparison.clone()));
                            ui.close();
                        }
                    }
                    if !recent_comparisons.is_empty() {
                        ui.separator();
                    }
                    if ui.button("Open Original...").clicked() {
                        action = Some(TitleBarAction::OpenOriginal);
                        ui.close();
                    }
                    if ui.button("Open Modified...").clicked() {
                        action = Some(TitleBarAction::OpenModified);
                        ui.close();
                    }
                })
                .response
                .on_hover_text("Open");

                ui.add_space(8.0);
                ui.label(original.map(file_name).unwrap_or("(none)"));
                if ui.button("⇄").on_hover_text("Swap sides").clicked() {
                    action = Some(TitleBarAction::SwapSides);
                }
                ui.label(modified.map(file_name).unwrap_or("(none)"));
                ui.add_space(16.0);

                if ui
                    .selectable_label(compact_mode, "Compact")
                    .on_hover_text("Highlight only the changed characters")
                    .clicked()
                {
                    action = Some(TitleBarAction::ToggleCompactMode);
                }
                if ui
                    .selectable_label(render_mode == RenderMode::TwoPane, "Side by side")
                    .clicked()
                {
                    action = Some(TitleBarAction::SetRenderMode(RenderMode::TwoPane));
                }
                if ui
                    .selectable_label(render_mode == RenderMode::SinglePane, "Unified")
                    .clicked()
                {
                    action = Some(TitleBarAction::SetRenderMode(RenderMode::SinglePane));
                }
            });

            // Window Controls
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.spacing_mut().item_spacing.x = 8.0;

                if ui.button("❌").on_hover_text("Close").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }

                let is_fullscreen = ui.input(|i| i.viewport().fullscreen.unwrap_or(false));
                if ui.button("⛶").on_hover_text("Fullscreen").clicked() {
                    ui.ctx()
                        .send_viewport_cmd(egui::ViewportCommand::Fullscreen(!is_fullscreen));
                }

                if ui.button("➖").on_hover_text("Minimize").clicked() {
                    ui.ctx()
                        .send_viewport_cmd(egui::ViewportCommand::Minimized(true));
                }

                ui.add_space(16.0);
                let summary = match status {
                    Some(message) => message.to_string(),
                    None => Self::format_change_count(change_count),
                };
                ui.label(egui::RichText::new(summary).small());
            });
        });

        action
    }

    fn format_change_count(count: usize) -> String {
        match count {
            0 => "No changes".to_string(),
            1 => "1 change".to_string(),
            n => format!("{} changes", n),
        }
    }
}
