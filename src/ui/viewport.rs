use crate::constant::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_TITLE, DEFAULT_WINDOW_WIDTH};

pub fn build_viewport() -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(DEFAULT_WINDOW_TITLE)
            .with_inner_size([DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT])
            .with_min_inner_size([480.0, 240.0])
            .with_drag_and_drop(true)
            .with_resizable(true),
        ..Default::default()
    }
}
