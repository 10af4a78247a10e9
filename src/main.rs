use compact_diff::app::DiffViewerApp;
use compact_diff::constant;
use compact_diff::ui;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1).map(PathBuf::from);
    let original = args.next();
    let modified = args.next();
    let options = ui::viewport::build_viewport();

    eframe::run_native(
        constant::DEFAULT_WINDOW_TITLE,
        options,
        Box::new(|cc| {
            // Setup fonts with CJK support
            let fonts = ui::font::setup_fonts();
            cc.egui_ctx.set_fonts(fonts);

            Ok(Box::new(DiffViewerApp::new(cc, original, modified)))
        }),
    )
}
