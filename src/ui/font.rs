/// Font setup for the diff panes
///
/// The panes render text in the monospace family. egui's bundled monospace
/// font has no CJK glyphs, so a system font with CJK coverage is appended to
/// the monospace family as a fallback.
use eframe::egui::{FontData, FontDefinitions, FontFamily};
use font_kit::handle::Handle;
use font_kit::source::SystemSource;

const CJK_FALLBACK_FONT: &str = "SystemCJKFallback";

/// Font definitions with a CJK fallback for monospace text, if one is installed.
pub fn setup_fonts() -> FontDefinitions {
    let mut fonts = FontDefinitions::default();
    let source = SystemSource::new();

    let loaded = preferred_cjk_fonts()
        .iter()
        .find_map(|name| load_family(&source, name).map(|data| (*name, data)));

    match loaded {
        Some((name, data)) => {
            tracing::info!("Using system font '{}' as CJK fallback", name);
            register_fallback(&mut fonts, data);
        }
        None => tracing::warn!("No CJK system font found, using defaults"),
    }

    fonts
}

fn preferred_cjk_fonts() -> &'static [&'static str] {
    match std::env::consts::OS {
        "macos" => &["PingFang SC", "Hiragino Sans GB", "Heiti SC"],
        "windows" => &["Microsoft YaHei", "SimHei", "MS Gothic"],
        "linux" => &["Noto Sans Mono CJK SC", "Noto Sans CJK SC", "WenQuanYi Micro Hei"],
        _ => &[],
    }
}

fn load_family(source: &SystemSource, name: &str) -> Option<Vec<u8>> {
    let family = source.select_family_by_name(name).ok()?;
    let handle = family.fonts().first()?;
    match handle {
        Handle::Memory { bytes, .. } => Some(bytes.to_vec()),
        Handle::Path { path, .. } => std::fs::read(path).ok(),
    }
}

fn register_fallback(fonts: &mut FontDefinitions, data: Vec<u8>) {
    fonts.font_data.insert(
        CJK_FALLBACK_FONT.to_owned(),
        FontData::from_owned(data).into(),
    );
    for family in [FontFamily::Monospace, FontFamily::Proportional] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push(CJK_FALLBACK_FONT.to_owned());
    }
}
