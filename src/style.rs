use crate::engine::DecorationClass;
use egui::{Color32, Context, Stroke, Style, Visuals};

// Whole-line backgrounds used when compact mode is off
pub const REMOVED_LINE_BG: Color32 = Color32::from_rgb(255, 235, 235);
pub const ADDED_LINE_BG: Color32 = Color32::from_rgb(230, 255, 235);

// Compact-mode decoration backgrounds
const LINE_DELETE_BG: Color32 = Color32::from_rgb(255, 215, 215);
const LINE_INSERT_BG: Color32 = Color32::from_rgb(205, 245, 210);
const CHAR_DELETE_BG: Color32 = Color32::from_rgb(255, 170, 170);
const CHAR_INSERT_BG: Color32 = Color32::from_rgb(160, 235, 170);

pub const GUTTER_TEXT_COLOR: Color32 = Color32::from_gray(150);

/// Background for a decoration class.
pub fn decoration_background(class: DecorationClass) -> Color32 {
    match class {
        DecorationClass::LineDelete | DecorationClass::EmptyLineDelete => LINE_DELETE_BG,
        DecorationClass::LineInsert | DecorationClass::EmptyLineInsert => LINE_INSERT_BG,
        DecorationClass::CharDelete => CHAR_DELETE_BG,
        DecorationClass::CharInsert => CHAR_INSERT_BG,
    }
}

/// Background for a rendered span carrying the given class names.
pub fn span_background(classes: &[String]) -> Option<Color32> {
    if classes
        .iter()
        .any(|c| c == DecorationClass::CharDelete.as_str())
    {
        Some(CHAR_DELETE_BG)
    } else if classes
        .iter()
        .any(|c| c == DecorationClass::CharInsert.as_str())
    {
        Some(CHAR_INSERT_BG)
    } else {
        None
    }
}

pub fn configure_style(ctx: &Context) {
    let mut style = Style::default();

    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.window_margin = egui::Margin::same(12);

    ctx.set_style(style);

    let mut visuals = Visuals::light();
    visuals.window_shadow = egui::epaint::Shadow::NONE;
    visuals.popup_shadow = egui::epaint::Shadow::NONE;

    visuals.widgets.noninteractive.bg_stroke = Stroke::new(0.0, Color32::TRANSPARENT);
    visuals.widgets.inactive.bg_fill = Color32::TRANSPARENT;
    visuals.widgets.hovered.bg_fill = Color32::from_gray(240);
    visuals.widgets.active.bg_fill = Color32::from_gray(230);

    visuals.selection.bg_fill = Color32::from_rgb(200, 220, 255);
    visuals.selection.stroke = Stroke::new(1.0, Color32::from_rgb(100, 100, 100));

    ctx.set_visuals(visuals);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_background_prefers_delete() {
        let classes = vec!["char-delete".to_string()];
        assert_eq!(span_background(&classes), Some(CHAR_DELETE_BG));
        assert_eq!(span_background(&[]), None);
        assert_eq!(
            span_background(&["char-insert".to_string()]),
            Some(CHAR_INSERT_BG)
        );
    }
}
