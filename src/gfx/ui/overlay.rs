use imgui::{Condition, StyleColor, Ui};

use crate::settings::OverlaySettings;

/// Fixed, non-interactive block of text over the top-left of the scene
pub fn draw_info_overlay(ui: &Ui, settings: &OverlaySettings) {
    ui.window("Info")
        .position(settings.position, Condition::Always)
        .size(settings.size, Condition::Always)
        .bg_alpha(0.0)
        .no_decoration()
        .no_inputs()
        .movable(false)
        .build(|| {
            let _color = ui.push_style_color(StyleColor::Text, settings.color);
            ui.text_wrapped(&settings.text);
        });
}
