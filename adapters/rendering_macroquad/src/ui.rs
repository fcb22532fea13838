//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types. The instructions panel and the
//! character dropdown are the only widgets.

use macroquad::{
    color::{Color, BLACK, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Skin, Ui},
};

const HUD_LINE_HEIGHT: f32 = 22.0;
const HUD_CHAR_WIDTH: f32 = 9.0;
const HUD_PADDING: Vec2 = Vec2::new(20.0, 10.0);

/// Layout and contents of the pinned instructions panel.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HudUiContext<'a> {
    /// Top-left corner in screen coordinates.
    pub origin: Vec2,
    /// Lines of text shown in the panel.
    pub text: &'a str,
}

/// Layout and contents of the character dropdown.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SelectorUiContext<'a> {
    /// Top-left corner in screen coordinates.
    pub origin: Vec2,
    /// Window size in screen coordinates.
    pub size: Vec2,
    /// Option labels in presentation order.
    pub labels: &'a [&'a str],
    /// Option shown as selected before interaction.
    pub selected: usize,
}

/// Estimated size of the instructions panel for the provided text.
#[must_use]
pub(crate) fn hud_size(text: &str) -> Vec2 {
    let lines = text.lines().count().max(1) as f32;
    let columns = text
        .lines()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0) as f32;
    Vec2::new(
        columns * HUD_CHAR_WIDTH + HUD_PADDING.x * 2.0,
        lines * HUD_LINE_HEIGHT + HUD_PADDING.y * 2.0,
    )
}

fn panel_skin(ui: &mut Ui, background: Color, text: Color) -> Skin {
    let mut skin = ui.default_skin();
    skin.margin = 0.0;

    skin.window_style = ui
        .style_builder()
        .color(background)
        .color_hovered(background)
        .color_clicked(background)
        .color_selected(background)
        .color_selected_hovered(background)
        .color_inactive(background)
        .text_color(text)
        .margin(RectOffset::new(
            HUD_PADDING.x,
            HUD_PADDING.x,
            HUD_PADDING.y,
            HUD_PADDING.y,
        ))
        .build();

    skin.label_style = ui
        .style_builder()
        .text_color(text)
        .text_color_hovered(text)
        .text_color_clicked(text)
        .font_size(16)
        .margin(RectOffset::new(0.0, 0.0, 2.0, 2.0))
        .build();

    skin
}

/// Draws the screen-pinned instructions panel.
pub(crate) fn draw_hud_ui(ui: &mut Ui, context: HudUiContext<'_>) {
    let skin = panel_skin(ui, WHITE, BLACK);
    ui.push_skin(&skin);

    let _ = ui.window(
        hash!("instructions"),
        context.origin,
        hud_size(context.text),
        |ui| {
            for line in context.text.lines() {
                ui.label(None, line);
            }
        },
    );

    ui.pop_skin();
}

/// Draws the character dropdown and returns the option picked during this frame.
pub(crate) fn draw_selector_ui(ui: &mut Ui, context: SelectorUiContext<'_>) -> Option<usize> {
    let skin = panel_skin(ui, Color::from_rgba(32, 32, 32, 230), WHITE);
    ui.push_skin(&skin);

    let mut selected = context.selected;
    let _ = ui.window(hash!("character_selector"), context.origin, context.size, |ui| {
        let _ = ui.combo_box(hash!(), "Character", context.labels, &mut selected);
    });

    ui.pop_skin();

    (selected != context.selected).then_some(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hud_size_grows_with_longest_line_and_line_count() {
        let single = hud_size("Arrow keys to move");
        let double = hud_size("Change your Cypher number in the URL\nArrow keys to move");

        assert_eq!(single.y, HUD_LINE_HEIGHT + HUD_PADDING.y * 2.0);
        assert_eq!(double.y, 2.0 * HUD_LINE_HEIGHT + HUD_PADDING.y * 2.0);
        assert_eq!(double.x, 36.0 * HUD_CHAR_WIDTH + HUD_PADDING.x * 2.0);
    }
}
