use ratatui::style::{Color, Modifier, Style};

// Centralized colors for menus and select controls. Keep these as small
// helpers so the renderer never hardcodes a color.

pub const ACCENT: Color = Color::Rgb(200, 100, 0);
pub const ACCENT_ALT: Color = Color::Rgb(255, 165, 0);

pub fn accent() -> Color {
    ACCENT
}

pub fn accent_alt() -> Color {
    ACCENT_ALT
}

// Page
pub fn page_bg() -> Color {
    Color::Reset
}
pub fn page_fg() -> Color {
    Color::Gray
}

// Menu bar triggers
pub fn trigger_fg() -> Color {
    Color::White
}
pub fn trigger_open_bg() -> Color {
    accent()
}
pub fn trigger_open_fg() -> Color {
    Color::Black
}

// Floating panels
pub fn menu_bg() -> Color {
    Color::DarkGray
}
pub fn menu_fg() -> Color {
    Color::White
}
pub fn menu_border() -> Color {
    Color::Gray
}
pub fn menu_active_bg() -> Color {
    accent_alt()
}
pub fn menu_active_fg() -> Color {
    Color::Black
}
pub fn menu_disabled_fg() -> Color {
    Color::Gray
}

// Select control
pub fn select_input_bg() -> Color {
    Color::Black
}
pub fn select_input_fg() -> Color {
    Color::White
}
pub fn select_selected_bg() -> Color {
    Color::Gray
}
pub fn select_selected_fg() -> Color {
    Color::Black
}
pub fn pill_bg() -> Color {
    Color::Blue
}
pub fn pill_fg() -> Color {
    Color::White
}

pub fn group_label_style() -> Style {
    Style::default()
        .fg(accent_alt())
        .add_modifier(Modifier::BOLD)
}

pub fn disabled_style() -> Style {
    Style::default()
        .fg(menu_disabled_fg())
        .add_modifier(Modifier::DIM)
}
