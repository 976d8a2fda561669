use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

/// Fixed dark theme; the demo runs full-screen in control rooms where a
/// light palette washes out.
pub fn app_theme() -> Theme {
    Theme::custom(
        "ProxAlert",
        Palette {
            background: color!(0x1c, 0x1c, 0x1e),
            text: color!(0xcc, 0xcc, 0xcc),
            primary: color!(0x5e, 0x9f, 0xf5),
            success: color!(0x30, 0xd1, 0x58),
            warning: color!(0xff, 0xcc, 0x00),
            danger: color!(0xff, 0x45, 0x3a),
        },
    )
}

/// Fixed camera position marker on the map.
pub fn camera_color() -> Color {
    color!(0xff, 0x45, 0x3a)
}

/// Fixed user position marker on the map.
pub fn user_color() -> Color {
    color!(0x30, 0xd1, 0x58)
}

/// Transient detection marker and its connecting line.
pub fn marker_color() -> Color {
    color!(0x34, 0x78, 0xf6)
}

pub fn alert_text_color() -> Color {
    color!(0xff, 0x45, 0x3a)
}

/// Fallback fill when map.png is missing next to the executable.
pub fn map_background_color() -> Color {
    color!(0x2a, 0x2d, 0x33)
}

/// Log console in the classic terminal green-on-black.
pub fn console_background_color() -> Color {
    Color::BLACK
}

pub fn console_text_color() -> Color {
    color!(0x32, 0xcd, 0x32)
}

pub fn toast_background_color() -> Color {
    color!(0xff, 0xcc, 0x00)
}
