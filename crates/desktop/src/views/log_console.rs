use iced::widget::{column, container, scrollable, text};
use iced::{Element, Font, Length};

use crate::theme;

/// Scrollable console of timestamped log lines, newest at the bottom.
pub fn view<Message: 'static>(lines: &[String]) -> Element<'_, Message> {
    let rows = column(
        lines
            .iter()
            .map(|line| {
                text(line.as_str())
                    .font(Font::MONOSPACE)
                    .size(12)
                    .color(theme::console_text_color())
                    .into()
            })
            .collect::<Vec<_>>(),
    )
    .spacing(2);

    container(
        scrollable(rows)
            .anchor_bottom()
            .width(Length::Fill)
            .height(Length::Fill),
    )
    .style(|_theme| container::Style {
        background: Some(theme::console_background_color().into()),
        ..container::Style::default()
    })
    .padding(8)
    .width(Length::Fill)
    .height(Length::Fill)
    .into()
}

/// Prefix a message with the wall-clock time, `[HH:MM:SS] message`.
pub fn timestamped(message: &str) -> String {
    format!("[{}] {message}", chrono::Local::now().format("%H:%M:%S"))
}
