use std::time::Duration;

use iced::border::Border;
use iced::widget::{container, text};
use iced::{alignment, Color, Element, Length};

use crate::theme;

pub const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Transient notification anchored to the bottom-right corner, stacked
/// over the main content.
pub fn view<Message: 'static>(message: &str) -> Element<'_, Message> {
    let body = container(text(message).size(13).color(Color::BLACK))
        .style(|_theme| container::Style {
            background: Some(theme::toast_background_color().into()),
            border: Border {
                color: Color::BLACK,
                width: 1.0,
                radius: 4.0.into(),
            },
            ..container::Style::default()
        })
        .padding([6, 12]);

    container(body)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(alignment::Horizontal::Right)
        .align_y(alignment::Vertical::Bottom)
        .padding(24)
        .into()
}
