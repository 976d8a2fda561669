use iced::mouse;
use iced::widget::canvas::{self, Canvas, Path, Stroke};
use iced::widget::{image, stack};
use iced::{Color, Element, Length, Point, Rectangle, Renderer, Theme};

use proxalert_core::alert::alert_controller::Alert;

use crate::theme;

pub const MAP_WIDTH: f32 = 480.0;
pub const MAP_HEIGHT: f32 = 300.0;

/// Fixed camera position on the map, in canvas coordinates.
const CAMERA: Point = Point::new(240.0, 140.0);
/// The user marker sits a fixed offset east of the camera.
const USER_X_OFFSET: f32 = 60.0;

/// Map panel: optional `map.png` background with the marker overlay
/// drawn on a canvas above it.
pub fn view<'a, Message: 'a>(
    background: Option<&image::Handle>,
    alert: Option<&'a Alert>,
) -> Element<'a, Message> {
    let overlay = Canvas::new(MarkerOverlay {
        alert,
        fill_background: background.is_none(),
    })
    .width(Length::Fixed(MAP_WIDTH))
    .height(Length::Fixed(MAP_HEIGHT));

    match background {
        Some(handle) => stack![
            image(handle.clone())
                .width(Length::Fixed(MAP_WIDTH))
                .height(Length::Fixed(MAP_HEIGHT))
                .content_fit(iced::ContentFit::Fill),
            overlay,
        ]
        .into(),
        None => overlay.into(),
    }
}

struct MarkerOverlay<'a> {
    alert: Option<&'a Alert>,
    fill_background: bool,
}

impl<Message> canvas::Program<Message> for MarkerOverlay<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        if self.fill_background {
            frame.fill_rectangle(Point::ORIGIN, bounds.size(), theme::map_background_color());
        }

        frame.fill(&Path::circle(CAMERA, 10.0), theme::camera_color());
        frame.fill_text(label("Camera", Point::new(CAMERA.x, CAMERA.y - 15.0)));

        let user = Point::new(CAMERA.x + USER_X_OFFSET, CAMERA.y);
        frame.fill(&Path::circle(user, 7.0), theme::user_color());
        frame.fill_text(label("User", Point::new(user.x, user.y + 15.0)));

        if let Some(alert) = self.alert {
            let marker = Point::new(alert.marker_x as f32, alert.marker_y as f32);
            frame.stroke(
                &Path::line(CAMERA, marker),
                Stroke {
                    style: canvas::Style::Solid(theme::marker_color()),
                    width: 2.0,
                    ..Stroke::default()
                },
            );
            frame.fill(&Path::circle(marker, 7.0), theme::marker_color());
            frame.fill_text(label(
                &alert.identity,
                Point::new(marker.x, marker.y - 10.0),
            ));
        }

        vec![frame.into_geometry()]
    }
}

fn label(content: &str, position: Point) -> canvas::Text {
    canvas::Text {
        content: content.to_string(),
        position,
        color: Color::WHITE,
        size: iced::Pixels(11.0),
        ..canvas::Text::default()
    }
}
