use iced::widget::image::Handle;
use iced::widget::{column, container, text};
use iced::{Element, Length};

use proxalert_core::shared::detection::Detection;
use proxalert_core::shared::frame::Frame;

pub const VIDEO_WIDTH: f32 = 400.0;
pub const VIDEO_HEIGHT: f32 = 300.0;

const BOX_COLOR: [u8; 4] = [0, 255, 0, 255];
const BOX_THICKNESS: i32 = 2;

/// Convert a frame to RGBA and draw a box around every recognized face.
/// Unknown faces are left unmarked.
pub fn annotate(frame: &Frame, detections: &[Detection]) -> Handle {
    let image = render(frame, detections);
    let (w, h) = image.dimensions();
    Handle::from_rgba(w, h, image.into_raw())
}

fn render(frame: &Frame, detections: &[Detection]) -> image::RgbaImage {
    let (w, h) = (frame.width(), frame.height());
    let mut image = image::RgbaImage::new(w, h);
    for (rgba, rgb) in image
        .chunks_exact_mut(4)
        .zip(frame.data().chunks_exact(3))
    {
        rgba[..3].copy_from_slice(rgb);
        rgba[3] = 255;
    }

    for detection in detections.iter().filter(|d| d.is_known()) {
        let bbox = detection.bbox.clamp(w, h);
        for inset in 0..BOX_THICKNESS {
            draw_hollow_rect(
                &mut image,
                bbox.x + inset,
                bbox.y + inset,
                bbox.width - 2 * inset,
                bbox.height - 2 * inset,
            );
        }
    }

    image
}

fn draw_hollow_rect(image: &mut image::RgbaImage, x: i32, y: i32, width: i32, height: i32) {
    if width <= 0 || height <= 0 {
        return;
    }
    let (right, bottom) = (x + width - 1, y + height - 1);
    for px in x..=right {
        put_pixel(image, px, y);
        put_pixel(image, px, bottom);
    }
    for py in y..=bottom {
        put_pixel(image, x, py);
        put_pixel(image, right, py);
    }
}

fn put_pixel(image: &mut image::RgbaImage, x: i32, y: i32) {
    if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
        image.put_pixel(x as u32, y as u32, image::Rgba(BOX_COLOR));
    }
}

/// Video panel: latest annotated frame with the recognized names
/// listed beneath it.
pub fn view<'a, Message: 'a>(
    handle: Option<&Handle>,
    detections: &'a [Detection],
) -> Element<'a, Message> {
    let feed: Element<'a, Message> = match handle {
        Some(handle) => iced::widget::image(handle.clone())
            .width(Length::Fixed(VIDEO_WIDTH))
            .height(Length::Fixed(VIDEO_HEIGHT))
            .into(),
        None => container(text("Waiting for camera\u{2026}").size(14))
            .width(Length::Fixed(VIDEO_WIDTH))
            .height(Length::Fixed(VIDEO_HEIGHT))
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into(),
    };

    let names: Vec<&str> = detections.iter().filter_map(|d| d.label.name()).collect();
    let caption = text(names.join(", ")).size(13);

    column![feed, caption].spacing(4).into()
}
