use ndarray::ArrayView3;

use crate::shared::detection::BoundingBox;

/// A single camera frame: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at the capture boundary only; recognition
/// code treats pixel data as opaque.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

pub const CHANNELS: usize = 3;

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (self.height as usize, self.width as usize, CHANNELS),
            &self.data,
        )
        .expect("Frame data length must match dimensions")
    }

    /// Extract the pixels under `bbox` as a new frame.
    ///
    /// The box must already be clamped to frame bounds; returns `None` for
    /// degenerate or out-of-range boxes instead of panicking.
    pub fn crop(&self, bbox: &BoundingBox) -> Option<Frame> {
        if bbox.is_degenerate() {
            return None;
        }
        let (x, y) = (bbox.x as usize, bbox.y as usize);
        let (w, h) = (bbox.width as usize, bbox.height as usize);
        if bbox.x < 0
            || bbox.y < 0
            || x + w > self.width as usize
            || y + h > self.height as usize
        {
            return None;
        }

        let mut out = Vec::with_capacity(w * h * CHANNELS);
        let row_stride = self.width as usize * CHANNELS;
        for row in y..y + h {
            let start = row * row_stride + x * CHANNELS;
            out.extend_from_slice(&self.data[start..start + w * CHANNELS]);
        }
        Some(Frame::new(out, w as u32, h as u32, self.index))
    }
}
