use crate::shared::frame::Frame;

/// Domain interface for a live, frame-by-frame video source.
///
/// `read_frame` blocks until the next frame is decoded. Any error leaves
/// the source closed; callers decide whether and when to `open` again.
pub trait VideoSource: Send {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error>>;

    fn is_open(&self) -> bool;

    fn read_frame(&mut self) -> Result<Frame, Box<dyn std::error::Error>>;

    fn close(&mut self);
}
