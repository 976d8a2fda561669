use crate::recognition::domain::embedding::Embedding;
use crate::shared::frame::Frame;

/// Domain interface for face embedding extraction.
///
/// The embedder owns resizing the crop to its model's input size.
pub trait FaceEmbedder: Send {
    fn embed(&mut self, crop: &Frame) -> Result<Embedding, Box<dyn std::error::Error>>;
}
