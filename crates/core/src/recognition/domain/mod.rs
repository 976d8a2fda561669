pub mod embedding;
pub mod face_detector;
pub mod face_embedder;
pub mod frame_recognizer;
pub mod gallery;
