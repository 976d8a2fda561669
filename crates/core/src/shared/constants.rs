pub const DETECTOR_MODEL_NAME: &str = "yolo11n-face.onnx";
pub const DETECTOR_MODEL_URL: &str =
    "https://github.com/proxalert/proxalert/releases/download/v0.1.0/yolo11n-face.onnx";

pub const EMBEDDER_MODEL_NAME: &str = "facenet_vggface2.onnx";
pub const EMBEDDER_MODEL_URL: &str =
    "https://github.com/proxalert/proxalert/releases/download/v0.1.0/facenet_vggface2.onnx";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

/// Fraction of a detection box trimmed from each side before embedding,
/// to keep background pixels out of the face crop.
pub const CROP_MARGIN: f64 = 0.1;

/// Minimum cosine similarity for a gallery match. Strictly-greater-than.
pub const MATCH_THRESHOLD: f32 = 0.5;

/// Minimum wall-clock interval between successive alerts.
pub const COOLDOWN_SECONDS: u64 = 15;
