pub mod gallery_loader;
pub mod model_resolver;
pub mod onnx_facenet_embedder;
pub mod onnx_yolo_detector;
