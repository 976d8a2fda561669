use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use proxalert_core::recognition::domain::face_detector::FaceDetector;
use proxalert_core::recognition::domain::face_embedder::FaceEmbedder;
use proxalert_core::recognition::domain::frame_recognizer::FrameRecognizer;
use proxalert_core::recognition::infrastructure::gallery_loader::load_gallery;
use proxalert_core::recognition::infrastructure::model_resolver;
use proxalert_core::recognition::infrastructure::onnx_facenet_embedder::OnnxFacenetEmbedder;
use proxalert_core::recognition::infrastructure::onnx_yolo_detector::OnnxYoloDetector;
use proxalert_core::shared::constants::{
    DETECTOR_MODEL_NAME, DETECTOR_MODEL_URL, EMBEDDER_MODEL_NAME, EMBEDDER_MODEL_URL,
    MATCH_THRESHOLD,
};
use proxalert_core::shared::frame::Frame;

/// Recognize faces in an image against an enrolled gallery.
#[derive(Parser)]
#[command(name = "proxalert")]
struct Cli {
    /// Input image file.
    input: PathBuf,

    /// Directory of reference photos, one or more per identity
    /// (alice.jpg, alice_2.jpg, ...).
    #[arg(long)]
    gallery: PathBuf,

    /// Cosine-similarity threshold for accepting a match (0.0-1.0).
    #[arg(long, default_value_t = MATCH_THRESHOLD)]
    threshold: f32,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value = "0.25")]
    confidence: f64,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let detector = build_detector(cli.confidence)?;
    let mut embedder = build_embedder()?;
    let gallery = load_gallery(&cli.gallery, embedder.as_mut())?;
    if gallery.is_empty() {
        log::warn!("gallery is empty; every face will be unknown");
    }

    let frame = load_image(&cli.input)?;
    let mut recognizer = FrameRecognizer::new(detector, embedder, gallery, cli.threshold);
    let detections = recognizer.recognize(&frame)?;

    for detection in &detections {
        let line = serde_json::json!({
            "x": detection.bbox.x,
            "y": detection.bbox.y,
            "width": detection.bbox.width,
            "height": detection.bbox.height,
            "label": detection.label.to_string(),
        });
        println!("{line}");
    }
    log::info!("{} face(s) found", detections.len());

    Ok(())
}

fn build_detector(confidence: f64) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {DETECTOR_MODEL_NAME}");
    let model_path = model_resolver::resolve(
        DETECTOR_MODEL_NAME,
        DETECTOR_MODEL_URL,
        Some(Box::new(download_progress)),
    )?;
    eprintln!();
    Ok(Box::new(OnnxYoloDetector::new(&model_path, confidence)?))
}

fn build_embedder() -> Result<Box<dyn FaceEmbedder>, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {EMBEDDER_MODEL_NAME}");
    let model_path = model_resolver::resolve(
        EMBEDDER_MODEL_NAME,
        EMBEDDER_MODEL_URL,
        Some(Box::new(download_progress)),
    )?;
    eprintln!();
    Ok(Box::new(OnnxFacenetEmbedder::new(&model_path)?))
}

fn load_image(path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
    let image = image::open(path)?.to_rgb8();
    let (w, h) = image.dimensions();
    Ok(Frame::new(image.into_raw(), w, h, 0))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !cli.gallery.is_dir() {
        return Err(format!("Gallery is not a directory: {}", cli.gallery.display()).into());
    }
    if !(0.0..=1.0).contains(&cli.threshold) {
        return Err(format!(
            "Threshold must be between 0.0 and 1.0, got {}",
            cli.threshold
        )
        .into());
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading model... {pct}%");
    } else {
        eprint!("\rDownloading model... {downloaded} bytes");
    }
}
