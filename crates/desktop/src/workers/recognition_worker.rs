use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use proxalert_core::recognition::domain::face_detector::FaceDetector;
use proxalert_core::recognition::domain::face_embedder::FaceEmbedder;
use proxalert_core::recognition::domain::frame_recognizer::FrameRecognizer;
use proxalert_core::recognition::infrastructure::gallery_loader::load_gallery;
use proxalert_core::recognition::infrastructure::model_resolver;
use proxalert_core::recognition::infrastructure::onnx_facenet_embedder::OnnxFacenetEmbedder;
use proxalert_core::recognition::infrastructure::onnx_yolo_detector::{
    OnnxYoloDetector, DEFAULT_CONFIDENCE,
};
use proxalert_core::shared::constants::{
    DETECTOR_MODEL_NAME, DETECTOR_MODEL_URL, EMBEDDER_MODEL_NAME, EMBEDDER_MODEL_URL,
};
use proxalert_core::shared::detection::Detection;
use proxalert_core::shared::frame::Frame;
use proxalert_core::video::domain::video_source::VideoSource;
use proxalert_core::video::infrastructure::ffmpeg_stream_source::FfmpegStreamSource;

const READ_RETRY_DELAY: Duration = Duration::from_millis(100);
const RECONNECT_INITIAL: Duration = Duration::from_millis(500);
const RECONNECT_MAX: Duration = Duration::from_secs(10);

pub enum RecognitionMessage {
    DownloadProgress(u64, u64),
    Status(String),
    /// Latest recognized frame. The UI drains the channel each tick and
    /// keeps only the newest one.
    Frame(Frame, Vec<Detection>),
    Fatal(String),
}

pub struct RecognitionParams {
    pub camera_url: String,
    pub gallery_dir: PathBuf,
    pub threshold: f32,
}

pub fn spawn(params: RecognitionParams) -> (Receiver<RecognitionMessage>, Arc<AtomicBool>) {
    let (tx, rx) = crossbeam_channel::unbounded::<RecognitionMessage>();
    let stop = Arc::new(AtomicBool::new(false));
    let stop_clone = stop.clone();

    thread::spawn(move || {
        if let Err(e) = run(&tx, &stop_clone, &params) {
            if !stop_clone.load(Ordering::Relaxed) {
                let _ = tx.send(RecognitionMessage::Fatal(e.to_string()));
            }
        }
    });

    (rx, stop)
}

fn run(
    tx: &Sender<RecognitionMessage>,
    stop: &Arc<AtomicBool>,
    params: &RecognitionParams,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut recognizer = build_recognizer(tx, params)?;
    let _ = tx.send(RecognitionMessage::Status(format!(
        "gallery loaded: {} identities",
        recognizer.gallery().identity_count()
    )));

    let mut source = FfmpegStreamSource::new(params.camera_url.clone());
    let mut backoff = RECONNECT_INITIAL;

    while !stop.load(Ordering::Relaxed) {
        if !source.is_open() {
            match source.open() {
                Ok(()) => {
                    let _ = tx.send(RecognitionMessage::Status(format!(
                        "camera connected: {}",
                        source.url()
                    )));
                    backoff = RECONNECT_INITIAL;
                }
                Err(e) => {
                    log::warn!("camera open failed, retrying in {backoff:?}: {e}");
                    let _ = tx.send(RecognitionMessage::Status(format!(
                        "camera unavailable, retrying: {e}"
                    )));
                    thread::sleep(backoff);
                    backoff = (backoff * 2).min(RECONNECT_MAX);
                    continue;
                }
            }
        }

        let frame = match source.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                // The source closed itself; the next iteration reopens it.
                log::warn!("frame read failed: {e}");
                thread::sleep(READ_RETRY_DELAY);
                continue;
            }
        };

        match recognizer.recognize(&frame) {
            Ok(detections) => {
                let _ = tx.send(RecognitionMessage::Frame(frame, detections));
            }
            Err(e) => {
                log::warn!("recognition failed on frame {}: {e}", frame.index());
            }
        }
    }

    source.close();
    Ok(())
}

fn build_recognizer(
    tx: &Sender<RecognitionMessage>,
    params: &RecognitionParams,
) -> Result<FrameRecognizer, Box<dyn std::error::Error>> {
    let _ = tx.send(RecognitionMessage::Status("resolving models".to_string()));

    let tx_dl = tx.clone();
    let detector_path = model_resolver::resolve(
        DETECTOR_MODEL_NAME,
        DETECTOR_MODEL_URL,
        Some(Box::new(move |dl, total| {
            let _ = tx_dl.send(RecognitionMessage::DownloadProgress(dl, total));
        })),
    )?;
    let tx_dl = tx.clone();
    let embedder_path = model_resolver::resolve(
        EMBEDDER_MODEL_NAME,
        EMBEDDER_MODEL_URL,
        Some(Box::new(move |dl, total| {
            let _ = tx_dl.send(RecognitionMessage::DownloadProgress(dl, total));
        })),
    )?;

    let detector: Box<dyn FaceDetector> =
        Box::new(OnnxYoloDetector::new(&detector_path, DEFAULT_CONFIDENCE)?);
    let mut embedder: Box<dyn FaceEmbedder> = Box::new(OnnxFacenetEmbedder::new(&embedder_path)?);

    let _ = tx.send(RecognitionMessage::Status(format!(
        "loading gallery from {}",
        params.gallery_dir.display()
    )));
    let gallery = load_gallery(&params.gallery_dir, embedder.as_mut())?;

    Ok(FrameRecognizer::new(
        detector,
        embedder,
        gallery,
        params.threshold,
    ))
}
