use crate::recognition::domain::face_detector::FaceDetector;
use crate::recognition::domain::face_embedder::FaceEmbedder;
use crate::recognition::domain::gallery::Gallery;
use crate::shared::constants::CROP_MARGIN;
use crate::shared::detection::{Detection, Label};
use crate::shared::frame::Frame;

/// Per-frame face recognition: detect, crop, embed, match.
///
/// Pure function of (frame, gallery); all state lives in the injected
/// detector/embedder sessions.
pub struct FrameRecognizer {
    detector: Box<dyn FaceDetector>,
    embedder: Box<dyn FaceEmbedder>,
    gallery: Gallery,
    threshold: f32,
}

impl FrameRecognizer {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        embedder: Box<dyn FaceEmbedder>,
        gallery: Gallery,
        threshold: f32,
    ) -> Self {
        Self {
            detector,
            embedder,
            gallery,
            threshold,
        }
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    /// Locate faces in `frame` and assign each a gallery identity or
    /// [`Label::Unknown`]. Output order matches detector output order.
    ///
    /// Degenerate crops are dropped before the embedding stage and never
    /// appear in the result. A per-face embedding failure downgrades that
    /// face to `Unknown` instead of failing the frame.
    pub fn recognize(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let boxes = self.detector.detect(frame)?;

        let mut detections = Vec::with_capacity(boxes.len());
        for bbox in boxes {
            let crop_box = bbox
                .shrink(CROP_MARGIN)
                .clamp(frame.width(), frame.height());
            let Some(crop) = frame.crop(&crop_box) else {
                continue;
            };

            let label = match self.embedder.embed(&crop) {
                Ok(embedding) => self.gallery.best_match(&embedding, self.threshold),
                Err(e) => {
                    log::warn!("embedding failed for face at {bbox:?}: {e}");
                    Label::Unknown
                }
            };

            detections.push(Detection { bbox, label });
        }

        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::domain::embedding::Embedding;
    use crate::shared::detection::BoundingBox;

    /// Detector stub that returns a fixed list of boxes.
    struct StubDetector(Vec<BoundingBox>);

    impl FaceDetector for StubDetector {
        fn detect(
            &mut self,
            _frame: &Frame,
        ) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
            Ok(self.0.clone())
        }
    }

    /// Embedder stub that keys the returned vector off the crop's first
    /// pixel value, so tests control similarity per face region.
    struct PixelKeyedEmbedder;

    impl FaceEmbedder for PixelKeyedEmbedder {
        fn embed(&mut self, crop: &Frame) -> Result<Embedding, Box<dyn std::error::Error>> {
            let key = crop.data()[0] as f32 / 255.0;
            Ok(Embedding::new(vec![key, (1.0 - key * key).max(0.0).sqrt()]))
        }
    }

    struct FailingEmbedder;

    impl FaceEmbedder for FailingEmbedder {
        fn embed(&mut self, _crop: &Frame) -> Result<Embedding, Box<dyn std::error::Error>> {
            Err("inference backend unavailable".into())
        }
    }

    fn bbox(x: i32, y: i32, w: i32, h: i32) -> BoundingBox {
        BoundingBox {
            x,
            y,
            width: w,
            height: h,
        }
    }

    /// 100x100 frame filled with `value`.
    fn uniform_frame(value: u8) -> Frame {
        Frame::new(vec![value; 100 * 100 * 3], 100, 100, 0)
    }

    fn alice_gallery() -> Gallery {
        let mut gallery = Gallery::new();
        // Reference points along the x axis; a probe keyed off pixel value v
        // has similarity v/255 to it.
        gallery.insert("alice", Embedding::new(vec![1.0, 0.0]));
        gallery
    }

    fn recognizer(detector: StubDetector, gallery: Gallery) -> FrameRecognizer {
        FrameRecognizer::new(
            Box::new(detector),
            Box::new(PixelKeyedEmbedder),
            gallery,
            0.5,
        )
    }

    #[test]
    fn test_high_similarity_labels_identity() {
        // Pixel 204 → similarity 0.8 to alice
        let frame = uniform_frame(204);
        let mut rec = recognizer(StubDetector(vec![bbox(10, 10, 50, 50)]), alice_gallery());

        let detections = rec.recognize(&frame).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].label, Label::Known("alice".into()));
        assert_eq!(detections[0].bbox, bbox(10, 10, 50, 50));
    }

    #[test]
    fn test_low_similarity_labels_unknown() {
        // Pixel 76 → similarity ~0.3
        let frame = uniform_frame(76);
        let mut rec = recognizer(StubDetector(vec![bbox(10, 10, 50, 50)]), alice_gallery());

        let detections = rec.recognize(&frame).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].label, Label::Unknown);
    }

    #[test]
    fn test_degenerate_box_never_reaches_output() {
        let frame = uniform_frame(204);
        let mut rec = recognizer(
            StubDetector(vec![bbox(10, 10, 0, 50), bbox(20, 20, 40, 40)]),
            alice_gallery(),
        );

        let detections = rec.recognize(&frame).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].bbox, bbox(20, 20, 40, 40));
    }

    #[test]
    fn test_corner_box_clamps_to_sliver_and_still_embeds() {
        let frame = uniform_frame(204);
        let mut rec = recognizer(StubDetector(vec![bbox(99, 99, 4, 4)]), alice_gallery());

        let detections = rec.recognize(&frame).unwrap();
        assert_eq!(detections.len(), 1);
    }

    #[test]
    fn test_box_fully_outside_frame_is_dropped() {
        let frame = uniform_frame(204);
        let mut rec = recognizer(StubDetector(vec![bbox(200, 200, 40, 40)]), alice_gallery());
        assert!(rec.recognize(&frame).unwrap().is_empty());
    }

    #[test]
    fn test_no_faces_yields_empty_list() {
        let frame = uniform_frame(204);
        let mut rec = recognizer(StubDetector(vec![]), alice_gallery());
        assert!(rec.recognize(&frame).unwrap().is_empty());
    }

    #[test]
    fn test_output_preserves_detector_order() {
        let frame = uniform_frame(204);
        let boxes = vec![bbox(50, 50, 20, 20), bbox(5, 5, 20, 20)];
        let mut rec = recognizer(StubDetector(boxes.clone()), alice_gallery());

        let detections = rec.recognize(&frame).unwrap();
        let out: Vec<_> = detections.iter().map(|d| d.bbox).collect();
        assert_eq!(out, boxes);
    }

    #[test]
    fn test_embedding_failure_downgrades_to_unknown() {
        let frame = uniform_frame(204);
        let mut rec = FrameRecognizer::new(
            Box::new(StubDetector(vec![bbox(10, 10, 50, 50)])),
            Box::new(FailingEmbedder),
            alice_gallery(),
            0.5,
        );

        let detections = rec.recognize(&frame).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].label, Label::Unknown);
    }

    #[test]
    fn test_empty_gallery_labels_everything_unknown() {
        let frame = uniform_frame(255);
        let mut rec = recognizer(StubDetector(vec![bbox(10, 10, 50, 50)]), Gallery::new());

        let detections = rec.recognize(&frame).unwrap();
        assert_eq!(detections[0].label, Label::Unknown);
    }
}
