use std::path::Path;

use crate::shared::frame::Frame;
use crate::video::domain::video_source::VideoSource;

/// Live camera source decoded via ffmpeg-next (libavformat + libavcodec).
///
/// The URL may be an HTTP camera stream, a local device path, or a plain
/// video file; each decoded frame is converted to RGB24.
pub struct FfmpegStreamSource {
    url: String,
    stream: Option<OpenStream>,
    frame_index: usize,
}

struct OpenStream {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
}

// Safety: the source is driven from a single worker thread at a time;
// the raw pointers inside ffmpeg types are never shared across threads.
unsafe impl Send for FfmpegStreamSource {}

impl FfmpegStreamSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            stream: None,
            frame_index: 0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl VideoSource for FfmpegStreamSource {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(Path::new(&self.url))?;
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;
        let stream_index = stream.index();

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;
        let (width, height) = (decoder.width(), decoder.height());

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::info!("opened video source {} ({width}x{height})", self.url);
        self.stream = Some(OpenStream {
            ictx,
            decoder,
            scaler,
            stream_index,
            width,
            height,
        });
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn read_frame(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
        let result = match self.stream.as_mut() {
            Some(stream) => stream.next_frame(self.frame_index),
            None => Err("video source not open".into()),
        };
        match result {
            Ok(frame) => {
                self.frame_index += 1;
                Ok(frame)
            }
            Err(e) => {
                // Leave the source closed; the caller owns reconnect policy.
                self.close();
                Err(e)
            }
        }
    }

    fn close(&mut self) {
        self.stream = None;
    }
}

impl OpenStream {
    /// Decode packets until one video frame is produced.
    fn next_frame(&mut self, index: usize) -> Result<Frame, Box<dyn std::error::Error>> {
        if let Some(frame) = self.try_receive(index)? {
            return Ok(frame);
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                return Err("video stream ended".into());
            };
            if stream.index() != self.stream_index {
                continue;
            }
            if self.decoder.send_packet(&packet).is_err() {
                // Corrupt packet; keep reading.
                continue;
            }
            if let Some(frame) = self.try_receive(index)? {
                return Ok(frame);
            }
        }
    }

    fn try_receive(&mut self, index: usize) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }

        let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler.run(&decoded, &mut rgb)?;

        // Strip per-row stride padding into a tightly-packed buffer.
        let stride = rgb.stride(0);
        let data = rgb.data(0);
        let w = self.width as usize;
        let h = self.height as usize;
        let mut pixels = Vec::with_capacity(w * h * 3);
        for row in 0..h {
            let start = row * stride;
            pixels.extend_from_slice(&data[start..start + w * 3]);
        }

        Ok(Some(Frame::new(pixels, self.width, self.height, index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn create_test_video(path: &Path, num_frames: usize, width: u32, height: u32) {
        ffmpeg_next::init().unwrap();

        let mut octx = ffmpeg_next::format::output(path).unwrap();
        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4).unwrap();
        let mut ost = octx.add_stream(Some(codec)).unwrap();

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .unwrap();
        encoder_ctx.set_width(width);
        encoder_ctx.set_height(height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, 30));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(30, 1)));
        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let mut encoder = encoder_ctx
            .open_with(ffmpeg_next::Dictionary::new())
            .unwrap();
        ost.set_parameters(&encoder);
        octx.write_header().unwrap();

        let ost_time_base = octx.stream(0).unwrap().time_base();
        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::format::Pixel::YUV420P,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .unwrap();

        for i in 0..num_frames {
            let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
                ffmpeg_next::format::Pixel::RGB24,
                width,
                height,
            );
            let stride = rgb_frame.stride(0);
            let data = rgb_frame.data_mut(0);
            let value = ((i * 40) % 256) as u8;
            for row in 0..height as usize {
                for col in 0..width as usize {
                    let offset = row * stride + col * 3;
                    data[offset..offset + 3].fill(value);
                }
            }

            let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
            scaler.run(&rgb_frame, &mut yuv_frame).unwrap();
            yuv_frame.set_pts(Some(i as i64));
            encoder.send_frame(&yuv_frame).unwrap();

            let mut encoded = ffmpeg_next::Packet::empty();
            while encoder.receive_packet(&mut encoded).is_ok() {
                encoded.set_stream(0);
                encoded.rescale_ts(ffmpeg_next::Rational(1, 30), ost_time_base);
                encoded.write_interleaved(&mut octx).unwrap();
            }
        }

        encoder.send_eof().unwrap();
        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            encoded.rescale_ts(ffmpeg_next::Rational(1, 30), ost_time_base);
            encoded.write_interleaved(&mut octx).unwrap();
        }
        octx.write_trailer().unwrap();
    }

    fn test_video(dir: &Path) -> PathBuf {
        let path = dir.join("test.mp4");
        create_test_video(&path, 5, 160, 120);
        path
    }

    #[test]
    fn test_open_and_read_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video(dir.path());

        let mut source = FfmpegStreamSource::new(path.to_string_lossy().to_string());
        source.open().unwrap();
        assert!(source.is_open());

        let frame = source.read_frame().unwrap();
        assert_eq!(frame.width(), 160);
        assert_eq!(frame.height(), 120);
        assert_eq!(frame.data().len(), 160 * 120 * 3);
        assert_eq!(frame.index(), 0);
    }

    #[test]
    fn test_frame_indices_are_monotonic() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video(dir.path());

        let mut source = FfmpegStreamSource::new(path.to_string_lossy().to_string());
        source.open().unwrap();

        let a = source.read_frame().unwrap();
        let b = source.read_frame().unwrap();
        assert_eq!(a.index() + 1, b.index());
    }

    #[test]
    fn test_read_without_open_is_error() {
        let mut source = FfmpegStreamSource::new("unused");
        assert!(source.read_frame().is_err());
    }

    #[test]
    fn test_end_of_stream_closes_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video(dir.path());

        let mut source = FfmpegStreamSource::new(path.to_string_lossy().to_string());
        source.open().unwrap();

        let mut decoded = 0;
        while source.read_frame().is_ok() {
            decoded += 1;
        }
        assert!(decoded >= 1);
        assert!(!source.is_open());
    }

    #[test]
    fn test_open_nonexistent_source_is_error() {
        let mut source = FfmpegStreamSource::new("/nonexistent/camera.mp4");
        assert!(source.open().is_err());
        assert!(!source.is_open());
    }

    #[test]
    fn test_reopen_after_end_of_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video(dir.path());

        let mut source = FfmpegStreamSource::new(path.to_string_lossy().to_string());
        source.open().unwrap();
        while source.read_frame().is_ok() {}

        source.open().unwrap();
        assert!(source.read_frame().is_ok());
    }
}
