//! FFmpeg integration for clip decoding and encoding
//!
//! Decoding converts every frame of the best video stream to RGB24. Encoding converts
//! RGB24 frames back to YUV420P and muxes them at the source frame rate.

use crate::{
    backends::video::{FrameRate, VideoBackend, VideoCodec, VideoMetadata, VideoSink, VideoSource},
    error::{AugmentError, Result},
};
use ffmpeg_next as ffmpeg;
use image::RgbImage;
use std::path::{Path, PathBuf};

const RGB_BYTES_PER_PIXEL: usize = 3;

impl VideoCodec {
    fn codec_id(self) -> ffmpeg::codec::Id {
        match self {
            Self::Mpeg4 => ffmpeg::codec::Id::MPEG4,
            Self::H264 => ffmpeg::codec::Id::H264,
        }
    }
}

/// FFmpeg video backend implementation
#[derive(Debug)]
pub struct FFmpegBackend {
    _initialized: (),
}

impl FFmpegBackend {
    /// Initialize FFmpeg and create the backend
    pub fn new() -> Result<Self> {
        ffmpeg::init()
            .map_err(|e| AugmentError::video(format!("Failed to initialize FFmpeg: {e}")))?;
        ffmpeg::util::log::set_level(ffmpeg::util::log::Level::Error);
        Ok(Self { _initialized: () })
    }
}

impl VideoBackend for FFmpegBackend {
    fn open_source(&self, path: &Path) -> Result<Box<dyn VideoSource>> {
        Ok(Box::new(FFmpegSource::open(path)?))
    }

    fn create_sink(
        &self,
        path: &Path,
        metadata: &VideoMetadata,
        codec: VideoCodec,
    ) -> Result<Box<dyn VideoSink>> {
        Ok(Box::new(FFmpegSink::create(path, metadata, codec)?))
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

/// Decoder over the best video stream of one file
struct FFmpegSource {
    input: ffmpeg::format::context::Input,
    decoder: ffmpeg::decoder::Video,
    scaler: ffmpeg::software::scaling::Context,
    stream_index: usize,
    metadata: VideoMetadata,
    eof_sent: bool,
}

impl FFmpegSource {
    fn open(path: &Path) -> Result<Self> {
        let input = ffmpeg::format::input(&path)
            .map_err(|e| AugmentError::source_unavailable(path, &e.to_string()))?;

        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| AugmentError::source_unavailable(path, "no video stream found"))?;
        let stream_index = stream.index();

        let mut frame_rate = stream.avg_frame_rate();
        if frame_rate.numerator() <= 0 || frame_rate.denominator() <= 0 {
            frame_rate = stream.rate();
        }

        let decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|e| {
                AugmentError::source_unavailable(path, &format!("cannot create decoder: {e}"))
            })?;

        let metadata = VideoMetadata::new(
            decoder.width(),
            decoder.height(),
            FrameRate::new(frame_rate.numerator(), frame_rate.denominator()),
        );

        let scaler = ffmpeg::software::scaling::Context::get(
            decoder.format(),
            metadata.width,
            metadata.height,
            ffmpeg::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            ffmpeg::software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| AugmentError::video_stage_error("create frame scaler", path, &e.to_string()))?;

        tracing::debug!(
            path = %path.display(),
            width = metadata.width,
            height = metadata.height,
            fps = %metadata.frame_rate,
            "Opened video source"
        );

        Ok(Self {
            input,
            decoder,
            scaler,
            stream_index,
            metadata,
            eof_sent: false,
        })
    }

    fn next_video_packet(&mut self) -> Option<ffmpeg::Packet> {
        let index = self.stream_index;
        self.input
            .packets()
            .find_map(|(stream, packet)| (stream.index() == index).then_some(packet))
    }

    fn to_rgb_image(&mut self, decoded: &ffmpeg::frame::Video) -> Result<RgbImage> {
        let mut rgb_frame = ffmpeg::frame::Video::empty();
        self.scaler
            .run(decoded, &mut rgb_frame)
            .map_err(|e| AugmentError::video(format!("Failed to convert frame to RGB: {e}")))?;

        let width = rgb_frame.width();
        let height = rgb_frame.height();
        let row_bytes = width as usize * RGB_BYTES_PER_PIXEL;
        let stride = rgb_frame.stride(0);

        // Rows may be padded past `row_bytes`
        let mut buffer = Vec::with_capacity(row_bytes * height as usize);
        for row in rgb_frame.data(0).chunks(stride).take(height as usize) {
            let pixels = row
                .get(..row_bytes)
                .ok_or_else(|| AugmentError::video("Decoded row shorter than frame width"))?;
            buffer.extend_from_slice(pixels);
        }

        RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| AugmentError::video("Decoded frame buffer has unexpected size"))
    }
}

impl VideoSource for FFmpegSource {
    fn metadata(&self) -> VideoMetadata {
        self.metadata
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let mut decoded = ffmpeg::frame::Video::empty();
        loop {
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return self.to_rgb_image(&decoded).map(Some);
            }
            if self.eof_sent {
                return Ok(None);
            }

            if let Some(packet) = self.next_video_packet() {
                self.decoder
                    .send_packet(&packet)
                    .map_err(|e| AugmentError::video(format!("Failed to send packet to decoder: {e}")))?;
            } else {
                self.decoder
                    .send_eof()
                    .map_err(|e| AugmentError::video(format!("Failed to flush decoder: {e}")))?;
                self.eof_sent = true;
            }
        }
    }
}

/// Encoder and muxer for one derived clip
struct FFmpegSink {
    path: PathBuf,
    output: ffmpeg::format::context::Output,
    encoder: ffmpeg::encoder::Video,
    scaler: ffmpeg::software::scaling::Context,
    stream_index: usize,
    encoder_time_base: ffmpeg::Rational,
    stream_time_base: ffmpeg::Rational,
    width: u32,
    height: u32,
    frames_written: u64,
    finished: bool,
}

impl FFmpegSink {
    fn create(path: &Path, metadata: &VideoMetadata, codec: VideoCodec) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| AugmentError::file_io_error("create output directory", parent, &e))?;
        }

        let stage_error =
            |stage: &str, e: ffmpeg::Error| AugmentError::video_stage_error(stage, path, &e.to_string());

        let frame_rate = if metadata.frame_rate.is_valid() {
            ffmpeg::Rational::new(metadata.frame_rate.numerator, metadata.frame_rate.denominator)
        } else {
            tracing::warn!(path = %path.display(), "Source frame rate unknown, writing at 30 fps");
            ffmpeg::Rational::new(30, 1)
        };
        let encoder_time_base = frame_rate.invert();

        let mut output = ffmpeg::format::output(&path).map_err(|e| stage_error("create container", e))?;
        let global_header = output
            .format()
            .flags()
            .contains(ffmpeg::format::Flags::GLOBAL_HEADER);

        let encoder_codec = ffmpeg::encoder::find(codec.codec_id()).ok_or_else(|| {
            AugmentError::video_stage_error(
                "find encoder",
                path,
                &format!("{} encoder not available", codec.ffmpeg_name()),
            )
        })?;

        let mut encoder = ffmpeg::codec::context::Context::new_with_codec(encoder_codec)
            .encoder()
            .video()
            .map_err(|e| stage_error("create encoder", e))?;
        encoder.set_width(metadata.width);
        encoder.set_height(metadata.height);
        encoder.set_format(ffmpeg::format::Pixel::YUV420P);
        encoder.set_frame_rate(Some(frame_rate));
        encoder.set_time_base(encoder_time_base);
        if global_header {
            encoder.set_flags(ffmpeg::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder
            .open_as(encoder_codec)
            .map_err(|e| stage_error("open encoder", e))?;

        let stream_index = {
            let mut stream = output
                .add_stream(encoder_codec)
                .map_err(|e| stage_error("add video stream", e))?;
            stream.set_parameters(&encoder);
            stream.set_time_base(encoder_time_base);
            stream.index()
        };

        output
            .write_header()
            .map_err(|e| stage_error("write container header", e))?;

        let stream_time_base = output
            .stream(stream_index)
            .map_or(encoder_time_base, |stream| stream.time_base());

        let scaler = ffmpeg::software::scaling::Context::get(
            ffmpeg::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            ffmpeg::format::Pixel::YUV420P,
            metadata.width,
            metadata.height,
            ffmpeg::software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| stage_error("create frame scaler", e))?;

        tracing::debug!(
            path = %path.display(),
            codec = %codec,
            width = metadata.width,
            height = metadata.height,
            "Opened video sink"
        );

        Ok(Self {
            path: path.to_path_buf(),
            output,
            encoder,
            scaler,
            stream_index,
            encoder_time_base,
            stream_time_base,
            width: metadata.width,
            height: metadata.height,
            frames_written: 0,
            finished: false,
        })
    }

    fn drain_packets(&mut self) -> Result<()> {
        let mut packet = ffmpeg::Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.stream_index);
            packet.rescale_ts(self.encoder_time_base, self.stream_time_base);
            packet
                .write_interleaved(&mut self.output)
                .map_err(|e| AugmentError::video_stage_error("write packet", &self.path, &e.to_string()))?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        // Marked first so a failing flush is not retried from Drop
        self.finished = true;
        self.encoder
            .send_eof()
            .map_err(|e| AugmentError::video_stage_error("flush encoder", &self.path, &e.to_string()))?;
        self.drain_packets()?;
        self.output
            .write_trailer()
            .map_err(|e| AugmentError::video_stage_error("write container trailer", &self.path, &e.to_string()))
    }
}

impl VideoSink for FFmpegSink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(AugmentError::video(format!(
                "Frame is {}x{}, sink expects {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }

        let mut rgb_frame =
            ffmpeg::frame::Video::new(ffmpeg::format::Pixel::RGB24, self.width, self.height);
        let row_bytes = self.width as usize * RGB_BYTES_PER_PIXEL;
        let stride = rgb_frame.stride(0);
        for (dst, src) in rgb_frame
            .data_mut(0)
            .chunks_mut(stride)
            .zip(frame.as_raw().chunks(row_bytes))
        {
            if let Some(dst) = dst.get_mut(..row_bytes) {
                dst.copy_from_slice(src);
            }
        }

        let mut yuv_frame = ffmpeg::frame::Video::empty();
        self.scaler
            .run(&rgb_frame, &mut yuv_frame)
            .map_err(|e| AugmentError::video(format!("Failed to convert frame to YUV: {e}")))?;
        yuv_frame.set_pts(Some(self.frames_written as i64));

        self.encoder
            .send_frame(&yuv_frame)
            .map_err(|e| AugmentError::video_stage_error("encode frame", &self.path, &e.to_string()))?;
        self.frames_written += 1;
        self.drain_packets()
    }

    fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finalize()?;
        tracing::debug!(
            path = %self.path.display(),
            frames = self.frames_written,
            "Closed video sink"
        );
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl Drop for FFmpegSink {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.finalize() {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to finalize video on drop");
            }
        }
    }
}
