use crate::config::{CodecConfig, PipelineConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{QrfeedError, QrfeedResult};
use crate::render::frame::{Frame, PixelOrder};

/// Stream parameters fixed by [`VideoSink::open`] for the whole output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Channel order of frames passed to `write`.
    pub pixel_order: PixelOrder,
    /// Encoder/container selection (ignored by in-memory sinks).
    pub codec: CodecConfig,
}

impl SinkConfig {
    pub fn from_pipeline(cfg: &PipelineConfig) -> Self {
        Self {
            width: cfg.video.width,
            height: cfg.video.height,
            fps: cfg.video.fps,
            pixel_order: cfg.video.pixel_order,
            codec: cfg.video.codec.clone(),
        }
    }

    /// Reject frames that do not match the stream.
    pub fn check_frame(&self, frame: &Frame) -> QrfeedResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(QrfeedError::frame_size_mismatch(
                (frame.width, frame.height),
                (self.width, self.height),
            ));
        }
        if frame.order != self.pixel_order {
            return Err(QrfeedError::validation(format!(
                "frame channel order {:?} does not match sink order {:?}",
                frame.order, self.pixel_order
            )));
        }
        if frame.data.len() != frame.expected_len() {
            return Err(QrfeedError::validation(
                "frame.data size mismatch with width*height*3",
            ));
        }
        Ok(())
    }
}

/// Append-only video output.
///
/// Lifecycle: `open` once, `write` frames in output order, `close` exactly once after the last
/// frame. An unclosed sink does not produce a playable file.
pub trait VideoSink {
    /// Create the output and fix its resolution and frame rate.
    fn open(&mut self, cfg: SinkConfig) -> QrfeedResult<()>;
    /// Append the next frame.
    fn write(&mut self, frame: &Frame) -> QrfeedResult<FrameIndex>;
    /// Flush and finalize the output.
    fn close(&mut self) -> QrfeedResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<Frame>,
    closed: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The configuration captured in `open`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Frames in output order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl VideoSink for InMemorySink {
    fn open(&mut self, cfg: SinkConfig) -> QrfeedResult<()> {
        if self.cfg.is_some() && !self.closed {
            return Err(QrfeedError::validation("sink is already open"));
        }
        self.cfg = Some(cfg);
        self.frames.clear();
        self.closed = false;
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> QrfeedResult<FrameIndex> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| QrfeedError::validation("sink not opened"))?;
        if self.closed {
            return Err(QrfeedError::validation("sink is already closed"));
        }
        cfg.check_frame(frame)?;
        self.frames.push(frame.clone());
        Ok(FrameIndex(self.frames.len() as u64 - 1))
    }

    fn close(&mut self) -> QrfeedResult<()> {
        if self.cfg.is_none() {
            return Err(QrfeedError::validation("sink not opened"));
        }
        if std::mem::replace(&mut self.closed, true) {
            return Err(QrfeedError::validation("sink is already closed"));
        }
        Ok(())
    }
}
