use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StageError, StageResult};
use crate::render::surface::Surface;

/// Container/codec of a captured animation.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    /// VP9 in WebM.
    #[default]
    Webm,
    /// H.264 in fragmented MP4.
    Mp4,
    /// Concatenated premultiplied RGBA8 frames, no container.
    Raw,
}

impl VideoFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            VideoFormat::Webm => "webm",
            VideoFormat::Mp4 => "mp4",
            VideoFormat::Raw => "rgba",
        }
    }

    /// MIME type of the encoded bytes.
    pub fn mime_type(self) -> &'static str {
        match self {
            VideoFormat::Webm => "video/webm",
            VideoFormat::Mp4 => "video/mp4",
            VideoFormat::Raw => "application/octet-stream",
        }
    }
}

impl std::str::FromStr for VideoFormat {
    type Err = StageError;

    fn from_str(s: &str) -> StageResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webm" => Ok(VideoFormat::Webm),
            "mp4" => Ok(VideoFormat::Mp4),
            "raw" | "rgba" => Ok(VideoFormat::Raw),
            other => Err(StageError::validation(format!(
                "unknown video format '{other}'"
            ))),
        }
    }
}

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Playback frame rate.
    pub fps: Fps,
}

impl SinkConfig {
    /// Reject zero-sized frames.
    pub fn validate(&self) -> StageResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(StageError::validation(format!(
                "sink frame size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// A finished, fully buffered animation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoArtifact {
    /// Encoding of `bytes`.
    pub format: VideoFormat,
    /// Frame width as captured (before any encoder padding).
    pub width: u32,
    /// Frame height as captured.
    pub height: u32,
    /// Number of frames pushed.
    pub frame_count: u64,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
}

impl VideoArtifact {
    /// Export file name, e.g. `cover_animation.webm`.
    pub fn file_name(&self) -> String {
        crate::export::naming::video_file_name(self.format)
    }
}

/// Consumer of rendered frames.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order between
/// one `begin` and one `end`. A failed capture calls `abort` instead of `end`.
pub trait FrameSink: Send {
    /// Called once before any frame is pushed.
    fn begin(&mut self, cfg: SinkConfig) -> StageResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &Surface) -> StageResult<()>;
    /// Finish the stream and hand back the buffered artifact.
    fn end(&mut self) -> StageResult<VideoArtifact>;
    /// Discard everything buffered so far.
    fn abort(&mut self) {}
}

/// Sink that keeps every frame in memory; for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, Surface)>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, Surface)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> StageResult<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Surface) -> StageResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| StageError::encode("in-memory sink not started"))?;
        if frame.width() != cfg.width || frame.height() != cfg.height {
            return Err(StageError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }
        if let Some((last, _)) = self.frames.last()
            && idx <= *last
        {
            return Err(StageError::encode("in-memory sink received out-of-order frame"));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> StageResult<VideoArtifact> {
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| StageError::encode("in-memory sink not started"))?;
        let bytes = self
            .frames
            .iter()
            .flat_map(|(_, f)| f.data().iter().copied())
            .collect();
        Ok(VideoArtifact {
            format: VideoFormat::Raw,
            width: cfg.width,
            height: cfg.height,
            frame_count: self.frames.len() as u64,
            bytes,
        })
    }

    fn abort(&mut self) {
        self.cfg = None;
        self.frames.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
