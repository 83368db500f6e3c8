use std::io::{Read, Write as _};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::effects::composite::flatten_premul_over_bg_to_opaque_rgba8;
use crate::encode::sink::{FrameSink, SinkConfig, VideoArtifact, VideoFormat};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{StageError, StageResult};
use crate::render::surface::Surface;

/// Options for [`FfmpegSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FfmpegSinkOpts {
    /// Output container; [`VideoFormat::Raw`] is not produced by ffmpeg.
    pub format: VideoFormat,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    /// Encode `format` over opaque black.
    pub fn new(format: VideoFormat) -> Self {
        Self {
            format,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

impl Default for FfmpegSinkOpts {
    fn default() -> Self {
        Self::new(VideoFormat::Webm)
    }
}

type Drain = JoinHandle<std::io::Result<Vec<u8>>>;

/// Sink that spawns the system `ffmpeg`, streams raw frames into its stdin, and buffers the
/// encoded container it writes to stdout.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_drain: Option<Drain>,
    stderr_drain: Option<Drain>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    frame_count: u64,
}

impl FfmpegSink {
    /// Create a sink; nothing is spawned until `begin`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stdout_drain: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
            frame_count: 0,
        }
    }

    fn command(&self, cfg: &SinkConfig) -> StageResult<Command> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Frames are flattened before writing, so the input is opaque straight RGBA.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
            "-an",
            // yuv420p needs even dimensions.
            "-vf",
            "pad=ceil(iw/2)*2:ceil(ih/2)*2",
            "-pix_fmt",
            "yuv420p",
        ]);

        match self.opts.format {
            VideoFormat::Webm => {
                cmd.args([
                    "-c:v",
                    "libvpx-vp9",
                    "-b:v",
                    "0",
                    "-crf",
                    "32",
                    "-deadline",
                    "realtime",
                    "-f",
                    "webm",
                ]);
            }
            VideoFormat::Mp4 => {
                // Non-seekable output needs a fragmented mp4.
                cmd.args([
                    "-c:v",
                    "libx264",
                    "-movflags",
                    "frag_keyframe+empty_moov",
                    "-f",
                    "mp4",
                ]);
            }
            VideoFormat::Raw => {
                return Err(StageError::validation(
                    "ffmpeg sink does not produce raw output; use InMemorySink",
                ));
            }
        }
        cmd.arg("pipe:1");
        Ok(cmd)
    }

    fn join_drains(&mut self) -> StageResult<(Vec<u8>, Vec<u8>)> {
        let stdout = join_drain(self.stdout_drain.take(), "stdout")?;
        let stderr = join_drain(self.stderr_drain.take(), "stderr")?;
        Ok((stdout, stderr))
    }
}

impl FrameSink for FfmpegSink {
    #[tracing::instrument(skip(self), fields(format = ?self.opts.format))]
    fn begin(&mut self, cfg: SinkConfig) -> StageResult<()> {
        cfg.validate()?;
        let mut cmd = self.command(&cfg)?;

        if !is_ffmpeg_on_path() {
            return Err(StageError::capture_unavailable(
                "ffmpeg is required for video capture, but was not found on PATH",
            ));
        }

        let mut child = cmd.spawn().map_err(|e| {
            StageError::capture_unavailable(format!("failed to spawn ffmpeg: {e}"))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| StageError::capture_unavailable("failed to open ffmpeg stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| StageError::capture_unavailable("failed to open ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| StageError::capture_unavailable("failed to open ffmpeg stderr"))?;

        self.stdout_drain = Some(spawn_drain(stdout));
        self.stderr_drain = Some(spawn_drain(stderr));
        self.scratch = vec![0u8; cfg.width as usize * cfg.height as usize * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.frame_count = 0;
        tracing::debug!(width = cfg.width, height = cfg.height, "ffmpeg started");
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Surface) -> StageResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| StageError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(StageError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        if frame.width() != cfg.width || frame.height() != cfg.height {
            return Err(StageError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }
        self.last_idx = Some(idx);

        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, frame.data(), self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(StageError::encode("ffmpeg sink is already finalized"));
        };
        stdin
            .write_all(&self.scratch)
            .map_err(|e| StageError::encode(format!("failed to write frame to ffmpeg: {e}")))?;
        self.frame_count += 1;
        Ok(())
    }

    fn end(&mut self) -> StageResult<VideoArtifact> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| StageError::encode("ffmpeg sink not started"))?;
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| StageError::encode("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| StageError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        let (bytes, stderr_bytes) = self.join_drains()?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(StageError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        if bytes.is_empty() {
            return Err(StageError::encode("ffmpeg produced no output"));
        }

        tracing::debug!(bytes = bytes.len(), frames = self.frame_count, "ffmpeg finished");
        Ok(VideoArtifact {
            format: self.opts.format,
            width: cfg.width,
            height: cfg.height,
            frame_count: self.frame_count,
            bytes,
        })
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        let _ = self.join_drains();
        self.cfg = None;
        self.frame_count = 0;
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

fn spawn_drain<R: Read + Send + 'static>(mut pipe: R) -> Drain {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        pipe.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

fn join_drain(handle: Option<Drain>, what: &str) -> StageResult<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| StageError::encode(format!("ffmpeg {what} drain thread panicked")))?
            .map_err(|e| StageError::encode(format!("ffmpeg {what} read failed: {e}"))),
        None => Ok(Vec::new()),
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> StageResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
