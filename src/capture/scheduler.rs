use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval};

use crate::encode::sink::{FrameSink, SinkConfig, VideoArtifact};
use crate::foundation::core::{Fps, FrameIndex, Size};
use crate::foundation::error::{StageError, StageResult};
use crate::render::surface::Surface;

/// Hold on the final frame after the animation ends.
pub const DEFAULT_TAIL_MS: u64 = 500;

/// How the capture loop waits between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pacing {
    /// One frame per wall-clock frame interval. A slow frame delays the next tick instead of
    /// triggering a burst of catch-up frames.
    #[default]
    RealTime,
    /// No waiting; frames are produced as fast as they render.
    Offline,
}

/// Capture loop settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureOpts {
    /// Output frame rate.
    pub fps: Fps,
    /// Extra frames repeating the last animation frame.
    pub tail_frames: u64,
    /// Wait strategy.
    pub pacing: Pacing,
}

impl CaptureOpts {
    /// Real-time capture at `fps` with a half-second tail.
    pub fn new(fps: Fps) -> Self {
        Self {
            fps,
            tail_frames: fps.millis_to_frames_round(DEFAULT_TAIL_MS),
            pacing: Pacing::RealTime,
        }
    }

    /// Replace the tail with `millis` worth of frames.
    pub fn with_tail_millis(mut self, millis: u64) -> Self {
        self.tail_frames = self.fps.millis_to_frames_round(millis);
        self
    }

    /// Replace the pacing.
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }
}

/// Admits one capture at a time; a second concurrent capture gets [`StageError::CaptureBusy`].
#[derive(Clone, Debug, Default)]
pub struct CaptureLock {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of a capture; releases the lock on drop.
#[derive(Debug)]
pub struct CaptureGuard {
    busy: Arc<AtomicBool>,
}

impl CaptureLock {
    /// Create an idle lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the lock or fail with [`StageError::CaptureBusy`].
    pub fn try_acquire(&self) -> StageResult<CaptureGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StageError::capture_busy("another capture is already in progress"))?;
        Ok(CaptureGuard {
            busy: Arc::clone(&self.busy),
        })
    }

    /// True while a guard is alive.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Drive `draw_frame` for `total_frames + tail_frames` ticks and stream the results into `sink`.
///
/// Tick `t` draws frame `min(t, total_frames - 1)` and pushes it as output frame `t`. A sink
/// that cannot start yields [`StageError::CaptureUnavailable`]; any later failure aborts the sink,
/// so no partial artifact escapes.
#[tracing::instrument(skip(sink, draw_frame), fields(fps = opts.fps.as_f64(), tail = opts.tail_frames))]
pub async fn capture<S, F>(
    sink: &mut S,
    size: Size,
    total_frames: u64,
    opts: CaptureOpts,
    mut draw_frame: F,
) -> StageResult<VideoArtifact>
where
    S: FrameSink + ?Sized,
    F: FnMut(FrameIndex) -> StageResult<Surface>,
{
    if total_frames == 0 {
        return Err(StageError::validation("nothing to capture: animation has no frames"));
    }

    sink.begin(SinkConfig {
        width: size.width,
        height: size.height,
        fps: opts.fps,
    })
    .map_err(|e| match e {
        StageError::Validation(_) | StageError::CaptureUnavailable(_) => e,
        other => StageError::capture_unavailable(other.to_string()),
    })?;

    match run_ticks(sink, total_frames, opts, &mut draw_frame).await {
        Ok(()) => sink.end(),
        Err(e) => {
            tracing::warn!(error = %e, "capture failed; discarding buffered frames");
            sink.abort();
            Err(e)
        }
    }
}

async fn run_ticks<S, F>(
    sink: &mut S,
    total_frames: u64,
    opts: CaptureOpts,
    draw_frame: &mut F,
) -> StageResult<()>
where
    S: FrameSink + ?Sized,
    F: FnMut(FrameIndex) -> StageResult<Surface>,
{
    let period = opts.fps.frame_interval().max(Duration::from_micros(1));
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ticks = total_frames + opts.tail_frames;
    for tick in 0..ticks {
        match opts.pacing {
            Pacing::RealTime => {
                ticker.tick().await;
            }
            Pacing::Offline => tokio::task::yield_now().await,
        }

        let started = Instant::now();
        let frame = draw_frame(FrameIndex(tick.min(total_frames - 1)))?;
        sink.push_frame(FrameIndex(tick), &frame)?;

        let spent = started.elapsed();
        if opts.pacing == Pacing::RealTime && spent > period {
            tracing::debug!(tick, ?spent, ?period, "frame overran its interval");
        }
    }
    tracing::debug!(ticks, "capture loop finished");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/capture/scheduler.rs"]
mod tests;
